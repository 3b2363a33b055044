//! The bean factory
//!
//! `BeanFactory` owns the description map, the class loader, the type
//! converter and the singleton cache, and drives construction:
//!
//! 1. look up the description (absent ⇒ [`BeanError::UnknownBean`])
//! 2. singleton already cached ⇒ return it
//! 3. otherwise construct, populate, cache if singleton, return
//!
//! Construction and population failures come back as
//! [`BeanError::BeanCreation`] naming the bean and its type, with the
//! underlying error as the source.

use crate::class::{BeanClass, BeanType};
use crate::constructor::ConstructorResolver;
use crate::convert::{SimpleTypeConverter, TypeConverter};
use crate::description::BeanDescription;
use crate::loader::ClassLoader;
use crate::populate::PropertyPopulator;
use crate::singleton::SingletonRegistry;
use crate::source::DescriptionSource;
use crate::value::Instance;
use crate::{BeanError, Result};
use ahash::RandomState;
use dashmap::DashMap;
use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

thread_local! {
    /// Beans being built on this thread, outermost first, tagged with the
    /// address of the factory building them.
    static IN_FLIGHT: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a bean as under construction on the current thread until dropped.
///
/// Entering an id that is already in flight for the same factory is a
/// cycle, including one closed by a description registered mid-build.
struct InFlight;

impl InFlight {
    fn enter(factory: &BeanFactory, id: &str) -> Result<Self> {
        let key = factory as *const BeanFactory as usize;
        IN_FLIGHT.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(start) = stack.iter().position(|(owner, seen)| *owner == key && seen == id) {
                let mut chain: Vec<String> = stack[start..]
                    .iter()
                    .filter(|(owner, _)| *owner == key)
                    .map(|(_, seen)| seen.clone())
                    .collect();
                chain.push(id.to_string());

                #[cfg(feature = "logging")]
                warn!(target: "bean_factory", chain = %chain.join(" -> "), "Circular bean reference during construction");

                return Err(BeanError::CyclicDependency { chain });
            }
            stack.push((key, id.to_string()));
            Ok(InFlight)
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let _ = IN_FLIGHT.try_with(|stack| stack.borrow_mut().pop());
    }
}

/// Declarative bean container.
///
/// Safe to share across threads (`Arc<BeanFactory>`); concurrent first
/// requests for the same singleton construct it once.
///
/// # Examples
///
/// ```rust
/// use bean_factory::{BeanClass, BeanDescription, BeanFactory};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct PetStoreService;
///
/// let factory = BeanFactory::new();
/// factory.register_class(
///     BeanClass::builder::<PetStoreService>("PetStoreService")
///         .constructor(PetStoreService::default)
///         .build(),
/// );
/// factory.register_description(BeanDescription::new("petStore", "PetStoreService"));
///
/// let a = factory.get_bean_as::<PetStoreService>("petStore").unwrap();
/// let b = factory.get_bean_as::<PetStoreService>("petStore").unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct BeanFactory {
    descriptions: DashMap<String, Arc<BeanDescription>, RandomState>,
    singletons: SingletonRegistry,
    classes: ClassLoader,
    converter: Arc<dyn TypeConverter>,
    ignore_unknown_properties: bool,
}

impl BeanFactory {
    /// Create an empty factory with the default converter and its own
    /// class loader.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Configure a factory.
    #[inline]
    pub fn builder() -> BeanFactoryBuilder {
        BeanFactoryBuilder::default()
    }

    /// Create a factory holding every description `source` yields.
    pub fn from_source<S: DescriptionSource + ?Sized>(source: &S) -> Result<Self> {
        let factory = Self::new();
        factory.load(source)?;
        Ok(factory)
    }

    /// Create a factory from a `.toml` or `.json` description file.
    #[cfg(any(feature = "toml", feature = "json"))]
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let factory = Self::new();
        factory.register_descriptions(crate::source::load_path(path)?);
        Ok(factory)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a description under its id. A later registration for the
    /// same id replaces the earlier one.
    pub fn register_description(&self, description: BeanDescription) {
        let id = description.id().to_string();

        #[cfg(feature = "logging")]
        debug!(
            target: "bean_factory",
            bean = %id,
            class = description.type_name(),
            scope = %description.scope(),
            constructor_args = description.constructor_args().len(),
            properties = description.properties().len(),
            "Registering bean description"
        );

        let _previous = self.descriptions.insert(id, Arc::new(description));

        #[cfg(feature = "logging")]
        if let Some(previous) = _previous {
            warn!(
                target: "bean_factory",
                bean = previous.id(),
                "Bean description overwritten by a later registration"
            );
        }
    }

    /// Register several descriptions in order.
    pub fn register_descriptions<I>(&self, descriptions: I)
    where
        I: IntoIterator<Item = BeanDescription>,
    {
        for description in descriptions {
            self.register_description(description);
        }
    }

    /// Register everything `source` yields; returns how many descriptions
    /// were read. Nothing is registered when the source fails.
    pub fn load<S: DescriptionSource + ?Sized>(&self, source: &S) -> Result<usize> {
        let descriptions = source.load_descriptions()?;
        let count = descriptions.len();
        self.register_descriptions(descriptions);
        Ok(count)
    }

    /// Register an already built instance as a singleton bean.
    ///
    /// The bean is described as a singleton of type
    /// `std::any::type_name::<T>()` with no arguments or properties. The
    /// first instance for an id wins: returns `false` and changes nothing
    /// when `id` already holds a cached singleton. No class is registered
    /// for it, so it does not survive [`destroy_singletons`](Self::destroy_singletons).
    pub fn register_singleton<T: Send + Sync + 'static>(&self, id: &str, instance: Arc<T>) -> bool {
        if !self.singletons.register(id, instance) {
            return false;
        }
        self.register_description(BeanDescription::new(id, std::any::type_name::<T>()));
        true
    }

    /// Make a type available to descriptions under the table's name.
    #[inline]
    pub fn register_class(&self, class: BeanClass) {
        self.classes.register(class);
    }

    /// Register the table a [`BeanType`] describes.
    #[inline]
    pub fn register_type<T: BeanType>(&self) {
        self.classes.register_type::<T>();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The description registered under `id`.
    pub fn get_bean_description(&self, id: &str) -> Option<Arc<BeanDescription>> {
        self.descriptions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    #[inline]
    pub fn contains_bean(&self, id: &str) -> bool {
        self.descriptions.contains_key(id)
    }

    /// Whether `id` is singleton-scoped
    pub fn is_singleton(&self, id: &str) -> Result<bool> {
        self.description(id).map(|d| d.is_singleton())
    }

    /// Whether `id` is prototype-scoped
    pub fn is_prototype(&self, id: &str) -> Result<bool> {
        self.description(id).map(|d| d.is_prototype())
    }

    /// Ids of every registered description
    pub fn bean_ids(&self) -> Vec<String> {
        self.descriptions.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of registered descriptions
    #[inline]
    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }

    /// Number of singletons constructed so far
    #[inline]
    pub fn singleton_count(&self) -> usize {
        self.singletons.len()
    }

    #[inline]
    pub fn class_loader(&self) -> &ClassLoader {
        &self.classes
    }

    #[inline]
    pub fn converter(&self) -> &dyn TypeConverter {
        self.converter.as_ref()
    }

    #[inline]
    pub fn ignores_unknown_properties(&self) -> bool {
        self.ignore_unknown_properties
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve a bean by id.
    ///
    /// Singletons are built on first request and cached for the life of
    /// the factory; prototypes are built on every request.
    pub fn get_bean(&self, id: &str) -> Result<Instance> {
        let description = self.description(id)?;

        if description.is_singleton() {
            if let Some(instance) = self.singletons.get(id) {
                #[cfg(feature = "logging")]
                trace!(target: "bean_factory", bean = id, "Singleton resolved from cache");
                return Ok(instance);
            }
        }

        self.check_references(id)?;
        self.obtain(&description)
    }

    /// Resolve a bean and downcast it to `T`.
    pub fn get_bean_as<T: Send + Sync + 'static>(&self, id: &str) -> Result<Arc<T>> {
        self.get_bean(id)?
            .downcast::<T>()
            .map_err(|_| BeanError::BeanNotOfRequiredType {
                id: id.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Try to resolve, returning `None` on any failure.
    #[inline]
    pub fn try_get_bean(&self, id: &str) -> Option<Instance> {
        self.get_bean(id).ok()
    }

    /// Resolution of a reference met while building another bean. The
    /// reference graph was already checked by the outermost `get_bean`;
    /// changes made since then are caught by the in-flight path in
    /// `obtain`.
    pub(crate) fn resolve_reference(&self, id: &str) -> Result<Instance> {
        let description = self.description(id)?;
        self.obtain(&description)
    }

    fn description(&self, id: &str) -> Result<Arc<BeanDescription>> {
        self.get_bean_description(id).ok_or_else(|| {
            #[cfg(feature = "logging")]
            debug!(target: "bean_factory", bean = id, "Bean not defined");
            BeanError::unknown_bean(id)
        })
    }

    fn obtain(&self, description: &BeanDescription) -> Result<Instance> {
        let _in_flight = InFlight::enter(self, description.id())?;

        if description.is_singleton() {
            self.singletons
                .get_or_try_create(description.id(), || self.create_bean(description))
        } else {
            self.create_bean(description)
        }
    }

    fn create_bean(&self, description: &BeanDescription) -> Result<Instance> {
        let id = description.id();
        let type_name = description.type_name();

        #[cfg(feature = "logging")]
        debug!(
            target: "bean_factory",
            bean = id,
            class = type_name,
            scope = %description.scope(),
            "Creating bean instance"
        );

        let wrap = |cause: BeanError| BeanError::creation_failed(id, type_name, cause);

        let class = self.classes.load(type_name).map_err(wrap)?;
        let mut instance = ConstructorResolver::new(self)
            .construct(description, &class)
            .map_err(wrap)?;
        PropertyPopulator::new(self)
            .populate(description, &class, instance.as_mut())
            .map_err(wrap)?;

        Ok(Instance::from(instance))
    }

    /// Fail fast on reference cycles reachable from `root`.
    ///
    /// Cached singletons are never rebuilt, so their own references are
    /// not followed. Dangling references are left for construction to
    /// report.
    fn check_references(&self, root: &str) -> Result<()> {
        let mut path = Vec::new();
        let mut done = HashSet::with_hasher(RandomState::new());
        self.visit(root, &mut path, &mut done)
    }

    fn visit(&self, id: &str, path: &mut Vec<String>, done: &mut HashSet<String, RandomState>) -> Result<()> {
        if done.contains(id) {
            return Ok(());
        }
        if let Some(start) = path.iter().position(|seen| seen == id) {
            let mut chain = path[start..].to_vec();
            chain.push(id.to_string());

            #[cfg(feature = "logging")]
            warn!(target: "bean_factory", chain = %chain.join(" -> "), "Circular bean reference");

            return Err(BeanError::CyclicDependency { chain });
        }

        let Some(description) = self.get_bean_description(id) else {
            return Ok(());
        };
        if description.is_singleton() && self.singletons.contains(id) {
            done.insert(id.to_string());
            return Ok(());
        }

        path.push(id.to_string());
        for reference in description.references() {
            self.visit(reference, path, done)?;
        }
        path.pop();
        done.insert(id.to_string());
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Drop every cached singleton. Descriptions and classes stay
    /// registered, so later requests build fresh singletons.
    ///
    /// Instances added through [`register_singleton`](Self::register_singleton)
    /// are dropped too, but their descriptions name no registered class:
    /// requesting them afterwards fails with [`BeanError::ClassNotFound`]
    /// beneath a [`BeanError::BeanCreation`] unless a class of that name
    /// has been registered since.
    pub fn destroy_singletons(&self) {
        #[cfg(feature = "logging")]
        debug!(
            target: "bean_factory",
            singletons = self.singletons.len(),
            "Destroying singletons"
        );

        self.singletons.clear();
    }
}

impl Default for BeanFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BeanFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanFactory")
            .field("descriptions", &self.len())
            .field("singletons", &self.singleton_count())
            .field("classes", &self.classes.len())
            .field("ignore_unknown_properties", &self.ignore_unknown_properties)
            .finish()
    }
}

/// Configuration for a [`BeanFactory`].
///
/// ```rust
/// use bean_factory::{BeanFactory, ClassLoader, SimpleTypeConverter};
/// use std::sync::Arc;
///
/// let classes = ClassLoader::new();
/// let factory = BeanFactory::builder()
///     .with_class_loader(classes.clone())
///     .with_converter(Arc::new(SimpleTypeConverter::new()))
///     .with_capacity(32)
///     .ignore_unknown_properties(true)
///     .build();
///
/// assert!(factory.ignores_unknown_properties());
/// ```
#[derive(Default)]
pub struct BeanFactoryBuilder {
    converter: Option<Arc<dyn TypeConverter>>,
    classes: Option<ClassLoader>,
    capacity: usize,
    ignore_unknown_properties: bool,
}

impl BeanFactoryBuilder {
    /// Use a custom converter instead of [`SimpleTypeConverter`]
    pub fn with_converter(mut self, converter: Arc<dyn TypeConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Share an existing class loader
    pub fn with_class_loader(mut self, classes: ClassLoader) -> Self {
        self.classes = Some(classes);
        self
    }

    /// Pre-size the description map and singleton cache
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Skip properties with no writable member instead of failing
    pub fn ignore_unknown_properties(mut self, ignore: bool) -> Self {
        self.ignore_unknown_properties = ignore;
        self
    }

    pub fn build(self) -> BeanFactory {
        #[cfg(feature = "logging")]
        debug!(
            target: "bean_factory",
            capacity = self.capacity,
            ignore_unknown_properties = self.ignore_unknown_properties,
            "Creating new bean factory"
        );

        let shard_amount = if self.capacity <= 16 { 8 } else { 16 };
        BeanFactory {
            descriptions: DashMap::with_capacity_and_hasher_and_shard_amount(
                self.capacity,
                RandomState::new(),
                shard_amount,
            ),
            singletons: SingletonRegistry::with_capacity(self.capacity),
            classes: self.classes.unwrap_or_default(),
            converter: self
                .converter
                .unwrap_or_else(|| Arc::new(SimpleTypeConverter::new())),
            ignore_unknown_properties: self.ignore_unknown_properties,
        }
    }
}
