//! Type-name lookup of accessor tables
//!
//! The loader is the factory's only way to reach a Rust type from the
//! `type_name` written in a description.

use crate::class::{BeanClass, BeanType, BoxedInstance, Constructor, PropertyDescriptor};
use crate::value::Value;
use crate::{BeanError, Result};
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Registry of [`BeanClass`] tables keyed by type name.
///
/// Cloning is cheap and clones share the same tables, so one loader can
/// back several factories.
#[derive(Clone)]
pub struct ClassLoader {
    classes: Arc<DashMap<String, Arc<BeanClass>, RandomState>>,
}

impl ClassLoader {
    /// Create an empty loader.
    ///
    /// 8 shards is plenty for the handful of types a typical
    /// configuration names.
    pub fn new() -> Self {
        Self {
            classes: Arc::new(DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                8,
            )),
        }
    }

    /// Register a table under its own name, replacing any previous one.
    pub fn register(&self, class: BeanClass) {
        let name = class.name().to_string();

        #[cfg(feature = "logging")]
        debug!(
            target: "bean_factory",
            class = %name,
            constructors = class.constructors().len(),
            properties = class.properties().len(),
            "Registering bean class"
        );

        let _previous = self.classes.insert(name, Arc::new(class));

        #[cfg(feature = "logging")]
        if let Some(previous) = _previous {
            warn!(
                target: "bean_factory",
                class = previous.name(),
                "Bean class replaced by a later registration"
            );
        }
    }

    /// Register the table a [`BeanType`] describes.
    #[inline]
    pub fn register_type<T: BeanType>(&self) {
        self.register(T::bean_class());
    }

    /// Look up a table by type name
    pub fn load(&self, type_name: &str) -> Result<Arc<BeanClass>> {
        self.classes
            .get(type_name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| BeanError::ClassNotFound {
                type_name: type_name.to_string(),
            })
    }

    #[inline]
    pub fn contains(&self, type_name: &str) -> bool {
        self.classes.contains_key(type_name)
    }

    /// Declared constructors of `type_name`, in declaration order
    pub fn constructors(&self, type_name: &str) -> Result<Vec<Constructor>> {
        Ok(self.load(type_name)?.constructors().to_vec())
    }

    /// Member `name` of `type_name`
    pub fn member(&self, type_name: &str, name: &str) -> Result<PropertyDescriptor> {
        self.load(type_name)?
            .property(name)
            .cloned()
            .ok_or_else(|| BeanError::unknown_property(type_name, name))
    }

    /// Invoke the first constructor of `type_name` whose arity matches `args`.
    ///
    /// Arguments must already have the parameter types; no conversion or
    /// overload selection happens here.
    pub fn instantiate(&self, type_name: &str, args: Vec<Value>) -> Result<BoxedInstance> {
        let class = self.load(type_name)?;
        let arity = args.len();
        let constructor = class
            .constructors()
            .iter()
            .find(|c| c.arity() == arity)
            .ok_or_else(|| {
                if arity == 0 {
                    BeanError::NoDefaultConstructor {
                        type_name: type_name.to_string(),
                    }
                } else {
                    BeanError::NoMatchingConstructor {
                        type_name: type_name.to_string(),
                        arity,
                    }
                }
            })?;
        constructor.invoke(args)
    }

    /// Number of registered tables
    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for ClassLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClassLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassLoader")
            .field("count", &self.len())
            .finish()
    }
}
