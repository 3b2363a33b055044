//! Accessor tables standing in for runtime reflection
//!
//! A [`BeanClass`] records, for one Rust type, the constructors a
//! description may invoke and the properties it may write. The factory
//! only ever talks to types through these tables, addressed by type name.
//!
//! Tables are built with [`BeanClass::builder`] or generated with
//! `#[derive(Bean)]` (feature `derive`).
//!
//! ```rust
//! use bean_factory::{BeanClass, Value};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct AccountDao;
//!
//! #[derive(Default)]
//! struct PetStoreService {
//!     account_dao: Option<Arc<AccountDao>>,
//!     version: u32,
//! }
//!
//! let class = BeanClass::builder::<PetStoreService>("PetStoreService")
//!     .constructor(PetStoreService::default)
//!     .constructor(|version: u32| PetStoreService { version, ..Default::default() })
//!     .property("accountDao", |s: &mut PetStoreService, dao: Arc<AccountDao>| {
//!         s.account_dao = Some(dao)
//!     })
//!     .getter("version", |s: &PetStoreService| Value::Int(s.version.into()))
//!     .build();
//!
//! assert_eq!(class.constructors().len(), 2);
//! assert!(class.property("accountDao").is_some_and(|p| p.is_writable()));
//! ```

use crate::value::{FromValue, Value, ValueType};
use crate::{BeanError, Result};
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A bean under construction, before it is shared.
pub type BoxedInstance = Box<dyn Any + Send + Sync>;

/// Type-erased constructor function
type ConstructFn = Arc<dyn Fn(Vec<Value>) -> Result<BoxedInstance> + Send + Sync>;

/// Type-erased property writer
type SetterFn = Arc<dyn Fn(&mut (dyn Any + Send + Sync), Value) -> Result<()> + Send + Sync>;

/// Type-erased property reader
type GetterFn = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Option<Value> + Send + Sync>;

/// One declared constructor.
#[derive(Clone)]
pub struct Constructor {
    params: Vec<ValueType>,
    invoke: ConstructFn,
}

impl Constructor {
    /// Declared parameter types, in order
    #[inline]
    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Invoke with already converted arguments.
    pub fn invoke(&self, args: Vec<Value>) -> Result<BoxedInstance> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor").field("params", &self.params).finish()
    }
}

/// Closures usable as constructors: `Fn(A1, .., An) -> T` where every
/// argument implements [`FromValue`].
pub trait IntoConstructor<T, Args> {
    fn into_constructor(self) -> Constructor;
}

macro_rules! impl_into_constructor {
    ($($arg:ident),*) => {
        impl<T, F, $($arg,)*> IntoConstructor<T, ($($arg,)*)> for F
        where
            T: Send + Sync + 'static,
            F: Fn($($arg),*) -> T + Send + Sync + 'static,
            $($arg: FromValue,)*
        {
            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_constructor(self) -> Constructor {
                let params = vec![$($arg::value_type()),*];
                let arity = params.len();
                Constructor {
                    params,
                    invoke: Arc::new(move |args: Vec<Value>| {
                        let supplied = args.len();
                        let mismatch = || BeanError::NoMatchingConstructor {
                            type_name: std::any::type_name::<T>().to_string(),
                            arity: supplied,
                        };
                        if supplied != arity {
                            return Err(mismatch());
                        }
                        let mut args = args.into_iter();
                        $(
                            let $arg = match args.next() {
                                Some(value) => $arg::from_value(value)?,
                                None => return Err(mismatch()),
                            };
                        )*
                        Ok(Box::new((self)($($arg),*)) as BoxedInstance)
                    }),
                }
            }
        }
    };
}

impl_into_constructor!();
impl_into_constructor!(A1);
impl_into_constructor!(A1, A2);
impl_into_constructor!(A1, A2, A3);
impl_into_constructor!(A1, A2, A3, A4);
impl_into_constructor!(A1, A2, A3, A4, A5);
impl_into_constructor!(A1, A2, A3, A4, A5, A6);

/// One named member: its declared type and how to write/read it.
#[derive(Clone)]
pub struct PropertyDescriptor {
    name: String,
    value_type: ValueType,
    setter: Option<SetterFn>,
    getter: Option<GetterFn>,
}

impl PropertyDescriptor {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of the member
    #[inline]
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    #[inline]
    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("writable", &self.is_writable())
            .field("readable", &self.is_readable())
            .finish()
    }
}

/// Accessor table for one bean type.
#[derive(Clone)]
pub struct BeanClass {
    name: String,
    type_id: TypeId,
    constructors: Vec<Constructor>,
    properties: Vec<PropertyDescriptor>,
}

impl BeanClass {
    /// Start a table for `T`, registered under `name`.
    pub fn builder<T: Send + Sync + 'static>(name: impl Into<String>) -> BeanClassBuilder<T> {
        BeanClassBuilder {
            name: name.into(),
            constructors: Vec::new(),
            properties: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Name descriptions use to refer to this type
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `TypeId` of the concrete type this table builds
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Constructors in declaration order
    #[inline]
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// The zero-argument constructor, if declared
    pub fn default_constructor(&self) -> Option<&Constructor> {
        self.constructors.iter().find(|c| c.arity() == 0)
    }

    #[inline]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Look up a member by name
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Write member `name` on `instance` with an already converted value.
    pub fn set_member(&self, instance: &mut (dyn Any + Send + Sync), name: &str, value: Value) -> Result<()> {
        let setter = self
            .property(name)
            .and_then(|p| p.setter.as_ref())
            .ok_or_else(|| BeanError::unknown_property(&self.name, name))?;
        setter(instance, value)
    }

    /// Read member `name` from `instance`; `None` when it has no getter.
    pub fn read_member(&self, instance: &(dyn Any + Send + Sync), name: &str) -> Option<Value> {
        self.property(name)
            .and_then(|p| p.getter.as_ref())
            .and_then(|getter| getter(instance))
    }
}

impl fmt::Debug for BeanClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanClass")
            .field("name", &self.name)
            .field("constructors", &self.constructors)
            .field("properties", &self.properties)
            .finish()
    }
}

/// Fluent builder for a [`BeanClass`].
pub struct BeanClassBuilder<T> {
    name: String,
    constructors: Vec<Constructor>,
    properties: Vec<PropertyDescriptor>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> BeanClassBuilder<T> {
    /// Declare a constructor. Declaration order breaks ties between
    /// constructors of the same arity.
    pub fn constructor<Args, F>(mut self, f: F) -> Self
    where
        F: IntoConstructor<T, Args>,
    {
        self.constructors.push(f.into_constructor());
        self
    }

    /// Declare a writable property.
    ///
    /// Declaring the same name again replaces the writer and keeps any reader.
    pub fn property<V, F>(mut self, name: impl Into<String>, set: F) -> Self
    where
        V: FromValue,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let name = name.into();
        let setter: SetterFn = Arc::new(move |target: &mut (dyn Any + Send + Sync), value: Value| {
            let bean = target
                .downcast_mut::<T>()
                .ok_or_else(|| BeanError::conversion("bean instance", ValueType::bean::<T>()))?;
            set(bean, V::from_value(value)?);
            Ok(())
        });
        self.descriptor(name, V::value_type()).setter = Some(setter);
        self
    }

    /// Declare a readable property.
    pub fn getter<F>(mut self, name: impl Into<String>, get: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        let getter: GetterFn =
            Arc::new(move |target: &(dyn Any + Send + Sync)| target.downcast_ref::<T>().map(&get));
        self.descriptor(name.into(), ValueType::Any).getter = Some(getter);
        self
    }

    fn descriptor(&mut self, name: String, value_type: ValueType) -> &mut PropertyDescriptor {
        match self.properties.iter().position(|p| p.name == name) {
            Some(index) => {
                let existing = &mut self.properties[index];
                if existing.value_type == ValueType::Any {
                    existing.value_type = value_type;
                }
                existing
            }
            None => {
                self.properties.push(PropertyDescriptor {
                    name,
                    value_type,
                    setter: None,
                    getter: None,
                });
                let last = self.properties.len() - 1;
                &mut self.properties[last]
            }
        }
    }

    pub fn build(self) -> BeanClass {
        BeanClass {
            name: self.name,
            type_id: TypeId::of::<T>(),
            constructors: self.constructors,
            properties: self.properties,
        }
    }
}

/// Types that describe their own accessor table.
///
/// Implemented by `#[derive(Bean)]`; register with
/// [`BeanFactory::register_type`](crate::BeanFactory::register_type).
pub trait BeanType: Send + Sync + 'static {
    fn bean_class() -> BeanClass;
}
