//! # Bean Factory - Declarative Bean Container for Rust
//!
//! Beans are described by id, type name, scope, constructor arguments and
//! property values. The factory builds them on request, wiring references
//! to other beans and converting literal text to the declared member
//! types.
//!
//! ## Features
//!
//! - 🧩 **Declarative** - descriptions built in code or read from TOML/JSON
//! - 🔌 **Autowired constructors** - overloads picked by arity, then by
//!   which parameters accept the arguments
//! - 🔗 **References** - properties and arguments can point at other beans
//! - 🏭 **Per-factory singletons** - built once, even under concurrent
//!   first access
//! - ♻️ **Prototypes** - a fresh instance on every request
//! - 🧯 **Typed failures** - unknown ids, missing constructors, bad
//!   conversions and reference cycles are all distinct errors
//! - 📊 **Observable** - optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use bean_factory::{BeanClass, BeanDescription, BeanFactory, ConfigValue};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct AccountDao;
//!
//! #[derive(Default)]
//! struct PetStoreService {
//!     account_dao: Option<Arc<AccountDao>>,
//!     max_items: u32,
//! }
//!
//! let factory = BeanFactory::new();
//!
//! // Accessor tables: how to build each type and write its members
//! factory.register_class(
//!     BeanClass::builder::<AccountDao>("AccountDao")
//!         .constructor(AccountDao::default)
//!         .build(),
//! );
//! factory.register_class(
//!     BeanClass::builder::<PetStoreService>("PetStoreService")
//!         .constructor(PetStoreService::default)
//!         .property("accountDao", |s: &mut PetStoreService, dao: Arc<AccountDao>| {
//!             s.account_dao = Some(dao)
//!         })
//!         .property("maxItems", |s: &mut PetStoreService, n: u32| s.max_items = n)
//!         .build(),
//! );
//!
//! // Descriptions: which beans exist and how they are wired
//! factory.register_description(BeanDescription::new("accountDao", "AccountDao"));
//! factory.register_description(
//!     BeanDescription::new("petStore", "PetStoreService")
//!         .with_property("accountDao", ConfigValue::reference("accountDao"))
//!         .with_property("maxItems", "25"),
//! );
//!
//! let store = factory.get_bean_as::<PetStoreService>("petStore").unwrap();
//! let dao = factory.get_bean_as::<AccountDao>("accountDao").unwrap();
//!
//! assert_eq!(store.max_items, 25);
//! assert!(Arc::ptr_eq(store.account_dao.as_ref().unwrap(), &dao));
//! ```
//!
//! ## Scopes
//!
//! ```rust
//! use bean_factory::{BeanClass, BeanDescription, BeanFactory, Scope};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct ShoppingCart;
//!
//! let factory = BeanFactory::new();
//! factory.register_class(
//!     BeanClass::builder::<ShoppingCart>("ShoppingCart")
//!         .constructor(ShoppingCart::default)
//!         .build(),
//! );
//! factory.register_description(
//!     BeanDescription::new("cart", "ShoppingCart").with_scope(Scope::Prototype),
//! );
//!
//! let a = factory.get_bean("cart").unwrap();
//! let b = factory.get_bean("cart").unwrap();
//! assert!(!Arc::ptr_eq(&a, &b));
//! ```
//!
//! ## Description files
//!
//! With the default `toml` and `json` features, descriptions can be read
//! from files with [`BeanFactory::from_path`] or [`load_path`]; see the
//! [`TomlSource`] docs for the format.

// Lets generated `::bean_factory::...` paths resolve inside this crate too.
extern crate self as bean_factory;

mod class;
mod constructor;
mod convert;
mod description;
mod error;
mod factory;
mod loader;
#[cfg(feature = "logging")]
pub mod logging;
mod populate;
mod resolver;
mod singleton;
mod source;
mod value;

pub use class::*;
pub use constructor::*;
pub use convert::*;
pub use description::*;
pub use error::*;
pub use factory::*;
pub use loader::*;
pub use populate::*;
pub use resolver::*;
pub use singleton::*;
pub use source::*;
pub use value::*;

#[cfg(feature = "derive")]
pub use bean_factory_derive::Bean;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BeanClass, BeanDescription, BeanError, BeanFactory, BeanType, ClassLoader, ConfigValue,
        DescriptionSource, FromValue, Instance, Result, Scope, TypeConverter, Value, ValueType,
    };
    #[cfg(feature = "derive")]
    pub use crate::Bean;
    pub use std::sync::Arc;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Barrier;
    use std::thread;

    #[derive(Default)]
    struct PetStoreService;

    #[derive(Default)]
    struct B;

    #[derive(Default)]
    struct A {
        dep: Option<Arc<B>>,
    }

    fn factory() -> BeanFactory {
        let factory = BeanFactory::new();
        factory.register_class(
            BeanClass::builder::<PetStoreService>("PetStoreService")
                .constructor(PetStoreService::default)
                .build(),
        );
        factory.register_class(BeanClass::builder::<B>("B").constructor(B::default).build());
        factory.register_class(
            BeanClass::builder::<A>("A")
                .constructor(A::default)
                .property("dep", |a: &mut A, b: Arc<B>| a.dep = Some(b))
                .build(),
        );
        factory
    }

    #[test]
    fn test_singleton_identity() {
        let factory = factory();
        factory.register_description(BeanDescription::new("petStore", "PetStoreService"));

        let first = factory.get_bean("petStore").unwrap();
        let second = factory.get_bean("petStore").unwrap();

        assert!(first.is::<PetStoreService>());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.singleton_count(), 1);
    }

    #[test]
    fn test_reference_wiring() {
        let factory = factory();
        factory.register_description(BeanDescription::new("a", "A").with_property("dep", ConfigValue::reference("b")));
        factory.register_description(BeanDescription::new("b", "B"));

        let a = factory.get_bean_as::<A>("a").unwrap();
        let b = factory.get_bean_as::<B>("b").unwrap();
        assert!(Arc::ptr_eq(a.dep.as_ref().unwrap(), &b));
    }

    #[test]
    fn test_unknown_bean() {
        let factory = factory();
        let err = factory.get_bean("invalidBean").unwrap_err();
        assert!(matches!(err, BeanError::UnknownBean { ref id } if id == "invalidBean"));
        assert_eq!(err.to_string(), "No bean named 'invalidBean' is defined");
    }

    #[test]
    fn test_prototype_distinctness() {
        static CREATED: AtomicU32 = AtomicU32::new(0);

        struct Counter(u32);

        let factory = factory();
        factory.register_class(
            BeanClass::builder::<Counter>("Counter")
                .constructor(|| Counter(CREATED.fetch_add(1, Ordering::SeqCst)))
                .build(),
        );
        factory.register_description(BeanDescription::new("counter", "Counter").with_scope(Scope::Prototype));

        let c1 = factory.get_bean_as::<Counter>("counter").unwrap();
        let c2 = factory.get_bean_as::<Counter>("counter").unwrap();

        assert!(!Arc::ptr_eq(&c1, &c2));
        assert_ne!(c1.0, c2.0);
        assert_eq!(factory.singleton_count(), 0);
    }

    #[test]
    fn test_constructor_selected_by_arity() {
        struct Endpoint {
            host: String,
            port: u16,
        }

        let factory = factory();
        factory.register_class(
            BeanClass::builder::<Endpoint>("Endpoint")
                .constructor(|host: String| Endpoint { host, port: 80 })
                .constructor(|host: String, port: u16| Endpoint { host, port })
                .build(),
        );
        factory.register_description(
            BeanDescription::new("api", "Endpoint")
                .with_constructor_arg("example.org")
                .with_constructor_arg("8443"),
        );
        factory.register_description(BeanDescription::new("web", "Endpoint").with_constructor_arg("example.org"));

        let api = factory.get_bean_as::<Endpoint>("api").unwrap();
        assert_eq!((api.host.as_str(), api.port), ("example.org", 8443));

        let web = factory.get_bean_as::<Endpoint>("web").unwrap();
        assert_eq!(web.port, 80);
    }

    #[test]
    fn test_mutual_references_fail_fast() {
        let factory = factory();
        factory.register_class(
            BeanClass::builder::<B>("Loop")
                .constructor(B::default)
                .property("peer", |_: &mut B, _: Value| {})
                .build(),
        );
        factory.register_description(BeanDescription::new("x", "Loop").with_property("peer", ConfigValue::reference("y")));
        factory.register_description(BeanDescription::new("y", "Loop").with_property("peer", ConfigValue::reference("x")));

        let err = factory.get_bean("x").unwrap_err();
        assert!(matches!(err, BeanError::CyclicDependency { ref chain } if chain == &["x", "y", "x"]));
        assert_eq!(err.to_string(), "Circular reference between beans: x -> y -> x");
    }

    #[test]
    fn test_concurrent_first_access_constructs_once() {
        static CREATED: AtomicU32 = AtomicU32::new(0);

        struct Expensive;

        let factory = Arc::new(factory());
        factory.register_class(
            BeanClass::builder::<Expensive>("Expensive")
                .constructor(|| {
                    CREATED.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(std::time::Duration::from_millis(10));
                    Expensive
                })
                .build(),
        );
        factory.register_description(BeanDescription::new("expensive", "Expensive"));

        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let factory = Arc::clone(&factory);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    factory.get_bean("expensive").unwrap()
                })
            })
            .collect();

        let beans: Vec<Instance> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(CREATED.load(Ordering::SeqCst), 1);
        assert!(beans.iter().all(|b| Arc::ptr_eq(b, &beans[0])));
    }

    #[test]
    fn test_nested_failure_keeps_cause_chain() {
        let factory = factory();
        factory.register_description(BeanDescription::new("a", "A").with_property("dep", ConfigValue::reference("b")));
        factory.register_description(BeanDescription::new("b", "B").with_property("colour", "red"));

        let err = factory.get_bean("a").unwrap_err();
        match &err {
            BeanError::BeanCreation { id, source: Some(inner), .. } => {
                assert_eq!(id, "a");
                assert!(matches!(inner.as_ref(), BeanError::BeanCreation { id, .. } if id == "b"));
            }
            other => panic!("expected creation error, got {other:?}"),
        }
        assert!(matches!(err.root_cause(), BeanError::UnknownProperty { property, .. } if property == "colour"));

        // Neither bean was cached.
        assert_eq!(factory.singleton_count(), 0);
    }

    #[test]
    fn test_factories_are_independent() {
        let first = factory();
        let second = BeanFactory::builder()
            .with_class_loader(first.class_loader().clone())
            .build();

        first.register_description(BeanDescription::new("petStore", "PetStoreService"));
        second.register_description(BeanDescription::new("petStore", "PetStoreService"));

        let a = first.get_bean("petStore").unwrap();
        let b = second.get_bean("petStore").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[cfg(feature = "derive")]
    mod derive {
        use super::*;

        #[derive(Default, Bean)]
        struct Inventory;

        #[derive(Default, Bean)]
        #[bean(name = "PetStore")]
        struct Store {
            inventory: Option<Arc<Inventory>>,
            #[property(name = "maxItems")]
            max_items: u32,
            #[property(skip)]
            #[allow(dead_code)]
            visits: AtomicU32,
        }

        #[test]
        fn test_derived_accessor_table() {
            let class = Store::bean_class();
            assert_eq!(class.name(), "PetStore");
            assert!(class.default_constructor().is_some());
            assert!(class.property("maxItems").is_some());
            assert!(class.property("max_items").is_none());
            assert!(class.property("visits").is_none());

            let factory = BeanFactory::new();
            factory.register_type::<Inventory>();
            factory.register_type::<Store>();
            factory.register_description(BeanDescription::new("inventory", "Inventory"));
            factory.register_description(
                BeanDescription::new("store", "PetStore")
                    .with_property("inventory", ConfigValue::reference("inventory"))
                    .with_property("maxItems", "12"),
            );

            let store = factory.get_bean_as::<Store>("store").unwrap();
            assert_eq!(store.max_items, 12);
            assert!(store.inventory.is_some());
        }
    }
}
