#![no_main]

//! Fuzz target for concurrent factory operations
//!
//! Threads race first access, re-registration and teardown on a shared
//! factory; every singleton handed out between teardowns must be the same
//! instance.

use arbitrary::Arbitrary;
use bean_factory::{BeanClass, BeanDescription, BeanFactory, ConfigValue, Scope};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;
use std::thread;

#[derive(Default)]
struct Shared {
    dep: Option<Arc<Leaf>>,
}

#[derive(Default)]
struct Leaf;

#[derive(Debug, Clone, Arbitrary)]
enum ThreadOp {
    GetShared,
    GetLeaf,
    GetMissing,
    Reregister(bool),
    Contains,
}

#[derive(Debug, Arbitrary)]
struct ConcurrentScenario {
    // Clamped to 1-8
    thread_count: u8,
    ops_per_thread: Vec<ThreadOp>,
}

fuzz_target!(|scenario: ConcurrentScenario| {
    let factory = Arc::new(BeanFactory::new());
    factory.register_class(BeanClass::builder::<Leaf>("Leaf").constructor(Leaf::default).build());
    factory.register_class(
        BeanClass::builder::<Shared>("Shared")
            .constructor(Shared::default)
            .property("dep", |s: &mut Shared, leaf: Arc<Leaf>| s.dep = Some(leaf))
            .build(),
    );
    factory.register_description(BeanDescription::new("leaf", "Leaf"));
    factory.register_description(
        BeanDescription::new("shared", "Shared").with_property("dep", ConfigValue::reference("leaf")),
    );

    let thread_count = (scenario.thread_count % 8).max(1) as usize;
    let ops = scenario.ops_per_thread;

    let handles: Vec<_> = (0..thread_count)
        .map(|_| {
            let factory = Arc::clone(&factory);
            let ops = ops.clone();
            thread::spawn(move || {
                for op in ops.into_iter().take(50) {
                    match op {
                        ThreadOp::GetShared => {
                            let shared = factory.get_bean_as::<Shared>("shared").unwrap();
                            assert!(shared.dep.is_some());
                        }
                        ThreadOp::GetLeaf => {
                            let _ = factory.get_bean_as::<Leaf>("leaf").unwrap();
                        }
                        ThreadOp::GetMissing => {
                            assert!(factory.get_bean("missing").unwrap_err().is_unknown_bean());
                        }
                        ThreadOp::Reregister(prototype) => {
                            let scope = if prototype { Scope::Prototype } else { Scope::Singleton };
                            factory.register_description(BeanDescription::new("leaf", "Leaf").with_scope(scope));
                        }
                        ThreadOp::Contains => {
                            assert!(factory.contains_bean("shared"));
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Same instance for every caller once threads are done
    let a = factory.get_bean("shared").unwrap();
    let b = factory.get_bean("shared").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
});
