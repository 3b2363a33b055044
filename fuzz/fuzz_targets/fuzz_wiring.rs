#![no_main]

//! Fuzz target for description graphs
//!
//! Registers arbitrary descriptions over a small pool of ids and checks
//! that resolution never panics or hangs, and that whatever succeeds
//! honours the scope rules.

use arbitrary::Arbitrary;
use bean_factory::{BeanClass, BeanDescription, BeanError, BeanFactory, ConfigValue, Scope, Value};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

const IDS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

#[derive(Default)]
struct Node {
    peers: Vec<Value>,
    label: String,
    weight: i64,
}

#[derive(Debug, Arbitrary)]
enum Raw {
    Literal(String),
    Ref(u8),
    List(Vec<u8>),
}

#[derive(Debug, Arbitrary)]
enum Member {
    Peers,
    Label,
    Weight,
    Unknown,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Describe {
        id: u8,
        prototype: bool,
        args: Vec<Raw>,
        properties: Vec<(Member, Raw)>,
    },
    Get(u8),
    DestroySingletons,
}

fn id(index: u8) -> &'static str {
    IDS[index as usize % IDS.len()]
}

fn config(raw: Raw) -> ConfigValue {
    match raw {
        Raw::Literal(text) => ConfigValue::Literal(text),
        Raw::Ref(index) => ConfigValue::reference(id(index)),
        Raw::List(indexes) => {
            ConfigValue::List(indexes.into_iter().take(4).map(|i| ConfigValue::reference(id(i))).collect())
        }
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let factory = BeanFactory::new();
    factory.register_class(
        BeanClass::builder::<Node>("Node")
            .constructor(Node::default)
            .constructor(|label: String| Node { label, ..Default::default() })
            .constructor(|weight: i64| Node { weight, ..Default::default() })
            .constructor(|label: String, weight: i64| Node { label, weight, ..Default::default() })
            .property("peers", |n: &mut Node, v: Vec<Value>| n.peers = v)
            .property("label", |n: &mut Node, v: String| n.label = v)
            .property("weight", |n: &mut Node, v: i64| n.weight = v)
            .build(),
    );

    for op in ops.into_iter().take(64) {
        match op {
            Op::Describe { id: index, prototype, args, properties } => {
                let scope = if prototype { Scope::Prototype } else { Scope::Singleton };
                let mut description = BeanDescription::new(id(index), "Node").with_scope(scope);
                for arg in args.into_iter().take(3) {
                    description = description.with_constructor_arg(config(arg));
                }
                for (member, raw) in properties.into_iter().take(4) {
                    let name = match member {
                        Member::Peers => "peers",
                        Member::Label => "label",
                        Member::Weight => "weight",
                        Member::Unknown => "colour",
                    };
                    description = description.with_property(name, config(raw));
                }
                factory.register_description(description);
            }
            Op::Get(index) => {
                let id = id(index);
                match factory.get_bean(id) {
                    Ok(first) => {
                        assert!(first.is::<Node>());
                        if let Ok(second) = factory.get_bean(id) {
                            let prototype = factory.is_prototype(id).unwrap_or(false);
                            assert_eq!(Arc::ptr_eq(&first, &second), !prototype);
                        }
                    }
                    Err(BeanError::CyclicDependency { chain }) => {
                        assert!(chain.len() >= 2);
                        assert_eq!(chain.first(), chain.last());
                    }
                    Err(err) => {
                        let _ = err.root_cause();
                    }
                }
            }
            Op::DestroySingletons => factory.destroy_singletons(),
        }
    }
});
