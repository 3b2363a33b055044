//! Example demonstrating the #[derive(Bean)] macro
//!
//! Run with:
//!   cargo run --example derive --features derive

use bean_factory::{Bean, BeanDescription, BeanFactory, BeanType, ConfigValue};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default, Bean)]
struct Database {
    url: String,
}

#[derive(Default, Bean)]
struct Cache {
    size: u32,
}

#[derive(Default, Bean)]
#[bean(name = "UserService")]
struct Users {
    #[property(name = "database")]
    db: Option<Arc<Database>>,
    cache: Option<Arc<Cache>>,
    #[property(skip)]
    request_count: AtomicU64,
}

impl Users {
    fn describe(&self) -> String {
        let requests = self.request_count.fetch_add(1, Ordering::Relaxed);
        format!(
            "UserService connected to {} with cache size {} (requests: {})",
            self.db.as_ref().map_or("nothing", |db| db.url.as_str()),
            self.cache.as_ref().map_or(0, |cache| cache.size),
            requests
        )
    }
}

fn main() {
    println!("=== #[derive(Bean)] Demo ===\n");

    for class in [Database::bean_class(), Cache::bean_class(), Users::bean_class()] {
        let members: Vec<_> = class.properties().iter().map(|p| p.name().to_string()).collect();
        println!("{:<12} members: {:?}", class.name(), members);
    }

    let factory = BeanFactory::new();
    factory.register_type::<Database>();
    factory.register_type::<Cache>();
    factory.register_type::<Users>();

    factory.register_description(
        BeanDescription::new("db", "Database").with_property("url", "postgres://localhost/app"),
    );
    factory.register_description(BeanDescription::new("cache", "Cache").with_property("size", "1024"));
    factory.register_description(
        BeanDescription::new("users", "UserService")
            .with_property("database", ConfigValue::reference("db"))
            .with_property("cache", ConfigValue::reference("cache")),
    );

    let users = match factory.get_bean_as::<Users>("users") {
        Ok(users) => users,
        Err(err) => {
            eprintln!("failed to build users: {err}");
            return;
        }
    };
    println!("\n{}", users.describe());
    println!("{}", users.describe());

    println!("\n=== Demo Complete ===");
}
