//! Example demonstrating logging capabilities
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```

use bean_factory::{BeanClass, BeanDescription, BeanFactory, ConfigValue, Scope};
use std::sync::Arc;

#[derive(Default)]
struct Database;

#[derive(Default)]
struct UserService {
    db: Option<Arc<Database>>,
}

#[derive(Default)]
struct RequestContext;

fn main() {
    // JSON with logging-json, pretty with logging-pretty
    bean_factory::logging::init();

    println!("=== Bean Factory Logging Demo ===\n");

    // logs: "Creating new bean factory"
    let factory = BeanFactory::builder().ignore_unknown_properties(true).build();

    // logs: "Registering bean class"
    factory.register_class(BeanClass::builder::<Database>("Database").constructor(Database::default).build());
    factory.register_class(
        BeanClass::builder::<UserService>("UserService")
            .constructor(UserService::default)
            .property("db", |s: &mut UserService, db: Arc<Database>| s.db = Some(db))
            .build(),
    );
    factory.register_class(
        BeanClass::builder::<RequestContext>("RequestContext")
            .constructor(RequestContext::default)
            .build(),
    );

    // logs: "Registering bean description"
    factory.register_description(BeanDescription::new("db", "Database"));
    factory.register_description(
        BeanDescription::new("users", "UserService")
            .with_property("db", ConfigValue::reference("db"))
            .with_property("verbose", "true"),
    );
    factory.register_description(BeanDescription::new("request", "RequestContext").with_scope(Scope::Prototype));

    // logs: "Creating bean instance" for users and db, "Skipping property
    // with no writable member" for verbose
    let users = factory.get_bean_as::<UserService>("users");
    assert!(users.is_ok_and(|u| u.db.is_some()));

    // logs: "Singleton resolved from cache" at trace level
    let _db = factory.get_bean("db");

    // logs: "Creating bean instance" on every call
    let _first = factory.get_bean("request");
    let _second = factory.get_bean("request");

    // logs: "Bean not defined"
    assert!(factory.try_get_bean("missing").is_none());

    // logs: "Bean description overwritten by a later registration"
    factory.register_description(BeanDescription::new("db", "Database"));

    // logs: "Destroying singletons", "Singleton cache cleared"
    factory.destroy_singletons();

    println!("\n=== Demo Complete ===");
    println!("Check the log output above to see structured logging in action!");
    println!("\nTip: Use --features logging-json for production (JSON output)");
    println!("     Use --features logging-pretty for development (colorful output)");
}
