//! Pet store wired from a TOML description file
//!
//! Run with:
//!   cargo run --example pet_store

use bean_factory::{BeanClass, BeanFactory, Scope, TomlSource};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

const BEANS: &str = r#"
[[bean]]
id = "accountDao"
class = "AccountDao"

[[bean.constructor-arg]]
value = "postgres://localhost/petstore"

[[bean]]
id = "itemDao"
class = "ItemDao"

[[bean.constructor-arg]]
value = "postgres://localhost/petstore"

[[bean.constructor-arg]]
value = 50

[[bean]]
id = "petStore"
class = "PetStoreService"

[[bean.constructor-arg]]
ref = "accountDao"

[[bean.constructor-arg]]
ref = "itemDao"

[[bean.property]]
name = "categories"
value = "dogs, cats, birds"

[[bean.property]]
name = "discounts"
map = [{ key = "members", value = "0.1" }, { key = "staff", value = "0.25" }]

[[bean]]
id = "cart"
class = "ShoppingCart"
scope = "prototype"

[[bean.property]]
name = "store"
ref = "petStore"
"#;

struct AccountDao {
    url: String,
}

struct ItemDao {
    url: String,
    pool_size: u32,
}

#[derive(Default)]
struct PetStoreService {
    accounts: Option<Arc<AccountDao>>,
    items: Option<Arc<ItemDao>>,
    categories: Vec<String>,
    discounts: HashMap<String, f64>,
}

static NEXT_CART: AtomicU64 = AtomicU64::new(1);

struct ShoppingCart {
    id: u64,
    store: Option<Arc<PetStoreService>>,
}

fn register_classes(factory: &BeanFactory) {
    factory.register_class(
        BeanClass::builder::<AccountDao>("AccountDao")
            .constructor(|url: String| AccountDao { url })
            .build(),
    );
    factory.register_class(
        BeanClass::builder::<ItemDao>("ItemDao")
            .constructor(|url: String| ItemDao { url, pool_size: 10 })
            .constructor(|url: String, pool_size: u32| ItemDao { url, pool_size })
            .build(),
    );
    factory.register_class(
        BeanClass::builder::<PetStoreService>("PetStoreService")
            .constructor(PetStoreService::default)
            .constructor(|accounts: Arc<AccountDao>, items: Arc<ItemDao>| PetStoreService {
                accounts: Some(accounts),
                items: Some(items),
                ..Default::default()
            })
            .property("categories", |s: &mut PetStoreService, v: Vec<String>| s.categories = v)
            .property("discounts", |s: &mut PetStoreService, v: HashMap<String, f64>| s.discounts = v)
            .build(),
    );
    factory.register_class(
        BeanClass::builder::<ShoppingCart>("ShoppingCart")
            .constructor(|| ShoppingCart {
                id: NEXT_CART.fetch_add(1, Ordering::SeqCst),
                store: None,
            })
            .property("store", |c: &mut ShoppingCart, s: Arc<PetStoreService>| c.store = Some(s))
            .build(),
    );
}

fn main() -> bean_factory::Result<()> {
    bean_factory::logging::init();

    println!("=== Bean Factory Pet Store Demo ===\n");

    let factory = BeanFactory::new();
    register_classes(&factory);
    let count = factory.load(&TomlSource::new(BEANS))?;
    println!("Loaded {count} bean descriptions");

    let store = factory.get_bean_as::<PetStoreService>("petStore")?;
    let again = factory.get_bean_as::<PetStoreService>("petStore")?;
    println!("petStore is a singleton: {}", Arc::ptr_eq(&store, &again));

    if let (Some(accounts), Some(items)) = (&store.accounts, &store.items) {
        println!("  accounts -> {}", accounts.url);
        println!("  items    -> {} (pool of {})", items.url, items.pool_size);
    }
    println!("  categories: {:?}", store.categories);
    let mut discounts: Vec<_> = store.discounts.iter().collect();
    discounts.sort_by(|a, b| a.0.cmp(b.0));
    println!("  discounts:  {discounts:?}");

    let first = factory.get_bean_as::<ShoppingCart>("cart")?;
    let second = factory.get_bean_as::<ShoppingCart>("cart")?;
    println!(
        "\ncart is {}: carts #{} and #{}, same store: {}",
        Scope::Prototype,
        first.id,
        second.id,
        first
            .store
            .as_ref()
            .zip(second.store.as_ref())
            .is_some_and(|(a, b)| Arc::ptr_eq(a, b))
    );

    match factory.get_bean("invalidBean") {
        Ok(_) => println!("\nunexpected bean"),
        Err(err) => println!("\ninvalidBean: {err}"),
    }

    println!("\n{factory:?}");
    Ok(())
}
