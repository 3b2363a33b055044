//! Benchmarks for the bean factory

use bean_factory::{BeanClass, BeanDescription, BeanFactory, ConfigValue, Scope};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

#[derive(Default)]
struct Repository;

#[allow(dead_code)]
#[derive(Default)]
struct Service {
    repo: Option<Arc<Repository>>,
    name: String,
    retries: u32,
}

#[allow(dead_code)]
struct Endpoint {
    host: String,
    port: u16,
}

fn register_classes(factory: &BeanFactory) {
    factory.register_class(
        BeanClass::builder::<Repository>("Repository")
            .constructor(Repository::default)
            .build(),
    );
    factory.register_class(
        BeanClass::builder::<Service>("Service")
            .constructor(Service::default)
            .property("repo", |s: &mut Service, r: Arc<Repository>| s.repo = Some(r))
            .property("name", |s: &mut Service, n: String| s.name = n)
            .property("retries", |s: &mut Service, n: u32| s.retries = n)
            .build(),
    );
    factory.register_class(
        BeanClass::builder::<Endpoint>("Endpoint")
            .constructor(|port: u16| Endpoint { host: "localhost".into(), port })
            .constructor(|host: String| Endpoint { host, port: 80 })
            .constructor(|host: String, port: u16| Endpoint { host, port })
            .build(),
    );
}

fn service(id: &str, scope: Scope) -> BeanDescription {
    BeanDescription::new(id, "Service")
        .with_scope(scope)
        .with_property("repo", ConfigValue::reference("repo"))
        .with_property("name", id)
        .with_property("retries", "3")
}

fn populated_factory() -> BeanFactory {
    let factory = BeanFactory::new();
    register_classes(&factory);
    factory.register_description(BeanDescription::new("repo", "Repository"));
    factory.register_description(service("service", Scope::Singleton));
    factory.register_description(service("prototype", Scope::Prototype));
    factory.register_description(
        BeanDescription::new("endpoint", "Endpoint")
            .with_scope(Scope::Prototype)
            .with_constructor_arg("example.org"),
    );
    factory
}

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    group.bench_function("description", |b| {
        let factory = BeanFactory::new();
        b.iter(|| factory.register_description(black_box(service("service", Scope::Singleton))))
    });

    group.bench_function("factory_with_classes", |b| {
        b.iter(|| {
            let factory = BeanFactory::new();
            register_classes(&factory);
            black_box(factory)
        })
    });

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    group.throughput(Throughput::Elements(1));

    let factory = populated_factory();
    let _ = factory.get_bean("service");

    group.bench_function("cached_singleton", |b| {
        b.iter(|| black_box(factory.get_bean("service").unwrap()))
    });

    group.bench_function("cached_singleton_typed", |b| {
        b.iter(|| black_box(factory.get_bean_as::<Service>("service").unwrap()))
    });

    group.bench_function("prototype_with_properties", |b| {
        b.iter(|| black_box(factory.get_bean("prototype").unwrap()))
    });

    group.bench_function("prototype_constructor_overload", |b| {
        b.iter(|| black_box(factory.get_bean("endpoint").unwrap()))
    });

    group.bench_function("unknown_bean", |b| {
        b.iter(|| black_box(factory.try_get_bean("missing")))
    });

    group.finish();
}

fn bench_first_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_access");

    group.bench_function("singleton_chain", |b| {
        let factory = populated_factory();
        b.iter(|| {
            factory.destroy_singletons();
            black_box(factory.get_bean("service").unwrap())
        })
    });

    group.bench_function("sixteen_singletons", |b| {
        let factory = BeanFactory::new();
        register_classes(&factory);
        factory.register_description(BeanDescription::new("repo", "Repository"));
        factory.register_description(service("s0", Scope::Singleton));
        for i in 1..16 {
            factory.register_description(
                BeanDescription::new(format!("s{i}"), "Service")
                    .with_property("repo", ConfigValue::reference("repo"))
                    .with_property("name", format!("s{i}")),
            );
        }

        b.iter(|| {
            factory.destroy_singletons();
            for i in 0..16 {
                black_box(factory.get_bean(&format!("s{i}")).unwrap());
            }
        })
    });

    group.finish();
}

fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");

    group.bench_function("concurrent_reads_4", |b| {
        let factory = Arc::new(populated_factory());
        let _ = factory.get_bean("service");

        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let f = Arc::clone(&factory);
                    thread::spawn(move || {
                        for _ in 0..100 {
                            let _ = f.get_bean("service").unwrap();
                        }
                    })
                })
                .collect();

            for h in handles {
                h.join().unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_registration,
    bench_resolution,
    bench_first_access,
    bench_concurrent,
);

criterion_main!(benches);
