use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scoped_di::*;
use std::sync::Arc;

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let mut sc = ServiceCollection::new();
    sc.add_singleton(42u64);
    let sp = sc.build().unwrap();

    // Prime the singleton
    let _ = sp.get::<u64>().unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = sp.get::<u64>().unwrap();
            black_box(v);
        })
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct ExpensiveToCreate {
        data: Vec<u64>,
    }

    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                let mut sc = ServiceCollection::new();
                sc.add_singleton_factory::<ExpensiveToCreate, _>(&[], |_| {
                    Ok(ExpensiveToCreate {
                        data: (0..1000).collect(),
                    })
                });
                sc.build().unwrap()
            },
            |sp| {
                let v = sp.get::<ExpensiveToCreate>().unwrap();
                black_box(v.data.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_scoped_vs_transient(c: &mut Criterion) {
    struct Service {
        data: [u8; 64],
    }

    let mut group = c.benchmark_group("scoped_vs_transient");

    let mut sc_scoped = ServiceCollection::new();
    sc_scoped.add_scoped_factory::<Service, _>(&[], |_| Ok(Service { data: [0; 64] }));
    let sp_scoped = sc_scoped.build().unwrap();
    let scope = sp_scoped.create_scope();
    let _ = scope.get::<Service>().unwrap();

    group.bench_function("scoped_hit", |b| {
        b.iter(|| black_box(scope.get::<Service>().unwrap().data[0]))
    });

    let mut sc_transient = ServiceCollection::new();
    sc_transient.add_transient_factory::<Service, _>(&[], |_| Ok(Service { data: [0; 64] }));
    let sp_transient = sc_transient.build().unwrap();

    // Transients are tracked until the scope is disposed, so each batch
    // gets a fresh scope.
    group.bench_function("transient", |b| {
        b.iter_batched(
            || sp_transient.create_scope(),
            |scope| {
                for _ in 0..64 {
                    black_box(scope.get::<Service>().unwrap().data[0]);
                }
                scope.dispose();
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_concrete_vs_trait(c: &mut Criterion) {
    trait Shape: Send + Sync {
        fn area(&self) -> f64;
    }
    struct Square(f64);
    impl Shape for Square {
        fn area(&self) -> f64 {
            self.0 * self.0
        }
    }

    let mut sc = ServiceCollection::new();
    sc.add_singleton(Square(2.0));
    sc.add_singleton_trait::<dyn Shape>(Arc::new(Square(3.0)));
    let sp = sc.build().unwrap();

    let mut group = c.benchmark_group("concrete_vs_trait");
    group.bench_function("concrete", |b| {
        b.iter(|| black_box(sp.get::<Square>().unwrap().0))
    });
    group.bench_function("trait", |b| {
        b.iter(|| black_box(sp.get_trait::<dyn Shape>().unwrap().area()))
    });
    group.finish();
}

fn bench_collection_scaling(c: &mut Criterion) {
    trait Plugin: Send + Sync {}
    struct P;
    impl Plugin for P {}

    let mut group = c.benchmark_group("collection_scaling");
    for count in [1usize, 8, 64] {
        let mut sc = ServiceCollection::new();
        for _ in 0..count {
            sc.add_singleton_trait::<dyn Plugin>(Arc::new(P));
        }
        let sp = sc.build().unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(sp.get_all_trait::<dyn Plugin>().unwrap().len()))
        });
    }
    group.finish();
}

fn bench_scope_lifecycle(c: &mut Criterion) {
    struct Session(u64);

    let mut sc = ServiceCollection::new();
    sc.add_singleton(1u64);
    sc.add_scoped_factory::<Session, _>(&[Requirement::of::<u64>()], |r| {
        Ok(Session(*r.get::<u64>()?))
    });
    let sp = sc.build().unwrap();

    c.bench_function("scope_create_resolve_dispose", |b| {
        b.iter(|| {
            let scope = sp.create_scope();
            black_box(scope.get::<Session>().unwrap().0);
            scope.dispose();
        })
    });
}

/// Chain of `n` transient services, each requiring the previous one.
fn chain_descriptors(n: usize) -> Vec<ServiceDescriptor> {
    macro_rules! links {
        ($($name:ident),*) => {{
            $(struct $name;)*
            vec![$(Key::of::<$name>()),*]
        }};
    }
    let keys = links!(L0, L1, L2, L3, L4, L5, L6, L7, L8, L9, L10, L11, L12, L13, L14, L15);
    (0..n.min(keys.len()))
        .map(|i| {
            let requirements: Vec<Requirement> = if i == 0 {
                Vec::new()
            } else {
                vec![Requirement::single(keys[i - 1])]
            };
            let lifetime = if i == 0 { Lifetime::Singleton } else { Lifetime::Transient };
            ServiceDescriptor::new(
                keys[i],
                lifetime,
                FnFactory::new(&requirements, format!("L{}", i), |_| Ok(ServiceInstance::of(()))),
            )
        })
        .collect()
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation");
    for depth in [4usize, 16] {
        group.bench_with_input(BenchmarkId::new("chain", depth), &depth, |b, &depth| {
            b.iter_batched(
                || chain_descriptors(depth),
                |descriptors| black_box(validate(descriptors).unwrap().len()),
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_contention(c: &mut Criterion) {
    let mut sc = ServiceCollection::new();
    sc.add_singleton(42u64);
    let sp = sc.build().unwrap();
    let _ = sp.get::<u64>().unwrap();

    let mut group = c.benchmark_group("contention");
    for &thread_count in &[1usize, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("singleton_threads", thread_count),
            &thread_count,
            |b, &threads| {
                b.iter_custom(|iters| {
                    let start = std::time::Instant::now();
                    crossbeam_utils::thread::scope(|s| {
                        for _ in 0..threads {
                            let sp = &sp;
                            s.spawn(move |_| {
                                for _ in 0..iters / threads as u64 {
                                    black_box(sp.get::<u64>().unwrap());
                                }
                            });
                        }
                    })
                    .unwrap();
                    start.elapsed()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_scoped_vs_transient,
    bench_concrete_vs_trait,
    bench_collection_scaling,
    bench_scope_lifecycle,
    bench_validation,
    bench_contention
);
criterion_main!(benches);
