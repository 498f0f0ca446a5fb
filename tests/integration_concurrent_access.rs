//! Concurrent access integration tests
//!
//! These tests verify that cached lifetimes construct at most once under
//! contention, and that scopes stay isolated across threads.

use scoped_di::{Requirement, Resolver, ServiceCollection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[derive(Debug)]
struct SlowService {
    id: usize,
}

#[test]
fn test_singleton_constructed_once_under_contention() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = constructed.clone();

    let mut sc = ServiceCollection::new();
    sc.add_singleton_factory::<SlowService, _>(&[], move |_| {
        thread::sleep(Duration::from_millis(20));
        Ok(SlowService {
            id: counter.fetch_add(1, Ordering::SeqCst),
        })
    });

    let sp = sc.build().unwrap();
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let sp = sp.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                // Half the threads resolve through their own child scope.
                let scope = if i % 2 == 0 { sp.clone() } else { sp.create_scope() };
                barrier.wait();
                scope.get_required::<SlowService>()
            })
        })
        .collect();

    let instances: Vec<Arc<SlowService>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    for instance in &instances {
        assert!(Arc::ptr_eq(instance, &instances[0]));
        assert_eq!(instance.id, 0);
    }
}

#[test]
fn test_scoped_constructed_once_per_scope_under_contention() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = constructed.clone();

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<SlowService, _>(&[], move |_| {
        thread::sleep(Duration::from_millis(10));
        Ok(SlowService {
            id: counter.fetch_add(1, Ordering::SeqCst),
        })
    });

    let sp = sc.build().unwrap();
    let scopes = [sp.create_scope(), sp.create_scope()];
    let barrier = Arc::new(Barrier::new(12));

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let scope = scopes[i % 2].clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                (i % 2, scope.get_required::<SlowService>())
            })
        })
        .collect();

    let results: Vec<(usize, Arc<SlowService>)> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(constructed.load(Ordering::SeqCst), 2);

    for (slot, instance) in &results {
        let expected = scopes[*slot].get_required::<SlowService>();
        assert!(Arc::ptr_eq(instance, &expected));
    }
    let a = scopes[0].get_required::<SlowService>();
    let b = scopes[1].get_required::<SlowService>();
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn test_transient_under_contention_is_always_fresh() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = constructed.clone();

    let mut sc = ServiceCollection::new();
    sc.add_singleton(7u8);
    sc.add_transient_factory::<SlowService, _>(&[Requirement::of::<u8>()], move |r| {
        r.get::<u8>()?;
        Ok(SlowService {
            id: counter.fetch_add(1, Ordering::SeqCst),
        })
    });

    let sp = sc.build().unwrap();
    let scope = sp.create_scope();
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let scope = scope.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                (0..10).map(|_| scope.get_required::<SlowService>().id).collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<usize> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 80);
    assert_eq!(constructed.load(Ordering::SeqCst), 80);
}

#[test]
fn test_resolve_and_dispose_race() {
    let mut sc = ServiceCollection::new();
    sc.add_transient_factory::<SlowService, _>(&[], |_| Ok(SlowService { id: 0 }));
    let sp = sc.build().unwrap();

    for _ in 0..10 {
        let scope = sp.create_scope();
        let barrier = Arc::new(Barrier::new(5));

        let resolvers: Vec<_> = (0..4)
            .map(|_| {
                let scope = scope.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..50 {
                        // Either outcome is fine; neither may panic or hang.
                        let _ = scope.get::<SlowService>();
                    }
                })
            })
            .collect();

        barrier.wait();
        scope.dispose();
        for handle in resolvers {
            handle.join().unwrap();
        }
        assert!(scope.is_disposed());
        assert!(scope.get::<SlowService>().is_err());
    }
}
