use scoped_di::{
    DiError, Dispose, DisposeFn, FnFactory, Key, Requirement, Resolver, ServiceCollection,
    ServiceDescriptor, ServiceInstance,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

struct Tracked {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl Dispose for Tracked {
    fn dispose(&self) {
        self.log.lock().unwrap().push(self.name);
    }
}

struct First(Tracked);
struct Second(Tracked);
struct Third(Tracked);

macro_rules! disposable {
    ($ty:ident) => {
        impl Dispose for $ty {
            fn dispose(&self) {
                self.0.dispose();
            }
        }
    };
}

disposable!(First);
disposable!(Second);
disposable!(Third);

fn tracked(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Tracked {
    Tracked { name, log: log.clone() }
}

#[test]
fn test_disposal_runs_in_reverse_creation_order() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sc = ServiceCollection::new();
    let l = log.clone();
    sc.add_scoped_disposable::<First, _>(&[], move |_| Ok(First(tracked("first", &l))));
    let l = log.clone();
    sc.add_scoped_disposable::<Second, _>(&[Requirement::of::<First>()], move |r| {
        r.get::<First>()?;
        Ok(Second(tracked("second", &l)))
    });
    let l = log.clone();
    sc.add_transient_disposable::<Third, _>(&[Requirement::of::<Second>()], move |r| {
        r.get::<Second>()?;
        Ok(Third(tracked("third", &l)))
    });

    let sp = sc.build().unwrap();
    let scope = sp.create_scope();
    scope.get_required::<Third>();

    // Dependencies finish construction first.
    scope.dispose();
    assert_eq!(*log.lock().unwrap(), ["third", "second", "first"]);
}

#[test]
fn test_dispose_is_idempotent() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut sc = ServiceCollection::new();
    sc.add(ServiceDescriptor::scoped::<u8>(FnFactory::new(&[], "u8", move |_| {
        let counter = counter.clone();
        Ok(ServiceInstance::new(
            Arc::new(1u8),
            Arc::new(DisposeFn::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        ))
    })));

    let sp = sc.build().unwrap();
    let scope = sp.create_scope();
    scope.get_required::<u8>();

    scope.dispose();
    scope.dispose();
    assert!(scope.is_disposed());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_every_transient_instance_is_released() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let l = log.clone();

    let mut sc = ServiceCollection::new();
    sc.add_transient_disposable::<First, _>(&[], move |_| Ok(First(tracked("t", &l))));

    let sp = sc.build().unwrap();
    let scope = sp.create_scope();
    for _ in 0..5 {
        scope.get_required::<First>();
    }
    sp.get_required::<First>();

    scope.dispose();
    assert_eq!(log.lock().unwrap().len(), 5);

    sp.dispose();
    assert_eq!(log.lock().unwrap().len(), 6);
}

#[test]
fn test_disposed_scope_rejects_without_calling_factory() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<u32, _>(&[], move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(5)
    });
    sc.add_transient_factory::<u64, _>(&[], |_| Ok(6));
    sc.add_singleton(7u16);

    let sp = sc.build().unwrap();
    let scope = sp.create_scope();
    scope.dispose();

    assert!(matches!(scope.get::<u32>(), Err(DiError::ScopeDisposed)));
    assert!(matches!(scope.get::<u64>(), Err(DiError::ScopeDisposed)));
    assert!(matches!(scope.get::<u16>(), Err(DiError::ScopeDisposed)));
    assert!(matches!(scope.get_all::<u32>(), Err(DiError::ScopeDisposed)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // Unknown keys report the disposed state too.
    assert!(matches!(scope.get::<String>(), Err(DiError::ScopeDisposed)));
    assert_eq!(scope.service_info(&Key::of::<u32>()).lifetime, None);
}

#[test]
fn test_child_dispose_leaves_root_and_siblings() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sc = ServiceCollection::new();
    let l = log.clone();
    sc.add_singleton_disposable::<First, _>(&[], move |_| Ok(First(tracked("singleton", &l))));
    let l = log.clone();
    sc.add_scoped_disposable::<Second, _>(&[], move |_| Ok(Second(tracked("scoped", &l))));

    let sp = sc.build().unwrap();
    let a = sp.create_scope();
    let b = sp.create_scope();
    a.get_required::<First>();
    a.get_required::<Second>();
    b.get_required::<Second>();

    a.dispose();
    assert_eq!(*log.lock().unwrap(), ["scoped"]);
    assert!(b.get::<Second>().is_ok());
    assert!(sp.get::<First>().is_ok());

    sp.dispose();
    assert_eq!(*log.lock().unwrap(), ["scoped", "singleton"]);

    // Disposing the root does not dispose its children.
    assert!(!b.is_disposed());
    b.dispose();
    assert_eq!(*log.lock().unwrap(), ["scoped", "singleton", "scoped"]);
}

#[test]
fn test_prebuilt_singletons_are_not_released() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sc = ServiceCollection::new();
    sc.add_singleton(First(tracked("prebuilt", &log)));

    let sp = sc.build().unwrap();
    sp.get_required::<First>();
    sp.dispose();
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_concurrent_dispose_releases_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut sc = ServiceCollection::new();
    sc.add(ServiceDescriptor::scoped::<u8>(FnFactory::new(&[], "u8", move |_| {
        let counter = counter.clone();
        Ok(ServiceInstance::new(
            Arc::new(1u8),
            Arc::new(DisposeFn::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        ))
    })));

    let sp = sc.build().unwrap();
    for _ in 0..20 {
        let scope = sp.create_scope();
        scope.get_required::<u8>();

        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let scope = scope.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    scope.dispose();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(scope.is_disposed());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 20);
}

#[test]
fn test_instance_finished_after_dispose_is_released_immediately() {
    let released = Arc::new(AtomicUsize::new(0));
    let counter = released.clone();
    let entered = Arc::new(Barrier::new(2));
    let proceed = Arc::new(Barrier::new(2));
    let (e, p) = (entered.clone(), proceed.clone());

    let mut sc = ServiceCollection::new();
    sc.add(ServiceDescriptor::scoped::<u8>(FnFactory::new(&[], "slow", move |_| {
        e.wait();
        p.wait();
        let counter = counter.clone();
        Ok(ServiceInstance::new(
            Arc::new(1u8),
            Arc::new(DisposeFn::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        ))
    })));

    let sp = sc.build().unwrap();
    let scope = sp.create_scope();
    let resolver = scope.clone();
    let handle = thread::spawn(move || resolver.get::<u8>().map(|_| ()));

    entered.wait();
    scope.dispose();
    assert_eq!(released.load(Ordering::SeqCst), 0);
    proceed.wait();

    assert!(matches!(handle.join().unwrap(), Err(DiError::ScopeDisposed)));
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_waiter_on_a_slot_built_after_dispose_gets_scope_disposed() {
    let released = Arc::new(AtomicUsize::new(0));
    let counter = released.clone();
    let entered = Arc::new(Barrier::new(2));
    let proceed = Arc::new(Barrier::new(2));
    let (e, p) = (entered.clone(), proceed.clone());

    let mut sc = ServiceCollection::new();
    sc.add(ServiceDescriptor::scoped::<u16>(FnFactory::new(&[], "slow", move |_| {
        e.wait();
        p.wait();
        let counter = counter.clone();
        Ok(ServiceInstance::new(
            Arc::new(7u16),
            Arc::new(DisposeFn::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        ))
    })));

    let sp = sc.build().unwrap();
    let scope = sp.create_scope();

    let creator = {
        let scope = scope.clone();
        thread::spawn(move || scope.get::<u16>().map(|_| ()))
    };
    entered.wait();

    // Blocks on the slot the creator is still filling.
    let waiter = {
        let scope = scope.clone();
        thread::spawn(move || scope.get::<u16>().map(|_| ()))
    };
    thread::sleep(std::time::Duration::from_millis(50));

    scope.dispose();
    proceed.wait();

    assert!(matches!(creator.join().unwrap(), Err(DiError::ScopeDisposed)));
    assert!(matches!(waiter.join().unwrap(), Err(DiError::ScopeDisposed)));
    assert_eq!(released.load(Ordering::SeqCst), 1);
}
