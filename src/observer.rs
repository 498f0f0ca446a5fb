//! Diagnostic observers for resolution events.
//!
//! Observers are attached to a [`ServiceCollection`](crate::ServiceCollection)
//! before it is built and are notified every time a factory runs. Cache hits
//! do not produce events.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::Key;

/// Observer trait for resolution events.
///
/// Observer calls are made synchronously on the resolving thread, around the
/// factory invocation. Keep implementations lightweight.
///
/// # Examples
///
/// ```
/// use scoped_di::{DiObserver, Key, Resolver, ServiceCollection};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct CountingObserver {
///     constructed: AtomicUsize,
/// }
///
/// impl DiObserver for CountingObserver {
///     fn resolving(&self, _key: &Key) {}
///
///     fn resolved(&self, _key: &Key, _duration: Duration) {
///         self.constructed.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let observer = Arc::new(CountingObserver::default());
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton_factory::<u64, _>(&[], |_| Ok(7));
/// services.add_observer(observer.clone());
///
/// let root = services.build().unwrap();
/// root.get_required::<u64>();
/// root.get_required::<u64>();
/// assert_eq!(observer.constructed.load(Ordering::SeqCst), 1);
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before a factory is invoked.
    fn resolving(&self, key: &Key);

    /// Called after a factory returned successfully.
    ///
    /// `duration` covers the factory call, nested resolutions included.
    fn resolved(&self, key: &Key, duration: Duration);

    /// Called when a factory returned an error.
    ///
    /// The error is still propagated to the caller after this call.
    fn factory_failed(&self, key: &Key, error: &DiError) {
        let _ = (key, error);
    }
}

/// Observer list shared by every scope of a container.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn resolving(&self, key: &Key) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    pub(crate) fn resolved(&self, key: &Key, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    pub(crate) fn factory_failed(&self, key: &Key, error: &DiError) {
        for observer in &self.observers {
            observer.factory_failed(key, error);
        }
    }
}

/// Observer that forwards resolution events to `tracing`.
///
/// Construction events are emitted at `TRACE`, failures at `WARN`.
///
/// ```
/// use scoped_di::{ServiceCollection, TracingObserver};
/// use std::sync::Arc;
///
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(TracingObserver::new()));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    /// Creates a new tracing observer.
    pub fn new() -> Self {
        Self
    }
}

impl DiObserver for TracingObserver {
    fn resolving(&self, key: &Key) {
        tracing::trace!(service = key.display_name(), "resolving");
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        tracing::trace!(
            service = key.display_name(),
            elapsed_us = duration.as_micros() as u64,
            "resolved"
        );
    }

    fn factory_failed(&self, key: &Key, error: &DiError) {
        tracing::warn!(service = key.display_name(), %error, "factory failed");
    }
}
