//! Disposal traits for resource cleanup.

use parking_lot::Mutex;

/// Release capability attached to every instance a scope creates.
///
/// A scope calls `dispose` exactly once for each instance it created, when
/// the scope itself is disposed. Implementations must not fail; there is no
/// error channel.
///
/// # Examples
///
/// ```
/// use scoped_di::{Dispose, Resolver, ServiceCollection};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// struct Connection {
///     closed: Arc<AtomicBool>,
/// }
///
/// impl Dispose for Connection {
///     fn dispose(&self) {
///         self.closed.store(true, Ordering::SeqCst);
///     }
/// }
///
/// let closed = Arc::new(AtomicBool::new(false));
/// let flag = closed.clone();
///
/// let mut services = ServiceCollection::new();
/// services.add_scoped_disposable::<Connection, _>(&[], move |_| {
///     Ok(Connection { closed: flag.clone() })
/// });
///
/// let root = services.build().unwrap();
/// let scope = root.create_scope();
/// let _conn = scope.get_required::<Connection>();
/// scope.dispose();
/// assert!(closed.load(Ordering::SeqCst));
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self);
}

/// Disposable that does nothing, for instances without cleanup.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDisposable;

impl Dispose for NoopDisposable {
    fn dispose(&self) {}
}

/// Disposable backed by a closure that runs at most once.
///
/// ```
/// use scoped_di::{Dispose, DisposeFn};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let counter = calls.clone();
/// let disposable = DisposeFn::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// disposable.dispose();
/// disposable.dispose();
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// ```
pub struct DisposeFn {
    release: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl DisposeFn {
    /// Wraps `release`; it runs on the first `dispose` call only.
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Mutex::new(Some(Box::new(release))),
        }
    }

    /// Returns `true` once the closure has run.
    pub fn is_disposed(&self) -> bool {
        self.release.lock().is_none()
    }
}

impl Dispose for DisposeFn {
    fn dispose(&self) {
        // Take under the lock, run outside it.
        let release = self.release.lock().take();
        if let Some(release) = release {
            release();
        }
    }
}

impl std::fmt::Debug for DisposeFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposeFn")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
