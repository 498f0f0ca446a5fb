//! Type-erased service instances paired with their release capability.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::traits::{Dispose, NoopDisposable};

/// Type-erased `Arc` used for storage and resolution.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// The product of a factory: the value itself and the capability that
/// releases it.
///
/// The scope that created the instance keeps the disposable and calls it
/// once when the scope is disposed. Cloning is cheap; both halves are shared.
///
/// # Examples
///
/// ```
/// use scoped_di::{Dispose, DisposeFn, ServiceInstance};
/// use std::sync::Arc;
///
/// let plain = ServiceInstance::of(5u32);
/// assert_eq!(*plain.instance().clone().downcast::<u32>().unwrap(), 5);
///
/// let with_release = ServiceInstance::new(
///     Arc::new("handle".to_string()),
///     Arc::new(DisposeFn::new(|| println!("released"))),
/// );
/// with_release.disposable().dispose();
/// ```
#[derive(Clone)]
pub struct ServiceInstance {
    instance: AnyArc,
    disposable: Arc<dyn Dispose>,
}

impl ServiceInstance {
    /// Pairs an instance with an explicit release capability.
    pub fn new(instance: AnyArc, disposable: Arc<dyn Dispose>) -> Self {
        Self { instance, disposable }
    }

    /// Instance with nothing to release.
    pub fn without_disposal(instance: AnyArc) -> Self {
        Self::new(instance, Arc::new(NoopDisposable))
    }

    /// Wraps a concrete value with a no-op disposable.
    pub fn of<T: Send + Sync + 'static>(value: T) -> Self {
        Self::without_disposal(Arc::new(value))
    }

    /// Wraps a value whose own [`Dispose`] implementation releases it.
    ///
    /// The same allocation backs both the resolved instance and the
    /// disposable.
    pub fn disposable_of<T: Dispose>(value: T) -> Self {
        let value = Arc::new(value);
        Self::new(value.clone(), value)
    }

    /// The type-erased value.
    pub fn instance(&self) -> &AnyArc {
        &self.instance
    }

    /// The release capability.
    pub fn disposable(&self) -> &Arc<dyn Dispose> {
        &self.disposable
    }

    pub(crate) fn into_parts(self) -> (AnyArc, Arc<dyn Dispose>) {
        (self.instance, self.disposable)
    }
}

impl fmt::Debug for ServiceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceInstance").finish_non_exhaustive()
    }
}
