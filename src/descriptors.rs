//! Service descriptors: the unit of registration.

use std::fmt;
use std::sync::Arc;

use crate::factories::InstanceFactory;
use crate::key::{Key, Requirement};
use crate::lifetime::Lifetime;
use crate::traits::ServiceFactory;

/// One registration: a service key, a lifetime and the factory that builds
/// instances.
///
/// Descriptors are immutable once created. Several descriptors may share a
/// key; singular resolution picks the last one registered, collection
/// resolution returns all of them in registration order.
///
/// # Examples
///
/// ```rust
/// use scoped_di::{FnFactory, Lifetime, Requirement, ServiceDescriptor};
///
/// struct Database { url: String }
/// struct Repository;
///
/// let db = ServiceDescriptor::instance(Database { url: "postgres://localhost".into() });
/// let repo = ServiceDescriptor::scoped::<Repository>(
///     FnFactory::of::<Repository, _>(&[Requirement::of::<Database>()], |_| Ok(Repository)),
/// );
///
/// assert_eq!(db.lifetime(), Lifetime::Singleton);
/// assert_eq!(repo.lifetime(), Lifetime::Scoped);
/// assert_eq!(repo.requirements(), &[Requirement::of::<Database>()]);
/// assert!(repo.display_name().ends_with("Repository"));
/// ```
#[derive(Clone)]
pub struct ServiceDescriptor {
    service_type: Key,
    lifetime: Lifetime,
    factory: Arc<dyn ServiceFactory>,
}

impl ServiceDescriptor {
    /// Creates a descriptor from its three parts.
    pub fn new(
        service_type: Key,
        lifetime: Lifetime,
        factory: impl ServiceFactory + 'static,
    ) -> Self {
        Self::from_arc(service_type, lifetime, Arc::new(factory))
    }

    /// Creates a descriptor around a factory that is already shared.
    pub fn from_arc(
        service_type: Key,
        lifetime: Lifetime,
        factory: Arc<dyn ServiceFactory>,
    ) -> Self {
        Self {
            service_type,
            lifetime,
            factory,
        }
    }

    /// Singleton registration keyed by `T`.
    pub fn singleton<T: ?Sized + 'static>(factory: impl ServiceFactory + 'static) -> Self {
        Self::new(Key::of::<T>(), Lifetime::Singleton, factory)
    }

    /// Scoped registration keyed by `T`.
    pub fn scoped<T: ?Sized + 'static>(factory: impl ServiceFactory + 'static) -> Self {
        Self::new(Key::of::<T>(), Lifetime::Scoped, factory)
    }

    /// Transient registration keyed by `T`.
    pub fn transient<T: ?Sized + 'static>(factory: impl ServiceFactory + 'static) -> Self {
        Self::new(Key::of::<T>(), Lifetime::Transient, factory)
    }

    /// Singleton registration of a prebuilt value.
    pub fn instance<T: Send + Sync + 'static>(value: T) -> Self {
        Self::singleton::<T>(InstanceFactory::new(value))
    }

    /// The service key this descriptor answers to.
    pub fn service_type(&self) -> Key {
        self.service_type
    }

    /// The instance lifetime.
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// The factory.
    pub fn factory(&self) -> &Arc<dyn ServiceFactory> {
        &self.factory
    }

    /// The factory's diagnostic name.
    pub fn display_name(&self) -> &str {
        self.factory.display_name()
    }

    /// The factory's declared requirements.
    pub fn requirements(&self) -> &[Requirement] {
        self.factory.requirements()
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("service_type", &self.service_type)
            .field("lifetime", &self.lifetime)
            .field("factory", &self.factory.display_name())
            .finish()
    }
}

impl fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.lifetime, self.factory.display_name())
    }
}
