//! Service collection: the mutable registration list a container is built
//! from.
//!
//! The collection is plain CRUD over an ordered descriptor list plus typed
//! helpers that wrap closures in [`FnFactory`]. Nothing is checked until
//! [`ServiceCollection::build`].

use std::sync::Arc;

use crate::descriptors::ServiceDescriptor;
use crate::error::DiResult;
use crate::factories::{FnFactory, InstanceFactory};
use crate::key::{Key, Requirement};
use crate::lifetime::Lifetime;
use crate::observer::{DiObserver, Observers};
use crate::options::ContainerOptions;
use crate::provider::{ResolverContext, Scope};
use crate::traits::Dispose;
use crate::validation::validate;

/// Ordered list of service registrations.
///
/// Registration order matters: singular resolution uses the last
/// registration of a key, collection resolution returns all of them in
/// order.
///
/// # Examples
///
/// ```
/// use scoped_di::{Requirement, Resolver, ServiceCollection};
///
/// struct Config { url: String }
/// struct Repository { url: String }
///
/// let mut services = ServiceCollection::new();
/// services
///     .add_singleton(Config { url: "postgres://localhost".into() })
///     .add_scoped_factory::<Repository, _>(&[Requirement::of::<Config>()], |r| {
///         Ok(Repository { url: r.get::<Config>()?.url.clone() })
///     });
///
/// let root = services.build().unwrap();
/// let scope = root.create_scope();
/// assert_eq!(scope.get_required::<Repository>().url, "postgres://localhost");
/// ```
#[derive(Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
    observers: Observers,
    options: ContainerOptions,
}

impl ServiceCollection {
    /// Creates a new empty service collection.
    pub fn new() -> Self {
        Self::default()
    }

    // ----- Descriptor CRUD -----

    /// Appends a descriptor.
    pub fn add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Appends descriptors in order.
    pub fn add_range<I>(&mut self, descriptors: I) -> &mut Self
    where
        I: IntoIterator<Item = ServiceDescriptor>,
    {
        self.descriptors.extend(descriptors);
        self
    }

    /// Appends `descriptor` unless its service type is already registered.
    ///
    /// Returns `true` if the descriptor was added.
    ///
    /// ```
    /// use scoped_di::{ServiceCollection, ServiceDescriptor};
    ///
    /// let mut services = ServiceCollection::new();
    /// assert!(services.try_add(ServiceDescriptor::instance(1u8)));
    /// assert!(!services.try_add(ServiceDescriptor::instance(2u8)));
    /// assert_eq!(services.len(), 1);
    /// ```
    pub fn try_add(&mut self, descriptor: ServiceDescriptor) -> bool {
        let service_type = descriptor.service_type();
        if self.descriptors.iter().any(|d| d.service_type() == service_type) {
            return false;
        }
        self.descriptors.push(descriptor);
        true
    }

    /// [`try_add`](Self::try_add) for each descriptor in order.
    pub fn try_add_range<I>(&mut self, descriptors: I) -> &mut Self
    where
        I: IntoIterator<Item = ServiceDescriptor>,
    {
        for descriptor in descriptors {
            self.try_add(descriptor);
        }
        self
    }

    /// Removes every registration of the descriptor's service type, then
    /// appends the descriptor.
    pub fn replace_all(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        let service_type = descriptor.service_type();
        self.descriptors.retain(|d| d.service_type() != service_type);
        self.descriptors.push(descriptor);
        self
    }

    /// Rewrites the descriptors matching `predicate`.
    ///
    /// Matching descriptors are removed and handed to `replace`, in order;
    /// whatever it returns is appended after the descriptors that remained.
    ///
    /// ```
    /// use scoped_di::{Key, ServiceCollection, ServiceDescriptor};
    ///
    /// let mut services = ServiceCollection::new();
    /// services
    ///     .add(ServiceDescriptor::instance(1u8))
    ///     .add(ServiceDescriptor::instance("name"))
    ///     .add(ServiceDescriptor::instance(2u8));
    ///
    /// // Keep only the last u8 registration.
    /// services.update_descriptors(
    ///     |d| d.service_type() == Key::of::<u8>(),
    ///     |mut matched| matched.split_off(matched.len() - 1),
    /// );
    ///
    /// assert_eq!(services.len(), 2);
    /// assert_eq!(services.descriptors()[1].service_type(), Key::of::<u8>());
    /// ```
    pub fn update_descriptors<P, R>(&mut self, predicate: P, replace: R) -> &mut Self
    where
        P: Fn(&ServiceDescriptor) -> bool,
        R: FnOnce(Vec<ServiceDescriptor>) -> Vec<ServiceDescriptor>,
    {
        let (matched, mut remaining): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.descriptors).into_iter().partition(|d| predicate(d));
        remaining.extend(replace(matched));
        self.descriptors = remaining;
        self
    }

    /// Descriptors matching `predicate`, in registration order.
    pub fn find_descriptors<P>(&self, predicate: P) -> Vec<&ServiceDescriptor>
    where
        P: Fn(&ServiceDescriptor) -> bool,
    {
        self.descriptors.iter().filter(|d| predicate(*d)).collect()
    }

    /// First descriptor matching `predicate`.
    pub fn find_first_descriptor<P>(&self, predicate: P) -> Option<&ServiceDescriptor>
    where
        P: Fn(&ServiceDescriptor) -> bool,
    {
        self.descriptors.iter().find(|d| predicate(*d))
    }

    /// Every registration of `key`, in registration order.
    pub fn descriptors_for(&self, key: &Key) -> Vec<&ServiceDescriptor> {
        self.find_descriptors(|d| d.service_type() == *key)
    }

    /// The first registration of `key`.
    pub fn first_descriptor_for(&self, key: &Key) -> Option<&ServiceDescriptor> {
        self.find_first_descriptor(|d| d.service_type() == *key)
    }

    /// All descriptors in registration order.
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    // ----- Concrete Type Registrations -----

    /// Registers a prebuilt singleton value.
    ///
    /// The container never releases it.
    pub fn add_singleton<T: 'static + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.add(ServiceDescriptor::instance(value))
    }

    /// Registers a singleton factory.
    ///
    /// `requirements` must list every service the closure resolves; they are
    /// what [`build`](Self::build) validates.
    pub fn add_singleton_factory<T, F>(
        &mut self,
        requirements: &[Requirement],
        factory: F,
    ) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        let factory = FnFactory::of::<T, _>(requirements, factory);
        self.add(ServiceDescriptor::singleton::<T>(factory))
    }

    /// Registers a scoped factory.
    pub fn add_scoped_factory<T, F>(
        &mut self,
        requirements: &[Requirement],
        factory: F,
    ) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        let factory = FnFactory::of::<T, _>(requirements, factory);
        self.add(ServiceDescriptor::scoped::<T>(factory))
    }

    /// Registers a transient factory.
    pub fn add_transient_factory<T, F>(
        &mut self,
        requirements: &[Requirement],
        factory: F,
    ) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        let factory = FnFactory::of::<T, _>(requirements, factory);
        self.add(ServiceDescriptor::transient::<T>(factory))
    }

    // ----- Disposable Registrations -----

    /// Registers a singleton released by the root scope's dispose.
    pub fn add_singleton_disposable<T, F>(
        &mut self,
        requirements: &[Requirement],
        factory: F,
    ) -> &mut Self
    where
        T: Dispose,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        let factory = FnFactory::disposable::<T, _>(requirements, factory);
        self.add(ServiceDescriptor::singleton::<T>(factory))
    }

    /// Registers a scoped service released by its scope's dispose.
    pub fn add_scoped_disposable<T, F>(
        &mut self,
        requirements: &[Requirement],
        factory: F,
    ) -> &mut Self
    where
        T: Dispose,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        let factory = FnFactory::disposable::<T, _>(requirements, factory);
        self.add(ServiceDescriptor::scoped::<T>(factory))
    }

    /// Registers a transient service released by the resolving scope's
    /// dispose.
    pub fn add_transient_disposable<T, F>(
        &mut self,
        requirements: &[Requirement],
        factory: F,
    ) -> &mut Self
    where
        T: Dispose,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        let factory = FnFactory::disposable::<T, _>(requirements, factory);
        self.add(ServiceDescriptor::transient::<T>(factory))
    }

    // ----- Trait Registrations -----

    /// Registers a prebuilt trait object as a singleton.
    ///
    /// ```
    /// use scoped_di::{Resolver, ServiceCollection};
    /// use std::sync::Arc;
    ///
    /// trait Clock: Send + Sync {
    ///     fn now(&self) -> u64;
    /// }
    ///
    /// struct Fixed;
    /// impl Clock for Fixed {
    ///     fn now(&self) -> u64 { 42 }
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton_trait::<dyn Clock>(Arc::new(Fixed));
    /// let root = services.build().unwrap();
    /// assert_eq!(root.get_required_trait::<dyn Clock>().now(), 42);
    /// ```
    pub fn add_singleton_trait<T>(&mut self, value: Arc<T>) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
    {
        self.add(ServiceDescriptor::singleton::<T>(InstanceFactory::from_trait(value)))
    }

    /// Registers a trait-object factory under `lifetime`.
    pub fn add_trait_factory<T, F>(
        &mut self,
        lifetime: Lifetime,
        requirements: &[Requirement],
        factory: F,
    ) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::new(
            Key::of::<T>(),
            lifetime,
            FnFactory::of_trait::<T, _>(requirements, factory),
        ))
    }

    // ----- Container -----

    /// Adds an observer notified around every factory invocation.
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    /// Replaces the container options.
    pub fn with_options(&mut self, options: ContainerOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Validates the registrations and creates the root scope.
    ///
    /// # Errors
    ///
    /// - [`DiError::InvalidOptions`](crate::DiError::InvalidOptions) for
    ///   unusable options.
    /// - [`DiError::Dependency`](crate::DiError::Dependency) listing every
    ///   missing dependency and lifetime violation.
    ///
    /// ```
    /// use scoped_di::{Requirement, ServiceCollection};
    ///
    /// struct Cache;
    /// struct Session;
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_scoped_factory::<Session, _>(&[], |_| Ok(Session));
    /// services.add_singleton_factory::<Cache, _>(&[Requirement::of::<Session>()], |_| Ok(Cache));
    ///
    /// let err = services.build().unwrap_err();
    /// assert!(err.to_string().contains("=(invalid)=>"));
    /// ```
    pub fn build(self) -> DiResult<Scope> {
        self.options.validate()?;
        let validated = validate(self.descriptors)?;
        Ok(Scope::root_with(validated, self.observers, self.options))
    }
}

impl std::fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("descriptors", &self.descriptors)
            .field("observers", &self.observers.len())
            .field("options", &self.options)
            .finish()
    }
}
