//! Resolver traits for service resolution.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::instance::AnyArc;
use crate::key::Key;

/// Core resolver trait for object-safe service resolution.
///
/// Implemented by [`Scope`](crate::Scope) and by the
/// [`ResolverContext`](crate::ResolverContext) handed to factories. Most
/// callers use the typed methods of [`Resolver`] instead.
pub trait ResolverCore: Send + Sync {
    /// Resolves the last registration of `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(AnyArc)` - The resolved service wrapped in `Arc<dyn Any>`
    /// * `Err(DiError)` - `ServiceNotFound`, `ScopeDisposed`, a cycle
    ///   error, or the error returned by the factory
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc>;

    /// Resolves every registration of `key`, in registration order.
    ///
    /// Zero registrations yields an empty vector, not an error.
    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>>;
}

/// Typed resolution on top of [`ResolverCore`].
///
/// Concrete services are stored as `Arc<T>`. Trait-object services
/// registered through [`add_trait_factory`](crate::ServiceCollection::add_trait_factory)
/// are stored as `Arc<Arc<dyn Trait>>` and read back with the `_trait`
/// methods.
///
/// # Examples
///
/// ```
/// use scoped_di::{Lifetime, Resolver, ServiceCollection};
/// use std::sync::Arc;
///
/// trait Plugin: Send + Sync {
///     fn name(&self) -> &str;
/// }
///
/// struct Audit;
/// impl Plugin for Audit {
///     fn name(&self) -> &str { "audit" }
/// }
///
/// struct Metrics;
/// impl Plugin for Metrics {
///     fn name(&self) -> &str { "metrics" }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(42usize);
/// services.add_trait_factory::<dyn Plugin, _>(Lifetime::Singleton, &[], |_| Ok(Arc::new(Audit)));
/// services.add_trait_factory::<dyn Plugin, _>(Lifetime::Transient, &[], |_| {
///     Ok(Arc::new(Metrics))
/// });
///
/// let root = services.build().unwrap();
/// assert_eq!(*root.get_required::<usize>(), 42);
///
/// // Singular resolution: last registration wins.
/// assert_eq!(root.get_required_trait::<dyn Plugin>().name(), "metrics");
///
/// // Collection resolution: registration order.
/// let names: Vec<_> = root
///     .get_all_trait::<dyn Plugin>()
///     .unwrap()
///     .iter()
///     .map(|p| p.name().to_string())
///     .collect();
/// assert_eq!(names, ["audit", "metrics"]);
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete service type.
    fn get<T: 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&Key::of::<T>())?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves every registration of a concrete service type.
    fn get_all<T: 'static + Send + Sync>(&self) -> DiResult<Vec<Arc<T>>> {
        self.resolve_many(&Key::of::<T>())?
            .into_iter()
            .map(|any| {
                any.downcast::<T>()
                    .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
            })
            .collect()
    }

    /// Resolves a trait-object service.
    fn get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&Key::of::<T>())?;
        any.downcast::<Arc<T>>()
            .map(|boxed| (*boxed).clone())
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves every registration of a trait-object service.
    fn get_all_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Vec<Arc<T>>> {
        self.resolve_many(&Key::of::<T>())?
            .into_iter()
            .map(|any| {
                any.downcast::<Arc<T>>()
                    .map(|boxed| (*boxed).clone())
                    .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
            })
            .collect()
    }

    /// Resolves a concrete service type, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if the service cannot be resolved (not found, disposed scope,
    /// factory error, etc.).
    fn get_required<T: 'static + Send + Sync>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }

    /// Resolves a trait-object service, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if the service cannot be resolved.
    fn get_required_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Arc<T> {
        self.get_trait::<T>().unwrap_or_else(|e| {
            panic!("Failed to resolve trait {}: {}", std::any::type_name::<T>(), e)
        })
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
