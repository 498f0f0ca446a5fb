//! Closure-backed factories.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::DiResult;
use crate::instance::ServiceInstance;
use crate::key::Requirement;
use crate::provider::ResolverContext;
use crate::traits::{Dispose, ServiceFactory};

type FactoryFn = dyn Fn(&ResolverContext<'_>) -> DiResult<ServiceInstance> + Send + Sync;

/// A [`ServiceFactory`] built from a closure and a requirement list.
///
/// The display name defaults to the produced type's name and can be
/// overridden with [`named`](FnFactory::named), which keeps validation
/// messages readable.
///
/// # Examples
///
/// ```
/// use scoped_di::{FnFactory, Requirement, Resolver, ServiceFactory};
///
/// struct Config { url: String }
/// struct Client { url: String }
///
/// let factory = FnFactory::of::<Client, _>(&[Requirement::of::<Config>()], |r| {
///     let config = r.get::<Config>()?;
///     Ok(Client { url: config.url.clone() })
/// })
/// .named("HttpClient");
///
/// assert_eq!(factory.display_name(), "HttpClient");
/// assert_eq!(factory.requirements().len(), 1);
/// ```
pub struct FnFactory {
    requirements: Vec<Requirement>,
    display_name: Cow<'static, str>,
    func: Box<FactoryFn>,
}

impl FnFactory {
    /// Wraps a closure that already produces a [`ServiceInstance`].
    pub fn new<F>(
        requirements: &[Requirement],
        display_name: impl Into<Cow<'static, str>>,
        func: F,
    ) -> Self
    where
        F: Fn(&ResolverContext<'_>) -> DiResult<ServiceInstance> + Send + Sync + 'static,
    {
        Self {
            requirements: requirements.to_vec(),
            display_name: display_name.into(),
            func: Box::new(func),
        }
    }

    /// Factory for a concrete `T` with nothing to release.
    pub fn of<T, F>(requirements: &[Requirement], func: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::new(requirements, std::any::type_name::<T>(), move |r| {
            func(r).map(ServiceInstance::of)
        })
    }

    /// Factory for a `T` released through its own [`Dispose`] impl.
    pub fn disposable<T, F>(requirements: &[Requirement], func: F) -> Self
    where
        T: Dispose,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::new(requirements, std::any::type_name::<T>(), move |r| {
            func(r).map(ServiceInstance::disposable_of)
        })
    }

    /// Factory for a trait-object contract.
    ///
    /// The `Arc<T>` is boxed once more so it can travel through `dyn Any`;
    /// [`Resolver::get_trait`](crate::Resolver::get_trait) unwraps it.
    pub fn of_trait<T, F>(requirements: &[Requirement], func: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        Self::new(requirements, std::any::type_name::<T>(), move |r| {
            func(r).map(ServiceInstance::of)
        })
    }

    /// Replaces the display name used in diagnostics.
    pub fn named(mut self, display_name: impl Into<Cow<'static, str>>) -> Self {
        self.display_name = display_name.into();
        self
    }
}

impl ServiceFactory for FnFactory {
    fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn instantiate(&self, resolver: &ResolverContext<'_>) -> DiResult<ServiceInstance> {
        (self.func)(resolver)
    }
}

impl fmt::Debug for FnFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFactory")
            .field("display_name", &self.display_name)
            .field("requirements", &self.requirements)
            .finish()
    }
}

/// Factory that hands out one prebuilt value.
///
/// Used for singleton instance registrations. The value is never released
/// by the container; its owner registered it already constructed.
pub struct InstanceFactory {
    instance: ServiceInstance,
    display_name: &'static str,
}

impl InstanceFactory {
    /// Wraps `value`.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an already shared value.
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            instance: ServiceInstance::without_disposal(value),
            display_name: std::any::type_name::<T>(),
        }
    }

    /// Wraps a trait object so it resolves through the `_trait` methods.
    pub fn from_trait<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            instance: ServiceInstance::of(value),
            display_name: std::any::type_name::<T>(),
        }
    }
}

impl ServiceFactory for InstanceFactory {
    fn requirements(&self) -> &[Requirement] {
        &[]
    }

    fn display_name(&self) -> &str {
        self.display_name
    }

    fn instantiate(&self, _resolver: &ResolverContext<'_>) -> DiResult<ServiceInstance> {
        Ok(self.instance.clone())
    }
}

impl fmt::Debug for InstanceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceFactory")
            .field("display_name", &self.display_name)
            .finish()
    }
}
