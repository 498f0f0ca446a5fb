//! Factory capability consumed by descriptors.

use crate::error::DiResult;
use crate::instance::ServiceInstance;
use crate::key::Requirement;
use crate::provider::ResolverContext;

/// Constructs service instances and declares what they depend on.
///
/// The declared requirements are what the validity checker walks; the
/// container trusts them. A factory that resolves something it did not
/// declare bypasses validation for that edge.
///
/// Most registrations never implement this trait by hand: the typed helpers
/// on [`ServiceCollection`](crate::ServiceCollection) wrap closures in a
/// [`FnFactory`](crate::FnFactory).
///
/// # Examples
///
/// ```
/// use scoped_di::{
///     DiResult, Lifetime, Requirement, Resolver, ResolverContext, ServiceDescriptor,
///     ServiceFactory, ServiceInstance, Key, validate, Scope,
/// };
///
/// struct Port(u16);
/// struct Endpoint(String);
///
/// struct EndpointFactory {
///     requirements: Vec<Requirement>,
/// }
///
/// impl ServiceFactory for EndpointFactory {
///     fn requirements(&self) -> &[Requirement] {
///         &self.requirements
///     }
///
///     fn display_name(&self) -> &str {
///         "EndpointFactory"
///     }
///
///     fn instantiate(&self, resolver: &ResolverContext<'_>) -> DiResult<ServiceInstance> {
///         let port = resolver.get::<Port>()?;
///         Ok(ServiceInstance::of(Endpoint(format!("localhost:{}", port.0))))
///     }
/// }
///
/// let descriptors = vec![
///     ServiceDescriptor::instance(Port(8080)),
///     ServiceDescriptor::new(
///         Key::of::<Endpoint>(),
///         Lifetime::Transient,
///         EndpointFactory { requirements: vec![Requirement::of::<Port>()] },
///     ),
/// ];
///
/// let root = Scope::root(validate(descriptors).unwrap());
/// assert_eq!(root.get_required::<Endpoint>().0, "localhost:8080");
/// ```
pub trait ServiceFactory: Send + Sync {
    /// Dependencies in declaration order.
    fn requirements(&self) -> &[Requirement];

    /// Name used in diagnostics only.
    fn display_name(&self) -> &str;

    /// Builds one instance, resolving dependencies through `resolver`.
    fn instantiate(&self, resolver: &ResolverContext<'_>) -> DiResult<ServiceInstance>;
}
