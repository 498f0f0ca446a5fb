//! Resolver context handed to factories.

use crate::error::DiResult;
use crate::instance::AnyArc;
use crate::key::Key;
use crate::traits::ResolverCore;

/// Context passed to factories for resolving their dependencies.
///
/// It resolves exactly as the scope that invoked the factory would: a
/// singleton factory sees the root scope, scoped and transient factories see
/// the scope they were resolved from.
///
/// # Examples
///
/// ```
/// use scoped_di::{Requirement, Resolver, ServiceCollection};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database { url: "postgres://localhost".to_string() });
/// services.add_transient_factory::<UserService, _>(&[Requirement::of::<Database>()], |resolver| {
///     Ok(UserService { db: resolver.get::<Database>()? })
/// });
///
/// let root = services.build().unwrap();
/// assert_eq!(root.get_required::<UserService>().db.url, "postgres://localhost");
/// ```
pub struct ResolverContext<'a> {
    resolver: &'a dyn ResolverCore,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new<T>(resolver: &'a T) -> Self
    where
        T: ResolverCore,
    {
        Self { resolver }
    }
}

impl<'a> ResolverCore for ResolverContext<'a> {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.resolver.resolve_any(key)
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        self.resolver.resolve_many(key)
    }
}
