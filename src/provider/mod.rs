//! Scopes: the runtime side of the container.
//!
//! A root [`Scope`] is built from a [`ValidatedDescriptors`] set and owns the
//! singleton tier. Child scopes created from it own one scoped instance per
//! descriptor and delegate singletons back to the root. Every scope tracks
//! the instances it created and releases them, newest first, when it is
//! disposed.

use std::fmt;
use std::sync::Arc;

use crate::error::DiResult;
use crate::instance::AnyArc;
use crate::key::Key;
use crate::observer::Observers;
use crate::options::ContainerOptions;
use crate::traits::ResolverCore;
use crate::validation::ValidatedDescriptors;

pub mod context;
pub mod info;
mod scope;

pub use context::ResolverContext;
pub use info::ServiceInfo;
use scope::{ScopeInner, Shared};

/// A node in the scope tree: the root scope or one of its children.
///
/// `Scope` is a cheap handle; clones refer to the same scope, and it can be
/// shared freely across threads.
///
/// # Lifetime Behavior
///
/// - **Singleton**: cached in the root, shared with every child scope. The
///   factory resolves its own dependencies through the root.
/// - **Scoped**: cached per scope. The root keeps its own scoped cache,
///   separate from every child's.
/// - **Transient**: a new instance per resolution, still released by the
///   resolving scope on dispose.
///
/// # Examples
///
/// ```
/// use scoped_di::{Requirement, Resolver, ServiceCollection};
/// use std::sync::Arc;
///
/// struct Pool;
/// struct Connection { pool: Arc<Pool> }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Pool);
/// services.add_scoped_factory::<Connection, _>(&[Requirement::of::<Pool>()], |r| {
///     Ok(Connection { pool: r.get::<Pool>()? })
/// });
///
/// let root = services.build().unwrap();
/// let request_a = root.create_scope();
/// let request_b = root.create_scope();
///
/// let a1 = request_a.get_required::<Connection>();
/// let a2 = request_a.get_required::<Connection>();
/// let b = request_b.get_required::<Connection>();
///
/// assert!(Arc::ptr_eq(&a1, &a2));
/// assert!(!Arc::ptr_eq(&a1, &b));
/// assert!(Arc::ptr_eq(&a1.pool, &b.pool));
///
/// request_a.dispose();
/// request_b.dispose();
/// root.dispose();
/// ```
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    /// Creates the root scope of a validated registration set.
    pub fn root(validated: ValidatedDescriptors) -> Self {
        Self::root_with(validated, Observers::default(), ContainerOptions::default())
    }

    /// Creates a root scope with explicit options.
    ///
    /// # Errors
    ///
    /// [`DiError::InvalidOptions`](crate::DiError::InvalidOptions) if the
    /// options do not validate.
    pub fn root_with_options(
        validated: ValidatedDescriptors,
        options: ContainerOptions,
    ) -> DiResult<Self> {
        options.validate()?;
        Ok(Self::root_with(validated, Observers::default(), options))
    }

    pub(crate) fn root_with(
        validated: ValidatedDescriptors,
        observers: Observers,
        options: ContainerOptions,
    ) -> Self {
        let shared = Arc::new(Shared {
            registry: validated.registry().clone(),
            observers,
            options,
        });
        tracing::debug!(descriptors = shared.registry.len(), "root scope created");
        Self {
            inner: Arc::new(ScopeInner::new_root(shared)),
        }
    }

    /// Creates a child scope with an empty scoped cache.
    ///
    /// The child's root is this scope's root, whichever scope it is called
    /// on. Disposing a scope never disposes its children.
    pub fn create_scope(&self) -> Scope {
        Self {
            inner: Arc::new(ScopeInner::new_child(self.inner.root_arc())),
        }
    }

    /// Releases every instance this scope created, newest first.
    ///
    /// Afterwards the scope is inert: resolution fails with
    /// [`DiError::ScopeDisposed`](crate::DiError::ScopeDisposed). Calling
    /// `dispose` again, from any thread, does nothing.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Whether [`dispose`](Scope::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Whether this is the root scope.
    pub fn is_root(&self) -> bool {
        self.inner.is_root()
    }

    /// Reports how `key` would resolve here, without constructing it.
    pub fn service_info(&self, key: &Key) -> ServiceInfo {
        self.inner.service_info(key)
    }

    /// Multi-line dump of the registrations and which ones are cached in
    /// this scope.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        self.inner.to_debug_string()
    }
}

impl ResolverCore for Scope {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.inner.resolve_any(key)
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        self.inner.resolve_many(key)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("root", &self.is_root())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
