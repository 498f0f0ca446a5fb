//! Read-only view of a registration as seen from one scope.

use crate::key::Key;
use crate::lifetime::Lifetime;

/// What a scope knows about a service key, without constructing anything.
///
/// `lifetime` is `None` when the key is not registered or the scope has been
/// disposed.
///
/// # Examples
///
/// ```
/// use scoped_di::{Key, Lifetime, Resolver, ServiceCollection};
///
/// struct Session;
///
/// let mut services = ServiceCollection::new();
/// services.add_scoped_factory::<Session, _>(&[], |_| Ok(Session));
/// let root = services.build().unwrap();
/// let scope = root.create_scope();
///
/// let info = scope.service_info(&Key::of::<Session>());
/// assert_eq!(info.lifetime, Some(Lifetime::Scoped));
/// assert!(!info.is_instantiated);
///
/// scope.get_required::<Session>();
/// assert!(scope.service_info(&Key::of::<Session>()).is_instantiated);
///
/// assert!(!scope.service_info(&Key::of::<String>()).is_registered());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceInfo {
    /// The queried key.
    pub service_type: Key,
    /// Lifetime of the registration singular resolution would use.
    pub lifetime: Option<Lifetime>,
    /// Whether a cached instance exists for this scope.
    ///
    /// Always `false` for transient services.
    pub is_instantiated: bool,
}

impl ServiceInfo {
    pub(crate) fn unknown(service_type: Key) -> Self {
        Self {
            service_type,
            lifetime: None,
            is_instantiated: false,
        }
    }

    /// Whether the key resolved to a registration.
    pub fn is_registered(&self) -> bool {
        self.lifetime.is_some()
    }
}
