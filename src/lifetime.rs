//! Service lifetime definitions.

use std::fmt;

/// Service lifetimes controlling instance sharing.
///
/// Lifetimes are ordered by *width*: a `Singleton` lives as long as the root
/// scope, a `Scoped` instance as long as one child scope, and a `Transient`
/// instance is never shared at all.
///
/// The one forbidden dependency edge is a singleton reaching a scoped
/// service, directly or through any chain of transient services: the
/// singleton would capture an instance that belongs to a single scope.
///
/// # Examples
///
/// ```rust
/// use scoped_di::Lifetime;
///
/// assert!(Lifetime::Scoped.can_depend_on(Lifetime::Singleton));
/// assert!(Lifetime::Singleton.can_depend_on(Lifetime::Transient));
/// assert!(!Lifetime::Singleton.can_depend_on(Lifetime::Scoped));
/// assert_eq!(Lifetime::Transient.to_string(), "Transient");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub enum Lifetime {
    /// Single instance per root scope, shared by every child scope.
    Singleton,
    /// Single instance per scope.
    ///
    /// Different scopes get different instances. The root scope has its own
    /// scoped instances, which it never shares with its children.
    Scoped,
    /// New instance per resolution, never cached.
    ///
    /// The resolving scope still releases the instance when it is disposed.
    Transient,
}

impl Lifetime {
    /// Returns `true` if a service with this lifetime may require a service
    /// with the `dependency` lifetime.
    #[inline]
    pub fn can_depend_on(self, dependency: Lifetime) -> bool {
        !(self == Lifetime::Singleton && dependency == Lifetime::Scoped)
    }

    /// Returns `true` for lifetimes whose instances are cached.
    #[inline]
    pub fn is_cached(self) -> bool {
        !matches!(self, Lifetime::Transient)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lifetime::Singleton => "Singleton",
            Lifetime::Scoped => "Scoped",
            Lifetime::Transient => "Transient",
        };
        f.write_str(name)
    }
}
