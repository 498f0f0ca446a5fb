//! Service keys and dependency requirements.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a service contract.
///
/// A key is built from a `TypeId`, so two keys are equal exactly when they
/// name the same Rust type. The type name is carried along for diagnostics
/// only and never takes part in comparisons. Trait-object contracts such as
/// `dyn Logger` get their own keys, distinct from any implementing type.
///
/// # Examples
///
/// ```rust
/// use scoped_di::{Key, key_of_type};
///
/// trait Logger: Send + Sync {}
///
/// let a = Key::of::<String>();
/// let b = key_of_type::<String>();
/// assert_eq!(a, b);
/// assert_ne!(a, Key::of::<dyn Logger>());
/// assert_eq!(a.display_name(), "alloc::string::String");
/// ```
#[derive(Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Key for the type `T`, which may be unsized (`dyn Trait`, `str`).
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The type name used in diagnostics.
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// The underlying type identity.
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

// Identity only: the name is diagnostic payload.
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl Hash for Key {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Helper for creating type keys.
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> Key {
    Key::of::<T>()
}

/// A dependency declared by a factory.
///
/// A *singular* requirement expects exactly one registration of its key
/// (the last one registered wins). A *collection* requirement asks for every
/// registration of its key, and zero registrations is a valid answer.
///
/// # Examples
///
/// ```rust
/// use scoped_di::{Key, Requirement};
///
/// struct Database;
/// trait Plugin: Send + Sync {}
///
/// let db = Requirement::of::<Database>();
/// assert!(!db.is_collection());
/// assert_eq!(db.key(), Key::of::<Database>());
///
/// let plugins = Requirement::all::<dyn Plugin>();
/// assert!(plugins.is_collection());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Requirement {
    key: Key,
    is_collection: bool,
}

impl Requirement {
    /// Singular requirement on `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::single(Key::of::<T>())
    }

    /// Collection requirement on every registration of `T`.
    pub fn all<T: ?Sized + 'static>() -> Self {
        Self::collection(Key::of::<T>())
    }

    /// Singular requirement on an explicit key.
    pub fn single(key: Key) -> Self {
        Self { key, is_collection: false }
    }

    /// Collection requirement on an explicit key.
    pub fn collection(key: Key) -> Self {
        Self { key, is_collection: true }
    }

    /// The required service key.
    pub fn key(&self) -> Key {
        self.key
    }

    /// Whether this is a collection requirement.
    pub fn is_collection(&self) -> bool {
        self.is_collection
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_collection {
            write!(f, "[{}]", self.key)
        } else {
            write!(f, "{}", self.key)
        }
    }
}
