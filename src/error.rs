//! Error types for the dependency injection container.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::validation::Violation;

/// Dependency injection errors.
///
/// Configuration problems ([`DiError::Dependency`]) are reported once, when
/// the container is built. Everything else is a resolution error local to a
/// single `resolve` call: it never poisons the scope, and a later call may
/// succeed.
///
/// # Examples
///
/// ```rust
/// use scoped_di::{DiError, Resolver, ServiceCollection};
///
/// let scope = ServiceCollection::new().build().unwrap();
/// match scope.get::<String>() {
///     Err(DiError::ServiceNotFound(name)) => assert_eq!(name, "alloc::string::String"),
///     other => panic!("unexpected: {:?}", other),
/// }
///
/// let failed = DiError::factory("connection refused");
/// assert_eq!(failed.to_string(), "Factory failed: connection refused");
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// The registration set failed validation; carries every violation found.
    Dependency(DependencyError),
    /// Service not registered
    ServiceNotFound(&'static str),
    /// The scope has been disposed
    ScopeDisposed,
    /// Type downcast failed
    TypeMismatch(&'static str),
    /// Circular resolution detected on the current thread (includes path)
    Circular(Vec<String>),
    /// Maximum resolution depth exceeded
    DepthExceeded(usize),
    /// Error returned by a user factory
    Factory(Arc<dyn Error + Send + Sync>),
    /// Rejected container options
    InvalidOptions(String),
}

impl DiError {
    /// Wraps an arbitrary error raised inside a factory.
    pub fn factory<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        DiError::Factory(Arc::from(error.into()))
    }

    /// Returns the aggregated validation error, if this is one.
    pub fn as_dependency_error(&self) -> Option<&DependencyError> {
        match self {
            DiError::Dependency(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::Dependency(err) => write!(f, "{}", err),
            DiError::ServiceNotFound(name) => write!(f, "Service not found: {}", name),
            DiError::ScopeDisposed => write!(f, "Scope has been disposed"),
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::Circular(path) => write!(f, "Circular dependency: {}", path.join(" -> ")),
            DiError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
            DiError::Factory(err) => write!(f, "Factory failed: {}", err),
            DiError::InvalidOptions(msg) => write!(f, "Invalid container options: {}", msg),
        }
    }
}

impl Error for DiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DiError::Dependency(err) => Some(err),
            DiError::Factory(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<DependencyError> for DiError {
    fn from(err: DependencyError) -> Self {
        DiError::Dependency(err)
    }
}

/// Aggregate of every violation found while validating a registration set.
///
/// The message lists one violation per line, so a misconfigured container can
/// be fixed in a single pass:
///
/// ```text
/// [Singleton] Cache ==> [Transient] Loader =(invalid)=> [Scoped] Session
/// [Scoped] Handler =(not found)=> app::Clock
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyError {
    violations: Vec<Violation>,
}

impl DependencyError {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Violations in discovery order, without duplicates.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Number of distinct violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Always `false` for errors produced by validation.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for DependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl Error for DependencyError {}

/// Result type for DI operations
pub type DiResult<T> = Result<T, DiError>;
