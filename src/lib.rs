//! # scoped-di
//!
//! Dependency injection with build-time lifetime validation and
//! scope-aware instance caching.
//!
//! ## Features
//!
//! - **Validated before use**: a registration set is checked once, when the
//!   container is built. Missing dependencies and singletons that reach a
//!   scoped service (directly or through transient services) are all reported
//!   together.
//! - **Three lifetimes**: Singleton, Scoped and Transient services
//! - **Trait support**: single and collection resolution of `dyn Trait` contracts
//! - **Deterministic teardown**: each scope releases the instances it
//!   created, newest first, exactly once
//! - **Thread-safe**: at most one factory call per cached slot, even under
//!   concurrent resolution
//!
//! ## Quick Start
//!
//! ```rust
//! use scoped_di::{Requirement, Resolver, ServiceCollection};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! });
//! services.add_transient_factory::<UserService, _>(&[Requirement::of::<Database>()], |resolver| {
//!     Ok(UserService {
//!         db: resolver.get::<Database>()?,
//!     })
//! });
//!
//! let root = services.build().unwrap();
//! let user_service = root.get_required::<UserService>();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! root.dispose();
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: created once per root scope and shared with every child
//! - **Scoped**: created once per scope (ideal for request contexts)
//! - **Transient**: created fresh on every resolution
//!
//! A singleton may never depend on a scoped service, however long the chain
//! in between:
//!
//! ```rust
//! use scoped_di::{Requirement, ServiceCollection};
//!
//! struct RequestContext;
//! struct Loader;
//! struct Cache;
//!
//! let mut services = ServiceCollection::new();
//! services.add_scoped_factory::<RequestContext, _>(&[], |_| Ok(RequestContext));
//! services.add_transient_factory::<Loader, _>(&[Requirement::of::<RequestContext>()], |_| {
//!     Ok(Loader)
//! });
//! services.add_singleton_factory::<Cache, _>(&[Requirement::of::<Loader>()], |_| Ok(Cache));
//!
//! let err = services.build().unwrap_err();
//! let message = err.to_string();
//! assert!(message.contains("==>"));
//! assert!(message.contains("=(invalid)=>"));
//! ```
//!
//! ## Scoped Services
//!
//! ```rust
//! use scoped_di::{Resolver, ServiceCollection};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! struct RequestId(usize);
//!
//! let counter = Arc::new(AtomicUsize::new(0));
//! let next = counter.clone();
//!
//! let mut services = ServiceCollection::new();
//! services.add_scoped_factory::<RequestId, _>(&[], move |_| {
//!     Ok(RequestId(next.fetch_add(1, Ordering::SeqCst)))
//! });
//!
//! let root = services.build().unwrap();
//! let scope1 = root.create_scope();
//! let scope2 = root.create_scope();
//!
//! assert_eq!(scope1.get_required::<RequestId>().0, 0);
//! assert_eq!(scope1.get_required::<RequestId>().0, 0);
//! assert_eq!(scope2.get_required::<RequestId>().0, 1);
//! ```

pub mod collection;
pub mod descriptors;
pub mod error;
pub mod factories;
pub mod instance;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod options;
pub mod provider;
pub mod traits;
pub mod validation;

mod internal;
mod registration;

pub use collection::ServiceCollection;
pub use descriptors::ServiceDescriptor;
pub use error::{DependencyError, DiError, DiResult};
pub use factories::{FnFactory, InstanceFactory};
pub use instance::{AnyArc, ServiceInstance};
pub use key::{key_of_type, Key, Requirement};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, TracingObserver};
pub use options::ContainerOptions;
pub use provider::{ResolverContext, Scope, ServiceInfo};
pub use traits::{Dispose, DisposeFn, NoopDisposable, Resolver, ResolverCore, ServiceFactory};
pub use validation::{validate, ChainLink, ValidatedDescriptors, Violation, ViolationReason};
