//! Core traits: resolution, factories and disposal.

pub mod dispose;
pub mod factory;
pub mod resolver;

pub use dispose::{Dispose, DisposeFn, NoopDisposable};
pub use factory::ServiceFactory;
pub use resolver::{Resolver, ResolverCore};
