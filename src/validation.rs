//! Build-time dependency validation.
//!
//! Every registration set passes through [`validate`] before a root scope can
//! exist. The checker proves two things without constructing anything:
//!
//! - every singular requirement names a registered service;
//! - no singleton reaches a scoped service, directly or through any chain of
//!   other services.
//!
//! Violations are collected rather than reported one at a time, so the
//! resulting [`DependencyError`] lists everything wrong with the set.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::descriptors::ServiceDescriptor;
use crate::error::{DependencyError, DiResult};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registration::Registry;

/// A registration set that passed validation.
///
/// There is no public constructor: [`validate`] is the only way to obtain
/// one, and [`Scope::root`](crate::Scope::root) only accepts this type.
///
/// # Examples
///
/// ```
/// use scoped_di::{validate, FnFactory, Requirement, ServiceDescriptor};
///
/// struct Clock;
/// struct Session;
///
/// let validated = validate(vec![
///     ServiceDescriptor::instance(Clock),
///     ServiceDescriptor::scoped::<Session>(
///         FnFactory::of::<Session, _>(&[Requirement::of::<Clock>()], |_| Ok(Session)),
///     ),
/// ])
/// .unwrap();
/// assert_eq!(validated.len(), 2);
/// ```
#[derive(Clone)]
pub struct ValidatedDescriptors {
    registry: Arc<Registry>,
}

impl ValidatedDescriptors {
    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// The descriptors in registration order.
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        self.registry.descriptors()
    }

    pub(crate) fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl fmt::Debug for ValidatedDescriptors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.registry.descriptors()).finish()
    }
}

/// Why a chain was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationReason {
    /// A singular requirement has no registration.
    NotFound,
    /// A singleton reaches a scoped service.
    LifetimeViolation,
}

/// One hop of a violation chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    service_type: Key,
    lifetime: Option<Lifetime>,
    display_name: String,
}

impl ChainLink {
    /// The key of this hop.
    pub fn service_type(&self) -> Key {
        self.service_type
    }

    /// The descriptor's lifetime; `None` for a missing dependency.
    pub fn lifetime(&self) -> Option<Lifetime> {
        self.lifetime
    }

    /// The factory display name, or the type name of a missing dependency.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl fmt::Display for ChainLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lifetime {
            Some(lifetime) => write!(f, "[{}] {}", lifetime, self.display_name),
            None => f.write_str(&self.display_name),
        }
    }
}

/// A request chain that ends in a missing or lifetime-incompatible service.
///
/// Rendered as `[Singleton] Cache ==> [Transient] Loader =(invalid)=> [Scoped] Session`
/// or `[Scoped] Handler =(not found)=> app::Clock`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    chain: Vec<ChainLink>,
    reason: ViolationReason,
}

impl Violation {
    /// Hops from the requesting descriptor to the offending one.
    pub fn chain(&self) -> &[ChainLink] {
        &self.chain
    }

    /// The kind of violation.
    pub fn reason(&self) -> ViolationReason {
        self.reason
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.chain.len().saturating_sub(1);
        for (i, link) in self.chain.iter().enumerate() {
            if i > 0 {
                let separator = if i < last {
                    " ==> "
                } else {
                    match self.reason {
                        ViolationReason::LifetimeViolation => " =(invalid)=> ",
                        ViolationReason::NotFound => " =(not found)=> ",
                    }
                };
                f.write_str(separator)?;
            }
            write!(f, "{}", link)?;
        }
        Ok(())
    }
}

/// Proves a registration set consistent.
///
/// Runs a direct pass over every requirement edge, then a transitive pass
/// that walks each requester's full dependency closure under the
/// requester's own lifetime. Violations from both passes are merged, and
/// identical chains are reported once.
///
/// # Errors
///
/// [`DiError::Dependency`](crate::DiError::Dependency) carrying every
/// violation found.
///
/// # Examples
///
/// ```
/// use scoped_di::{validate, FnFactory, Lifetime, Requirement, ServiceDescriptor};
///
/// struct A;
/// struct B;
///
/// // A scoped B may depend on a singleton A.
/// let ok = validate(vec![
///     ServiceDescriptor::singleton::<A>(FnFactory::of::<A, _>(&[], |_| Ok(A)).named("A")),
///     ServiceDescriptor::scoped::<B>(
///         FnFactory::of::<B, _>(&[Requirement::of::<A>()], |_| Ok(B)).named("B"),
///     ),
/// ]);
/// assert!(ok.is_ok());
///
/// // A singleton B may not depend on a scoped A.
/// let err = validate(vec![
///     ServiceDescriptor::scoped::<A>(FnFactory::of::<A, _>(&[], |_| Ok(A)).named("A")),
///     ServiceDescriptor::singleton::<B>(
///         FnFactory::of::<B, _>(&[Requirement::of::<A>()], |_| Ok(B)).named("B"),
///     ),
/// ])
/// .unwrap_err();
/// assert_eq!(err.to_string(), "[Singleton] B =(invalid)=> [Scoped] A");
/// ```
pub fn validate(descriptors: Vec<ServiceDescriptor>) -> DiResult<ValidatedDescriptors> {
    let registry = Registry::new(descriptors);
    let violations = Checker::new(&registry).run();

    if violations.is_empty() {
        tracing::debug!(descriptors = registry.len(), "registration set validated");
        Ok(ValidatedDescriptors {
            registry: Arc::new(registry),
        })
    } else {
        tracing::debug!(
            descriptors = registry.len(),
            violations = violations.len(),
            "registration set rejected"
        );
        Err(DependencyError::new(violations).into())
    }
}

/// Per-descriptor memo for one validation pass.
///
/// Scoped contexts have their own flag. Singleton and transient contexts
/// share a bucket that remembers which of the two filled it; a singleton
/// context re-enters a record first visited under a transient context.
#[derive(Debug, Default)]
struct ValidationRecord {
    checked_as_scoped_context: bool,
    checked_as_non_scoped_context: Option<Lifetime>,
    last_recurse_pass: Option<bool>,
}

impl ValidationRecord {
    /// Marks the record visited under `context`; `false` means skip.
    fn enter(&mut self, context: Lifetime, recurse: bool) -> bool {
        if self.last_recurse_pass != Some(recurse) {
            self.checked_as_scoped_context = false;
            self.checked_as_non_scoped_context = None;
            self.last_recurse_pass = Some(recurse);
        }

        match context {
            Lifetime::Scoped => {
                if self.checked_as_scoped_context {
                    return false;
                }
                self.checked_as_scoped_context = true;
            }
            Lifetime::Singleton => {
                if self.checked_as_non_scoped_context == Some(Lifetime::Singleton) {
                    return false;
                }
                self.checked_as_non_scoped_context = Some(Lifetime::Singleton);
            }
            Lifetime::Transient => {
                if self.checked_as_non_scoped_context.is_some() {
                    return false;
                }
                self.checked_as_non_scoped_context = Some(Lifetime::Transient);
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Hop {
    Descriptor(usize),
    Missing(Key),
}

struct Checker<'r> {
    registry: &'r Registry,
    records: Vec<ValidationRecord>,
    seen: HashSet<(Vec<Hop>, ViolationReason)>,
    violations: Vec<Violation>,
}

impl<'r> Checker<'r> {
    fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            records: (0..registry.len()).map(|_| ValidationRecord::default()).collect(),
            seen: HashSet::new(),
            violations: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Violation> {
        self.run_pass(false);
        self.run_pass(true);
        self.violations
    }

    fn run_pass(&mut self, recurse: bool) {
        let mut chain = Vec::new();
        for index in 0..self.registry.len() {
            let context = self.registry.get(index).lifetime();
            chain.push(index);
            self.check(index, context, &mut chain, recurse);
            chain.pop();
        }
    }

    fn check(&mut self, index: usize, context: Lifetime, chain: &mut Vec<usize>, recurse: bool) {
        if !self.records[index].enter(context, recurse) {
            return;
        }

        let registry = self.registry;
        for requirement in registry.get(index).requirements() {
            let key = requirement.key();
            if requirement.is_collection() {
                for &dependency in registry.indices_of(&key) {
                    self.check_dependency(dependency, context, chain, recurse);
                }
            } else {
                match registry.last_index_of(&key) {
                    Some(dependency) => self.check_dependency(dependency, context, chain, recurse),
                    None => self.report(chain, Some(key), ViolationReason::NotFound),
                }
            }
        }
    }

    fn check_dependency(
        &mut self,
        dependency: usize,
        context: Lifetime,
        chain: &mut Vec<usize>,
        recurse: bool,
    ) {
        chain.push(dependency);
        if !context.can_depend_on(self.registry.get(dependency).lifetime()) {
            self.report(chain, None, ViolationReason::LifetimeViolation);
        }
        if recurse {
            self.check(dependency, context, chain, recurse);
        }
        chain.pop();
    }

    fn report(&mut self, chain: &[usize], missing: Option<Key>, reason: ViolationReason) {
        let mut hops: Vec<Hop> = chain.iter().map(|&index| Hop::Descriptor(index)).collect();
        hops.extend(missing.map(Hop::Missing));

        let links = hops.iter().map(|hop| self.link(hop)).collect();
        if self.seen.insert((hops, reason)) {
            self.violations.push(Violation { chain: links, reason });
        }
    }

    fn link(&self, hop: &Hop) -> ChainLink {
        match *hop {
            Hop::Descriptor(index) => {
                let descriptor = self.registry.get(index);
                ChainLink {
                    service_type: descriptor.service_type(),
                    lifetime: Some(descriptor.lifetime()),
                    display_name: descriptor.display_name().to_string(),
                }
            }
            Hop::Missing(key) => ChainLink {
                service_type: key,
                lifetime: None,
                display_name: key.display_name().to_string(),
            },
        }
    }
}
