//! Per-scope caches, teardown tracking and lifetime-aware resolution.

use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use super::{ResolverContext, ServiceInfo};
use crate::error::{DiError, DiResult};
use crate::instance::{AnyArc, ServiceInstance};
use crate::internal::ResolutionGuard;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::observer::Observers;
use crate::options::ContainerOptions;
use crate::registration::Registry;
use crate::traits::{Dispose, ResolverCore};

/// State shared by a root scope and every scope created from it.
pub(crate) struct Shared {
    pub(crate) registry: Arc<Registry>,
    pub(crate) observers: Observers,
    pub(crate) options: ContainerOptions,
}

type Slot = Arc<OnceCell<AnyArc>>;

/// Everything a live scope owns. Taken out wholesale on dispose.
struct ScopeState {
    // One lazily allocated cell per descriptor position.
    slots: Box<[Option<Slot>]>,
    // Creation order.
    teardown: Vec<Arc<dyn Dispose>>,
}

impl ScopeState {
    fn new(descriptors: usize) -> Self {
        Self {
            slots: (0..descriptors).map(|_| None).collect(),
            teardown: Vec::new(),
        }
    }

    fn slot(&mut self, index: usize) -> Slot {
        self.slots[index].get_or_insert_with(|| Arc::new(OnceCell::new())).clone()
    }

    fn is_instantiated(&self, index: usize) -> bool {
        self.slots[index].as_ref().map_or(false, |cell| cell.get().is_some())
    }
}

pub(crate) struct ScopeInner {
    shared: Arc<Shared>,
    // `None` on the root itself.
    root: Option<Arc<ScopeInner>>,
    // `None` once disposed.
    state: Mutex<Option<ScopeState>>,
}

impl ScopeInner {
    pub(crate) fn new_root(shared: Arc<Shared>) -> Self {
        let state = ScopeState::new(shared.registry.len());
        Self {
            shared,
            root: None,
            state: Mutex::new(Some(state)),
        }
    }

    pub(crate) fn new_child(root: Arc<ScopeInner>) -> Self {
        let shared = root.shared.clone();
        let state = ScopeState::new(shared.registry.len());
        Self {
            shared,
            root: Some(root),
            state: Mutex::new(Some(state)),
        }
    }

    /// The root scope; the root is its own root.
    pub(crate) fn root(&self) -> &ScopeInner {
        self.root.as_deref().unwrap_or(self)
    }

    pub(crate) fn root_arc(self: &Arc<Self>) -> Arc<ScopeInner> {
        match &self.root {
            Some(root) => root.clone(),
            None => self.clone(),
        }
    }

    pub(crate) fn is_root(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.state.lock().is_none()
    }

    fn ensure_live(&self) -> DiResult<()> {
        if self.is_disposed() {
            return Err(DiError::ScopeDisposed);
        }
        Ok(())
    }

    fn guard(&self, index: usize) -> DiResult<ResolutionGuard> {
        let descriptor = self.shared.registry.get(index);
        ResolutionGuard::enter(
            self as *const ScopeInner as usize,
            index,
            descriptor.display_name(),
            self.shared.options.max_depth,
        )
    }

    fn resolve_index(&self, index: usize) -> DiResult<AnyArc> {
        let descriptor = self.shared.registry.get(index);
        match descriptor.lifetime() {
            Lifetime::Singleton => self.root().resolve_cached(index),
            // The root caches its own scoped instances like any other scope.
            Lifetime::Scoped => self.resolve_cached(index),
            Lifetime::Transient => {
                self.ensure_live()?;
                let _guard = self.guard(index)?;
                let (instance, disposable) = self.instantiate(index)?.into_parts();
                self.track(disposable)?;
                Ok(instance)
            }
        }
    }

    /// At most one factory call per slot. A failed factory leaves the slot
    /// empty for a later retry.
    fn resolve_cached(&self, index: usize) -> DiResult<AnyArc> {
        let cell = {
            let mut state = self.state.lock();
            let cell = state.as_mut().ok_or(DiError::ScopeDisposed)?.slot(index);
            if let Some(value) = cell.get() {
                return Ok(value.clone());
            }
            cell
        };

        let _guard = self.guard(index)?;
        let mut created = None;
        let value = cell
            .get_or_try_init(|| {
                let (instance, disposable) = self.instantiate(index)?.into_parts();
                created = Some(disposable);
                Ok::<_, DiError>(instance)
            })?
            .clone();

        match created {
            Some(disposable) => self.track(disposable)?,
            // Built by another thread, which may have lost a race with dispose.
            None => self.ensure_live()?,
        }
        Ok(value)
    }

    fn instantiate(&self, index: usize) -> DiResult<ServiceInstance> {
        let descriptor = self.shared.registry.get(index);
        let context = ResolverContext::new(self);
        let observers = &self.shared.observers;

        if observers.is_empty() {
            return descriptor.factory().instantiate(&context);
        }

        let key = descriptor.service_type();
        observers.resolving(&key);
        let start = Instant::now();
        let result = descriptor.factory().instantiate(&context);
        match &result {
            Ok(_) => observers.resolved(&key, start.elapsed()),
            Err(err) => observers.factory_failed(&key, err),
        }
        result
    }

    /// Hands a disposable to the scope, or releases it on the spot if the
    /// scope was disposed while the instance was being built.
    fn track(&self, disposable: Arc<dyn Dispose>) -> DiResult<()> {
        let mut state = self.state.lock();
        if let Some(state) = state.as_mut() {
            state.teardown.push(disposable);
            return Ok(());
        }
        drop(state);

        tracing::debug!("instance finished after its scope was disposed; releasing it");
        disposable.dispose();
        Err(DiError::ScopeDisposed)
    }

    pub(crate) fn dispose(&self) {
        let state = self.state.lock().take();
        let Some(state) = state else {
            return;
        };

        tracing::debug!(
            root = self.is_root(),
            instances = state.teardown.len(),
            "disposing scope"
        );
        for disposable in state.teardown.into_iter().rev() {
            disposable.dispose();
        }
    }

    fn is_instantiated(&self, index: usize) -> bool {
        self.state
            .lock()
            .as_ref()
            .map_or(false, |state| state.is_instantiated(index))
    }

    pub(crate) fn service_info(&self, key: &Key) -> ServiceInfo {
        if self.is_disposed() {
            return ServiceInfo::unknown(*key);
        }
        let Some(index) = self.shared.registry.last_index_of(key) else {
            return ServiceInfo::unknown(*key);
        };

        let lifetime = self.shared.registry.get(index).lifetime();
        let is_instantiated = match lifetime {
            Lifetime::Singleton => self.root().is_instantiated(index),
            Lifetime::Scoped => self.is_instantiated(index),
            Lifetime::Transient => false,
        };
        ServiceInfo {
            service_type: *key,
            lifetime: Some(lifetime),
            is_instantiated,
        }
    }

    #[cfg(feature = "diagnostics")]
    pub(crate) fn to_debug_string(&self) -> String {
        use std::fmt::Write;

        let guard = self.state.lock();
        let mut out = String::new();
        let kind = if self.is_root() { "root" } else { "child" };
        let Some(state) = guard.as_ref() else {
            let _ = writeln!(out, "Scope ({kind}, disposed)");
            return out;
        };

        let _ = writeln!(
            out,
            "Scope ({kind}, {} descriptors, {} tracked instances, {} observers)",
            self.shared.registry.len(),
            state.teardown.len(),
            self.shared.observers.len()
        );
        for (index, descriptor) in self.shared.registry.descriptors().iter().enumerate() {
            let marker = if state.is_instantiated(index) { "*" } else { " " };
            let _ = writeln!(out, "  {marker} {descriptor}");
        }
        out
    }

    fn undisposed_instances(&mut self) -> usize {
        self.state.get_mut().as_ref().map_or(0, |state| state.teardown.len())
    }
}

impl ResolverCore for ScopeInner {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.ensure_live()?;
        let index = self
            .shared
            .registry
            .last_index_of(key)
            .ok_or(DiError::ServiceNotFound(key.display_name()))?;
        self.resolve_index(index)
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        self.ensure_live()?;
        self.shared
            .registry
            .indices_of(key)
            .iter()
            .map(|&index| self.resolve_index(index))
            .collect()
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        let undisposed = self.undisposed_instances();
        if undisposed > 0 && self.shared.options.warn_on_undisposed_drop {
            tracing::warn!(
                root = self.is_root(),
                instances = undisposed,
                "scope dropped without dispose(); tracked instances were not released"
            );
        }
    }
}
