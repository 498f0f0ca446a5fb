//! Frozen descriptor storage with a per-key index.

use crate::descriptors::ServiceDescriptor;
use crate::key::Key;

#[cfg(feature = "ahash")]
pub(crate) type KeyMap<V> = ahash::AHashMap<Key, V>;
#[cfg(not(feature = "ahash"))]
pub(crate) type KeyMap<V> = std::collections::HashMap<Key, V>;

/// Descriptors in registration order, indexed by service key.
///
/// A descriptor's position doubles as its identity: scopes allocate one
/// cache slot per position.
pub(crate) struct Registry {
    descriptors: Box<[ServiceDescriptor]>,
    index: KeyMap<Vec<usize>>,
}

impl Registry {
    pub(crate) fn new(descriptors: Vec<ServiceDescriptor>) -> Self {
        let mut index: KeyMap<Vec<usize>> = KeyMap::default();
        for (position, descriptor) in descriptors.iter().enumerate() {
            index.entry(descriptor.service_type()).or_default().push(position);
        }
        Self {
            descriptors: descriptors.into_boxed_slice(),
            index,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    pub(crate) fn get(&self, position: usize) -> &ServiceDescriptor {
        &self.descriptors[position]
    }

    pub(crate) fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    /// Position of the registration that singular resolution uses.
    #[inline]
    pub(crate) fn last_index_of(&self, key: &Key) -> Option<usize> {
        self.index.get(key).and_then(|positions| positions.last().copied())
    }

    /// Every position registered for `key`, in registration order.
    #[inline]
    pub(crate) fn indices_of(&self, key: &Key) -> &[usize] {
        self.index.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}
