//! Per-factory singleton cache
//!
//! Each id maps to a `OnceCell` slot. The first caller to reach an empty
//! slot runs the construction; concurrent callers for the same id block on
//! the slot and receive the same instance. A failed construction leaves the
//! slot empty, so nothing half-built is ever cached and a later call
//! retries.

use crate::value::Instance;
use crate::Result;
use ahash::RandomState;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

type Slot = Arc<OnceCell<Instance>>;

/// Cache of constructed singletons, keyed by bean id.
///
/// Entries live until [`clear`](Self::clear) or until the registry is
/// dropped; there is no eviction.
pub struct SingletonRegistry {
    slots: DashMap<String, Slot, RandomState>,
}

impl SingletonRegistry {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let shard_amount = if capacity <= 16 { 8 } else { 16 };
        Self {
            slots: DashMap::with_capacity_and_hasher_and_shard_amount(
                capacity,
                RandomState::new(),
                shard_amount,
            ),
        }
    }

    /// The cached instance for `id`, if one has been constructed.
    #[inline]
    pub fn get(&self, id: &str) -> Option<Instance> {
        self.slots.get(id).and_then(|slot| slot.get().cloned())
    }

    /// Register an already constructed instance.
    ///
    /// The first registration for an id wins; returns `false` and leaves
    /// the cache untouched when `id` already holds an instance.
    pub fn register(&self, id: &str, instance: Instance) -> bool {
        let registered = self.slot(id).set(instance).is_ok();

        #[cfg(feature = "logging")]
        debug!(
            target: "bean_factory",
            bean = id,
            registered,
            "Registering singleton instance"
        );

        registered
    }

    /// Return the cached instance for `id`, running `create` to build it
    /// if the slot is empty.
    ///
    /// `create` runs at most once per successful construction; callers
    /// arriving while it runs wait for its result.
    pub fn get_or_try_create<F>(&self, id: &str, create: F) -> Result<Instance>
    where
        F: FnOnce() -> Result<Instance>,
    {
        let slot = self.slot(id);

        if let Some(instance) = slot.get() {
            #[cfg(feature = "logging")]
            trace!(target: "bean_factory", bean = id, "Singleton cache hit");
            return Ok(Arc::clone(instance));
        }

        slot.get_or_try_init(create).map(Arc::clone)
    }

    /// Slot for `id`, created empty on first use. The map guard is
    /// released before the slot is returned so construction never holds
    /// a shard lock.
    fn slot(&self, id: &str) -> Slot {
        if let Some(slot) = self.slots.get(id) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.slots.entry(id.to_string()).or_default().value())
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of constructed singletons
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.get().is_some()).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of constructed singletons
    pub fn ids(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|slot| slot.get().is_some())
            .map(|slot| slot.key().clone())
            .collect()
    }

    /// Drop every cached instance.
    pub fn clear(&self) {
        #[cfg(feature = "logging")]
        let count = self.len();

        self.slots.clear();

        #[cfg(feature = "logging")]
        debug!(
            target: "bean_factory",
            singletons_removed = count,
            "Singleton cache cleared"
        );
    }
}

impl Default for SingletonRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SingletonRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonRegistry")
            .field("count", &self.len())
            .finish()
    }
}
