//! Extension cache and configuration handles.
//!
//! # Responsibility
//! - Give each partial configuration a handle identity used as cache scope.
//! - Memoize derived definitions per `(handle, base identity)`.
//!
//! # Invariants
//! - Handle ids are process-unique; clones of a handle share the id and cache.
//! - Two handles never share cache entries, whatever their contents.
//! - One definition at most is built per key; concurrent misses wait for it.
//! - Entries live exactly as long as the last clone of their handle.

use crate::definition::Definition;
use crate::model::identity::DefinitionId;
use crate::model::options::PartialConfig;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id of one configuration handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandleId(u64);

impl HandleId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Shared, immutable handle to one partial configuration.
///
/// The handle carries the cache of definitions derived with it, so dropping
/// every clone releases those definitions.
#[derive(Clone)]
pub struct ConfigHandle {
    id: HandleId,
    config: Arc<PartialConfig>,
    cache: Arc<ExtensionCache>,
}

impl ConfigHandle {
    pub fn new(config: PartialConfig) -> Self {
        Self {
            id: HandleId(NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed)),
            config: Arc::new(config),
            cache: Arc::new(ExtensionCache::new()),
        }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn config(&self) -> &PartialConfig {
        &self.config
    }

    /// Shared reference to the wrapped configuration.
    pub fn shared_config(&self) -> &Arc<PartialConfig> {
        &self.config
    }

    /// Definitions derived with this handle, keyed by base identity.
    pub fn cache(&self) -> &ExtensionCache {
        &self.cache
    }

    /// Returns whether both handles are the same cache scope.
    pub fn same_handle(&self, other: &ConfigHandle) -> bool {
        self.id == other.id
    }
}

impl From<PartialConfig> for ConfigHandle {
    fn from(value: PartialConfig) -> Self {
        Self::new(value)
    }
}

impl Debug for ConfigHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigHandle")
            .field("id", &self.id.0)
            .field("name", &self.config.name)
            .field("cached", &self.cache.len())
            .finish()
    }
}

type Slot = Arc<OnceCell<Arc<Definition>>>;

/// Memoized definitions derived with one handle.
#[derive(Default)]
pub struct ExtensionCache {
    slots: Mutex<HashMap<DefinitionId, Slot>>,
}

impl ExtensionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the definition previously derived from `base`, if built.
    pub fn lookup(&self, base: DefinitionId) -> Option<Arc<Definition>> {
        self.lock().get(&base).and_then(|slot| slot.get().cloned())
    }

    /// Returns the definition for `base`, running `build` on a miss.
    ///
    /// The flag is `true` when this call built the definition. Concurrent
    /// callers for the same base block until the first build finishes and all
    /// receive its result.
    pub fn get_or_build(
        &self,
        base: DefinitionId,
        build: impl FnOnce() -> Arc<Definition>,
    ) -> (Arc<Definition>, bool) {
        let slot = Arc::clone(self.lock().entry(base).or_default());
        let mut built = false;
        let definition = slot.get_or_init(|| {
            built = true;
            build()
        });
        (Arc::clone(definition), built)
    }

    /// Drops the entry for `base`; returns whether one was present.
    pub fn evict(&self, base: DefinitionId) -> bool {
        self.lock()
            .remove(&base)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Drops every entry; returns how many built definitions were released.
    pub fn clear(&self) -> usize {
        let mut slots = self.lock();
        let released = slots.values().filter(|slot| slot.get().is_some()).count();
        slots.clear();
        released
    }

    /// Number of built entries.
    pub fn len(&self) -> usize {
        self.lock().values().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DefinitionId, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for ExtensionCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionCache")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigHandle;
    use crate::model::identity::DefinitionId;
    use crate::model::options::PartialConfig;

    #[test]
    fn equal_contents_get_distinct_handles() {
        let first = ConfigHandle::new(PartialConfig::named("Card"));
        let second = ConfigHandle::new(PartialConfig::named("Card"));
        assert_eq!(first.config(), second.config());
        assert!(!first.same_handle(&second));
    }

    #[test]
    fn clones_share_handle_id() {
        let handle = ConfigHandle::new(PartialConfig::named("Card"));
        let clone = handle.clone();
        assert!(handle.same_handle(&clone));
        assert_eq!(handle.id(), clone.id());
        assert!(std::ptr::eq(handle.cache(), clone.cache()));
    }

    #[test]
    fn fresh_cache_is_empty() {
        let handle = ConfigHandle::new(PartialConfig::new());
        assert!(handle.cache().is_empty());
        assert!(handle.cache().lookup(DefinitionId::ROOT).is_none());
        assert!(!handle.cache().evict(DefinitionId::ROOT));
        assert_eq!(handle.cache().clear(), 0);
    }
}
