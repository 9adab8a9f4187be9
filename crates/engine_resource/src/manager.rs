//! Per-process collection of resource caches sharing one event channel.

use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;

use crate::cache::ResourceCache;
use crate::events::ResourceEvents;
use crate::handle::Resource;

trait ErasedCache: Any + Send + Sync {
    fn collect_unreferenced(&self) -> usize;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<R: Resource> ErasedCache for ResourceCache<R> {
    fn collect_unreferenced(&self) -> usize {
        ResourceCache::collect_unreferenced(self)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Owns one [`ResourceCache`] per resource kind and the event channel they
/// all publish on.
pub struct ResourceManager {
    events: ResourceEvents,
    caches: DashMap<TypeId, Arc<dyn ErasedCache>>,
}

impl ResourceManager {
    /// Create a manager with no caches yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: ResourceEvents::new(),
            caches: DashMap::new(),
        }
    }

    /// The shared change-event channel.
    #[must_use]
    pub fn events(&self) -> &ResourceEvents {
        &self.events
    }

    /// The cache for kind `R`, created on first use.
    #[must_use]
    pub fn cache<R: Resource>(&self) -> Arc<ResourceCache<R>> {
        let erased = {
            let entry = self.caches.entry(TypeId::of::<R>()).or_insert_with(|| {
                Arc::new(ResourceCache::<R>::new(self.events.clone())) as Arc<dyn ErasedCache>
            });
            Arc::clone(entry.value())
        };
        // Entries are keyed by `TypeId::of::<R>()`, so the downcast always succeeds.
        erased
            .into_any()
            .downcast::<ResourceCache<R>>()
            .unwrap_or_else(|_| Arc::new(ResourceCache::new(self.events.clone())))
    }

    /// Evict unreferenced entries from every cache. Returns the total
    /// evicted.
    pub fn collect_unreferenced(&self) -> usize {
        let caches: Vec<Arc<dyn ErasedCache>> =
            self.caches.iter().map(|c| Arc::clone(c.value())).collect();
        caches.iter().map(|c| c.collect_unreferenced()).sum()
    }
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("caches", &self.caches.len())
            .field("events", &self.events)
            .finish()
    }
}
