//! Named cache of one resource kind.
//!
//! Every id maps to a single shared entry, so two requests for the same id
//! always see the same content. Storing content under an id advances its
//! change counter (after the first load) and publishes
//! [`ResourceEventKind::ContentUpdated`]; unloading publishes
//! [`ResourceEventKind::ContentUnloading`] before the content goes away.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::events::{ResourceEvent, ResourceEventKind, ResourceEvents};
use crate::handle::{LoadState, Resource, ResourceEntry, ResourceHandle};

/// Cache of resources of kind `R`, keyed by id.
pub struct ResourceCache<R: Resource> {
    entries: DashMap<String, Arc<ResourceEntry<R>>>,
    events: ResourceEvents,
}

impl<R: Resource> ResourceCache<R> {
    /// Create an empty cache publishing on `events`.
    #[must_use]
    pub fn new(events: ResourceEvents) -> Self {
        Self {
            entries: DashMap::new(),
            events,
        }
    }

    fn entry(&self, id: &str) -> Arc<ResourceEntry<R>> {
        if let Some(existing) = self.entries.get(id) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .entries
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(ResourceEntry::new(id)));
        Arc::clone(entry.value())
    }

    /// Handle to `id`, creating a pending entry if none exists.
    ///
    /// The content may not be available yet; check
    /// [`ResourceLock::is_missing`](crate::ResourceLock::is_missing).
    #[must_use]
    pub fn load(&self, id: &str) -> ResourceHandle<R> {
        ResourceHandle::from_entry(self.entry(id))
    }

    /// Handle to `id` only if its content is loaded.
    #[must_use]
    pub fn get_existing(&self, id: &str) -> Option<ResourceHandle<R>> {
        let entry = Arc::clone(self.entries.get(id)?.value());
        let loaded = entry.read_state().load_state == LoadState::Loaded;
        loaded.then(|| ResourceHandle::from_entry(entry))
    }

    /// Register `content` under `id`, typically for a derived artifact.
    pub fn create(&self, id: &str, content: R, description: &str) -> ResourceHandle<R> {
        debug!(kind = R::KIND, id, description, "creating resource");
        self.store(id, content)
    }

    /// Replace the content of `id`, e.g. after a reload from disk.
    pub fn update_content(&self, id: &str, content: R) -> ResourceHandle<R> {
        self.store(id, content)
    }

    fn store(&self, id: &str, content: R) -> ResourceHandle<R> {
        let entry = self.entry(id);
        let change_counter = {
            let mut state = entry.write_state();
            if state.ever_loaded {
                state.change_counter = state.change_counter.wrapping_add(1);
            }
            state.ever_loaded = true;
            state.load_state = LoadState::Loaded;
            state.content = Some(Arc::new(content));
            state.change_counter
        };

        debug!(kind = R::KIND, id, change_counter, "resource content stored");
        self.publish(ResourceEventKind::ContentUpdated, id);
        ResourceHandle::from_entry(entry)
    }

    /// Unload the content of `id`, leaving the entry pending.
    ///
    /// Returns `false` if nothing was loaded under `id`.
    pub fn unload(&self, id: &str) -> bool {
        let Some(entry) = self.entries.get(id).map(|e| Arc::clone(e.value())) else {
            return false;
        };
        if entry.read_state().load_state != LoadState::Loaded {
            return false;
        }

        self.publish(ResourceEventKind::ContentUnloading, id);

        let mut state = entry.write_state();
        state.load_state = LoadState::Pending;
        state.content = None;
        debug!(kind = R::KIND, id, "resource content unloaded");
        true
    }

    /// Mark `id` as permanently missing.
    pub fn mark_missing(&self, id: &str) {
        let entry = self.entry(id);
        let mut state = entry.write_state();
        state.load_state = LoadState::Missing;
        state.content = None;
    }

    /// Evict entries no handle refers to anymore. Returns how many were
    /// evicted.
    pub fn collect_unreferenced(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| Arc::strong_count(entry) > 1);
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            debug!(kind = R::KIND, evicted, "evicted unreferenced resources");
        }
        evicted
    }

    /// Returns `true` if an entry exists for `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of entries, pending ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn publish(&self, kind: ResourceEventKind, id: &str) {
        self.events.publish(&ResourceEvent {
            kind,
            resource_kind: R::KIND,
            resource_id: id.to_string(),
        });
    }
}

impl<R: Resource> std::fmt::Debug for ResourceCache<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("kind", &R::KIND)
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Text(String);
    impl Resource for Text {
        const KIND: &'static str = "Text";
    }

    fn cache() -> ResourceCache<Text> {
        ResourceCache::new(ResourceEvents::new())
    }

    #[test]
    fn test_load_returns_pending_handle() {
        let cache = cache();
        let h = cache.load("a");
        assert!(h.is_valid());
        assert!(h.acquire().unwrap().is_missing());
        assert!(cache.get_existing("a").is_none());
    }

    #[test]
    fn test_same_id_same_entry() {
        let cache = cache();
        let a = cache.load("a");
        let b = cache.load("a");
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_update_makes_content_visible_to_existing_handles() {
        let cache = cache();
        let early = cache.load("a");
        cache.update_content("a", Text("v1".into()));
        let lock = early.acquire().unwrap();
        assert_eq!(lock.get(), Some(&Text("v1".into())));
        assert_eq!(lock.change_counter(), 0);
        assert_eq!(cache.get_existing("a"), Some(early));
    }

    #[test]
    fn test_change_counter_advances_after_first_load() {
        let cache = cache();
        let h = cache.update_content("a", Text("v1".into()));
        cache.update_content("a", Text("v2".into()));
        assert_eq!(h.acquire().unwrap().change_counter(), 1);

        assert!(cache.unload("a"));
        cache.update_content("a", Text("v3".into()));
        assert_eq!(h.acquire().unwrap().change_counter(), 2);
    }

    #[test]
    fn test_events_are_published() {
        let events = ResourceEvents::new();
        let cache = ResourceCache::<Text>::new(events.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let _sub = events.subscribe(move |e| log.lock().unwrap().push(e.kind));

        cache.update_content("a", Text("v1".into()));
        cache.unload("a");
        assert!(!cache.unload("a"), "second unload has nothing to do");

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ResourceEventKind::ContentUpdated,
                ResourceEventKind::ContentUnloading
            ]
        );
    }

    #[test]
    fn test_unloading_event_sees_content_still_present() {
        let events = ResourceEvents::new();
        let cache = Arc::new(ResourceCache::<Text>::new(events.clone()));
        let h = cache.update_content("a", Text("v1".into()));
        let observed = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&observed);
        let probe = h.clone();
        let _sub = events.subscribe(move |e| {
            if e.kind == ResourceEventKind::ContentUnloading {
                *slot.lock().unwrap() = Some(!probe.acquire().unwrap().is_missing());
            }
        });

        cache.unload("a");
        assert_eq!(*observed.lock().unwrap(), Some(true));
        assert!(h.acquire().unwrap().is_missing());
    }

    #[test]
    fn test_missing_state() {
        let cache = cache();
        cache.mark_missing("gone");
        let h = cache.load("gone");
        assert_eq!(h.load_state(), Some(LoadState::Missing));
        assert!(h.acquire().unwrap().is_missing());
    }

    #[test]
    fn test_collect_unreferenced() {
        let cache = cache();
        let kept = cache.create("kept", Text("k".into()), "test");
        let _ = cache.create("dropped", Text("d".into()), "test");
        assert_eq!(cache.collect_unreferenced(), 1);
        assert!(cache.contains("kept"));
        assert!(!cache.contains("dropped"));
        drop(kept);
        assert_eq!(cache.collect_unreferenced(), 1);
        assert!(cache.is_empty());
    }
}
