//! Reference-counted resource handles.
//!
//! A [`ResourceHandle`] points at a named cache entry. All handles for the
//! same id share one entry; the entry lives as long as any handle or the
//! cache holds it. Reading content goes through [`ResourceHandle::acquire`],
//! which snapshots the content and its change counter together.

use std::sync::{Arc, PoisonError, RwLock};

use crate::hash::fnv1a_32;

/// A kind of resource that can be cached and handed out.
pub trait Resource: Send + Sync + 'static {
    /// Kind name carried by change events (e.g. `"CollisionMesh"`).
    const KIND: &'static str;
}

/// Load progress of a resource entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Requested, content not present yet (or unloaded again).
    Pending,
    /// Content is available.
    Loaded,
    /// The content will never become available.
    Missing,
}

#[derive(Debug)]
pub(crate) struct EntryState<R> {
    pub(crate) load_state: LoadState,
    pub(crate) content: Option<Arc<R>>,
    pub(crate) change_counter: u32,
    pub(crate) ever_loaded: bool,
}

/// One named slot of a resource cache.
#[derive(Debug)]
pub(crate) struct ResourceEntry<R> {
    id: String,
    id_hash: u32,
    pub(crate) state: RwLock<EntryState<R>>,
}

impl<R> ResourceEntry<R> {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            id_hash: fnv1a_32(id.as_bytes()),
            state: RwLock::new(EntryState {
                load_state: LoadState::Pending,
                content: None,
                change_counter: 0,
                ever_loaded: false,
            }),
        }
    }

    pub(crate) fn read_state(&self) -> std::sync::RwLockReadGuard<'_, EntryState<R>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, EntryState<R>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A shared, possibly invalid handle to a resource of kind `R`.
pub struct ResourceHandle<R: Resource> {
    entry: Option<Arc<ResourceEntry<R>>>,
}

impl<R: Resource> ResourceHandle<R> {
    pub(crate) fn from_entry(entry: Arc<ResourceEntry<R>>) -> Self {
        Self { entry: Some(entry) }
    }

    /// A handle that refers to nothing.
    #[must_use]
    pub fn invalid() -> Self {
        Self { entry: None }
    }

    /// Returns `true` if the handle refers to a cache entry.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.entry.is_some()
    }

    /// Drop the reference, leaving an invalid handle.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// The resource id, if valid.
    #[must_use]
    pub fn resource_id(&self) -> Option<&str> {
        self.entry.as_deref().map(|e| e.id.as_str())
    }

    /// FNV-1a hash of the resource id, or `0` for an invalid handle.
    #[must_use]
    pub fn id_hash(&self) -> u32 {
        self.entry.as_deref().map_or(0, |e| e.id_hash)
    }

    /// Current load state, if valid.
    #[must_use]
    pub fn load_state(&self) -> Option<LoadState> {
        self.entry.as_deref().map(|e| e.read_state().load_state)
    }

    /// Number of live references to the entry, the cache's own included.
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.entry.as_ref().map_or(0, Arc::strong_count)
    }

    /// Snapshot the content together with its change counter.
    ///
    /// Returns `None` for an invalid handle. A pending or missing resource
    /// yields a lock whose [`ResourceLock::is_missing`] is `true`.
    #[must_use]
    pub fn acquire(&self) -> Option<ResourceLock<R>> {
        let entry = self.entry.as_deref()?;
        let state = entry.read_state();
        Some(ResourceLock {
            resource_id: entry.id.clone(),
            content: match state.load_state {
                LoadState::Loaded => state.content.clone(),
                LoadState::Pending | LoadState::Missing => None,
            },
            change_counter: state.change_counter,
        })
    }
}

impl<R: Resource> Clone for ResourceHandle<R> {
    fn clone(&self) -> Self {
        Self {
            entry: self.entry.clone(),
        }
    }
}

impl<R: Resource> Default for ResourceHandle<R> {
    fn default() -> Self {
        Self::invalid()
    }
}

impl<R: Resource> PartialEq for ResourceHandle<R> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.entry, &other.entry) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<R: Resource> Eq for ResourceHandle<R> {}

impl<R: Resource> std::fmt::Debug for ResourceHandle<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.resource_id() {
            Some(id) => write!(f, "ResourceHandle<{}>({id})", R::KIND),
            None => write!(f, "ResourceHandle<{}>(invalid)", R::KIND),
        }
    }
}

/// A consistent snapshot of a resource's content.
#[derive(Debug)]
pub struct ResourceLock<R> {
    resource_id: String,
    content: Option<Arc<R>>,
    change_counter: u32,
}

impl<R> ResourceLock<R> {
    /// The resource id.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Returns `true` if content is not available (pending or missing).
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.content.is_none()
    }

    /// The content, if available.
    #[must_use]
    pub fn get(&self) -> Option<&R> {
        self.content.as_deref()
    }

    /// The change counter at snapshot time.
    #[must_use]
    pub fn change_counter(&self) -> u32 {
        self.change_counter
    }
}
