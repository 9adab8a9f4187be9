//! Generic per-type component manager.
//!
//! A [`ComponentManager`] is the allocation authority for all components of
//! one type in one world. Besides storage it keeps the pending-update queue:
//! components ask to be revisited, and the manager's update function drains
//! the queue once per tick in FIFO order.
//!
//! ## Threading
//!
//! Storage is only touched from the world's update thread. The pending
//! queue and the resource-holder index live in a [`ManagerShared`] behind a
//! mutex because resource events can arrive on any thread. The same mutex
//! serialises event delivery against teardown: once
//! [`ComponentManager::release_resource_events`] returns, no handler for
//! this manager is running or will run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use engine_component::{
    Component, ComponentBase, ComponentContext, ComponentError, ComponentHandle, ComponentStorage,
    ComponentTypeId, LifecycleState, ObjectId,
};
use engine_resource::{ResourceEvents, Subscription};
use tracing::{debug, trace};

#[derive(Debug)]
struct ComponentSlot<T> {
    base: ComponentBase,
    component: T,
}

/// State shared between the update thread and resource event handlers.
#[derive(Debug)]
pub struct ManagerShared {
    pending: Vec<ComponentHandle>,
    resource_refs: HashMap<ComponentHandle, String>,
    accepting_events: bool,
}

impl ManagerShared {
    fn new() -> Self {
        Self {
            pending: Vec::new(),
            resource_refs: HashMap::new(),
            accepting_events: true,
        }
    }

    /// Re-enqueue every component recorded as holding `resource_id`.
    /// Returns how many were enqueued.
    pub fn enqueue_holders(&mut self, resource_id: &str) -> usize {
        let mut holders: Vec<ComponentHandle> = self
            .resource_refs
            .iter()
            .filter(|(_, id)| id.as_str() == resource_id)
            .map(|(handle, _)| *handle)
            .collect();
        holders.sort();
        let count = holders.len();
        self.pending.extend(holders);
        count
    }
}

/// Outcome counters of one queue drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    /// Handles whose component was visited.
    pub processed: usize,
    /// Handles that no longer resolved.
    pub skipped_stale: usize,
    /// Handles whose component was inactive.
    pub skipped_inactive: usize,
}

/// Storage, lifecycle driver and pending-update queue for components of
/// type `T`.
#[derive(Debug)]
pub struct ComponentManager<T: Component> {
    storage: ComponentStorage<ComponentSlot<T>>,
    shared: Arc<Mutex<ManagerShared>>,
    uninitialized: Vec<ComponentHandle>,
}

impl<T: Component> ComponentManager<T> {
    /// Create an empty manager for the registered type `type_id`.
    #[must_use]
    pub fn new(type_id: ComponentTypeId) -> Self {
        Self {
            storage: ComponentStorage::new(type_id),
            shared: Arc::new(Mutex::new(ManagerShared::new())),
            uninitialized: Vec::new(),
        }
    }

    /// The managed component type.
    #[must_use]
    pub fn type_id(&self) -> ComponentTypeId {
        self.storage.type_id()
    }

    fn lock_shared(&self) -> MutexGuard<'_, ManagerShared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_hook(
        &mut self,
        handle: ComponentHandle,
        to: LifecycleState,
        hook: fn(&mut T, &mut ComponentContext),
    ) -> Result<(), ComponentError> {
        let slot = self
            .storage
            .get_mut(handle)
            .ok_or(ComponentError::StaleHandle(handle))?;
        slot.base.advance(to)?;

        let mut ctx = ComponentContext::new(handle, slot.base.owner());
        hook(&mut slot.component, &mut ctx);
        if ctx.update_requested() && to != LifecycleState::Detached {
            self.enqueue_update(handle);
        }
        Ok(())
    }

    /// Allocate `component`, attach it to `owner` and run
    /// [`Component::on_after_attached_to_object`].
    ///
    /// The component stays in [`LifecycleState::Attached`] until
    /// [`ComponentManager::initialize_pending`] runs.
    ///
    /// # Errors
    ///
    /// Propagates lifecycle errors; none occur for a fresh component.
    pub fn create_component(
        &mut self,
        owner: ObjectId,
        component: T,
    ) -> Result<ComponentHandle, ComponentError> {
        let handle = self.storage.insert_with(|handle| ComponentSlot {
            base: ComponentBase::new(handle, owner),
            component,
        });
        self.run_hook(
            handle,
            LifecycleState::Attached,
            T::on_after_attached_to_object,
        )?;
        self.uninitialized.push(handle);

        trace!(component = T::type_name(), %handle, %owner, "component attached");
        Ok(handle)
    }

    /// Run [`Component::initialize`] on one attached component.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::StaleHandle`] or
    /// [`ComponentError::IllegalTransition`] if it is not attached.
    pub fn initialize_component(&mut self, handle: ComponentHandle) -> Result<(), ComponentError> {
        self.run_hook(handle, LifecycleState::Initialized, T::initialize)
    }

    /// Initialise every component attached since the last call. Returns how
    /// many were initialised.
    pub fn initialize_pending(&mut self) -> usize {
        let handles = std::mem::take(&mut self.uninitialized);
        let mut count = 0;
        for handle in handles {
            let attached = self
                .storage
                .get(handle)
                .is_some_and(|slot| slot.base.state() == LifecycleState::Attached);
            if attached && self.initialize_component(handle).is_ok() {
                count += 1;
            }
        }
        count
    }

    /// Deinitialise (if needed), detach and free a component.
    ///
    /// Queued updates for the handle stay in the queue and are skipped when
    /// drained.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::StaleHandle`] if the handle does not
    /// resolve.
    pub fn delete_component(&mut self, handle: ComponentHandle) -> Result<T, ComponentError> {
        let initialized = self
            .storage
            .get(handle)
            .ok_or(ComponentError::StaleHandle(handle))?
            .base
            .is_initialized();

        if initialized {
            self.run_hook(handle, LifecycleState::Deinitialized, T::deinitialize)?;
        }
        self.run_hook(
            handle,
            LifecycleState::Detached,
            T::on_before_detached_from_object,
        )?;

        self.lock_shared().resource_refs.remove(&handle);
        let slot = self
            .storage
            .remove(handle)
            .ok_or(ComponentError::StaleHandle(handle))?;

        trace!(component = T::type_name(), %handle, "component deleted");
        Ok(slot.component)
    }

    /// Resolve a handle. Fails on stale or foreign handles.
    #[must_use]
    pub fn try_get_component(&self, handle: ComponentHandle) -> Option<&T> {
        self.storage.get(handle).map(|slot| &slot.component)
    }

    /// Resolve a handle mutably.
    #[must_use]
    pub fn try_get_component_mut(&mut self, handle: ComponentHandle) -> Option<&mut T> {
        self.storage.get_mut(handle).map(|slot| &mut slot.component)
    }

    /// The base state of a component.
    #[must_use]
    pub fn base(&self, handle: ComponentHandle) -> Option<&ComponentBase> {
        self.storage.get(handle).map(|slot| &slot.base)
    }

    /// Set or clear a component's active flag. Returns `true` if the flag
    /// changed.
    pub fn set_active(&mut self, handle: ComponentHandle, active: bool) -> bool {
        let Some(slot) = self.storage.get_mut(handle) else {
            return false;
        };
        let changed = slot.base.is_active() != active;
        slot.base.set_active(active);
        changed
    }

    /// Append `handle` to the pending queue. Duplicates are kept.
    pub fn enqueue_update(&self, handle: ComponentHandle) {
        self.lock_shared().pending.push(handle);
    }

    /// Remove and return the pending queue, oldest first.
    #[must_use]
    pub fn take_pending(&self) -> Vec<ComponentHandle> {
        std::mem::take(&mut self.lock_shared().pending)
    }

    /// A copy of the pending queue, oldest first.
    #[must_use]
    pub fn pending(&self) -> Vec<ComponentHandle> {
        self.lock_shared().pending.clone()
    }

    /// Number of queued handles, duplicates included.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.lock_shared().pending.len()
    }

    /// Drain the queue in FIFO order and call `visit` on every live, active
    /// component. The queue is empty afterwards whatever `visit` does.
    pub fn drain_pending<F>(&mut self, mut visit: F) -> DrainStats
    where
        F: FnMut(ComponentHandle, &ComponentBase, &mut T),
    {
        let mut stats = DrainStats::default();
        for handle in self.take_pending() {
            let Some(slot) = self.storage.get_mut(handle) else {
                trace!(component = T::type_name(), %handle, "skipping stale queued handle");
                stats.skipped_stale += 1;
                continue;
            };
            if !slot.base.is_active() {
                stats.skipped_inactive += 1;
                continue;
            }
            visit(handle, &slot.base, &mut slot.component);
            stats.processed += 1;
        }
        stats
    }

    /// Record which resource a component holds, for event-driven
    /// re-enqueueing. `None` clears the record.
    pub fn track_resource(&self, handle: ComponentHandle, resource_id: Option<&str>) {
        let mut shared = self.lock_shared();
        match resource_id {
            Some(id) if self.storage.contains(handle) => {
                shared.resource_refs.insert(handle, id.to_string());
            }
            _ => {
                shared.resource_refs.remove(&handle);
            }
        }
    }

    /// The resource id recorded for a component.
    #[must_use]
    pub fn tracked_resource(&self, handle: ComponentHandle) -> Option<String> {
        self.lock_shared().resource_refs.get(&handle).cloned()
    }

    /// Subscribe to `events` so that an update or unload of a resource of
    /// `resource_kind` re-enqueues every component holding it.
    #[must_use = "dropping the subscription stops event delivery"]
    pub fn subscribe_resource_events(
        &self,
        events: &ResourceEvents,
        resource_kind: &'static str,
    ) -> Subscription {
        let shared = Arc::clone(&self.shared);
        {
            self.lock_shared().accepting_events = true;
        }
        let component = T::type_name();
        debug!(component, resource_kind, "subscribing to resource events");

        events.subscribe(move |event| {
            if event.resource_kind != resource_kind {
                return;
            }
            let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
            if !shared.accepting_events {
                return;
            }
            let enqueued = shared.enqueue_holders(&event.resource_id);
            if enqueued > 0 {
                debug!(
                    component,
                    resource_id = %event.resource_id,
                    kind = ?event.kind,
                    enqueued,
                    "resource changed, re-enqueued holders"
                );
            }
        })
    }

    /// Stop event delivery and drop the subscription while holding the
    /// shared lock, so no handler runs concurrently with teardown.
    pub fn release_resource_events(&self, subscription: &mut Option<Subscription>) {
        let mut shared = self.lock_shared();
        shared.accepting_events = false;
        if let Some(subscription) = subscription.take() {
            drop(subscription);
            debug!(component = T::type_name(), "resource event subscription released");
        }
    }

    /// Iterate over live components in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentHandle, &ComponentBase, &T)> {
        self.storage
            .iter()
            .map(|(handle, slot)| (handle, &slot.base, &slot.component))
    }

    /// Number of live components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns `true` if the manager owns no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use engine_resource::{ResourceEvent, ResourceEventKind};

    use super::*;

    #[derive(Debug, Default)]
    struct Probe {
        hooks: Vec<&'static str>,
        wants_update_on_init: bool,
        visits: usize,
    }

    impl Component for Probe {
        fn type_name() -> &'static str {
            "Probe"
        }

        fn initialize(&mut self, ctx: &mut ComponentContext) {
            self.hooks.push("initialize");
            if self.wants_update_on_init {
                ctx.request_update();
            }
        }

        fn deinitialize(&mut self, _ctx: &mut ComponentContext) {
            self.hooks.push("deinitialize");
        }

        fn on_after_attached_to_object(&mut self, _ctx: &mut ComponentContext) {
            self.hooks.push("attached");
        }

        fn on_before_detached_from_object(&mut self, _ctx: &mut ComponentContext) {
            self.hooks.push("detached");
        }
    }

    const TYPE: ComponentTypeId = ComponentTypeId(1);
    const OWNER: ObjectId = ObjectId(1);

    fn manager() -> ComponentManager<Probe> {
        ComponentManager::new(TYPE)
    }

    fn updated(id: &str) -> ResourceEvent {
        ResourceEvent {
            kind: ResourceEventKind::ContentUpdated,
            resource_kind: "CollisionMesh",
            resource_id: id.to_string(),
        }
    }

    #[test]
    fn test_hooks_run_in_lifecycle_order() {
        let mut m = manager();
        let h = m.create_component(OWNER, Probe::default()).unwrap();
        assert_eq!(m.base(h).unwrap().state(), LifecycleState::Attached);
        assert_eq!(m.initialize_pending(), 1);
        assert_eq!(m.base(h).unwrap().state(), LifecycleState::Initialized);

        let probe = m.delete_component(h).unwrap();
        assert_eq!(
            probe.hooks,
            vec!["attached", "initialize", "deinitialize", "detached"]
        );
        assert!(m.is_empty());
    }

    #[test]
    fn test_delete_before_initialize_skips_deinitialize() {
        let mut m = manager();
        let h = m.create_component(OWNER, Probe::default()).unwrap();
        let probe = m.delete_component(h).unwrap();
        assert_eq!(probe.hooks, vec!["attached", "detached"]);
        assert_eq!(m.initialize_pending(), 0);
    }

    #[test]
    fn test_initialize_twice_fails() {
        let mut m = manager();
        let h = m.create_component(OWNER, Probe::default()).unwrap();
        m.initialize_component(h).unwrap();
        assert!(matches!(
            m.initialize_component(h),
            Err(ComponentError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_stale_handle_lookup_leaves_state_unchanged() {
        let mut m = manager();
        let stale = m.create_component(OWNER, Probe::default()).unwrap();
        m.delete_component(stale).unwrap();
        let live = m.create_component(OWNER, Probe::default()).unwrap();
        m.enqueue_update(live);

        assert!(m.try_get_component(stale).is_none());
        assert!(m.try_get_component_mut(stale).is_none());
        assert!(!m.set_active(stale, false));
        assert!(matches!(
            m.delete_component(stale),
            Err(ComponentError::StaleHandle(_))
        ));

        assert_eq!(m.len(), 1);
        assert_eq!(m.pending(), vec![live]);
        assert!(m.base(live).unwrap().is_active());
    }

    #[test]
    fn test_initialize_request_enqueues() {
        let mut m = manager();
        let h = m
            .create_component(
                OWNER,
                Probe {
                    wants_update_on_init: true,
                    ..Probe::default()
                },
            )
            .unwrap();
        assert_eq!(m.pending_len(), 0);
        m.initialize_pending();
        assert_eq!(m.pending(), vec![h]);
    }

    #[test]
    fn test_drain_is_fifo_and_clears_queue() {
        let mut m = manager();
        let a = m.create_component(OWNER, Probe::default()).unwrap();
        let b = m.create_component(OWNER, Probe::default()).unwrap();
        m.enqueue_update(b);
        m.enqueue_update(a);

        let mut order = Vec::new();
        let stats = m.drain_pending(|h, _, _| order.push(h));
        assert_eq!(order, vec![b, a]);
        assert_eq!(stats.processed, 2);
        assert_eq!(m.pending_len(), 0);
    }

    #[test]
    fn test_duplicate_enqueue_visits_twice() {
        let mut m = manager();
        let x = m.create_component(OWNER, Probe::default()).unwrap();
        m.enqueue_update(x);
        m.enqueue_update(x);
        let stats = m.drain_pending(|_, _, probe| probe.visits += 1);
        assert_eq!(stats.processed, 2);
        assert_eq!(m.try_get_component(x).unwrap().visits, 2);
        assert_eq!(m.pending_len(), 0);
    }

    #[test]
    fn test_drain_skips_stale_and_inactive() {
        let mut m = manager();
        let removed = m.create_component(OWNER, Probe::default()).unwrap();
        let inactive = m.create_component(OWNER, Probe::default()).unwrap();
        let live = m.create_component(OWNER, Probe::default()).unwrap();
        m.enqueue_update(removed);
        m.enqueue_update(inactive);
        m.enqueue_update(live);
        m.delete_component(removed).unwrap();
        assert!(m.set_active(inactive, false));

        let mut visited = Vec::new();
        let stats = m.drain_pending(|h, _, _| visited.push(h));
        assert_eq!(visited, vec![live]);
        assert_eq!(
            stats,
            DrainStats {
                processed: 1,
                skipped_stale: 1,
                skipped_inactive: 1
            }
        );
        assert_eq!(m.pending_len(), 0);
    }

    #[test]
    fn test_event_reenqueues_only_holders() {
        let mut m = manager();
        let x = m.create_component(OWNER, Probe::default()).unwrap();
        let y = m.create_component(OWNER, Probe::default()).unwrap();
        let z = m.create_component(OWNER, Probe::default()).unwrap();
        m.track_resource(x, Some("rock.colmesh"));
        m.track_resource(y, Some("rock.colmesh"));
        m.track_resource(z, Some("tree.colmesh"));

        let events = ResourceEvents::new();
        let _sub = m.subscribe_resource_events(&events, "CollisionMesh");
        events.publish(&updated("rock.colmesh"));

        let pending = m.pending();
        assert!(pending.contains(&x));
        assert!(pending.contains(&y));
        assert!(!pending.contains(&z));
    }

    #[test]
    fn test_event_of_other_kind_is_ignored() {
        let mut m = manager();
        let x = m.create_component(OWNER, Probe::default()).unwrap();
        m.track_resource(x, Some("rock"));
        let events = ResourceEvents::new();
        let _sub = m.subscribe_resource_events(&events, "CollisionMesh");
        events.publish(&ResourceEvent {
            resource_kind: "Texture",
            ..updated("rock")
        });
        assert_eq!(m.pending_len(), 0);
    }

    #[test]
    fn test_deleted_component_is_no_longer_tracked() {
        let mut m = manager();
        let x = m.create_component(OWNER, Probe::default()).unwrap();
        m.track_resource(x, Some("rock"));
        m.delete_component(x).unwrap();
        assert!(m.tracked_resource(x).is_none());
        m.track_resource(x, Some("rock"));
        assert!(m.tracked_resource(x).is_none(), "stale handles are not tracked");
    }

    #[test]
    fn test_release_stops_delivery() {
        let mut m = manager();
        let x = m.create_component(OWNER, Probe::default()).unwrap();
        m.track_resource(x, Some("rock"));
        let events = ResourceEvents::new();
        let mut sub = Some(m.subscribe_resource_events(&events, "CollisionMesh"));

        m.release_resource_events(&mut sub);
        assert!(sub.is_none());
        assert_eq!(events.handler_count(), 0);
        events.publish(&updated("rock"));
        assert_eq!(m.pending_len(), 0);
    }

    #[test]
    fn test_teardown_while_events_in_flight() {
        let mut m = manager();
        for _ in 0..16 {
            let h = m.create_component(OWNER, Probe::default()).unwrap();
            m.track_resource(h, Some("rock"));
        }
        let events = ResourceEvents::new();
        let mut sub = Some(m.subscribe_resource_events(&events, "CollisionMesh"));
        let published = Arc::new(AtomicUsize::new(0));

        let publisher = {
            let events = events.clone();
            let published = Arc::clone(&published);
            std::thread::spawn(move || {
                for _ in 0..2_000 {
                    events.publish(&updated("rock"));
                    published.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        while published.load(Ordering::SeqCst) < 100 {
            std::thread::yield_now();
        }
        m.release_resource_events(&mut sub);
        let after_release = m.pending_len();
        drop(m);

        publisher.join().unwrap();
        assert_eq!(events.handler_count(), 0);
        assert!(after_release >= 16 * 100);
    }
}
