//! The world: objects, their components' managers, and the tick.
//!
//! A [`World`] owns one [`ComponentManagerModule`] per component type and
//! drives them through the [`UpdateScheduler`]. Each tick:
//!
//! 1. Components attached since the last tick are initialised.
//! 2. Every phase in [`UpdatePhase::ALL`] runs its update functions in
//!    registration order. The module being updated is taken out of the
//!    world for the call, so it gets exclusive access to itself and read
//!    access to everything else.
//! 3. Objects whose bounds were invalidated during a phase get their local
//!    bounds recomputed when the phase ends.
//! 4. Every `gc_interval_ticks`, unreferenced cached resources are evicted.

use std::collections::HashMap;
use std::sync::Arc;

use engine_component::{ComponentHandle, ComponentTypeId, ObjectId, OwnerObject, TypeRegistry};
use engine_math::Transform3D;
use engine_resource::ResourceManager;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::config::WorldConfig;
use crate::context::UpdateContext;
use crate::error::WorldError;
use crate::module::{ComponentManagerModule, ModuleInit, ModuleView, WorldModule};
use crate::object::{GameObject, ObjectTable};
use crate::scheduler::{UpdatePhase, UpdateScheduler};

/// One simulation world.
pub struct World {
    id: Uuid,
    config: WorldConfig,
    registry: Arc<TypeRegistry>,
    resources: Arc<ResourceManager>,
    modules: Vec<Option<Box<dyn WorldModule>>>,
    module_by_type: HashMap<ComponentTypeId, usize>,
    scheduler: UpdateScheduler,
    objects: ObjectTable,
    tick_id: u64,
    shut_down: bool,
}

impl World {
    /// Create an empty world sharing `registry` and `resources` with the
    /// rest of the process.
    #[must_use]
    pub fn new(
        config: WorldConfig,
        registry: Arc<TypeRegistry>,
        resources: Arc<ResourceManager>,
    ) -> Self {
        let id = Uuid::new_v4();
        info!(world = %config.name, %id, "world created");
        Self {
            id,
            config,
            registry,
            resources,
            modules: Vec::new(),
            module_by_type: HashMap::new(),
            scheduler: UpdateScheduler::new(),
            objects: ObjectTable::new(),
            tick_id: 0,
            shut_down: false,
        }
    }

    /// Unique id of this world instance.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The configuration the world was created with.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The last completed tick; 0 before the first.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// The process-wide type registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// The world's resources.
    #[must_use]
    pub fn resources(&self) -> &Arc<ResourceManager> {
        &self.resources
    }

    /// Registered update functions.
    #[must_use]
    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    /// Add the manager for `M::Component`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateManager`] if the type already has a
    /// manager in this world, or any error from the module's
    /// initialisation. Both are fatal setup errors.
    pub fn register_manager<M: ComponentManagerModule>(
        &mut self,
    ) -> Result<ComponentTypeId, WorldError> {
        let type_id = self.registry.register::<M::Component>()?;
        if self.module_by_type.contains_key(&type_id) {
            return Err(WorldError::DuplicateManager(M::module_name()));
        }

        let index = self.modules.len();
        let mut module = M::new(type_id);
        let mut init = ModuleInit {
            module_index: index,
            module_name: M::module_name(),
            scheduler: &mut self.scheduler,
            resources: &self.resources,
            registry: &self.registry,
        };
        if let Err(err) = module.initialize_module(&mut init) {
            self.scheduler.remove_module(index);
            return Err(err);
        }

        self.modules.push(Some(Box::new(module)));
        self.module_by_type.insert(type_id, index);

        info!(
            world = %self.config.name,
            module = M::module_name(),
            %type_id,
            "manager registered"
        );
        Ok(type_id)
    }

    /// The manager for `M::Component`, registering it on first use.
    ///
    /// # Errors
    ///
    /// Propagates registration errors.
    pub fn get_or_create_manager<M: ComponentManagerModule>(
        &mut self,
    ) -> Result<&mut M, WorldError> {
        let type_id = match self.registry.type_id::<M::Component>() {
            Some(type_id) if self.module_by_type.contains_key(&type_id) => type_id,
            _ => self.register_manager::<M>()?,
        };
        let index = self.module_by_type.get(&type_id).copied();
        index
            .and_then(|index| self.modules.get_mut(index))
            .and_then(|slot| slot.as_deref_mut())
            .and_then(|module| module.as_any_mut().downcast_mut::<M>())
            .ok_or(WorldError::ManagerUnavailable(M::module_name()))
    }

    fn module_index<M: ComponentManagerModule>(&self) -> Option<usize> {
        let type_id = self.registry.type_id::<M::Component>()?;
        self.module_by_type.get(&type_id).copied()
    }

    /// The manager for `M::Component`, if registered.
    #[must_use]
    pub fn manager<M: ComponentManagerModule>(&self) -> Option<&M> {
        let index = self.module_index::<M>()?;
        self.modules
            .get(index)?
            .as_deref()?
            .as_any()
            .downcast_ref::<M>()
    }

    /// The manager for `M::Component`, mutably.
    #[must_use]
    pub fn manager_mut<M: ComponentManagerModule>(&mut self) -> Option<&mut M> {
        let index = self.module_index::<M>()?;
        self.modules
            .get_mut(index)?
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<M>()
    }

    /// Create an object with no components.
    pub fn create_object(&mut self, name: impl Into<String>, transform: Transform3D) -> ObjectId {
        let id = self.objects.create(name, transform);
        trace!(world = %self.config.name, %id, "object created");
        id
    }

    /// Look up an object.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    /// Every object in the world.
    #[must_use]
    pub fn objects(&self) -> &ObjectTable {
        &self.objects
    }

    /// Move an object.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ObjectNotFound`] for an unknown id.
    pub fn set_transform(&mut self, id: ObjectId, transform: Transform3D) -> Result<(), WorldError> {
        let object = self
            .objects
            .get_mut(id)
            .ok_or(WorldError::ObjectNotFound(id))?;
        object.set_transform(transform);
        Ok(())
    }

    /// Attach `component` to `owner`, creating the manager if needed.
    ///
    /// The component is initialised at the start of the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ObjectNotFound`] for an unknown owner, or a
    /// manager registration error.
    pub fn attach_component<M: ComponentManagerModule>(
        &mut self,
        owner: ObjectId,
        component: M::Component,
    ) -> Result<ComponentHandle, WorldError> {
        if self.objects.get(owner).is_none() {
            return Err(WorldError::ObjectNotFound(owner));
        }

        let handle = self
            .get_or_create_manager::<M>()?
            .components_mut()
            .create_component(owner, component)?;

        if let Some(object) = self.objects.get_mut(owner) {
            object.add_component(handle);
        }
        Ok(handle)
    }

    fn module_for(&mut self, handle: ComponentHandle) -> Result<&mut (dyn WorldModule + 'static), WorldError> {
        let index = self
            .module_by_type
            .get(&handle.type_id())
            .copied()
            .ok_or(WorldError::NoManager(handle))?;
        self.modules
            .get_mut(index)
            .and_then(|slot| slot.as_deref_mut())
            .ok_or(WorldError::NoManager(handle))
    }

    /// Detach and delete one component.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NoManager`] for an unregistered type or a
    /// stale-handle error.
    pub fn delete_component(&mut self, handle: ComponentHandle) -> Result<(), WorldError> {
        let module = self.module_for(handle)?;
        let owner = module.component_owner(handle);
        module.delete_component(handle)?;

        if let Some(owner) = owner {
            if let Some(object) = self.objects.get_mut(owner) {
                object.remove_component(handle);
            }
            self.recompute_local_bounds(owner);
        }
        Ok(())
    }

    /// Set a component's active flag. Returns `true` if it changed.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NoManager`] for an unregistered type.
    pub fn set_component_active(
        &mut self,
        handle: ComponentHandle,
        active: bool,
    ) -> Result<bool, WorldError> {
        Ok(self.module_for(handle)?.set_component_active(handle, active))
    }

    /// Delete an object and all its components, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ObjectNotFound`] for an unknown id.
    pub fn delete_object(&mut self, id: ObjectId) -> Result<(), WorldError> {
        let object = self
            .objects
            .remove(id)
            .ok_or(WorldError::ObjectNotFound(id))?;

        for &handle in object.components().iter().rev() {
            let deleted = self
                .module_for(handle)
                .and_then(|module| module.delete_component(handle));
            if let Err(err) = deleted {
                warn!(world = %self.config.name, %id, %handle, %err, "failed to delete component");
            }
        }

        trace!(world = %self.config.name, %id, "object deleted");
        Ok(())
    }

    /// Recompute `owner`'s local bounds from its components.
    pub fn recompute_local_bounds(&mut self, owner: ObjectId) {
        let Some(object) = self.objects.get(owner) else {
            return;
        };
        let view = ModuleView::new(&self.modules);
        let bounds = object
            .components()
            .iter()
            .filter_map(|&handle| view.component_bounds(handle))
            .reduce(|acc, b| acc.union(&b));

        if let Some(object) = self.objects.get_mut(owner) {
            object.set_local_bounds(bounds);
        }
    }

    /// Advance the world by one tick of `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        if self.shut_down {
            return;
        }
        self.tick_id += 1;

        let initialized: usize = self
            .modules
            .iter_mut()
            .flatten()
            .map(|module| module.initialize_pending_components())
            .sum();

        debug!(
            world = %self.config.name,
            tick_id = self.tick_id,
            dt,
            initialized,
            "tick start"
        );

        for phase in UpdatePhase::ALL {
            let mut bounds_requests = Vec::new();
            for index in self.scheduler.phase_indices(phase) {
                bounds_requests.extend(self.run_update(index, phase, dt));
            }
            for owner in bounds_requests {
                self.recompute_local_bounds(owner);
            }
        }

        let gc_interval = self.config.gc_interval_ticks;
        if gc_interval > 0 && self.tick_id % gc_interval == 0 {
            let evicted = self.resources.collect_unreferenced();
            if evicted > 0 {
                debug!(tick_id = self.tick_id, evicted, "evicted unreferenced resources");
            }
        }
    }

    fn run_update(&mut self, index: usize, phase: UpdatePhase, dt: f64) -> Vec<ObjectId> {
        let Some(update) = self.scheduler.update_mut(index) else {
            return Vec::new();
        };
        let module_index = update.module_index;
        let Some(mut module) = self.modules.get_mut(module_index).and_then(Option::take) else {
            return Vec::new();
        };

        trace!(
            tick_id = self.tick_id,
            %phase,
            module = update.module_name,
            update = update.name,
            "running update function"
        );

        let mut ctx = UpdateContext::new(
            self.tick_id,
            dt,
            phase,
            &self.objects,
            ModuleView::new(&self.modules),
            &self.resources,
            &self.registry,
        );
        (update.function)(module.as_any_mut(), &mut ctx);
        let requests = ctx.into_bounds_requests();

        self.modules[module_index] = Some(module);
        requests
    }

    /// Delete every object, then deinitialise managers in reverse
    /// registration order. Further ticks do nothing. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        let ids: Vec<ObjectId> = self.objects.iter().map(|o| o.id()).collect();
        for id in ids.into_iter().rev() {
            if let Err(err) = self.delete_object(id) {
                warn!(world = %self.config.name, %err, "failed to delete object during shutdown");
            }
        }

        for module in self.modules.iter_mut().rev().flatten() {
            module.deinitialize_module();
            debug!(world = %self.config.name, module = module.name(), "manager deinitialized");
        }

        info!(world = %self.config.name, ticks = self.tick_id, "world shut down");
    }

    /// Returns `true` once [`World::shutdown`] ran.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("tick_id", &self.tick_id)
            .field("modules", &ModuleView::new(&self.modules))
            .field("objects", &self.objects.len())
            .finish_non_exhaustive()
    }
}
