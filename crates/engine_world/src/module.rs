//! Manager modules: how a component manager plugs into a world.
//!
//! A type implementing [`ComponentManagerModule`] wraps one
//! [`ComponentManager`] and adds its type-specific behavior: update
//! functions, event subscriptions and bounds. The world owns exactly one
//! module per component type.

use std::any::Any;
use std::sync::Arc;

use engine_component::{
    Component, ComponentBase, ComponentHandle, ComponentTypeId, ObjectId, TypeRegistry,
};
use engine_math::BoundingBoxSphere;
use engine_resource::ResourceManager;

use crate::error::WorldError;
use crate::manager::ComponentManager;
use crate::scheduler::{UpdateFunctionDesc, UpdateScheduler};

/// A per-type component manager that lives in a world.
pub trait ComponentManagerModule: Send + Sized + 'static {
    /// The managed component type.
    type Component: Component;

    /// Name used in logs and errors.
    fn module_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Create an empty module for the registered component type.
    fn new(type_id: ComponentTypeId) -> Self;

    /// The wrapped manager.
    fn components(&self) -> &ComponentManager<Self::Component>;

    /// The wrapped manager, mutably.
    fn components_mut(&mut self) -> &mut ComponentManager<Self::Component>;

    /// Register update functions and subscriptions. Called once when the
    /// module is added to a world.
    ///
    /// # Errors
    ///
    /// Setup errors are fatal for the world.
    fn initialize(&mut self, _init: &mut ModuleInit<'_>) -> Result<(), WorldError> {
        Ok(())
    }

    /// Release subscriptions. Called once when the world is torn down.
    fn deinitialize(&mut self) {}

    /// Set a component's active flag. Returns `true` if it changed.
    fn set_active(&mut self, handle: ComponentHandle, active: bool) -> bool {
        self.components_mut().set_active(handle, active)
    }

    /// Bounds the component contributes to its owner, in owner space.
    fn local_bounds(&self, _handle: ComponentHandle) -> Option<BoundingBoxSphere> {
        None
    }
}

/// What a module can reach while it is being added to a world.
pub struct ModuleInit<'a> {
    pub(crate) module_index: usize,
    pub(crate) module_name: &'static str,
    pub(crate) scheduler: &'a mut UpdateScheduler,
    pub(crate) resources: &'a Arc<ResourceManager>,
    pub(crate) registry: &'a Arc<TypeRegistry>,
}

impl ModuleInit<'_> {
    /// Register `desc` with the world's scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateUpdateFunction`] if the module already
    /// has a function in that phase.
    pub fn register_update_function<M: ComponentManagerModule>(
        &mut self,
        desc: UpdateFunctionDesc<M>,
    ) -> Result<(), WorldError> {
        self.scheduler
            .register(self.module_index, self.module_name, desc)
    }

    /// The world's resources.
    #[must_use]
    pub fn resources(&self) -> &Arc<ResourceManager> {
        self.resources
    }

    /// The process-wide type registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        self.registry
    }
}

/// Object-safe view of a module, used by the world.
pub(crate) trait WorldModule: Send {
    fn name(&self) -> &'static str;
    fn component_type(&self) -> ComponentTypeId;
    fn initialize_module(&mut self, init: &mut ModuleInit<'_>) -> Result<(), WorldError>;
    fn deinitialize_module(&mut self);
    fn initialize_pending_components(&mut self) -> usize;
    fn component_owner(&self, handle: ComponentHandle) -> Option<ObjectId>;
    fn delete_component(&mut self, handle: ComponentHandle) -> Result<(), WorldError>;
    fn set_component_active(&mut self, handle: ComponentHandle, active: bool) -> bool;
    fn component_bounds(&self, handle: ComponentHandle) -> Option<BoundingBoxSphere>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<M: ComponentManagerModule> WorldModule for M {
    fn name(&self) -> &'static str {
        M::module_name()
    }

    fn component_type(&self) -> ComponentTypeId {
        self.components().type_id()
    }

    fn initialize_module(&mut self, init: &mut ModuleInit<'_>) -> Result<(), WorldError> {
        ComponentManagerModule::initialize(self, init)
    }

    fn deinitialize_module(&mut self) {
        ComponentManagerModule::deinitialize(self);
    }

    fn initialize_pending_components(&mut self) -> usize {
        self.components_mut().initialize_pending()
    }

    fn component_owner(&self, handle: ComponentHandle) -> Option<ObjectId> {
        self.components().base(handle).map(ComponentBase::owner)
    }

    fn delete_component(&mut self, handle: ComponentHandle) -> Result<(), WorldError> {
        self.components_mut().delete_component(handle)?;
        Ok(())
    }

    fn set_component_active(&mut self, handle: ComponentHandle, active: bool) -> bool {
        ComponentManagerModule::set_active(self, handle, active)
    }

    fn component_bounds(&self, handle: ComponentHandle) -> Option<BoundingBoxSphere> {
        ComponentManagerModule::local_bounds(self, handle)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Read access to the modules of a world other than the one being updated.
#[derive(Clone, Copy)]
pub struct ModuleView<'a> {
    modules: &'a [Option<Box<dyn WorldModule>>],
}

impl<'a> ModuleView<'a> {
    pub(crate) fn new(modules: &'a [Option<Box<dyn WorldModule>>]) -> Self {
        Self { modules }
    }

    /// The module of type `M`, unless it is the one currently updating.
    #[must_use]
    pub fn get<M: ComponentManagerModule>(&self) -> Option<&'a M> {
        self.modules
            .iter()
            .flatten()
            .find_map(|module| module.as_any().downcast_ref::<M>())
    }

    /// Local bounds of `handle`, asked of the module owning its type.
    pub(crate) fn component_bounds(&self, handle: ComponentHandle) -> Option<BoundingBoxSphere> {
        self.modules
            .iter()
            .flatten()
            .find(|module| module.component_type() == handle.type_id())
            .and_then(|module| module.component_bounds(handle))
    }
}

impl std::fmt::Debug for ModuleView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.modules.iter().flatten().map(|m| m.name()))
            .finish()
    }
}
