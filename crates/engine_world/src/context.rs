//! Per-call context handed to update functions.

use engine_component::{ObjectId, TypeRegistry};
use engine_resource::ResourceManager;

use crate::module::{ComponentManagerModule, ModuleView};
use crate::object::{GameObject, ObjectTable};
use crate::scheduler::UpdatePhase;

/// What an update function can see besides its own module.
///
/// Objects and other modules are read-only here. Changes to objects are
/// requested and applied by the world once the function returns.
#[derive(Debug)]
pub struct UpdateContext<'a> {
    tick_id: u64,
    dt: f64,
    phase: UpdatePhase,
    objects: &'a ObjectTable,
    modules: ModuleView<'a>,
    resources: &'a ResourceManager,
    registry: &'a TypeRegistry,
    bounds_requests: Vec<ObjectId>,
}

impl<'a> UpdateContext<'a> {
    pub(crate) fn new(
        tick_id: u64,
        dt: f64,
        phase: UpdatePhase,
        objects: &'a ObjectTable,
        modules: ModuleView<'a>,
        resources: &'a ResourceManager,
        registry: &'a TypeRegistry,
    ) -> Self {
        Self {
            tick_id,
            dt,
            phase,
            objects,
            modules,
            resources,
            registry,
            bounds_requests: Vec::new(),
        }
    }

    /// The tick being run, starting at 1.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// Seconds simulated by this tick.
    #[must_use]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// The phase being run.
    #[must_use]
    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    /// A component's owner.
    #[must_use]
    pub fn owner(&self, id: ObjectId) -> Option<&'a GameObject> {
        self.objects.get(id)
    }

    /// Every object in the world.
    #[must_use]
    pub fn objects(&self) -> &'a ObjectTable {
        self.objects
    }

    /// Another module of the world.
    #[must_use]
    pub fn module<M: ComponentManagerModule>(&self) -> Option<&'a M> {
        self.modules.get::<M>()
    }

    /// The world's resources.
    #[must_use]
    pub fn resources(&self) -> &'a ResourceManager {
        self.resources
    }

    /// The process-wide type registry.
    #[must_use]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Ask the world to recompute `owner`'s local bounds after this phase.
    pub fn request_bounds_update(&mut self, owner: ObjectId) {
        if !self.bounds_requests.contains(&owner) {
            self.bounds_requests.push(owner);
        }
    }

    pub(crate) fn into_bounds_requests(self) -> Vec<ObjectId> {
        self.bounds_requests
    }
}
