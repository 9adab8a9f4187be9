//! Static physics actors.
//!
//! Only the part other components rely on is modelled: the collision mesh
//! an actor is cooked from.

use engine_component::{Component, ComponentHandle, ComponentTypeId};
use engine_math::BoundingBoxSphere;
use engine_resource::{CollisionGeometry, CollisionMeshResource, ResourceHandle};
use engine_world::{ComponentManager, ComponentManagerModule};

/// A non-moving physics actor with a collision mesh.
#[derive(Debug, Default)]
pub struct StaticActorComponent {
    mesh: ResourceHandle<CollisionMeshResource>,
}

impl StaticActorComponent {
    /// An actor using `mesh` as its shape.
    #[must_use]
    pub fn new(mesh: ResourceHandle<CollisionMeshResource>) -> Self {
        Self { mesh }
    }

    /// The collision mesh.
    #[must_use]
    pub fn mesh(&self) -> &ResourceHandle<CollisionMeshResource> {
        &self.mesh
    }

    /// Replace the collision mesh.
    pub fn set_mesh(&mut self, mesh: ResourceHandle<CollisionMeshResource>) {
        self.mesh = mesh;
    }
}

impl Component for StaticActorComponent {
    fn type_name() -> &'static str {
        "StaticActor"
    }
}

/// Manager for [`StaticActorComponent`]s.
#[derive(Debug)]
pub struct StaticActorManager {
    components: ComponentManager<StaticActorComponent>,
}

impl ComponentManagerModule for StaticActorManager {
    type Component = StaticActorComponent;

    fn module_name() -> &'static str {
        "StaticActorManager"
    }

    fn new(type_id: ComponentTypeId) -> Self {
        Self {
            components: ComponentManager::new(type_id),
        }
    }

    fn components(&self) -> &ComponentManager<StaticActorComponent> {
        &self.components
    }

    fn components_mut(&mut self) -> &mut ComponentManager<StaticActorComponent> {
        &mut self.components
    }

    fn local_bounds(&self, handle: ComponentHandle) -> Option<BoundingBoxSphere> {
        let lock = self.components.try_get_component(handle)?.mesh.acquire()?;
        let vertices = match lock.get()?.geometry()? {
            CollisionGeometry::Convex(hull) => &hull.vertices,
            CollisionGeometry::Triangles(mesh) => &mesh.vertices,
        };
        BoundingBoxSphere::from_points(vertices.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use engine_component::{ObjectId, TypeRegistry};
    use engine_math::{Transform3D, Vec3};
    use engine_resource::{ConvexHull, ResourceManager};
    use engine_world::{World, WorldConfig};

    use super::*;

    #[test]
    fn test_bounds_come_from_collision_mesh() {
        let resources = Arc::new(ResourceManager::new());
        let mesh = resources.cache::<CollisionMeshResource>().create(
            "box.colmesh",
            CollisionMeshResource::new(CollisionGeometry::Convex(ConvexHull::cuboid(Vec3::ONE))),
            "test",
        );
        let mut world = World::new(
            WorldConfig::new("actors"),
            Arc::new(TypeRegistry::new()),
            resources,
        );
        let obj = world.create_object("box", Transform3D::IDENTITY);
        world
            .attach_component::<StaticActorManager>(obj, StaticActorComponent::new(mesh))
            .unwrap();

        world.recompute_local_bounds(obj);
        let bounds = world.object(obj).unwrap().local_bounds().unwrap();
        assert_eq!(bounds.half_extents, Vec3::ONE);
    }

    #[test]
    fn test_missing_mesh_has_no_bounds() {
        let mut manager = StaticActorManager::new(ComponentTypeId(1));
        let h = manager
            .components_mut()
            .create_component(ObjectId(1), StaticActorComponent::default())
            .unwrap();
        assert!(manager.local_bounds(h).is_none());
    }
}
