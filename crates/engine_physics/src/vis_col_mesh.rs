//! Render visualisation of physics collision meshes.
//!
//! A [`VisColMeshComponent`] shows the collision mesh of its owner. The
//! render mesh is derived lazily: whenever the source may have changed, the
//! component is enqueued with its manager, and the manager's pre-async
//! update (re)derives it through [`col_mesh_builder::get_or_build`]. The
//! manager also listens for collision mesh reloads and unloads so holders
//! re-derive rather than keep drawing stale data.

use engine_component::{
    Component, ComponentContext, ComponentError, ComponentHandle, ComponentRecord,
    ComponentTypeId, OwnerObject,
};
use engine_math::BoundingBoxSphere;
use engine_resource::{
    CollisionMeshResource, MeshResource, Resource, ResourceHandle, ResourceManager, Subscription,
    fnv1a_32,
};
use engine_world::{
    ComponentManager, ComponentManagerModule, ModuleInit, ObjectTable, UpdateContext,
    UpdateFunctionDesc, UpdatePhase, WorldError,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::col_mesh_builder::{self, BuildOutcome};
use crate::render::{
    self, ExtractRenderDataMsg, MeshRenderData, RenderDataCaching, RenderDataCategory,
};
use crate::static_actor::{StaticActorComponent, StaticActorManager};

/// Draws the collision mesh of its owner.
///
/// If no collision mesh is set, the mesh of a sibling
/// [`StaticActorComponent`] is used.
#[derive(Debug, Default)]
pub struct VisColMeshComponent {
    collision_mesh: ResourceHandle<CollisionMeshResource>,
    mesh: ResourceHandle<MeshResource>,
}

impl VisColMeshComponent {
    /// A component visualising `collision_mesh`.
    #[must_use]
    pub fn new(collision_mesh: ResourceHandle<CollisionMeshResource>) -> Self {
        Self {
            collision_mesh,
            mesh: ResourceHandle::invalid(),
        }
    }

    /// The source collision mesh.
    #[must_use]
    pub fn collision_mesh(&self) -> &ResourceHandle<CollisionMeshResource> {
        &self.collision_mesh
    }

    /// The derived render mesh; invalid until the first successful update.
    #[must_use]
    pub fn mesh(&self) -> &ResourceHandle<MeshResource> {
        &self.mesh
    }

    /// Id of the collision mesh, empty if none is set.
    #[must_use]
    pub fn mesh_file(&self) -> &str {
        self.collision_mesh.resource_id().unwrap_or("")
    }

    /// Replace the source. Returns `true` if it changed, in which case the
    /// derived mesh is dropped and the component needs an update.
    fn set_mesh(&mut self, mesh: ResourceHandle<CollisionMeshResource>) -> bool {
        if self.collision_mesh == mesh {
            return false;
        }
        self.collision_mesh = mesh;
        self.mesh.invalidate();
        true
    }

    /// Bounds of the derived mesh.
    #[must_use]
    pub fn local_bounds(&self) -> Option<BoundingBoxSphere> {
        self.mesh.acquire()?.get()?.bounds()
    }

    /// Emit one record per sub-mesh of the derived mesh.
    pub fn extract_render_data(
        &self,
        handle: ComponentHandle,
        owner: &impl OwnerObject,
        msg: &mut ExtractRenderDataMsg,
    ) {
        let Some(lock) = self.mesh.acquire() else {
            return;
        };
        let Some(mesh) = lock.get() else {
            return;
        };

        let mesh_hash = self.mesh.id_hash();
        let transform = owner.global_transform();
        let flip_winding = transform.contains_negative_scale();
        let global_bounds = owner.global_bounds();

        for (part_index, sub_mesh) in (0u32..).zip(mesh.sub_meshes()) {
            let material = mesh
                .materials()
                .get(sub_mesh.material_index as usize)
                .filter(|m| !m.is_empty());
            let material_hash = material.map_or(0, |m| fnv1a_32(m.as_bytes()));

            msg.add_render_data(MeshRenderData {
                owner: owner.id(),
                component: handle,
                global_transform: transform,
                global_bounds,
                mesh: lock.resource_id().to_string(),
                material: material.cloned(),
                sub_mesh_index: part_index,
                batch_id: render::batch_id(mesh_hash, material_hash, part_index, flip_winding),
                sort_key: render::sort_key(material_hash, mesh_hash, flip_winding),
                category: RenderDataCategory::LitOpaque,
                caching: RenderDataCaching::IfStatic,
            });
        }
    }
}

impl Component for VisColMeshComponent {
    fn type_name() -> &'static str {
        "VisColMesh"
    }

    fn initialize(&mut self, ctx: &mut ComponentContext) {
        ctx.request_update();
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct VisColMeshRecord {
    collision_mesh: Option<String>,
}

/// Counters of what the update did, summed over the manager's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisColMeshStats {
    /// Meshes built from source content.
    pub built: u64,
    /// Derived meshes found in the cache.
    pub cache_hits: u64,
    /// Updates aborted because the source was unavailable.
    pub source_missing: u64,
    /// Updates aborted because the source had no usable geometry.
    pub no_geometry: u64,
}

/// Manager for [`VisColMeshComponent`]s.
#[derive(Debug)]
pub struct VisColMeshManager {
    components: ComponentManager<VisColMeshComponent>,
    subscription: Option<Subscription>,
    static_actor_type: Option<ComponentTypeId>,
    stats: VisColMeshStats,
}

impl VisColMeshManager {
    /// Lifetime update counters.
    #[must_use]
    pub fn stats(&self) -> VisColMeshStats {
        self.stats
    }

    /// Set a component's collision mesh. Only a change drops the derived
    /// mesh and enqueues an update. Returns `true` on change.
    pub fn set_mesh(
        &mut self,
        handle: ComponentHandle,
        mesh: ResourceHandle<CollisionMeshResource>,
    ) -> bool {
        let Some(component) = self.components.try_get_component_mut(handle) else {
            return false;
        };
        if !component.set_mesh(mesh) {
            return false;
        }
        let source = component.collision_mesh.resource_id().map(str::to_string);
        self.components.track_resource(handle, source.as_deref());
        self.components.enqueue_update(handle);
        true
    }

    /// Set a component's collision mesh by id; an empty id clears it.
    pub fn set_mesh_file(
        &mut self,
        handle: ComponentHandle,
        file: &str,
        resources: &ResourceManager,
    ) -> bool {
        let mesh = if file.is_empty() {
            ResourceHandle::invalid()
        } else {
            resources.cache::<CollisionMeshResource>().load(file)
        };
        self.set_mesh(handle, mesh)
    }

    /// Id of a component's collision mesh, empty if none.
    #[must_use]
    pub fn mesh_file(&self, handle: ComponentHandle) -> Option<&str> {
        self.components
            .try_get_component(handle)
            .map(VisColMeshComponent::mesh_file)
    }

    /// Persist a component's collision mesh id.
    ///
    /// # Errors
    ///
    /// Returns a stale-handle error or an encoding error.
    pub fn serialize_component(&self, handle: ComponentHandle) -> Result<ComponentRecord, WorldError> {
        let component = self
            .components
            .try_get_component(handle)
            .ok_or(ComponentError::StaleHandle(handle))?;
        let record = VisColMeshRecord {
            collision_mesh: component.collision_mesh.resource_id().map(str::to_string),
        };
        Ok(ComponentRecord::write::<VisColMeshComponent, _>(&record)?)
    }

    /// Restore a component's collision mesh from `record`. The derived mesh
    /// is rebuilt on the next update, not here.
    ///
    /// # Errors
    ///
    /// Returns a stale-handle error or a decoding error.
    pub fn deserialize_component(
        &mut self,
        handle: ComponentHandle,
        record: &ComponentRecord,
        resources: &ResourceManager,
    ) -> Result<(), WorldError> {
        let fields: VisColMeshRecord = record.read::<VisColMeshComponent, _>()?;
        let component = self
            .components
            .try_get_component_mut(handle)
            .ok_or(ComponentError::StaleHandle(handle))?;

        component.collision_mesh = fields
            .collision_mesh
            .map(|id| resources.cache::<CollisionMeshResource>().load(&id))
            .unwrap_or_default();
        component.mesh.invalidate();

        let source = component.collision_mesh.resource_id().map(str::to_string);
        self.components.track_resource(handle, source.as_deref());
        self.components.enqueue_update(handle);
        Ok(())
    }

    /// Extract render data of every active component.
    pub fn extract_render_data(&self, objects: &ObjectTable, msg: &mut ExtractRenderDataMsg) {
        for (handle, base, component) in self.components.iter() {
            if !base.is_active() {
                continue;
            }
            if let Some(owner) = objects.get(base.owner()) {
                component.extract_render_data(handle, owner, msg);
            }
        }
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let meshes = ctx.resources().cache::<MeshResource>();
        let objects = ctx.objects();
        let static_actors = ctx.module::<StaticActorManager>();
        let static_actor_type = self.static_actor_type;

        let mut stats = VisColMeshStats::default();
        let mut tracked = Vec::new();
        let mut bounds_changed = Vec::new();

        let drained = self.components.drain_pending(|handle, base, component| {
            if !component.collision_mesh.is_valid() {
                let sibling = objects
                    .get(base.owner())
                    .zip(static_actor_type)
                    .and_then(|(owner, type_id)| owner.try_get_component_of_type(type_id))
                    .zip(static_actors)
                    .and_then(|(sibling, actors)| actors.components().try_get_component(sibling))
                    .map(StaticActorComponent::mesh);
                if let Some(mesh) = sibling.filter(|m| m.is_valid()) {
                    component.collision_mesh = mesh.clone();
                }
            }
            tracked.push((
                handle,
                component.collision_mesh.resource_id().map(str::to_string),
            ));

            match col_mesh_builder::get_or_build(&component.collision_mesh, &meshes) {
                BuildOutcome::Built(mesh) => {
                    stats.built += 1;
                    component.mesh = mesh;
                    bounds_changed.push(base.owner());
                }
                BuildOutcome::Cached(mesh) => {
                    stats.cache_hits += 1;
                    component.mesh = mesh;
                    bounds_changed.push(base.owner());
                }
                BuildOutcome::SourceMissing => stats.source_missing += 1,
                BuildOutcome::NoGeometry => stats.no_geometry += 1,
            }
        });

        for (handle, source) in tracked {
            self.components.track_resource(handle, source.as_deref());
        }
        for owner in bounds_changed {
            ctx.request_bounds_update(owner);
        }

        self.stats.built += stats.built;
        self.stats.cache_hits += stats.cache_hits;
        self.stats.source_missing += stats.source_missing;
        self.stats.no_geometry += stats.no_geometry;

        if drained.processed > 0 {
            trace!(
                tick_id = ctx.tick_id(),
                processed = drained.processed,
                skipped_stale = drained.skipped_stale,
                built = stats.built,
                "collision visualisation updated"
            );
        }
    }
}

impl ComponentManagerModule for VisColMeshManager {
    type Component = VisColMeshComponent;

    fn module_name() -> &'static str {
        "VisColMeshManager"
    }

    fn new(type_id: ComponentTypeId) -> Self {
        Self {
            components: ComponentManager::new(type_id),
            subscription: None,
            static_actor_type: None,
            stats: VisColMeshStats::default(),
        }
    }

    fn components(&self) -> &ComponentManager<VisColMeshComponent> {
        &self.components
    }

    fn components_mut(&mut self) -> &mut ComponentManager<VisColMeshComponent> {
        &mut self.components
    }

    fn initialize(&mut self, init: &mut ModuleInit<'_>) -> Result<(), WorldError> {
        init.register_update_function(UpdateFunctionDesc {
            name: "VisColMeshManager::update",
            phase: UpdatePhase::PreAsync,
            function: Self::update,
        })?;
        self.static_actor_type = Some(init.registry().register::<StaticActorComponent>()?);
        self.subscription = Some(
            self.components
                .subscribe_resource_events(init.resources().events(), CollisionMeshResource::KIND),
        );
        debug!("collision mesh visualisation manager initialized");
        Ok(())
    }

    fn deinitialize(&mut self) {
        self.components
            .release_resource_events(&mut self.subscription);
    }

    fn set_active(&mut self, handle: ComponentHandle, active: bool) -> bool {
        let changed = self.components.set_active(handle, active);
        if changed && active {
            self.components.enqueue_update(handle);
        }
        changed
    }

    fn local_bounds(&self, handle: ComponentHandle) -> Option<BoundingBoxSphere> {
        self.components.try_get_component(handle)?.local_bounds()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use engine_component::{CodecError, ObjectId, TypeRegistry};
    use engine_math::{Transform3D, Vec3};
    use engine_resource::{CollisionGeometry, ConvexHull};
    use engine_world::{World, WorldConfig};

    use super::*;
    use crate::col_mesh_builder::COLLISION_MESH_MATERIAL;

    fn setup() -> (World, Arc<ResourceManager>) {
        let resources = Arc::new(ResourceManager::new());
        let mut world = World::new(
            WorldConfig::new("vis"),
            Arc::new(TypeRegistry::new()),
            Arc::clone(&resources),
        );
        world.register_manager::<VisColMeshManager>().unwrap();
        (world, resources)
    }

    fn hull(half_extents: f32) -> CollisionMeshResource {
        CollisionMeshResource::new(CollisionGeometry::Convex(ConvexHull::cuboid(Vec3::splat(
            half_extents,
        ))))
    }

    fn source(resources: &ResourceManager, id: &str) -> ResourceHandle<CollisionMeshResource> {
        resources
            .cache::<CollisionMeshResource>()
            .create(id, hull(1.0), "test")
    }

    fn manager(world: &World) -> &VisColMeshManager {
        world.manager::<VisColMeshManager>().unwrap()
    }

    fn component(world: &World, handle: ComponentHandle) -> &VisColMeshComponent {
        manager(world).components().try_get_component(handle).unwrap()
    }

    fn spawn(world: &mut World, mesh: ResourceHandle<CollisionMeshResource>) -> (ObjectId, ComponentHandle) {
        let obj = world.create_object("vis", Transform3D::IDENTITY);
        let h = world
            .attach_component::<VisColMeshManager>(obj, VisColMeshComponent::new(mesh))
            .unwrap();
        (obj, h)
    }

    #[test]
    fn test_initialize_builds_mesh() {
        let (mut world, resources) = setup();
        let (obj, h) = spawn(&mut world, source(&resources, "cube.colmesh"));
        assert!(!component(&world, h).mesh().is_valid());

        world.tick(0.016);
        let mesh = component(&world, h).mesh();
        assert_eq!(mesh.resource_id(), Some("cube.colmesh_0_VisColMesh"));
        assert_eq!(manager(&world).stats().built, 1);

        let bounds = world.object(obj).unwrap().local_bounds().unwrap();
        assert_eq!(bounds.half_extents, Vec3::ONE);
        assert_eq!(
            component(&world, h).local_bounds().unwrap().half_extents,
            Vec3::ONE
        );
    }

    #[test]
    fn test_shared_source_is_built_once() {
        let (mut world, resources) = setup();
        let mesh = source(&resources, "cube.colmesh");
        let (_, a) = spawn(&mut world, mesh.clone());
        let (_, b) = spawn(&mut world, mesh);
        world.tick(0.016);

        let stats = manager(&world).stats();
        assert_eq!(stats.built, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(component(&world, a).mesh(), component(&world, b).mesh());
        assert_eq!(resources.cache::<MeshResource>().len(), 1);
    }

    #[test]
    fn test_set_mesh_only_acts_on_change() {
        let (mut world, resources) = setup();
        let cube = source(&resources, "cube.colmesh");
        let (_, h) = spawn(&mut world, cube.clone());
        world.tick(0.016);

        let vis = world.manager_mut::<VisColMeshManager>().unwrap();
        assert!(!vis.set_mesh(h, cube));
        assert_eq!(vis.components().pending_len(), 0);

        let other = source(&resources, "other.colmesh");
        let vis = world.manager_mut::<VisColMeshManager>().unwrap();
        assert!(vis.set_mesh(h, other));
        assert!(!component(&world, h).mesh().is_valid());
        assert_eq!(manager(&world).components().pending(), vec![h]);

        world.tick(0.016);
        assert_eq!(
            component(&world, h).mesh().resource_id(),
            Some("other.colmesh_0_VisColMesh")
        );
    }

    #[test]
    fn test_mesh_file_accessors() {
        let (mut world, resources) = setup();
        let (_, h) = spawn(&mut world, ResourceHandle::invalid());
        let vis = world.manager_mut::<VisColMeshManager>().unwrap();
        assert_eq!(vis.mesh_file(h), Some(""));

        assert!(vis.set_mesh_file(h, "rock.colmesh", &resources));
        assert_eq!(vis.mesh_file(h), Some("rock.colmesh"));
        assert!(!vis.set_mesh_file(h, "rock.colmesh", &resources));

        assert!(vis.set_mesh_file(h, "", &resources));
        assert_eq!(vis.mesh_file(h), Some(""));
    }

    #[test]
    fn test_falls_back_to_static_actor_mesh() {
        let (mut world, resources) = setup();
        world.register_manager::<StaticActorManager>().unwrap();
        let cube = source(&resources, "actor.colmesh");

        let obj = world.create_object("actor", Transform3D::IDENTITY);
        world
            .attach_component::<StaticActorManager>(obj, StaticActorComponent::new(cube.clone()))
            .unwrap();
        let h = world
            .attach_component::<VisColMeshManager>(obj, VisColMeshComponent::default())
            .unwrap();
        world.tick(0.016);

        let vis = component(&world, h);
        assert_eq!(vis.collision_mesh(), &cube);
        assert_eq!(vis.mesh().resource_id(), Some("actor.colmesh_0_VisColMesh"));
    }

    #[test]
    fn test_without_any_source_nothing_is_built() {
        let (mut world, _resources) = setup();
        let (_, h) = spawn(&mut world, ResourceHandle::invalid());
        world.tick(0.016);
        assert!(!component(&world, h).mesh().is_valid());
        assert_eq!(manager(&world).stats().source_missing, 1);
        assert_eq!(manager(&world).components().pending_len(), 0);
    }

    #[test]
    fn test_missing_source_recovers_on_content_update() {
        let (mut world, resources) = setup();
        let sources = resources.cache::<CollisionMeshResource>();
        let (_, h) = spawn(&mut world, sources.load("late.colmesh"));

        world.tick(0.016);
        assert!(!component(&world, h).mesh().is_valid());
        assert_eq!(manager(&world).stats().source_missing, 1);
        assert_eq!(manager(&world).components().pending_len(), 0);
        assert!(resources.cache::<MeshResource>().is_empty());

        sources.update_content("late.colmesh", hull(1.0));
        assert_eq!(manager(&world).components().pending(), vec![h]);

        world.tick(0.016);
        assert!(component(&world, h).mesh().is_valid());
    }

    #[test]
    fn test_reload_rebuilds_under_new_name() {
        let (mut world, resources) = setup();
        let (obj, h) = spawn(&mut world, source(&resources, "cube.colmesh"));
        world.tick(0.016);

        resources
            .cache::<CollisionMeshResource>()
            .update_content("cube.colmesh", hull(2.0));
        world.tick(0.016);

        assert_eq!(
            component(&world, h).mesh().resource_id(),
            Some("cube.colmesh_1_VisColMesh")
        );
        let bounds = world.object(obj).unwrap().local_bounds().unwrap();
        assert_eq!(bounds.half_extents, Vec3::splat(2.0));
    }

    #[test]
    fn test_unload_enqueues_and_keeps_last_mesh() {
        let (mut world, resources) = setup();
        let (_, h) = spawn(&mut world, source(&resources, "cube.colmesh"));
        world.tick(0.016);

        assert!(resources
            .cache::<CollisionMeshResource>()
            .unload("cube.colmesh"));
        assert_eq!(manager(&world).components().pending(), vec![h]);

        world.tick(0.016);
        assert_eq!(manager(&world).stats().source_missing, 1);
        assert!(component(&world, h).mesh().is_valid());
    }

    #[test]
    fn test_update_event_enqueues_only_holders() {
        let (mut world, resources) = setup();
        let rock = source(&resources, "rock.colmesh");
        let tree = source(&resources, "tree.colmesh");
        let (_, x) = spawn(&mut world, rock.clone());
        let (_, y) = spawn(&mut world, rock);
        let (_, z) = spawn(&mut world, tree);
        world.tick(0.016);

        resources
            .cache::<CollisionMeshResource>()
            .update_content("rock.colmesh", hull(3.0));

        let pending = manager(&world).components().pending();
        assert!(pending.contains(&x));
        assert!(pending.contains(&y));
        assert!(!pending.contains(&z));
    }

    #[test]
    fn test_serialization_round_trip() {
        let (mut world, resources) = setup();
        let (_, original) = spawn(&mut world, source(&resources, "cube.colmesh"));
        world.tick(0.016);

        let bytes = manager(&world)
            .serialize_component(original)
            .unwrap()
            .to_bytes()
            .unwrap();
        let record = ComponentRecord::from_bytes(&bytes).unwrap();

        let (_, restored) = spawn(&mut world, ResourceHandle::invalid());
        world.tick(0.016);
        world
            .manager_mut::<VisColMeshManager>()
            .unwrap()
            .deserialize_component(restored, &record, &resources)
            .unwrap();
        assert!(!component(&world, restored).mesh().is_valid());
        assert_eq!(manager(&world).components().pending(), vec![restored]);

        world.tick(0.016);
        let a = component(&world, original).mesh().acquire().unwrap();
        let b = component(&world, restored).mesh().acquire().unwrap();
        let (a, b) = (a.get().unwrap(), b.get().unwrap());
        assert_eq!(a.vertex_count(), b.vertex_count());
        assert_eq!(a.triangle_count(), b.triangle_count());
        assert_eq!(a.bounds(), b.bounds());
    }

    #[test]
    fn test_deserialize_rejects_foreign_record() {
        let (mut world, resources) = setup();
        let (_, h) = spawn(&mut world, ResourceHandle::invalid());
        let record = ComponentRecord {
            type_name: "StaticActor".to_string(),
            version: 1,
            data: Vec::new(),
        };
        let err = world
            .manager_mut::<VisColMeshManager>()
            .unwrap()
            .deserialize_component(h, &record, &resources)
            .unwrap_err();
        assert!(matches!(err, WorldError::Codec(CodecError::TypeMismatch { .. })));
    }

    #[test]
    fn test_extract_render_data() {
        let (mut world, resources) = setup();
        let (obj, h) = spawn(&mut world, source(&resources, "cube.colmesh"));
        world.tick(0.016);

        let mut msg = ExtractRenderDataMsg::new();
        manager(&world).extract_render_data(world.objects(), &mut msg);
        assert_eq!(msg.len(), 1);

        let record = &msg.records()[0];
        let mesh_hash = component(&world, h).mesh().id_hash();
        let material_hash = fnv1a_32(COLLISION_MESH_MATERIAL.as_bytes());
        assert_eq!(record.owner, obj);
        assert_eq!(record.component, h);
        assert_eq!(record.mesh, "cube.colmesh_0_VisColMesh");
        assert_eq!(record.material.as_deref(), Some(COLLISION_MESH_MATERIAL));
        assert_eq!(record.category, RenderDataCategory::LitOpaque);
        assert_eq!(record.caching, RenderDataCaching::IfStatic);
        assert_eq!(record.sort_key, render::sort_key(material_hash, mesh_hash, false));
        assert_eq!(
            record.batch_id,
            render::batch_id(mesh_hash, material_hash, 0, false)
        );
    }

    #[test]
    fn test_negative_scale_flips_winding() {
        let (mut world, resources) = setup();
        let (obj, _) = spawn(&mut world, source(&resources, "cube.colmesh"));
        world
            .set_transform(
                obj,
                Transform3D::IDENTITY.scaled(Vec3::new(-1.0, 1.0, 1.0)),
            )
            .unwrap();
        world.tick(0.016);

        let mut msg = ExtractRenderDataMsg::new();
        manager(&world).extract_render_data(world.objects(), &mut msg);
        assert_eq!(msg.records()[0].sort_key & 1, 1);
    }

    #[test]
    fn test_inactive_components_emit_nothing_and_reactivation_enqueues() {
        let (mut world, resources) = setup();
        let (_, h) = spawn(&mut world, source(&resources, "cube.colmesh"));
        world.tick(0.016);

        assert!(world.set_component_active(h, false).unwrap());
        let mut msg = ExtractRenderDataMsg::new();
        manager(&world).extract_render_data(world.objects(), &mut msg);
        assert!(msg.is_empty());

        assert!(world.set_component_active(h, true).unwrap());
        assert_eq!(manager(&world).components().pending(), vec![h]);
    }

    #[test]
    fn test_source_without_geometry() {
        let (mut world, resources) = setup();
        let empty = resources.cache::<CollisionMeshResource>().create(
            "empty.colmesh",
            CollisionMeshResource::empty(),
            "test",
        );
        let (_, h) = spawn(&mut world, empty);
        world.tick(0.016);
        assert!(!component(&world, h).mesh().is_valid());
        assert_eq!(manager(&world).stats().no_geometry, 1);
    }

    #[test]
    fn test_shutdown_releases_subscription() {
        let (mut world, resources) = setup();
        assert_eq!(resources.events().handler_count(), 1);
        world.shutdown();
        assert_eq!(resources.events().handler_count(), 0);
    }
}
