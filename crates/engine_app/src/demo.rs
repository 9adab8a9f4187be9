//! Demo scene: a row of crates whose collision meshes are visualised, plus
//! a background task that reloads one of the meshes mid-run.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use engine_component::{ComponentHandle, TypeRegistry};
use engine_math::{Transform3D, Vec3};
use engine_physics::{
    ExtractRenderDataMsg, MeshRenderData, StaticActorComponent, StaticActorManager,
    VisColMeshComponent, VisColMeshManager,
};
use engine_resource::{
    CollisionGeometry, CollisionMeshResource, ConvexHull, ResourceManager, TriangleIndices,
    TriangleMesh,
};
use engine_world::{World, WorldConfig};
use tokio::task::JoinHandle;
use tracing::info;

/// Collision mesh shared by all crates; the one the reload task replaces.
pub const CRATE_MESH: &str = "Meshes/Crate.colmesh";

/// Triangle collision mesh of the floor.
pub const FLOOR_MESH: &str = "Meshes/Floor.colmesh";

/// A populated world and the handles of its visualisation components.
#[derive(Debug)]
pub struct DemoScene {
    /// The world.
    pub world: World,
    /// Visualisation components, one per object.
    pub visualizers: Vec<ComponentHandle>,
}

fn crate_mesh(half_extent: f32) -> CollisionMeshResource {
    CollisionMeshResource::new(CollisionGeometry::Convex(ConvexHull::cuboid(Vec3::splat(
        half_extent,
    ))))
}

fn floor_mesh() -> CollisionMeshResource {
    CollisionMeshResource::new(CollisionGeometry::Triangles(TriangleMesh {
        vertices: vec![
            Vec3::new(-50.0, 0.0, -50.0),
            Vec3::new(50.0, 0.0, -50.0),
            Vec3::new(50.0, 0.0, 50.0),
            Vec3::new(-50.0, 0.0, 50.0),
        ],
        indices: TriangleIndices::U16(vec![0, 2, 1, 0, 3, 2]),
    }))
}

/// Build a world with a floor and `objects` crates.
///
/// Even crates name their collision mesh directly; odd crates rely on their
/// static actor's mesh.
///
/// # Errors
///
/// Returns setup errors from manager registration or attachment.
pub fn build_scene(
    config: WorldConfig,
    resources: &Arc<ResourceManager>,
    objects: usize,
) -> Result<DemoScene> {
    let registry = Arc::new(TypeRegistry::new());
    let mut world = World::new(config, registry, Arc::clone(resources));
    world.register_manager::<StaticActorManager>()?;
    world.register_manager::<VisColMeshManager>()?;

    let sources = resources.cache::<CollisionMeshResource>();
    let crate_mesh = sources.create(CRATE_MESH, crate_mesh(0.5), "demo crate");
    let floor = sources.create(FLOOR_MESH, floor_mesh(), "demo floor");

    let mut visualizers = Vec::with_capacity(objects + 1);

    let floor_obj = world.create_object("floor", Transform3D::IDENTITY);
    world.attach_component::<StaticActorManager>(floor_obj, StaticActorComponent::new(floor.clone()))?;
    visualizers.push(
        world.attach_component::<VisColMeshManager>(floor_obj, VisColMeshComponent::new(floor))?,
    );

    for i in 0..objects {
        let position = Vec3::new(i as f32 * 2.0, 0.5, 0.0);
        let obj = world.create_object(format!("crate-{i}"), Transform3D::from_position(position));
        world.attach_component::<StaticActorManager>(
            obj,
            StaticActorComponent::new(crate_mesh.clone()),
        )?;

        let vis = if i % 2 == 0 {
            VisColMeshComponent::new(crate_mesh.clone())
        } else {
            VisColMeshComponent::default()
        };
        visualizers.push(world.attach_component::<VisColMeshManager>(obj, vis)?);
    }

    info!(objects = world.objects().len(), "demo scene built");
    Ok(DemoScene { world, visualizers })
}

/// After `delay`, replace the crate collision mesh with a larger one.
///
/// The update happens on a runtime worker thread, so the resulting event
/// reaches the visualisation manager from outside the simulation thread.
pub fn spawn_reload(resources: Arc<ResourceManager>, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        info!(mesh = CRATE_MESH, "reloading collision mesh");
        resources
            .cache::<CollisionMeshResource>()
            .update_content(CRATE_MESH, crate_mesh(0.75));
    })
}

/// Render data of every visualised collision mesh, sorted for submission.
#[must_use]
pub fn extract_render_data(world: &World) -> Vec<MeshRenderData> {
    let mut msg = ExtractRenderDataMsg::new();
    if let Some(vis) = world.manager::<VisColMeshManager>() {
        vis.extract_render_data(world.objects(), &mut msg);
    }
    msg.into_sorted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_world::ComponentManagerModule;

    fn scene(objects: usize) -> (DemoScene, Arc<ResourceManager>) {
        let resources = Arc::new(ResourceManager::new());
        let scene = build_scene(WorldConfig::new("demo"), &resources, objects).unwrap();
        (scene, resources)
    }

    #[test]
    fn test_scene_builds_all_meshes_in_one_tick() {
        let (mut scene, _resources) = scene(4);
        scene.world.tick(1.0 / 60.0);

        let vis = scene.world.manager::<VisColMeshManager>().unwrap();
        for handle in &scene.visualizers {
            let component = vis.components().try_get_component(*handle).unwrap();
            assert!(component.mesh().is_valid());
        }
        // Floor and crate meshes are built once each; the rest are hits.
        assert_eq!(vis.stats().built, 2);
        assert_eq!(vis.stats().cache_hits, 3);
        assert_eq!(extract_render_data(&scene.world).len(), 5);
    }

    #[test]
    fn test_reload_reaches_every_crate() {
        let (mut scene, resources) = scene(3);
        scene.world.tick(1.0 / 60.0);

        resources
            .cache::<CollisionMeshResource>()
            .update_content(CRATE_MESH, crate_mesh(0.75));
        scene.world.tick(1.0 / 60.0);

        let records = extract_render_data(&scene.world);
        let reloaded = records
            .iter()
            .filter(|r| r.mesh == format!("{CRATE_MESH}_1_VisColMesh"))
            .count();
        assert_eq!(reloaded, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_background_reload() {
        let (mut scene, resources) = scene(2);
        scene.world.tick(1.0 / 60.0);

        spawn_reload(Arc::clone(&resources), Duration::ZERO)
            .await
            .unwrap();
        scene.world.tick(1.0 / 60.0);

        let vis = scene.world.manager::<VisColMeshManager>().unwrap();
        assert_eq!(vis.stats().built, 3);
        let render = serde_json::to_string(&extract_render_data(&scene.world)).unwrap();
        assert!(render.contains("_1_VisColMesh"));
    }
}
