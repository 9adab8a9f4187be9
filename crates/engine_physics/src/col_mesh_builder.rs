//! Derives render meshes from collision meshes.
//!
//! The derived mesh is cached under a name built from the source id and the
//! source's change counter. A lookup for an unchanged source is a cache
//! hit; a content change produces a new name and so a fresh build, leaving
//! the old mesh to be evicted once nothing refers to it.

use engine_resource::{
    CollisionGeometry, CollisionMeshResource, ConvexHull, MeshResource, MeshResourceDescriptor,
    ResourceCache, ResourceHandle, TriangleMesh,
};
use tracing::{debug, trace};

/// Material assigned to every visualised collision mesh.
pub const COLLISION_MESH_MATERIAL: &str = "Materials/Common/ColMesh.material";

/// Description attached to derived meshes in the cache.
const DERIVED_MESH_DESCRIPTION: &str = "Collision Mesh Visualization";

/// Triangles a fan over an `n`-gon produces: `n - 2`, or 0 below 3.
#[must_use]
pub const fn fan_triangle_count(vertex_count: u32) -> u32 {
    vertex_count.saturating_sub(2)
}

/// Cache name of the mesh derived from `source_id` at `change_counter`.
#[must_use]
pub fn derived_mesh_name(source_id: &str, change_counter: u32) -> String {
    format!("{source_id}_{change_counter}_VisColMesh")
}

/// Result of [`get_or_build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The mesh for this source revision already existed.
    Cached(ResourceHandle<MeshResource>),
    /// The mesh was built and registered.
    Built(ResourceHandle<MeshResource>),
    /// No source, or the source is pending or missing.
    SourceMissing,
    /// The source has no usable geometry.
    NoGeometry,
}

impl BuildOutcome {
    /// The derived mesh, if one is available.
    #[must_use]
    pub fn mesh(&self) -> Option<&ResourceHandle<MeshResource>> {
        match self {
            Self::Cached(mesh) | Self::Built(mesh) => Some(mesh),
            Self::SourceMissing | Self::NoGeometry => None,
        }
    }
}

/// Look up the mesh derived from `source`'s current content, building and
/// registering it in `meshes` on a miss.
///
/// Failures are soft: nothing is cached and the caller retries on its next
/// update.
pub fn get_or_build(
    source: &ResourceHandle<CollisionMeshResource>,
    meshes: &ResourceCache<MeshResource>,
) -> BuildOutcome {
    let Some(lock) = source.acquire() else {
        return BuildOutcome::SourceMissing;
    };
    let Some(collision) = lock.get() else {
        trace!(source = lock.resource_id(), "collision mesh not available yet");
        return BuildOutcome::SourceMissing;
    };

    let name = derived_mesh_name(lock.resource_id(), lock.change_counter());
    if let Some(existing) = meshes.get_existing(&name) {
        return BuildOutcome::Cached(existing);
    }

    let Some(desc) = collision.geometry().and_then(build_descriptor) else {
        debug!(source = lock.resource_id(), "collision mesh has no usable geometry");
        return BuildOutcome::NoGeometry;
    };

    debug!(
        name = %name,
        vertices = desc.mesh_buffer().vertex_count(),
        triangles = desc.mesh_buffer().triangle_count(),
        "built collision visualisation mesh"
    );
    BuildOutcome::Built(meshes.create(
        &name,
        MeshResource::from(desc),
        DERIVED_MESH_DESCRIPTION,
    ))
}

/// Assemble a single sub-mesh render mesh from collision geometry.
///
/// Returns `None` if a face or triangle refers outside the source buffers.
#[must_use]
pub fn build_descriptor(geometry: &CollisionGeometry) -> Option<MeshResourceDescriptor> {
    let mut desc = MeshResourceDescriptor::new();
    let triangle_count = match geometry {
        CollisionGeometry::Convex(hull) => fill_from_hull(&mut desc, hull)?,
        CollisionGeometry::Triangles(mesh) => fill_from_triangles(&mut desc, mesh)?,
    };

    desc.add_sub_mesh(triangle_count, 0, 0);
    desc.compute_bounds();
    desc.set_material(0, COLLISION_MESH_MATERIAL);
    Some(desc)
}

fn fill_from_hull(desc: &mut MeshResourceDescriptor, hull: &ConvexHull) -> Option<u32> {
    let vertex_count = hull.vertices.len();
    let in_range = |index: u32| (index as usize) < vertex_count;

    let mut faces = Vec::with_capacity(hull.polygons.len());
    for polygon in &hull.polygons {
        let start = polygon.index_base as usize;
        let end = start.checked_add(polygon.vertex_count as usize)?;
        let face = hull.indices.get(start..end)?;
        if !face.iter().all(|&i| in_range(i)) {
            return None;
        }
        faces.push(face);
    }

    let triangle_count: u32 = hull
        .polygons
        .iter()
        .map(|p| fan_triangle_count(p.vertex_count))
        .sum();

    let buffer = desc.mesh_buffer_mut();
    buffer.allocate_streams(vertex_count, triangle_count as usize);
    for (v, position) in hull.vertices.iter().enumerate() {
        buffer.set_vertex_position(v, *position);
    }

    let mut triangle = 0;
    for face in faces {
        for pair in face.windows(2).skip(1) {
            buffer.set_triangle_indices(triangle, face[0], pair[0], pair[1]);
            triangle += 1;
        }
    }
    Some(triangle_count)
}

fn fill_from_triangles(desc: &mut MeshResourceDescriptor, mesh: &TriangleMesh) -> Option<u32> {
    let vertex_count = mesh.vertices.len();
    let triangle_count = mesh.indices.triangle_count();

    let buffer = desc.mesh_buffer_mut();
    buffer.allocate_streams(vertex_count, triangle_count);
    for (v, position) in mesh.vertices.iter().enumerate() {
        buffer.set_vertex_position(v, *position);
    }
    for t in 0..triangle_count {
        let [a, b, c] = mesh.indices.triangle(t)?;
        if [a, b, c].iter().any(|&i| i as usize >= vertex_count) {
            return None;
        }
        buffer.set_triangle_indices(t, a, b, c);
    }
    u32::try_from(triangle_count).ok()
}
