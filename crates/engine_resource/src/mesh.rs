//! Render mesh resources.
//!
//! A [`MeshResourceDescriptor`] is filled in by whoever produces a mesh and
//! then frozen into an immutable [`MeshResource`].

use engine_math::{BoundingBoxSphere, Vec3};

use crate::handle::Resource;

/// A contiguous range of triangles drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMesh {
    /// Number of triangles in the range.
    pub triangle_count: u32,
    /// First triangle of the range.
    pub first_triangle: u32,
    /// Slot in the mesh's material list.
    pub material_index: u32,
}

/// Position stream and triangle index buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBufferDescriptor {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl MeshBufferDescriptor {
    /// Size the buffers, zero-filled.
    pub fn allocate_streams(&mut self, vertex_count: usize, triangle_count: usize) {
        self.positions = vec![Vec3::ZERO; vertex_count];
        self.triangles = vec![[0; 3]; triangle_count];
    }

    /// Write one vertex position. Returns `false` if `index` is out of range.
    pub fn set_vertex_position(&mut self, index: usize, position: Vec3) -> bool {
        match self.positions.get_mut(index) {
            Some(slot) => {
                *slot = position;
                true
            }
            None => false,
        }
    }

    /// Write one triangle. Returns `false` if `triangle` is out of range.
    pub fn set_triangle_indices(&mut self, triangle: usize, a: u32, b: u32, c: u32) -> bool {
        match self.triangles.get_mut(triangle) {
            Some(slot) => {
                *slot = [a, b, c];
                true
            }
            None => false,
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Triangle index triples.
    #[must_use]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }
}

/// Everything needed to create a [`MeshResource`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshResourceDescriptor {
    buffer: MeshBufferDescriptor,
    sub_meshes: Vec<SubMesh>,
    materials: Vec<String>,
    bounds: Option<BoundingBoxSphere>,
}

impl MeshResourceDescriptor {
    /// An empty descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The vertex and index buffers.
    #[must_use]
    pub fn mesh_buffer(&self) -> &MeshBufferDescriptor {
        &self.buffer
    }

    /// The vertex and index buffers, for filling in.
    pub fn mesh_buffer_mut(&mut self) -> &mut MeshBufferDescriptor {
        &mut self.buffer
    }

    /// Append a sub-mesh.
    pub fn add_sub_mesh(&mut self, triangle_count: u32, first_triangle: u32, material_index: u32) {
        self.sub_meshes.push(SubMesh {
            triangle_count,
            first_triangle,
            material_index,
        });
    }

    /// Assign a material id to a slot, growing the list as needed.
    pub fn set_material(&mut self, slot: usize, material: &str) {
        if self.materials.len() <= slot {
            self.materials.resize(slot + 1, String::new());
        }
        self.materials[slot] = material.to_string();
    }

    /// Compute bounds over all vertex positions.
    pub fn compute_bounds(&mut self) {
        self.bounds = BoundingBoxSphere::from_points(self.buffer.positions.iter().copied());
    }

    /// Bounds computed by [`MeshResourceDescriptor::compute_bounds`].
    #[must_use]
    pub fn bounds(&self) -> Option<BoundingBoxSphere> {
        self.bounds
    }
}

/// An immutable render mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshResource {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    sub_meshes: Vec<SubMesh>,
    materials: Vec<String>,
    bounds: Option<BoundingBoxSphere>,
}

impl MeshResource {
    /// Vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Triangle index triples.
    #[must_use]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Sub-mesh ranges.
    #[must_use]
    pub fn sub_meshes(&self) -> &[SubMesh] {
        &self.sub_meshes
    }

    /// Material ids by slot.
    #[must_use]
    pub fn materials(&self) -> &[String] {
        &self.materials
    }

    /// Bounds of all vertices, `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<BoundingBoxSphere> {
        self.bounds
    }
}

impl From<MeshResourceDescriptor> for MeshResource {
    fn from(desc: MeshResourceDescriptor) -> Self {
        Self {
            positions: desc.buffer.positions,
            triangles: desc.buffer.triangles,
            sub_meshes: desc.sub_meshes,
            materials: desc.materials,
            bounds: desc.bounds,
        }
    }
}

impl Resource for MeshResource {
    const KIND: &'static str = "Mesh";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_writes_are_bounds_checked() {
        let mut buffer = MeshBufferDescriptor::default();
        buffer.allocate_streams(3, 1);
        assert!(buffer.set_vertex_position(2, Vec3::ONE));
        assert!(!buffer.set_vertex_position(3, Vec3::ONE));
        assert!(buffer.set_triangle_indices(0, 0, 1, 2));
        assert!(!buffer.set_triangle_indices(1, 0, 1, 2));
        assert_eq!(buffer.triangles(), &[[0, 1, 2]]);
    }

    #[test]
    fn test_descriptor_into_resource() {
        let mut desc = MeshResourceDescriptor::new();
        desc.mesh_buffer_mut().allocate_streams(3, 1);
        desc.mesh_buffer_mut().set_vertex_position(0, Vec3::ZERO);
        desc.mesh_buffer_mut().set_vertex_position(1, Vec3::X);
        desc.mesh_buffer_mut().set_vertex_position(2, Vec3::Y);
        desc.mesh_buffer_mut().set_triangle_indices(0, 0, 1, 2);
        desc.add_sub_mesh(1, 0, 0);
        desc.set_material(0, "Materials/Test.material");
        desc.compute_bounds();

        let mesh = MeshResource::from(desc);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.sub_meshes().len(), 1);
        assert_eq!(mesh.materials(), &["Materials/Test.material".to_string()]);
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min(), Vec3::ZERO);
        assert_eq!(bounds.max(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_set_material_grows_slots() {
        let mut desc = MeshResourceDescriptor::new();
        desc.set_material(2, "m");
        let mesh = MeshResource::from(desc);
        assert_eq!(mesh.materials().len(), 3);
        assert!(mesh.materials()[0].is_empty());
    }
}
