//! Physics collision mesh resources.
//!
//! A collision mesh is the source artifact collision visualisation is
//! derived from. It carries one of two geometry representations, or none
//! when the authored data had nothing usable.

use engine_math::Vec3;

use crate::handle::Resource;

/// One face of a convex hull: `vertex_count` entries of the hull's index
/// buffer starting at `index_base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HullPolygon {
    /// First entry in the index buffer.
    pub index_base: u32,
    /// Number of vertices of the face.
    pub vertex_count: u32,
}

/// A convex hull as a vertex list plus polygonal faces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvexHull {
    /// Hull vertices.
    pub vertices: Vec<Vec3>,
    /// Indices into `vertices`, grouped per face by `polygons`.
    pub indices: Vec<u32>,
    /// Faces, in winding order.
    pub polygons: Vec<HullPolygon>,
}

impl ConvexHull {
    /// An axis-aligned box hull with six quad faces.
    #[must_use]
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        let vertices = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        let faces: [[u32; 4]; 6] = [
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [2, 3, 7, 6],
            [1, 2, 6, 5],
            [0, 4, 7, 3],
        ];
        let mut hull = Self {
            vertices,
            ..Self::default()
        };
        for face in faces {
            hull.push_polygon(&face);
        }
        hull
    }

    /// Append a face given by vertex indices.
    pub fn push_polygon(&mut self, face: &[u32]) {
        let index_base = u32::try_from(self.indices.len()).unwrap_or(u32::MAX);
        let vertex_count = u32::try_from(face.len()).unwrap_or(u32::MAX);
        self.indices.extend_from_slice(face);
        self.polygons.push(HullPolygon {
            index_base,
            vertex_count,
        });
    }
}

/// Triangle index storage, as authored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriangleIndices {
    /// 16-bit index triples.
    U16(Vec<u16>),
    /// 32-bit index triples.
    U32(Vec<u32>),
}

impl TriangleIndices {
    /// Number of complete triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        match self {
            Self::U16(i) => i.len() / 3,
            Self::U32(i) => i.len() / 3,
        }
    }

    /// Indices of triangle `t`, widened to 32 bits.
    #[must_use]
    pub fn triangle(&self, t: usize) -> Option<[u32; 3]> {
        match self {
            Self::U16(i) => {
                let tri = i.get(t * 3..t * 3 + 3)?;
                Some([u32::from(tri[0]), u32::from(tri[1]), u32::from(tri[2])])
            }
            Self::U32(i) => {
                let tri = i.get(t * 3..t * 3 + 3)?;
                Some([tri[0], tri[1], tri[2]])
            }
        }
    }
}

/// An arbitrary (possibly concave) triangle mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    /// Mesh vertices.
    pub vertices: Vec<Vec3>,
    /// Index triples into `vertices`.
    pub indices: TriangleIndices,
}

/// The geometry representations a collision mesh can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionGeometry {
    /// A convex hull with polygonal faces.
    Convex(ConvexHull),
    /// A triangle soup.
    Triangles(TriangleMesh),
}

/// A cooked physics collision mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionMeshResource {
    geometry: Option<CollisionGeometry>,
}

impl CollisionMeshResource {
    /// A collision mesh with the given geometry.
    #[must_use]
    pub fn new(geometry: CollisionGeometry) -> Self {
        Self {
            geometry: Some(geometry),
        }
    }

    /// A collision mesh without usable geometry.
    #[must_use]
    pub fn empty() -> Self {
        Self { geometry: None }
    }

    /// The geometry, if any.
    #[must_use]
    pub fn geometry(&self) -> Option<&CollisionGeometry> {
        self.geometry.as_ref()
    }
}

impl Resource for CollisionMeshResource {
    const KIND: &'static str = "CollisionMesh";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_has_six_quads() {
        let hull = ConvexHull::cuboid(Vec3::ONE);
        assert_eq!(hull.vertices.len(), 8);
        assert_eq!(hull.polygons.len(), 6);
        assert!(hull.polygons.iter().all(|p| p.vertex_count == 4));
        assert_eq!(hull.indices.len(), 24);
        assert_eq!(hull.polygons[5].index_base, 20);
    }

    #[test]
    fn test_triangle_indices_widths() {
        let narrow = TriangleIndices::U16(vec![0, 1, 2, 2, 3]);
        assert_eq!(narrow.triangle_count(), 1);
        assert_eq!(narrow.triangle(0), Some([0, 1, 2]));
        assert_eq!(narrow.triangle(1), None);

        let wide = TriangleIndices::U32(vec![70_000, 1, 2]);
        assert_eq!(wide.triangle(0), Some([70_000, 1, 2]));
    }

    #[test]
    fn test_empty_collision_mesh() {
        assert!(CollisionMeshResource::empty().geometry().is_none());
    }
}
