//! Render data emitted by extraction.

use engine_component::{ComponentHandle, ObjectId};
use engine_math::{BoundingBoxSphere, Transform3D};
use engine_resource::fnv1a_32_words;
use serde::Serialize;

/// Render pass a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RenderDataCategory {
    /// Opaque geometry lit by the scene.
    LitOpaque,
}

/// Whether the renderer may reuse a record across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RenderDataCaching {
    /// Re-extract every frame.
    Never,
    /// Reuse while the owner is static.
    IfStatic,
}

/// One draw of one sub-mesh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshRenderData {
    /// Object being drawn.
    pub owner: ObjectId,
    /// Component that emitted the record.
    pub component: ComponentHandle,
    /// Owner's global transform.
    pub global_transform: Transform3D,
    /// Owner's global bounds.
    pub global_bounds: Option<BoundingBoxSphere>,
    /// Mesh resource id.
    pub mesh: String,
    /// Material resource id, `None` for an unassigned slot.
    pub material: Option<String>,
    /// Sub-mesh index.
    pub sub_mesh_index: u32,
    /// Records with equal batch ids can be drawn together.
    pub batch_id: u32,
    /// Ordering within the category.
    pub sort_key: u32,
    /// Render pass.
    pub category: RenderDataCategory,
    /// Cross-frame reuse policy.
    pub caching: RenderDataCaching,
}

/// Collects render data from components for one view.
#[derive(Debug, Default)]
pub struct ExtractRenderDataMsg {
    records: Vec<MeshRenderData>,
}

impl ExtractRenderDataMsg {
    /// An empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record.
    pub fn add_render_data(&mut self, data: MeshRenderData) {
        self.records.push(data);
    }

    /// Records in the order they were added.
    #[must_use]
    pub fn records(&self) -> &[MeshRenderData] {
        &self.records
    }

    /// Records sorted by category, then sort key.
    #[must_use]
    pub fn into_sorted(mut self) -> Vec<MeshRenderData> {
        self.records
            .sort_by_key(|r| (r.category as u8, r.sort_key, r.batch_id));
        self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Batch id of a draw: mesh, material, part and winding all have to match.
#[must_use]
pub fn batch_id(mesh_hash: u32, material_hash: u32, part_index: u32, flip_winding: bool) -> u32 {
    fnv1a_32_words(&[mesh_hash, material_hash, part_index, u32::from(flip_winding)])
}

/// Sorts by material first, then mesh. The low bit carries the winding.
#[must_use]
pub fn sort_key(material_hash: u32, mesh_hash: u32, flip_winding: bool) -> u32 {
    (material_hash << 16) | (mesh_hash & 0xFFFE) | u32::from(flip_winding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_layout() {
        assert_eq!(sort_key(0x0000_0001, 0x0000_00FF, false), 0x0001_00FE);
        assert_eq!(sort_key(0x0000_0001, 0x0000_00FF, true), 0x0001_00FF);
        // Material bits above 16 are shifted out.
        assert_eq!(sort_key(0xABCD_0002, 0, false), 0x0002_0000);
    }

    #[test]
    fn test_batch_id_depends_on_every_input() {
        let base = batch_id(1, 2, 0, false);
        assert_eq!(base, batch_id(1, 2, 0, false));
        assert_ne!(base, batch_id(9, 2, 0, false));
        assert_ne!(base, batch_id(1, 9, 0, false));
        assert_ne!(base, batch_id(1, 2, 1, false));
        assert_ne!(base, batch_id(1, 2, 0, true));
    }

    #[test]
    fn test_records_serialize_to_json() {
        let mut msg = ExtractRenderDataMsg::new();
        msg.add_render_data(MeshRenderData {
            owner: ObjectId(1),
            component: ComponentHandle::INVALID,
            global_transform: Transform3D::IDENTITY,
            global_bounds: None,
            mesh: "rock_0_VisColMesh".to_string(),
            material: None,
            sub_mesh_index: 0,
            batch_id: 7,
            sort_key: 3,
            category: RenderDataCategory::LitOpaque,
            caching: RenderDataCaching::IfStatic,
        });

        let json = serde_json::to_value(msg.records()).unwrap();
        assert_eq!(json[0]["mesh"], "rock_0_VisColMesh");
        assert_eq!(json[0]["category"], "LitOpaque");
        assert_eq!(json[0]["caching"], "IfStatic");
    }
}
