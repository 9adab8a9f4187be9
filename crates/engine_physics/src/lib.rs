//! # engine_physics
//!
//! Physics-side components of the runtime.
//!
//! - [`StaticActorComponent`]: a static actor and the collision mesh it is
//!   cooked from.
//! - [`VisColMeshComponent`]: draws a collision mesh by deriving a render
//!   mesh from it on demand, see [`col_mesh_builder`].
//! - [`render`]: render data records and their batching and sort keys.

pub mod col_mesh_builder;
pub mod render;
pub mod static_actor;
pub mod vis_col_mesh;

pub use col_mesh_builder::{BuildOutcome, COLLISION_MESH_MATERIAL};
pub use render::{ExtractRenderDataMsg, MeshRenderData, RenderDataCaching, RenderDataCategory};
pub use static_actor::{StaticActorComponent, StaticActorManager};
pub use vis_col_mesh::{VisColMeshComponent, VisColMeshManager, VisColMeshStats};
