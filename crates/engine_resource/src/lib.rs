//! # engine_resource
//!
//! Named, reference-counted resources and their change notifications.
//!
//! This crate provides:
//!
//! - [`ResourceHandle`]: shared handle to a cache entry, with consistent
//!   content snapshots via [`ResourceLock`].
//! - [`ResourceCache`]: id-keyed cache for one resource kind.
//! - [`ResourceManager`]: one cache per kind, sharing [`ResourceEvents`].
//! - [`ResourceEvents`] / [`Subscription`]: publish/subscribe channel with
//!   scoped handler registration.
//! - [`CollisionMeshResource`] and [`MeshResource`]: the source and derived
//!   artifacts of collision visualisation.

pub mod cache;
pub mod collision;
pub mod events;
pub mod handle;
pub mod hash;
pub mod manager;
pub mod mesh;

pub use cache::ResourceCache;
pub use collision::{
    CollisionGeometry, CollisionMeshResource, ConvexHull, HullPolygon, TriangleIndices,
    TriangleMesh,
};
pub use events::{ResourceEvent, ResourceEventKind, ResourceEvents, Subscription};
pub use handle::{LoadState, Resource, ResourceHandle, ResourceLock};
pub use hash::{fnv1a_32, fnv1a_32_words};
pub use manager::ResourceManager;
pub use mesh::{MeshBufferDescriptor, MeshResource, MeshResourceDescriptor, SubMesh};
