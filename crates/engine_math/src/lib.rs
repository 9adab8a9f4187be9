//! # engine_math
//!
//! Math types for the component runtime. Re-exports [`glam`] for linear
//! algebra and defines the spatial types owner objects expose to their
//! components: [`Transform3D`] and [`BoundingBoxSphere`].

pub mod bounds;
pub mod transform;

// Re-export glam types for convenience.
pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

pub use bounds::BoundingBoxSphere;
pub use transform::Transform3D;
