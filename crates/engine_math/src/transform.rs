//! 3D transform type.
//!
//! [`Transform3D`] is the global transform an owner object exposes to its
//! components. Render extraction reads it to decide whether triangle winding
//! has to be flipped.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A 3D transform representing position, rotation, and per-axis scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform3D {
    /// World-space position.
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Per-axis scale. Negative components mirror the object.
    pub scale: Vec3,
}

impl Transform3D {
    /// The identity transform: origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a new transform with the given position and default rotation/scale.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Create a new transform with position, rotation and scale.
    #[must_use]
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Compute the 4×4 model matrix for this transform.
    #[must_use]
    pub fn to_matrix(&self) -> glam::Mat4 {
        glam::Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Transform a point from local into global space.
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (point * self.scale) + self.position
    }

    /// Returns `true` if the scale mirrors geometry, i.e. an odd number of
    /// axes is negatively scaled.
    #[must_use]
    pub fn contains_negative_scale(&self) -> bool {
        self.scale.x * self.scale.y * self.scale.z < 0.0
    }

    /// Translate the transform by the given offset.
    #[must_use]
    pub fn translated(mut self, offset: Vec3) -> Self {
        self.position += offset;
        self
    }

    /// Apply a per-axis scale.
    #[must_use]
    pub fn scaled(mut self, factor: Vec3) -> Self {
        self.scale *= factor;
        self
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform() {
        let t = Transform3D::IDENTITY;
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.to_matrix(), glam::Mat4::IDENTITY);
    }

    #[test]
    fn test_transform_point() {
        let t = Transform3D::from_position(Vec3::new(1.0, 0.0, 0.0)).scaled(Vec3::splat(2.0));
        assert_eq!(t.transform_point(Vec3::new(1.0, 1.0, 1.0)), Vec3::new(3.0, 2.0, 2.0));
    }

    #[test]
    fn test_negative_scale_detection() {
        assert!(!Transform3D::IDENTITY.contains_negative_scale());
        let mirrored = Transform3D::IDENTITY.scaled(Vec3::new(-1.0, 1.0, 1.0));
        assert!(mirrored.contains_negative_scale());
        // Two mirrored axes cancel out.
        let rotated = Transform3D::IDENTITY.scaled(Vec3::new(-1.0, -1.0, 1.0));
        assert!(!rotated.contains_negative_scale());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let t = Transform3D::from_position(Vec3::new(1.0, 2.0, 3.0));
        let bytes = rmp_serde::to_vec(&t).unwrap();
        let restored: Transform3D = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(t, restored);
    }
}
