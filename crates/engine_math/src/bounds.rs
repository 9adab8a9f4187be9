//! Combined box/sphere bounding volume.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::transform::Transform3D;

/// An axis-aligned box and an enclosing sphere sharing the same center.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBoxSphere {
    /// Center of both the box and the sphere.
    pub center: Vec3,
    /// Half size of the box along each axis.
    pub half_extents: Vec3,
    /// Radius of the sphere, never smaller than the box diagonal.
    pub sphere_radius: f32,
}

impl BoundingBoxSphere {
    /// Build the tightest box around `points` and a sphere around its center.
    ///
    /// Returns `None` for an empty point set.
    #[must_use]
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let points: Vec<Vec3> = points.into_iter().collect();
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));

        let center = (min + max) * 0.5;
        let sphere_radius = points
            .iter()
            .map(|p| p.distance(center))
            .fold(0.0_f32, f32::max);

        Some(Self {
            center,
            half_extents: (max - min) * 0.5,
            sphere_radius,
        })
    }

    /// Minimum corner of the box.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    /// Maximum corner of the box.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// The eight box corners.
    #[must_use]
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min(), self.max());
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Smallest volume enclosing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let min = self.min().min(other.min());
        let max = self.max().max(other.max());
        let center = (min + max) * 0.5;
        let sphere_radius = (self.center.distance(center) + self.sphere_radius)
            .max(other.center.distance(center) + other.sphere_radius);
        Self {
            center,
            half_extents: (max - min) * 0.5,
            sphere_radius,
        }
    }

    /// Bounds of this volume after applying `transform`.
    #[must_use]
    pub fn transformed(&self, transform: &Transform3D) -> Self {
        let corners = self.corners().map(|c| transform.transform_point(c));
        Self::from_points(corners).unwrap_or(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_empty() {
        assert!(BoundingBoxSphere::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_from_points_unit_cube() {
        let b = BoundingBoxSphere::from_points([Vec3::splat(-1.0), Vec3::splat(1.0)]).unwrap();
        assert_eq!(b.center, Vec3::ZERO);
        assert_eq!(b.half_extents, Vec3::ONE);
        assert!((b.sphere_radius - 3.0_f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_union_encloses_both() {
        let a = BoundingBoxSphere::from_points([Vec3::ZERO, Vec3::ONE]).unwrap();
        let b = BoundingBoxSphere::from_points([Vec3::splat(2.0), Vec3::splat(3.0)]).unwrap();
        let u = a.union(&b);
        assert_eq!(u.min(), Vec3::ZERO);
        assert_eq!(u.max(), Vec3::splat(3.0));
        assert!(u.sphere_radius >= u.half_extents.length() - 1e-5);
    }

    #[test]
    fn test_transformed_translates_center() {
        let b = BoundingBoxSphere::from_points([Vec3::splat(-1.0), Vec3::splat(1.0)]).unwrap();
        let t = Transform3D::from_position(Vec3::new(10.0, 0.0, 0.0));
        let moved = b.transformed(&t);
        assert!((moved.center - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-5);
        assert!((moved.half_extents - Vec3::ONE).length() < 1e-5);
    }
}
