//! Bounding boxes of robot geometry.

use crate::urdf::Shape;
use glam::{Mat3, Mat4, Vec3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Inverted box holding nothing; the identity of [`union`](Self::union).
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    /// Box spanning `min..=max`.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered on the origin.
    pub fn from_half_extents(half: Vec3) -> Self {
        Self::new(-half, half)
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Smallest box holding both `self` and `other`.
    pub fn union(self, other: Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Axis-aligned box around this box placed by `transform`.
    pub fn transformed(&self, transform: &Mat4) -> Aabb {
        let center = transform.transform_point3((self.min + self.max) * 0.5);
        let linear = Mat3::from_mat4(*transform);
        let abs = Mat3::from_cols(linear.x_axis.abs(), linear.y_axis.abs(), linear.z_axis.abs());
        let half = abs * (self.size() * 0.5);
        Aabb::new(center - half, center + half)
    }

    /// True when `point` lies inside or on the boundary.
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Local bounding box of a shape.
///
/// Cylinders and capsules run along z, as in URDF. Mesh files are not decoded,
/// so they report an empty box at their origin.
pub fn shape_aabb(shape: &Shape) -> Aabb {
    let half = match shape {
        Shape::Box { size } => *size * 0.5,
        Shape::Cylinder { radius, length } => Vec3::new(*radius, *radius, length * 0.5),
        Shape::Capsule { radius, length } => {
            Vec3::new(*radius, *radius, length * 0.5 + radius)
        }
        Shape::Sphere { radius } => Vec3::splat(*radius),
        Shape::Mesh { .. } => Vec3::ZERO,
    };
    Aabb::from_half_extents(half)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_union() {
        let a = Aabb::new(Vec3::new(1.0, -2.0, 0.0), Vec3::new(2.0, 0.0, 0.5));
        let b = Aabb::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.25));
        let both = a.union(b);
        assert_eq!(both.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(both.max, Vec3::new(2.0, 3.0, 0.5));
        assert_eq!(both.size(), Vec3::new(3.0, 5.0, 0.5));
        assert_eq!(Aabb::EMPTY.union(a), a);
    }

    #[test]
    fn test_transformed_follows_rotation() {
        // A 2 x 1 x 1 box turned a quarter about z becomes 1 x 2 x 1.
        let aabb = Aabb::from_half_extents(Vec3::new(1.0, 0.5, 0.5));
        let world = Mat4::from_rotation_translation(
            glam::Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::new(0.0, 0.0, 3.0),
        );
        let moved = aabb.transformed(&world);
        assert!((moved.min - Vec3::new(-0.5, -1.0, 2.5)).length() < 1e-5);
        assert!((moved.max - Vec3::new(0.5, 1.0, 3.5)).length() < 1e-5);
    }

    #[test]
    fn test_shape_bounds() {
        let aabb = shape_aabb(&Shape::Box {
            size: Vec3::new(2.0, 4.0, 6.0),
        });
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));

        let aabb = shape_aabb(&Shape::Cylinder {
            radius: 0.5,
            length: 2.0,
        });
        assert_eq!(aabb.max, Vec3::new(0.5, 0.5, 1.0));

        let aabb = shape_aabb(&Shape::Capsule {
            radius: 0.5,
            length: 2.0,
        });
        assert_eq!(aabb.max, Vec3::new(0.5, 0.5, 1.5));

        let aabb = shape_aabb(&Shape::Mesh {
            path: PathBuf::from("m.stl"),
            scale: Vec3::ONE,
        });
        assert_eq!(aabb.size(), Vec3::ZERO);
    }

    #[test]
    fn test_contains() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!(aabb.contains(Vec3::ZERO));
        assert!(aabb.contains(Vec3::splat(1.0)));
        assert!(!aabb.contains(Vec3::new(0.0, 1.5, 0.0)));
    }
}
