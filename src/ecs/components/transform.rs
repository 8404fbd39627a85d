//! Transform components for ECS entities.

use crate::scene::{rpy_to_quat, MeshNode};
use glam::{Mat4, Quat, Vec3};

/// Local-space transform. Stores position, rotation, and scale separately.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Create an identity transform.
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Create a transform from a position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Local placement of a mesh node.
    pub fn from_node(node: &MeshNode) -> Self {
        Self {
            position: node.position,
            rotation: rpy_to_quat(node.rotation),
            scale: Vec3::ONE,
        }
    }

    /// Convert to a 4x4 matrix (translation * rotation * scale).
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// World-space transform matrix. Updated by [`transform_system`](crate::ecs::systems::transform_system).
#[derive(Debug, Clone, Copy)]
pub struct GlobalTransform(pub Mat4);

impl Default for GlobalTransform {
    fn default() -> Self {
        Self(Mat4::IDENTITY)
    }
}

/// Reference to a parent entity.
pub struct Parent(pub hecs::Entity);

/// List of child entities.
pub struct Children(pub Vec<hecs::Entity>);
