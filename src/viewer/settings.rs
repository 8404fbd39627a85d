//! Viewer settings
//!
//! Per-robot placement, shadow and animation configuration.

use crate::animation::AnimationTargets;
use glam::Vec3;

/// Settings for placing and animating one robot.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSettings {
    /// Position of the robot's base in the scene.
    pub origin_position: Vec3,
    /// Rotation of the robot's base (roll, pitch, yaw in radians).
    pub origin_rotation: Vec3,
    /// Whether mesh nodes cast shadows.
    pub cast_shadow: bool,
    /// Whether mesh nodes receive shadows.
    pub receive_shadow: bool,
    /// Joints driven by the animator.
    pub targets: AnimationTargets,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            origin_position: Vec3::ZERO,
            origin_rotation: Vec3::ZERO,
            cast_shadow: true,
            receive_shadow: true,
            targets: AnimationTargets::All,
        }
    }
}

impl ViewerSettings {
    /// Create new settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base position.
    pub fn position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.origin_position = Vec3::new(x, y, z);
        self
    }

    /// Set the base rotation (roll, pitch, yaw).
    pub fn rotation(mut self, roll: f32, pitch: f32, yaw: f32) -> Self {
        self.origin_rotation = Vec3::new(roll, pitch, yaw);
        self
    }

    /// Set whether mesh nodes cast shadows.
    pub fn cast_shadow(mut self, cast_shadow: bool) -> Self {
        self.cast_shadow = cast_shadow;
        self
    }

    /// Set whether mesh nodes receive shadows.
    pub fn receive_shadow(mut self, receive_shadow: bool) -> Self {
        self.receive_shadow = receive_shadow;
        self
    }

    /// Set the animated joints.
    pub fn targets(mut self, targets: AnimationTargets) -> Self {
        self.targets = targets;
        self
    }
}
