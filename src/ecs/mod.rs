//! Entity Component System integration with hecs.
//!
//! Spawns a robot's mesh tree as a parent/child entity hierarchy and keeps
//! entity transforms in step with the animated tree.

pub mod bridge;
pub mod components;
pub mod systems;

pub mod prelude {
    pub use super::bridge::*;
    pub use super::components::*;
    pub use super::systems::{sync_robot_transforms, transform_system};
}
