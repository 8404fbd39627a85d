//! Rein URDF viewer core
//!
//! Turns URDF robot descriptions into renderable scene-graph trees and
//! animates their revolute joints.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **urdf** - URDF loading into a robot description tree
//! 2. **scene** - Mesh tree construction from a robot description
//! 3. **animation** - Per-frame joint-angle animation
//! 4. **viewer** - Load, build and animate pipeline for several robots
//! 5. **ecs** - hecs ECS integration (feature = "ecs")

pub mod animation;
pub mod error;
pub mod scene;
pub mod urdf;
pub mod viewer;

#[cfg(feature = "ecs")]
pub mod ecs;

// Re-export commonly used types
pub use error::{AnimationIssue, LoadError};

pub use urdf::{
    DescriptionNode, GeometryHandle, GeometryResolver, JointKind, JointLimit, JointNode, LinkNode,
    Material, MaterialHandle, MeshFileResolver, PendingLoad, PrimitiveResolver, RobotDescription,
    Shape, UrdfLoader, VisualNode,
};

pub use scene::{
    rpy_to_quat, Aabb, MeshNode, MeshTree, NodeId, NodeLookup, RobotScene, RobotTreeWalker,
    DEBUG_PALETTE, PALETTE_SIZE,
};

pub use animation::{joint_angle, AnimationTargets, JointAnimator, RotationAxis, TickReport};

pub use viewer::{LiveRobot, RobotId, RobotViewer, ViewerEvent, ViewerSettings};

#[cfg(feature = "ecs")]
pub use ecs::prelude::*;

// Re-export glam for convenience
pub use glam;
