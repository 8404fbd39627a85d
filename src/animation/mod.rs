//! Joint animation
//!
//! Per-frame joint-angle updates driven by elapsed time.

mod animator;

pub use animator::{joint_angle, AnimationTargets, JointAnimator, RotationAxis, TickReport};
