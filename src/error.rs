//! Error types for robot loading and joint animation.

use crate::scene::NodeId;

/// Errors raised while turning a parsed URDF into a robot description.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The URDF has no root link (every link is some joint's child).
    #[error("no root link found")]
    NoRootLink,

    /// The URDF declares no links at all.
    #[error("robot {0} has no links")]
    NoLinks(String),

    /// The background load thread went away without reporting a result.
    #[error("load worker for {0} exited without a result")]
    WorkerLost(String),
}

/// A per-joint problem that made the animator skip a joint for one frame.
///
/// These never abort a tick. They are collected in
/// [`TickReport`](crate::animation::TickReport) and logged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnimationIssue {
    /// The joint carries no motion limit (fixed, continuous, root, ...).
    #[error("joint {0} has no motion limit")]
    MissingLimit(String),

    /// `upper <= lower`, so the oscillation period is zero or negative.
    #[error("joint {name} has degenerate limit [{lower}, {upper}]")]
    DegenerateLimit { name: String, lower: f32, upper: f32 },

    /// The joint axis is the zero vector.
    #[error("joint {0} has no rotation axis")]
    NoAxis(String),

    /// The lookup table points at a node that is not in the tree.
    #[error("joint {name} points at detached node {node:?}")]
    DetachedNode { name: String, node: NodeId },
}

impl AnimationIssue {
    /// Name of the joint the issue was raised for.
    pub fn joint_name(&self) -> &str {
        match self {
            Self::MissingLimit(name) | Self::NoAxis(name) => name,
            Self::DegenerateLimit { name, .. } | Self::DetachedNode { name, .. } => name,
        }
    }
}
