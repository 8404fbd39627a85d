//! Rendering components for ECS entities.

use crate::scene::{MeshNode, NodeId};
use crate::urdf::{GeometryHandle, MaterialHandle};

/// Geometry + material of a robot link. Handles are shared with the mesh tree.
pub struct MeshRenderer {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    /// Depth-cycling debug color.
    pub debug_color: [f32; 3],
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshRenderer {
    /// Renderer for a mesh node.
    pub fn from_node(node: &MeshNode) -> Self {
        Self {
            geometry: node.geometry.clone(),
            material: node.material.clone(),
            debug_color: node.debug_color(),
            visible: true,
            cast_shadow: node.cast_shadow,
            receive_shadow: node.receive_shadow,
        }
    }
}

/// The mesh-tree node an entity was spawned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotNode(pub NodeId);

/// Link name of a spawned entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkName(pub String);
