//! Robot scene graph
//!
//! Mesh nodes mirroring a robot's joint/link tree, stored in an arena owned
//! by the rendering side and addressed by [`NodeId`].

mod bounds;
mod walker;

pub use bounds::{shape_aabb, Aabb};
pub use walker::{RobotScene, RobotTreeWalker};

use crate::urdf::{GeometryHandle, JointLimit, MaterialHandle};
use glam::{EulerRot, Mat4, Quat, Vec3};
use std::collections::BTreeMap;

/// Number of entries in the depth-cycling debug palette.
pub const PALETTE_SIZE: usize = 7;

/// Debug colors indexed by [`MeshNode::color_index`].
pub const DEBUG_PALETTE: [[f32; 3]; PALETTE_SIZE] = [
    [0.90, 0.30, 0.25],
    [0.95, 0.60, 0.20],
    [0.95, 0.85, 0.25],
    [0.35, 0.75, 0.35],
    [0.25, 0.60, 0.85],
    [0.40, 0.35, 0.80],
    [0.70, 0.40, 0.75],
];

/// Index of a node in a [`MeshTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Name-to-node table used to target joints at runtime.
///
/// Ordered by name, so joints are always visited in the same order.
pub type NodeLookup = BTreeMap<String, NodeId>;

/// Rotation from URDF roll/pitch/yaw (applied as Rz * Ry * Rx).
pub fn rpy_to_quat(rpy: Vec3) -> Quat {
    Quat::from_euler(EulerRot::ZYX, rpy.z, rpy.y, rpy.x)
}

/// A renderable node: one per robot base and per kept joint.
#[derive(Debug, Clone)]
pub struct MeshNode {
    /// Link name.
    pub name: String,
    /// Placement relative to the parent node.
    pub position: Vec3,
    /// Rotation relative to the parent node (roll, pitch, yaw). Animated.
    pub rotation: Vec3,
    /// Shared geometry.
    pub geometry: GeometryHandle,
    /// Shared material.
    pub material: MaterialHandle,
    /// Rotation about z at construction time; animation baseline.
    pub start_rotation: f32,
    /// Animation range copied from the joint.
    pub limit: Option<JointLimit>,
    /// Joint axis; `None` on the root.
    pub axis: Option<Vec3>,
    /// Depth-cycling debug color index.
    pub color_index: usize,
    /// Whether the geometry casts shadows.
    pub cast_shadow: bool,
    /// Whether the geometry receives shadows.
    pub receive_shadow: bool,
    /// Parent node; `None` on the root.
    pub parent: Option<NodeId>,
    /// Children in source order.
    pub children: Vec<NodeId>,
}

impl MeshNode {
    /// Debug color for this node's depth.
    pub fn debug_color(&self) -> [f32; 3] {
        DEBUG_PALETTE[self.color_index % PALETTE_SIZE]
    }

    /// Transform relative to the parent node.
    pub fn local_transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(rpy_to_quat(self.rotation), self.position)
    }
}

/// Arena of mesh nodes with a single root.
#[derive(Debug, Clone)]
pub struct MeshTree {
    nodes: Vec<MeshNode>,
    root: NodeId,
}

impl MeshTree {
    /// Create a tree holding only `root`.
    pub(crate) fn new(mut root: MeshNode) -> Self {
        root.parent = None;
        root.children.clear();
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Append `node` as the last child of `parent`.
    pub(crate) fn attach(&mut self, parent: NodeId, mut node: MeshNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node.
    pub fn get(&self, id: NodeId) -> Option<&MeshNode> {
        self.nodes.get(id.0)
    }

    /// Get a node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut MeshNode> {
        self.nodes.get_mut(id.0)
    }

    /// Children of a node, in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Depth of a node below the root (root is 0).
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).and_then(|node| node.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.get(parent).and_then(|node| node.parent);
        }
        depth
    }

    /// Node ids in depth-first pre-order, children in source order.
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        order
    }

    /// World transform of a node (product of local transforms from the root).
    pub fn world_transform(&self, id: NodeId) -> Mat4 {
        let mut transform = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.get(id)) {
            transform = node.local_transform() * transform;
            current = node.parent;
        }
        transform
    }

    /// World transforms of every node, indexed by [`NodeId::index`].
    pub fn world_transforms(&self) -> Vec<Mat4> {
        let mut transforms = vec![Mat4::IDENTITY; self.nodes.len()];
        for id in self.depth_first() {
            let node = &self.nodes[id.0];
            let parent = node.parent.map_or(Mat4::IDENTITY, |p| transforms[p.0]);
            transforms[id.0] = parent * node.local_transform();
        }
        transforms
    }

    /// World-space bounding box of every node's geometry.
    ///
    /// Mesh files are not decoded here and contribute only their origin.
    pub fn aabb(&self) -> Aabb {
        let transforms = self.world_transforms();
        self.nodes
            .iter()
            .zip(&transforms)
            .map(|(node, world)| shape_aabb(&node.geometry).transformed(world))
            .fold(Aabb::EMPTY, Aabb::union)
    }
}
