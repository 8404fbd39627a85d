//! Robot tree walker
//!
//! Builds a [`MeshTree`] from a [`RobotDescription`], one mesh node for the
//! base link and one for every joint whose link has renderable geometry.

use crate::scene::{MeshNode, MeshTree, NodeId, NodeLookup, PALETTE_SIZE};
use crate::urdf::{JointNode, RobotDescription};
use glam::Vec3;
use tracing::{debug, info};

/// A built robot: the mesh tree plus the link-name lookup used for animation.
#[derive(Debug, Clone)]
pub struct RobotScene {
    pub tree: MeshTree,
    pub lookup: NodeLookup,
}

/// Recursive mesh-tree construction.
#[derive(Debug, Clone, Copy)]
pub struct RobotTreeWalker {
    cast_shadow: bool,
    receive_shadow: bool,
}

impl Default for RobotTreeWalker {
    fn default() -> Self {
        Self {
            cast_shadow: true,
            receive_shadow: true,
        }
    }
}

impl RobotTreeWalker {
    /// Create a walker with shadows enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shadow flags given to every node.
    pub fn with_shadows(mut self, cast_shadow: bool, receive_shadow: bool) -> Self {
        self.cast_shadow = cast_shadow;
        self.receive_shadow = receive_shadow;
        self
    }

    /// Build the mesh tree of `robot`, placed at the given origin.
    ///
    /// Returns `None` when the base link has no visual geometry. Joints whose
    /// link or visual geometry is missing are pruned together with everything
    /// below them. Children keep their source order.
    pub fn build(
        &self,
        robot: &RobotDescription,
        origin_position: Vec3,
        origin_rotation: Vec3,
    ) -> Option<RobotScene> {
        let Some(visual) = robot.root.visual() else {
            debug!("Robot {} has no base visual, not rendered", robot.name);
            return None;
        };
        let Some(geometry) = visual.geometry() else {
            debug!("Robot {} base visual has no geometry, not rendered", robot.name);
            return None;
        };

        let mut tree = MeshTree::new(MeshNode {
            name: robot.name.clone(),
            position: origin_position,
            rotation: origin_rotation,
            geometry: geometry.clone(),
            material: visual.material.clone(),
            start_rotation: origin_rotation.z,
            limit: None,
            axis: None,
            color_index: 0,
            cast_shadow: self.cast_shadow,
            receive_shadow: self.receive_shadow,
            parent: None,
            children: Vec::new(),
        });
        let mut lookup = NodeLookup::new();

        let root = tree.root();
        for joint in robot.joints() {
            self.build_joint_subtree(joint, 0, root, &mut tree, &mut lookup);
        }

        info!(
            "Built robot {}: {} mesh nodes, {} animation targets",
            robot.name,
            tree.len(),
            lookup.len()
        );
        Some(RobotScene { tree, lookup })
    }

    fn build_joint_subtree(
        &self,
        joint: &JointNode,
        depth: usize,
        parent: NodeId,
        tree: &mut MeshTree,
        lookup: &mut NodeLookup,
    ) -> Option<NodeId> {
        let Some(link) = joint.link() else {
            debug!("Joint {} has no link, pruned", joint.name);
            return None;
        };
        let Some((visual, geometry)) = link
            .visual()
            .and_then(|visual| visual.geometry().map(|geometry| (visual, geometry)))
        else {
            debug!("Link {} has no visual geometry, joint {} pruned", link.name, joint.name);
            return None;
        };

        let id = tree.attach(
            parent,
            MeshNode {
                name: link.name.clone(),
                position: joint.position,
                rotation: joint.rotation,
                geometry: geometry.clone(),
                material: visual.material.clone(),
                start_rotation: joint.rotation.z,
                limit: joint.limit,
                axis: Some(joint.axis),
                color_index: depth % PALETTE_SIZE,
                cast_shadow: self.cast_shadow,
                receive_shadow: self.receive_shadow,
                parent: None,
                children: Vec::new(),
            },
        );

        for child in link.joints() {
            self.build_joint_subtree(child, depth + 1, id, tree, lookup);
        }

        if lookup.insert(link.name.clone(), id).is_some() {
            debug!("Link name {} registered twice, keeping the latest", link.name);
        }
        Some(id)
    }
}
