//! Robot description tree
//!
//! A parsed URDF rearranged as a kinematic tree of tagged nodes: every link
//! holds its visuals and the joints leading to the next articulation stage,
//! and every joint holds the link it moves.

#![allow(clippy::cast_possible_truncation)]

use crate::error::LoadError;
use crate::urdf::resolver::{GeometryHandle, GeometryResolver, Material, MaterialHandle};
use glam::Vec3;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Allowed rotation range of a joint, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimit {
    pub lower: f32,
    pub upper: f32,
}

impl JointLimit {
    /// Create a limit.
    pub fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    /// Width of the range (`upper - lower`).
    pub fn range(&self) -> f32 {
        self.upper - self.lower
    }

    /// True when the range is not a positive finite number.
    pub fn is_degenerate(&self) -> bool {
        let range = self.range();
        !(range.is_finite() && range > 0.0)
    }
}

/// URDF joint type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointKind {
    Revolute,
    Continuous,
    Prismatic,
    Fixed,
    Floating,
    Planar,
    Spherical,
}

impl From<&urdf_rs::JointType> for JointKind {
    fn from(joint_type: &urdf_rs::JointType) -> Self {
        match joint_type {
            urdf_rs::JointType::Revolute => Self::Revolute,
            urdf_rs::JointType::Continuous => Self::Continuous,
            urdf_rs::JointType::Prismatic => Self::Prismatic,
            urdf_rs::JointType::Fixed => Self::Fixed,
            urdf_rs::JointType::Floating => Self::Floating,
            urdf_rs::JointType::Planar => Self::Planar,
            urdf_rs::JointType::Spherical => Self::Spherical,
        }
    }
}

/// A node of the description tree.
#[derive(Debug, Clone)]
pub enum DescriptionNode {
    Joint(JointNode),
    Link(LinkNode),
    Visual(VisualNode),
    Geometry(GeometryNode),
}

/// One articulated joint.
#[derive(Debug, Clone)]
pub struct JointNode {
    /// Joint name.
    pub name: String,
    /// Joint type.
    pub kind: JointKind,
    /// Rotation axis.
    pub axis: Vec3,
    /// Offset from the parent link.
    pub position: Vec3,
    /// Rotation relative to the parent link (roll, pitch, yaw).
    pub rotation: Vec3,
    /// Animation range. Only revolute joints carry one.
    pub limit: Option<JointLimit>,
    /// Child nodes; a well-formed joint holds exactly one link.
    pub children: Vec<DescriptionNode>,
}

impl JointNode {
    /// Create a joint with a z axis, no offset and no limit.
    pub fn new(name: impl Into<String>, kind: JointKind) -> Self {
        Self {
            name: name.into(),
            kind,
            axis: Vec3::Z,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            limit: None,
            children: Vec::new(),
        }
    }

    /// Set the rotation axis.
    pub fn with_axis(mut self, axis: Vec3) -> Self {
        self.axis = axis;
        self
    }

    /// Set the offset from the parent link.
    pub fn with_origin(mut self, position: Vec3, rotation: Vec3) -> Self {
        self.position = position;
        self.rotation = rotation;
        self
    }

    /// Set the animation range.
    pub fn with_limit(mut self, lower: f32, upper: f32) -> Self {
        self.limit = Some(JointLimit::new(lower, upper));
        self
    }

    /// Attach the moved link.
    pub fn with_link(mut self, link: LinkNode) -> Self {
        self.children.push(DescriptionNode::Link(link));
        self
    }

    /// The link this joint moves, if any.
    pub fn link(&self) -> Option<&LinkNode> {
        self.children.iter().find_map(|child| match child {
            DescriptionNode::Link(link) => Some(link),
            DescriptionNode::Joint(_)
            | DescriptionNode::Visual(_)
            | DescriptionNode::Geometry(_) => None,
        })
    }
}

/// One rigid body segment.
#[derive(Debug, Clone)]
pub struct LinkNode {
    /// Link name, also the animation lookup key.
    pub name: String,
    /// Visuals followed by the joints of the next articulation stage.
    pub children: Vec<DescriptionNode>,
}

impl LinkNode {
    /// Create an empty link.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Add a visual.
    pub fn with_visual(mut self, visual: VisualNode) -> Self {
        self.children.push(DescriptionNode::Visual(visual));
        self
    }

    /// Add a child joint.
    pub fn with_joint(mut self, joint: JointNode) -> Self {
        self.children.push(DescriptionNode::Joint(joint));
        self
    }

    /// First visual of the link.
    pub fn visual(&self) -> Option<&VisualNode> {
        self.children.iter().find_map(|child| match child {
            DescriptionNode::Visual(visual) => Some(visual),
            DescriptionNode::Joint(_) | DescriptionNode::Link(_) | DescriptionNode::Geometry(_) => {
                None
            }
        })
    }

    /// Child joints, in source order.
    pub fn joints(&self) -> impl Iterator<Item = &JointNode> {
        self.children.iter().filter_map(|child| match child {
            DescriptionNode::Joint(joint) => Some(joint),
            DescriptionNode::Link(_) | DescriptionNode::Visual(_) | DescriptionNode::Geometry(_) => {
                None
            }
        })
    }
}

/// Visual element of a link.
#[derive(Debug, Clone)]
pub struct VisualNode {
    /// Offset from the link frame.
    pub position: Vec3,
    /// Rotation relative to the link frame (roll, pitch, yaw).
    pub rotation: Vec3,
    /// Surface material.
    pub material: MaterialHandle,
    /// Geometry nodes; the first one is rendered.
    pub children: Vec<DescriptionNode>,
}

impl VisualNode {
    /// Create a visual holding `geometry`, or an empty one for `None`.
    pub fn new(geometry: Option<GeometryHandle>) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            material: Arc::new(Material::standard()),
            children: geometry
                .map(|handle| DescriptionNode::Geometry(GeometryNode { handle }))
                .into_iter()
                .collect(),
        }
    }

    /// Set the material.
    pub fn with_material(mut self, material: MaterialHandle) -> Self {
        self.material = material;
        self
    }

    /// Geometry of the visual.
    pub fn geometry(&self) -> Option<&GeometryHandle> {
        self.children.iter().find_map(|child| match child {
            DescriptionNode::Geometry(geometry) => Some(&geometry.handle),
            DescriptionNode::Joint(_) | DescriptionNode::Link(_) | DescriptionNode::Visual(_) => {
                None
            }
        })
    }
}

/// Resolved geometry of a visual.
#[derive(Debug, Clone)]
pub struct GeometryNode {
    pub handle: GeometryHandle,
}

/// A robot as a tree rooted at its base link.
#[derive(Debug, Clone)]
pub struct RobotDescription {
    /// Robot name.
    pub name: String,
    /// Base link; its joints are the robot's top-level joints.
    pub root: LinkNode,
}

impl RobotDescription {
    /// Create a description from a base link.
    pub fn new(name: impl Into<String>, root: LinkNode) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    /// Top-level joints, in source order.
    pub fn joints(&self) -> impl Iterator<Item = &JointNode> {
        self.root.joints()
    }

    /// Total number of joints in the tree.
    pub fn joint_count(&self) -> usize {
        fn count(link: &LinkNode) -> usize {
            link.joints()
                .map(|joint| 1 + joint.link().map_or(0, count))
                .sum()
        }
        count(&self.root)
    }

    /// Build the tree from a parsed URDF.
    ///
    /// The root is the first link (in file order) that no joint names as its
    /// child. Joints whose child link is missing keep no link and are pruned
    /// later by the tree walker; links reached twice are attached only once.
    pub fn from_urdf(
        robot: &urdf_rs::Robot,
        resolver: &dyn GeometryResolver,
    ) -> Result<Self, LoadError> {
        if robot.links.is_empty() {
            return Err(LoadError::NoLinks(robot.name.clone()));
        }

        let child_links: HashSet<&str> = robot
            .joints
            .iter()
            .map(|joint| joint.child.link.as_str())
            .collect();
        let mut roots = robot
            .links
            .iter()
            .filter(|link| !child_links.contains(link.name.as_str()));
        let root = roots.next().ok_or(LoadError::NoRootLink)?;
        let extra_roots = roots.count();
        if extra_roots > 0 {
            warn!(
                "Robot {} has {} extra root links, using {}",
                robot.name, extra_roots, root.name
            );
        }

        let mut builder = TreeBuilder {
            links: robot
                .links
                .iter()
                .map(|link| (link.name.as_str(), link))
                .collect(),
            joints_by_parent: HashMap::new(),
            materials: robot
                .materials
                .iter()
                .map(|material| (material.name.as_str(), material))
                .collect(),
            resolver,
            visited: HashSet::new(),
        };
        for joint in &robot.joints {
            builder
                .joints_by_parent
                .entry(joint.parent.link.as_str())
                .or_default()
                .push(joint);
        }

        Ok(Self {
            name: robot.name.clone(),
            root: builder.link(root),
        })
    }
}

struct TreeBuilder<'a> {
    links: HashMap<&'a str, &'a urdf_rs::Link>,
    joints_by_parent: HashMap<&'a str, Vec<&'a urdf_rs::Joint>>,
    materials: HashMap<&'a str, &'a urdf_rs::Material>,
    resolver: &'a dyn GeometryResolver,
    visited: HashSet<&'a str>,
}

impl<'a> TreeBuilder<'a> {
    fn link(&mut self, link: &'a urdf_rs::Link) -> LinkNode {
        self.visited.insert(link.name.as_str());

        let mut node = LinkNode::new(link.name.clone());
        for visual in &link.visual {
            node.children
                .push(DescriptionNode::Visual(self.visual(visual)));
        }

        let joints = self
            .joints_by_parent
            .get(link.name.as_str())
            .cloned()
            .unwrap_or_default();
        for joint in joints {
            node.children.push(DescriptionNode::Joint(self.joint(joint)));
        }
        node
    }

    fn joint(&mut self, joint: &'a urdf_rs::Joint) -> JointNode {
        let kind = JointKind::from(&joint.joint_type);
        let mut node = JointNode {
            name: joint.name.clone(),
            kind,
            axis: vec3(&joint.axis.xyz),
            position: vec3(&joint.origin.xyz),
            rotation: vec3(&joint.origin.rpy),
            limit: (kind == JointKind::Revolute)
                .then(|| JointLimit::new(joint.limit.lower as f32, joint.limit.upper as f32)),
            children: Vec::new(),
        };

        let child = joint.child.link.as_str();
        match self.links.get(child).copied() {
            Some(_) if self.visited.contains(child) => {
                warn!("Link {} reached twice, skipping via {}", child, joint.name);
            }
            Some(link) => node.children.push(DescriptionNode::Link(self.link(link))),
            None => debug!("Joint {} has unknown child link {}", joint.name, child),
        }
        node
    }

    fn visual(&self, visual: &urdf_rs::Visual) -> VisualNode {
        let mut node = VisualNode::new(self.resolver.resolve(&visual.geometry));
        node.position = vec3(&visual.origin.xyz);
        node.rotation = vec3(&visual.origin.rpy);
        if let Some(material) = &visual.material {
            node.material = Arc::new(self.material(material));
        }
        node
    }

    /// Visual materials often only name a robot-level material.
    fn material(&self, material: &urdf_rs::Material) -> Material {
        let color = material.color.as_ref().or_else(|| {
            self.materials
                .get(material.name.as_str())
                .and_then(|shared| shared.color.as_ref())
        });
        Material {
            name: material.name.clone(),
            color: color.map(|c| {
                [
                    c.rgba[0] as f32,
                    c.rgba[1] as f32,
                    c.rgba[2] as f32,
                    c.rgba[3] as f32,
                ]
            }),
        }
    }
}

fn vec3(v: &[f64; 3]) -> Vec3 {
    Vec3::new(v[0] as f32, v[1] as f32, v[2] as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::urdf::resolver::PrimitiveResolver;

    const LEG_URDF: &str = r#"
        <robot name="leg">
            <material name="grey">
                <color rgba="0.5 0.5 0.5 1"/>
            </material>
            <link name="base_link">
                <visual>
                    <geometry><box size="0.4 0.2 0.1"/></geometry>
                    <material name="grey"/>
                </visual>
            </link>
            <link name="Hip1">
                <visual><geometry><cylinder radius="0.05" length="0.2"/></geometry></visual>
            </link>
            <link name="Thigh1">
                <visual><geometry><sphere radius="0.05"/></geometry></visual>
            </link>
            <link name="Sensor"/>
            <joint name="hip" type="revolute">
                <parent link="base_link"/>
                <child link="Hip1"/>
                <origin xyz="0.1 0 0" rpy="0 0 0.5"/>
                <axis xyz="0 0 1"/>
                <limit lower="-1" upper="1" effort="10" velocity="1"/>
            </joint>
            <joint name="thigh" type="revolute">
                <parent link="Hip1"/>
                <child link="Thigh1"/>
                <axis xyz="1 0 0"/>
                <limit lower="0" upper="2" effort="10" velocity="1"/>
            </joint>
            <joint name="sensor_mount" type="fixed">
                <parent link="base_link"/>
                <child link="Sensor"/>
            </joint>
        </robot>
    "#;

    fn leg() -> RobotDescription {
        let robot = urdf_rs::read_from_string(LEG_URDF).unwrap();
        RobotDescription::from_urdf(&robot, &PrimitiveResolver).unwrap()
    }

    #[test]
    fn test_root_is_never_a_child() {
        let description = leg();
        assert_eq!(description.name, "leg");
        assert_eq!(description.root.name, "base_link");
    }

    #[test]
    fn test_joints_follow_source_order() {
        let description = leg();
        let names: Vec<&str> = description.joints().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["hip", "sensor_mount"]);
        assert_eq!(description.joint_count(), 3);
    }

    #[test]
    fn test_joint_fields_converted() {
        let description = leg();
        let hip = description.joints().next().unwrap();
        assert_eq!(hip.kind, JointKind::Revolute);
        assert_eq!(hip.axis, Vec3::Z);
        assert_eq!(hip.position, Vec3::new(0.1, 0.0, 0.0));
        assert!((hip.rotation.z - 0.5).abs() < 1e-6);
        assert_eq!(hip.limit, Some(JointLimit::new(-1.0, 1.0)));

        let thigh = hip.link().unwrap().joints().next().unwrap();
        assert_eq!(thigh.axis, Vec3::X);
        assert_eq!(thigh.link().unwrap().name, "Thigh1");
    }

    #[test]
    fn test_fixed_joint_has_no_limit() {
        let description = leg();
        let mount = description.joints().nth(1).unwrap();
        assert_eq!(mount.kind, JointKind::Fixed);
        assert!(mount.limit.is_none());
        assert!(mount.link().unwrap().visual().is_none());
    }

    #[test]
    fn test_material_color_resolved_from_robot() {
        let description = leg();
        let visual = description.root.visual().unwrap();
        assert_eq!(visual.material.name, "grey");
        assert_eq!(visual.material.color, Some([0.5, 0.5, 0.5, 1.0]));
        assert!(visual.geometry().is_some());
    }

    #[test]
    fn test_missing_child_link_leaves_joint_empty() {
        let robot = urdf_rs::read_from_string(
            r#"
            <robot name="broken">
                <link name="base"/>
                <joint name="j" type="revolute">
                    <parent link="base"/>
                    <child link="ghost"/>
                    <limit lower="0" upper="1" effort="1" velocity="1"/>
                </joint>
            </robot>
        "#,
        )
        .unwrap();
        let description = RobotDescription::from_urdf(&robot, &PrimitiveResolver).unwrap();
        let joint = description.joints().next().unwrap();
        assert!(joint.link().is_none());
    }

    #[test]
    fn test_limit_degenerate() {
        assert!(!JointLimit::new(-1.0, 1.0).is_degenerate());
        assert!(JointLimit::new(1.0, 1.0).is_degenerate());
        assert!(JointLimit::new(2.0, 1.0).is_degenerate());
        assert!(JointLimit::new(0.0, f32::NAN).is_degenerate());
        assert_eq!(JointLimit::new(-1.0, 1.0).range(), 2.0);
    }

    #[test]
    fn test_builders_compose_tree() {
        let description = RobotDescription::new(
            "manual",
            LinkNode::new("base").with_joint(
                JointNode::new("j1", JointKind::Revolute)
                    .with_axis(Vec3::Y)
                    .with_limit(0.0, 1.0)
                    .with_link(LinkNode::new("l1")),
            ),
        );
        assert_eq!(description.joint_count(), 1);
        let joint = description.joints().next().unwrap();
        assert_eq!(joint.axis, Vec3::Y);
        assert_eq!(joint.link().unwrap().name, "l1");
    }
}
