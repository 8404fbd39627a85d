//! Joint animator
//!
//! Drives every targeted joint through a sawtooth sweep of its limit range:
//! the angle rises from `lower` towards `upper` and wraps back to `lower`
//! once per `upper - lower` seconds.

use crate::error::AnimationIssue;
use crate::scene::{MeshTree, NodeId, NodeLookup};
use crate::urdf::JointLimit;
use glam::Vec3;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Rotation component driven by a joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAxis {
    X,
    Y,
    Z,
}

impl RotationAxis {
    /// First nonzero component of `axis`, checked in x, y, z order.
    ///
    /// Joints with several nonzero components only turn about the first one.
    pub fn select(axis: Vec3) -> Option<Self> {
        if axis.x != 0.0 {
            Some(Self::X)
        } else if axis.y != 0.0 {
            Some(Self::Y)
        } else if axis.z != 0.0 {
            Some(Self::Z)
        } else {
            None
        }
    }

    /// Overwrite the matching component of `rotation`.
    pub fn apply(self, rotation: &mut Vec3, angle: f32) {
        match self {
            Self::X => rotation.x = angle,
            Self::Y => rotation.y = angle,
            Self::Z => rotation.z = angle,
        }
    }
}

/// Sawtooth joint angle at `elapsed` seconds.
///
/// `%` keeps the sign of the dividend, so a negative `start + elapsed` lands
/// below `lower`.
pub fn joint_angle(start_rotation: f32, elapsed: f32, limit: JointLimit) -> f32 {
    ((start_rotation + elapsed) % limit.range()) + limit.lower
}

/// Which lookup entries the animator drives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnimationTargets {
    /// Every joint in the lookup table.
    #[default]
    All,
    /// Links with these exact names. Names missing from the lookup are
    /// skipped without a report.
    Names(Vec<String>),
    /// Links whose name starts with any of these prefixes.
    Prefixes(Vec<String>),
}

impl AnimationTargets {
    fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Names(names) => names.iter().any(|n| n == name),
            Self::Prefixes(prefixes) => prefixes.iter().any(|p| name.starts_with(p.as_str())),
        }
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Joints whose rotation was updated.
    pub animated: usize,
    /// Joints skipped this frame, with the reason.
    pub skipped: Vec<AnimationIssue>,
}

/// Per-frame joint animation over a robot's mesh tree.
///
/// Owns the name lookup produced by the tree walker. Dropping the animator
/// stops the animation; it never creates or removes nodes.
#[derive(Debug, Clone)]
pub struct JointAnimator {
    lookup: NodeLookup,
    targets: AnimationTargets,
    warned: HashSet<String>,
}

impl JointAnimator {
    /// Create an animator driving every joint in `lookup`.
    pub fn new(lookup: NodeLookup) -> Self {
        Self {
            lookup,
            targets: AnimationTargets::All,
            warned: HashSet::new(),
        }
    }

    /// Restrict the joints this animator drives.
    pub fn with_targets(mut self, targets: AnimationTargets) -> Self {
        self.targets = targets;
        self
    }

    /// The lookup table.
    pub fn lookup(&self) -> &NodeLookup {
        &self.lookup
    }

    /// The target selection.
    pub fn targets(&self) -> &AnimationTargets {
        &self.targets
    }

    /// Node registered for a link name.
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.lookup.get(name).copied()
    }

    /// Update joint rotations for `elapsed` seconds since animation start.
    ///
    /// Never fails: a joint that cannot be animated keeps its rotation and
    /// is listed in the report.
    pub fn tick(&mut self, tree: &mut MeshTree, elapsed: f32) -> TickReport {
        let mut report = TickReport::default();
        if !elapsed.is_finite() {
            warn!("Ignoring non-finite animation time {}", elapsed);
            return report;
        }

        let targets: Vec<(&str, NodeId)> = match &self.targets {
            AnimationTargets::Names(names) => names
                .iter()
                .filter_map(|name| self.lookup.get(name).map(|&id| (name.as_str(), id)))
                .collect(),
            targets => self
                .lookup
                .iter()
                .filter(|(name, _)| targets.matches(name))
                .map(|(name, &id)| (name.as_str(), id))
                .collect(),
        };

        for (name, id) in targets {
            match animate(tree, name, id, elapsed) {
                Ok(()) => report.animated += 1,
                Err(issue) => {
                    if matches!(issue, AnimationIssue::DegenerateLimit { .. }) {
                        if self.warned.insert(name.to_string()) {
                            warn!("{}, joint left unanimated", issue);
                        }
                    } else {
                        debug!("Skipping joint: {}", issue);
                    }
                    report.skipped.push(issue);
                }
            }
        }
        report
    }
}

fn animate(tree: &mut MeshTree, name: &str, id: NodeId, elapsed: f32) -> Result<(), AnimationIssue> {
    let node = tree.get_mut(id).ok_or_else(|| AnimationIssue::DetachedNode {
        name: name.to_string(),
        node: id,
    })?;
    let limit = node
        .limit
        .ok_or_else(|| AnimationIssue::MissingLimit(name.to_string()))?;
    if limit.is_degenerate() {
        return Err(AnimationIssue::DegenerateLimit {
            name: name.to_string(),
            lower: limit.lower,
            upper: limit.upper,
        });
    }
    let axis = node
        .axis
        .and_then(RotationAxis::select)
        .ok_or_else(|| AnimationIssue::NoAxis(name.to_string()))?;

    axis.apply(&mut node.rotation, joint_angle(node.start_rotation, elapsed, limit));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tests::node;
    use crate::scene::MeshNode;

    fn joint(name: &str, axis: Vec3, lower: f32, upper: f32) -> MeshNode {
        let mut n = node(name);
        n.axis = Some(axis);
        n.limit = Some(JointLimit::new(lower, upper));
        n
    }

    fn rig(joints: Vec<MeshNode>) -> (MeshTree, NodeLookup) {
        let mut tree = MeshTree::new(node("base"));
        let mut lookup = NodeLookup::new();
        for j in joints {
            let name = j.name.clone();
            let id = tree.attach(tree.root(), j);
            lookup.insert(name, id);
        }
        (tree, lookup)
    }

    fn rotation(tree: &MeshTree, lookup: &NodeLookup, name: &str) -> Vec3 {
        tree.get(lookup[name]).unwrap().rotation
    }

    #[test]
    fn test_sawtooth_wraps() {
        let (mut tree, lookup) = rig(vec![joint("Hip1", Vec3::Z, -1.0, 1.0)]);
        let mut animator = JointAnimator::new(lookup.clone());

        let mut angles = Vec::new();
        for t in [0.0, 1.0, 2.0, 3.0] {
            let report = animator.tick(&mut tree, t);
            assert_eq!(report.animated, 1);
            angles.push(rotation(&tree, &lookup, "Hip1").z);
        }
        assert_eq!(angles, vec![-1.0, 0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_angle_rises_monotonically_within_period() {
        let limit = JointLimit::new(0.5, 2.5);
        let mut previous = joint_angle(0.0, 0.0, limit);
        for step in 1..20 {
            let angle = joint_angle(0.0, step as f32 * 0.1, limit);
            assert!(angle > previous);
            assert!(angle >= limit.lower && angle < limit.upper);
            previous = angle;
        }
    }

    #[test]
    fn test_start_rotation_offsets_phase() {
        let limit = JointLimit::new(-1.0, 1.0);
        assert!((joint_angle(0.5, 0.0, limit) - -0.5).abs() < 1e-6);
        assert!((joint_angle(0.5, 1.0, limit) - 0.5).abs() < 1e-6);
        assert!((joint_angle(0.5, 2.0, limit) - -0.5).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_limit_is_skipped_and_reported() {
        let mut flat = joint("Flat", Vec3::Z, 1.0, 1.0);
        flat.rotation.z = 0.25;
        let (mut tree, lookup) = rig(vec![flat, joint("Ok", Vec3::Z, -1.0, 1.0)]);
        let mut animator = JointAnimator::new(lookup.clone());

        for t in [0.0, 0.5] {
            let report = animator.tick(&mut tree, t);
            assert_eq!(report.animated, 1);
            assert_eq!(
                report.skipped,
                vec![AnimationIssue::DegenerateLimit {
                    name: "Flat".into(),
                    lower: 1.0,
                    upper: 1.0,
                }]
            );
            assert_eq!(rotation(&tree, &lookup, "Flat").z, 0.25);
        }
        assert!(animator.warned.contains("Flat"));
    }

    #[test]
    fn test_empty_lookup_is_noop() {
        let mut tree = MeshTree::new(node("base"));
        let mut animator = JointAnimator::new(NodeLookup::new());
        let report = animator.tick(&mut tree, 1.0);
        assert_eq!(report, TickReport::default());
        assert_eq!(tree.get(tree.root()).unwrap().rotation, Vec3::ZERO);
    }

    #[test]
    fn test_axis_priority_x_first() {
        let (mut tree, lookup) = rig(vec![joint("Knee", Vec3::new(1.0, 1.0, 0.0), -1.0, 1.0)]);
        let mut animator = JointAnimator::new(lookup.clone());
        for t in [0.0, 0.3, 1.7, 12.0] {
            animator.tick(&mut tree, t);
            let rot = rotation(&tree, &lookup, "Knee");
            assert_eq!(rot.x, joint_angle(0.0, t, JointLimit::new(-1.0, 1.0)));
            assert_eq!(rot.y, 0.0);
            assert_eq!(rot.z, 0.0);
        }
    }

    #[test]
    fn test_axis_selection() {
        assert_eq!(RotationAxis::select(Vec3::new(0.0, -1.0, 1.0)), Some(RotationAxis::Y));
        assert_eq!(RotationAxis::select(Vec3::Z), Some(RotationAxis::Z));
        assert_eq!(RotationAxis::select(Vec3::ZERO), None);
    }

    #[test]
    fn test_missing_limit_and_axis_reported() {
        let mut fixed = node("Fixed");
        fixed.axis = Some(Vec3::Z);
        let mut no_axis = joint("NoAxis", Vec3::ZERO, 0.0, 1.0);
        no_axis.rotation.x = 0.1;
        let (mut tree, lookup) = rig(vec![fixed, no_axis]);
        let mut animator = JointAnimator::new(lookup.clone());

        let report = animator.tick(&mut tree, 0.5);
        assert_eq!(report.animated, 0);
        assert_eq!(
            report.skipped,
            vec![
                AnimationIssue::MissingLimit("Fixed".into()),
                AnimationIssue::NoAxis("NoAxis".into()),
            ]
        );
        assert_eq!(rotation(&tree, &lookup, "NoAxis").x, 0.1);
    }

    #[test]
    fn test_detached_node_reported() {
        let mut lookup = NodeLookup::new();
        lookup.insert("Ghost".into(), NodeId(42));
        let mut tree = MeshTree::new(node("base"));
        let report = JointAnimator::new(lookup).tick(&mut tree, 1.0);
        assert_eq!(
            report.skipped,
            vec![AnimationIssue::DetachedNode {
                name: "Ghost".into(),
                node: NodeId(42),
            }]
        );
    }

    #[test]
    fn test_skipped_joints_reported_in_name_order() {
        let (mut tree, lookup) = rig(vec![
            joint("Shin2", Vec3::X, 0.0, 0.0),
            joint("Ankle", Vec3::X, 1.0, 1.0),
            joint("Toe", Vec3::X, 0.5, 0.5),
            joint("Knee", Vec3::X, 2.0, 2.0),
        ]);
        let mut animator = JointAnimator::new(lookup);

        for t in 0..20 {
            let report = animator.tick(&mut tree, t as f32 * 0.1);
            let names: Vec<&str> = report.skipped.iter().map(|i| i.joint_name()).collect();
            assert_eq!(names, vec!["Ankle", "Knee", "Shin2", "Toe"]);
        }
    }

    #[test]
    fn test_named_targets_skip_missing_silently() {
        let (mut tree, lookup) = rig(vec![
            joint("Hip1", Vec3::Z, -1.0, 1.0),
            joint("Thigh1", Vec3::Z, -1.0, 1.0),
        ]);
        let mut animator = JointAnimator::new(lookup.clone())
            .with_targets(AnimationTargets::Names(vec!["Thigh1".into(), "Thigh6".into()]));
        let report = animator.tick(&mut tree, 0.5);
        assert_eq!(report.animated, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(rotation(&tree, &lookup, "Thigh1").z, -0.5);
        assert_eq!(rotation(&tree, &lookup, "Hip1").z, 0.0);
        assert_eq!(animator.node("Thigh1"), Some(lookup["Thigh1"]));
    }

    #[test]
    fn test_prefix_targets() {
        let (mut tree, lookup) = rig(vec![
            joint("Hip1", Vec3::Z, 0.0, 4.0),
            joint("Hip2", Vec3::Z, 0.0, 4.0),
            joint("Foot1", Vec3::Z, 0.0, 4.0),
        ]);
        let mut animator = JointAnimator::new(lookup.clone())
            .with_targets(AnimationTargets::Prefixes(vec!["Hip".into()]));
        let report = animator.tick(&mut tree, 1.5);
        assert_eq!(report.animated, 2);
        assert_eq!(rotation(&tree, &lookup, "Hip2").z, 1.5);
        assert_eq!(rotation(&tree, &lookup, "Foot1").z, 0.0);
    }

    #[test]
    fn test_non_finite_time_ignored() {
        let (mut tree, lookup) = rig(vec![joint("Hip1", Vec3::Z, -1.0, 1.0)]);
        let mut animator = JointAnimator::new(lookup.clone());
        let report = animator.tick(&mut tree, f32::NAN);
        assert_eq!(report.animated, 0);
        assert_eq!(rotation(&tree, &lookup, "Hip1").z, 0.0);
    }
}
