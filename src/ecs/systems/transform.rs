//! Transform hierarchy propagation and robot sync systems.

use crate::ecs::bridge::SpawnedRobot;
use crate::ecs::components::transform::{Children, GlobalTransform, Parent, Transform};
use crate::scene::MeshTree;
use glam::Mat4;

/// Copy animated node placements from `tree` into the robot's entity transforms.
///
/// Run after [`JointAnimator::tick`](crate::animation::JointAnimator::tick) and
/// before [`transform_system`].
pub fn sync_robot_transforms(world: &mut hecs::World, tree: &MeshTree, spawned: &SpawnedRobot) {
    for (node_id, entity) in spawned.iter() {
        let Some(node) = tree.get(node_id) else {
            continue;
        };
        if let Ok(mut transform) = world.get::<&mut Transform>(entity) {
            *transform = Transform::from_node(node);
        }
    }
}

/// Recompute every [`GlobalTransform`] from the Parent/Children hierarchy.
///
/// Entities without a [`Parent`] are roots; each child gets its parent's
/// global matrix times its own local one. A child without a [`Transform`]
/// inherits the parent's matrix unchanged.
pub fn transform_system(world: &mut hecs::World) {
    let mut stack: Vec<(hecs::Entity, Mat4)> = world
        .query_mut::<hecs::Without<&Transform, &Parent>>()
        .into_iter()
        .map(|(entity, transform)| (entity, transform.to_matrix()))
        .collect();

    while let Some((entity, global)) = stack.pop() {
        if let Ok(mut slot) = world.get::<&mut GlobalTransform>(entity) {
            slot.0 = global;
        }
        let Ok(children) = world.get::<&Children>(entity) else {
            continue;
        };
        for &child in &children.0 {
            let local = world
                .get::<&Transform>(child)
                .map_or(Mat4::IDENTITY, |t| t.to_matrix());
            stack.push((child, global * local));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::JointAnimator;
    use crate::ecs::bridge::spawn_robot;
    use crate::ecs::bridge::tests::two_link_tree;
    use crate::scene::NodeLookup;
    use glam::Vec3;

    #[test]
    fn test_root_entity_propagation() {
        let mut world = hecs::World::new();

        let pos = Vec3::new(1.0, 2.0, 3.0);
        let entity = world.spawn((Transform::from_position(pos), GlobalTransform::default()));

        transform_system(&mut world);

        let global = world.get::<&GlobalTransform>(entity).unwrap();
        assert_eq!(global.0, Mat4::from_translation(pos));
    }

    #[test]
    fn test_animated_rotation_reaches_world() {
        let (mut tree, upper) = two_link_tree();
        let mut world = hecs::World::new();
        let spawned = spawn_robot(&mut world, &tree);

        // Rotating the base at (1, 0, 0) a quarter turn about z swings Upper's
        // (0, 1, 0) offset onto (-1, 0, 0), landing it on the origin.
        let root = tree.root();
        let mut lookup = NodeLookup::new();
        lookup.insert("Upper".into(), upper);
        tree.get_mut(root).unwrap().rotation.z = std::f32::consts::FRAC_PI_2;
        JointAnimator::new(lookup).tick(&mut tree, 0.5);

        sync_robot_transforms(&mut world, &tree, &spawned);
        transform_system(&mut world);

        let child = spawned.entity(upper).unwrap();
        let global = world.get::<&GlobalTransform>(child).unwrap().0;
        let pos = global.transform_point3(Vec3::ZERO);
        assert!((pos - Vec3::new(0.0, 0.0, 0.0)).length() < 1e-5, "got {pos:?}");

        let expected = tree.world_transform(upper);
        let point = Vec3::new(0.3, -0.2, 0.1);
        assert!((global.transform_point3(point) - expected.transform_point3(point)).length() < 1e-5);
    }
}
