//! Bridge between a robot's mesh tree and the ECS.

use std::collections::HashMap;

use crate::ecs::components::rendering::{LinkName, MeshRenderer, RobotNode};
use crate::ecs::components::transform::{Children, GlobalTransform, Parent, Transform};
use crate::scene::{MeshTree, NodeId};

/// Entities spawned for one mesh tree.
#[derive(Debug, Clone)]
pub struct SpawnedRobot {
    /// Entity of the tree's root node.
    pub root: hecs::Entity,
    entities: HashMap<NodeId, hecs::Entity>,
}

impl SpawnedRobot {
    /// Entity spawned for a node.
    pub fn entity(&self, node: NodeId) -> Option<hecs::Entity> {
        self.entities.get(&node).copied()
    }

    /// Number of spawned entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if nothing was spawned.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// (node, entity) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, hecs::Entity)> + '_ {
        self.entities.iter().map(|(&node, &entity)| (node, entity))
    }
}

/// Spawn every node of `tree` as an entity.
///
/// Each entity gets Transform, GlobalTransform, MeshRenderer, RobotNode and
/// LinkName; the hierarchy is mirrored with Parent and Children.
pub fn spawn_robot(world: &mut hecs::World, tree: &MeshTree) -> SpawnedRobot {
    let transforms = tree.world_transforms();
    let mut entities = HashMap::with_capacity(tree.len());

    for id in tree.depth_first() {
        let Some(node) = tree.get(id) else { continue };
        let entity = world.spawn((
            Transform::from_node(node),
            GlobalTransform(transforms[id.index()]),
            MeshRenderer::from_node(node),
            RobotNode(id),
            LinkName(node.name.clone()),
        ));
        entities.insert(id, entity);
    }

    for (&id, &entity) in &entities {
        let children: Vec<hecs::Entity> = tree
            .children(id)
            .iter()
            .filter_map(|child| entities.get(child).copied())
            .collect();
        for &child in &children {
            world.insert_one(child, Parent(entity)).ok();
        }
        if !children.is_empty() {
            world.insert_one(entity, Children(children)).ok();
        }
    }

    let root = entities[&tree.root()];
    SpawnedRobot { root, entities }
}

/// Despawn every entity of a spawned robot.
pub fn despawn_robot(world: &mut hecs::World, spawned: SpawnedRobot) {
    for (_, entity) in spawned.entities {
        world.despawn(entity).ok();
    }
}
