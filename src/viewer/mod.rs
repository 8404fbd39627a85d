//! Robot viewer
//!
//! Runs the load → build → animate pipeline for any number of robots.
//! Loads happen on background threads; building, attaching and animating
//! happen on the thread calling [`RobotViewer::update`].

mod settings;

pub use settings::ViewerSettings;

use crate::animation::{JointAnimator, TickReport};
use crate::scene::{MeshTree, RobotTreeWalker};
use crate::urdf::{PendingLoad, RobotDescription, UrdfLoader};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Handle of a robot owned by a [`RobotViewer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RobotId(u64);

/// Something that happened to a robot during [`RobotViewer::update`].
#[derive(Debug)]
pub enum ViewerEvent {
    /// The robot was built and attached.
    Loaded { id: RobotId, name: String, nodes: usize },
    /// The robot loaded but its base link has no visual geometry.
    Unrenderable { id: RobotId, name: String },
    /// The URDF could not be read or parsed.
    LoadFailed { id: RobotId, error: anyhow::Error },
}

/// A built, animated robot.
#[derive(Debug)]
pub struct LiveRobot {
    name: String,
    tree: MeshTree,
    animator: JointAnimator,
    last_report: TickReport,
}

impl LiveRobot {
    /// Robot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The mesh tree, for the rendering layer.
    pub fn tree(&self) -> &MeshTree {
        &self.tree
    }

    /// The joint animator.
    pub fn animator(&self) -> &JointAnimator {
        &self.animator
    }

    /// Report of the most recent tick.
    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }
}

enum Slot {
    Loading {
        pending: PendingLoad,
        settings: ViewerSettings,
    },
    Live(LiveRobot),
}

/// Owns every robot of a scene.
#[derive(Default)]
pub struct RobotViewer {
    loader: UrdfLoader,
    slots: HashMap<RobotId, Slot>,
    next_id: u64,
}

impl RobotViewer {
    /// Create a viewer that loads with `loader`.
    pub fn new(loader: UrdfLoader) -> Self {
        Self {
            loader,
            slots: HashMap::new(),
            next_id: 0,
        }
    }

    /// Start loading a URDF file. The robot appears during a later
    /// [`update`](Self::update).
    pub fn load(&mut self, path: impl Into<PathBuf>, settings: ViewerSettings) -> RobotId {
        let id = self.allocate_id();
        let pending = self.loader.spawn(path);
        self.slots.insert(id, Slot::Loading { pending, settings });
        id
    }

    /// Build and attach an already loaded description right away.
    ///
    /// Returns `None` when the robot is unrenderable.
    pub fn insert(
        &mut self,
        description: &RobotDescription,
        settings: &ViewerSettings,
    ) -> Option<RobotId> {
        let robot = build(description, settings)?;
        let id = self.allocate_id();
        self.slots.insert(id, Slot::Live(robot));
        Some(id)
    }

    /// Attach finished loads, then advance every live robot's animation to
    /// `elapsed` seconds.
    pub fn update(&mut self, elapsed: f32) -> Vec<ViewerEvent> {
        let mut events = Vec::new();

        let finished: Vec<(RobotId, anyhow::Result<RobotDescription>)> = self
            .slots
            .iter()
            .filter_map(|(&id, slot)| match slot {
                Slot::Loading { pending, .. } => pending.poll().map(|result| (id, result)),
                Slot::Live(_) => None,
            })
            .collect();

        for (id, result) in finished {
            let Some(Slot::Loading { pending, settings }) = self.slots.remove(&id) else {
                continue;
            };
            match result {
                Ok(description) => match build(&description, &settings) {
                    Some(robot) => {
                        events.push(ViewerEvent::Loaded {
                            id,
                            name: robot.name.clone(),
                            nodes: robot.tree.len(),
                        });
                        self.slots.insert(id, Slot::Live(robot));
                    }
                    None => {
                        warn!("Robot {} has no renderable base link", description.name);
                        events.push(ViewerEvent::Unrenderable {
                            id,
                            name: description.name,
                        });
                    }
                },
                Err(error) => {
                    warn!("Failed to load {:?}: {:#}", pending.path(), error);
                    events.push(ViewerEvent::LoadFailed { id, error });
                }
            }
        }

        for slot in self.slots.values_mut() {
            if let Slot::Live(robot) = slot {
                robot.last_report = robot.animator.tick(&mut robot.tree, elapsed);
            }
        }

        events
    }

    /// Remove a robot, cancelling its load if still running.
    ///
    /// Returns false for unknown ids.
    pub fn unmount(&mut self, id: RobotId) -> bool {
        match self.slots.remove(&id) {
            Some(Slot::Loading { pending, .. }) => {
                pending.cancel();
                info!("Cancelled load of {:?}", pending.path());
                true
            }
            Some(Slot::Live(robot)) => {
                info!("Unmounted robot {}", robot.name);
                true
            }
            None => false,
        }
    }

    /// A live robot.
    pub fn robot(&self, id: RobotId) -> Option<&LiveRobot> {
        match self.slots.get(&id)? {
            Slot::Live(robot) => Some(robot),
            Slot::Loading { .. } => None,
        }
    }

    /// True while the robot's load is in flight.
    pub fn is_loading(&self, id: RobotId) -> bool {
        matches!(self.slots.get(&id), Some(Slot::Loading { .. }))
    }

    /// All live robots.
    pub fn robots(&self) -> impl Iterator<Item = (RobotId, &LiveRobot)> {
        self.slots.iter().filter_map(|(&id, slot)| match slot {
            Slot::Live(robot) => Some((id, robot)),
            Slot::Loading { .. } => None,
        })
    }

    fn allocate_id(&mut self) -> RobotId {
        let id = RobotId(self.next_id);
        self.next_id += 1;
        id
    }
}

fn build(description: &RobotDescription, settings: &ViewerSettings) -> Option<LiveRobot> {
    let scene = RobotTreeWalker::new()
        .with_shadows(settings.cast_shadow, settings.receive_shadow)
        .build(
            description,
            settings.origin_position,
            settings.origin_rotation,
        )?;
    Some(LiveRobot {
        name: description.name.clone(),
        tree: scene.tree,
        animator: JointAnimator::new(scene.lookup).with_targets(settings.targets.clone()),
        last_report: TickReport::default(),
    })
}
