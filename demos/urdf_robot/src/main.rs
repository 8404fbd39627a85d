//! URDF Robot - Load a robot from URDF and step its joint animation
//!
//! Run with: cargo run -- [path/to/robot.urdf] [seconds]
//!
//! Without arguments the walker fixture from the crate's tests is used.

use anyhow::{bail, Context};
use glam::Vec3;
use rein_urdf::{MeshTree, RobotViewer, ViewerEvent, ViewerSettings};
use std::path::PathBuf;
use std::time::{Duration, Instant};

const FRAME_TIME: f32 = 1.0 / 30.0;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().map(PathBuf::from).unwrap_or_else(|| {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/data/walker.urdf")
    });
    let seconds: f32 = match args.next() {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("Invalid duration {:?}", arg))?,
        None => 2.0,
    };

    let mut viewer = RobotViewer::default();
    let id = viewer.load(&path, ViewerSettings::new().position(0.0, 0.0, 0.5));

    // Wait for the background load
    let deadline = Instant::now() + Duration::from_secs(30);
    while viewer.is_loading(id) {
        for event in viewer.update(0.0) {
            match event {
                ViewerEvent::Loaded { name, nodes, .. } => {
                    println!("Loaded {} ({} mesh nodes) from {}", name, nodes, path.display());
                }
                ViewerEvent::Unrenderable { name, .. } => {
                    bail!("Robot {} has no renderable base link", name);
                }
                ViewerEvent::LoadFailed { error, .. } => {
                    return Err(error.context(format!("Loading {}", path.display())));
                }
            }
        }
        if Instant::now() > deadline {
            bail!("Timed out loading {}", path.display());
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    let frames = (seconds / FRAME_TIME).ceil() as u32;
    for frame in 0..=frames {
        let elapsed = frame as f32 * FRAME_TIME;
        viewer.update(elapsed);

        if frame % 15 == 0 {
            let robot = viewer.robot(id).context("Robot disappeared")?;
            println!("t = {:.2}s", elapsed);
            print_tree(robot.tree());
            for issue in &robot.last_report().skipped {
                log::warn!("{}", issue);
            }
        }
    }

    Ok(())
}

fn print_tree(tree: &MeshTree) {
    let transforms = tree.world_transforms();
    for id in tree.depth_first() {
        let Some(node) = tree.get(id) else { continue };
        let indent = "  ".repeat(tree.depth(id) + 1);
        let world = transforms[id.index()].transform_point3(Vec3::ZERO);
        println!(
            "{}{:<10} rot=({:+.2}, {:+.2}, {:+.2}) at ({:+.2}, {:+.2}, {:+.2})",
            indent,
            node.name,
            node.rotation.x,
            node.rotation.y,
            node.rotation.z,
            world.x,
            world.y,
            world.z
        );
    }
}
