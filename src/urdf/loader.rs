//! URDF loader
//!
//! Reads URDF files with `urdf-rs`, either on the calling thread or on a
//! background thread guarded by a liveness flag.

use crate::error::LoadError;
use crate::urdf::description::RobotDescription;
use crate::urdf::resolver::{GeometryResolver, PrimitiveResolver};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// URDF loader utility.
#[derive(Clone)]
pub struct UrdfLoader {
    resolver: Arc<dyn GeometryResolver>,
}

impl Default for UrdfLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UrdfLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrdfLoader").finish_non_exhaustive()
    }
}

impl UrdfLoader {
    /// Create a loader that accepts every geometry.
    pub fn new() -> Self {
        Self::with_resolver(Arc::new(PrimitiveResolver))
    }

    /// Create a loader with a custom geometry resolver.
    pub fn with_resolver(resolver: Arc<dyn GeometryResolver>) -> Self {
        Self { resolver }
    }

    /// Load a URDF file.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<RobotDescription> {
        let path = path.as_ref();
        info!("Loading URDF from {:?}", path);

        let robot = urdf_rs::read_file(path)
            .with_context(|| format!("Failed to load URDF from {:?}", path))?;
        self.describe(&robot)
            .with_context(|| format!("Failed to build robot tree from {:?}", path))
    }

    /// Load URDF XML held in memory.
    pub fn load_str(&self, xml: &str) -> Result<RobotDescription> {
        let robot = urdf_rs::read_from_string(xml).context("Failed to parse URDF")?;
        self.describe(&robot)
    }

    /// Load a URDF file on a background thread.
    ///
    /// The result is dropped instead of delivered once the returned handle is
    /// cancelled or dropped.
    pub fn spawn(&self, path: impl Into<PathBuf>) -> PendingLoad {
        let path = path.into();
        let alive = Arc::new(AtomicBool::new(true));
        let (sender, receiver) = mpsc::channel();

        let loader = self.clone();
        let worker_path = path.clone();
        let worker_alive = alive.clone();
        let spawned = thread::Builder::new()
            .name("urdf-load".to_string())
            .spawn(move || {
                let result = loader.load(&worker_path);
                if !worker_alive.load(Ordering::Acquire) {
                    debug!("Load of {:?} cancelled, result dropped", worker_path);
                    return;
                }
                // The handle may be gone by now; nothing to deliver to then.
                let _ = sender.send(result);
            });
        let worker = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to start load thread for {:?}: {}", path, e);
                None
            }
        };

        PendingLoad {
            path,
            alive,
            receiver,
            worker,
        }
    }

    fn describe(&self, robot: &urdf_rs::Robot) -> Result<RobotDescription> {
        let description = RobotDescription::from_urdf(robot, self.resolver.as_ref())?;
        info!(
            "Loaded robot {}: {} links, {} joints",
            robot.name,
            robot.links.len(),
            robot.joints.len()
        );
        Ok(description)
    }
}

/// A load running on a background thread.
#[derive(Debug)]
pub struct PendingLoad {
    path: PathBuf,
    alive: Arc<AtomicBool>,
    receiver: Receiver<Result<RobotDescription>>,
    worker: Option<JoinHandle<()>>,
}

impl PendingLoad {
    /// Path being loaded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// False once the load has been cancelled.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// True once the worker thread has exited. Its result, if any, has been
    /// sent by then.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancel the load. A result that arrives afterwards is discarded.
    pub fn cancel(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// Check for a result without blocking.
    ///
    /// Returns `None` while the load is running, and always after
    /// cancellation.
    pub fn poll(&self) -> Option<Result<RobotDescription>> {
        if !self.is_alive() {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(self.worker_lost())),
        }
    }

    /// Block until the load finishes.
    pub fn wait(self) -> Result<RobotDescription> {
        self.receiver.recv().map_err(|_| self.worker_lost())?
    }

    fn worker_lost(&self) -> anyhow::Error {
        LoadError::WorkerLost(self.path.display().to_string()).into()
    }
}

impl Drop for PendingLoad {
    fn drop(&mut self) {
        self.cancel();
    }
}
