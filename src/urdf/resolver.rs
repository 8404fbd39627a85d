//! Geometry resolution
//!
//! Turns URDF geometry elements into shared, read-only geometry handles.
//! Decoding mesh files is left to the rendering layer; a resolver only
//! decides whether a geometry can be rendered at all.

#![allow(clippy::cast_possible_truncation)]

use glam::Vec3;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Renderable shape referenced by a visual.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Box { size: Vec3 },
    Cylinder { radius: f32, length: f32 },
    Sphere { radius: f32 },
    Capsule { radius: f32, length: f32 },
    /// External mesh file, decoded by the rendering layer.
    Mesh { path: PathBuf, scale: Vec3 },
}

/// Shared geometry handle. Mesh nodes hold clones of the handle, never copies
/// of the geometry.
pub type GeometryHandle = Arc<Shape>;

/// Surface material of a visual.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name.
    pub name: String,
    /// RGBA color, if the URDF gives one.
    pub color: Option<[f32; 4]>,
}

impl Material {
    /// Plain material used when a visual declares none.
    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            color: None,
        }
    }
}

/// Shared material handle.
pub type MaterialHandle = Arc<Material>;

/// Resolves URDF geometry into renderable handles.
///
/// Returning `None` marks the geometry as unrenderable. The tree walker prunes
/// the joint subtree that owns it.
pub trait GeometryResolver: Send + Sync {
    /// Resolve one geometry element.
    fn resolve(&self, geometry: &urdf_rs::Geometry) -> Option<GeometryHandle>;
}

/// Accepts every geometry, mesh references included.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveResolver;

impl GeometryResolver for PrimitiveResolver {
    fn resolve(&self, geometry: &urdf_rs::Geometry) -> Option<GeometryHandle> {
        Some(Arc::new(shape_from_urdf(geometry, |filename| {
            PathBuf::from(filename)
        })))
    }
}

/// Accepts primitives, and mesh references whose file exists under `root`.
///
/// `package://` and `file://` prefixes are stripped before joining.
#[derive(Debug, Clone)]
pub struct MeshFileResolver {
    root: PathBuf,
}

impl MeshFileResolver {
    /// Create a resolver that looks for mesh files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory mesh references are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn mesh_path(&self, filename: &str) -> PathBuf {
        let relative = filename
            .strip_prefix("package://")
            .or_else(|| filename.strip_prefix("file://"))
            .unwrap_or(filename);
        self.root.join(relative)
    }
}

impl GeometryResolver for MeshFileResolver {
    fn resolve(&self, geometry: &urdf_rs::Geometry) -> Option<GeometryHandle> {
        let shape = shape_from_urdf(geometry, |filename| self.mesh_path(filename));
        if let Shape::Mesh { path, .. } = &shape {
            if !path.is_file() {
                debug!("Mesh file {:?} not found, visual dropped", path);
                return None;
            }
        }
        Some(Arc::new(shape))
    }
}

fn shape_from_urdf(geometry: &urdf_rs::Geometry, mesh_path: impl FnOnce(&str) -> PathBuf) -> Shape {
    match geometry {
        urdf_rs::Geometry::Box { size } => Shape::Box {
            size: Vec3::new(size[0] as f32, size[1] as f32, size[2] as f32),
        },
        urdf_rs::Geometry::Cylinder { radius, length } => Shape::Cylinder {
            radius: *radius as f32,
            length: *length as f32,
        },
        urdf_rs::Geometry::Capsule { radius, length } => Shape::Capsule {
            radius: *radius as f32,
            length: *length as f32,
        },
        urdf_rs::Geometry::Sphere { radius } => Shape::Sphere {
            radius: *radius as f32,
        },
        urdf_rs::Geometry::Mesh { filename, scale } => Shape::Mesh {
            path: mesh_path(filename),
            scale: scale
                .as_ref()
                .map_or(Vec3::ONE, |s| Vec3::new(s[0] as f32, s[1] as f32, s[2] as f32)),
        },
    }
}
