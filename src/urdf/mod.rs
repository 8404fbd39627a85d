//! URDF support
//!
//! Loads URDF files into a [`RobotDescription`] tree.

pub mod description;
pub mod loader;
pub mod resolver;

pub use description::{
    DescriptionNode, GeometryNode, JointKind, JointLimit, JointNode, LinkNode, RobotDescription,
    VisualNode,
};
pub use loader::{PendingLoad, UrdfLoader};
pub use resolver::{
    GeometryHandle, GeometryResolver, Material, MaterialHandle, MeshFileResolver,
    PrimitiveResolver, Shape,
};
