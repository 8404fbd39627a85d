//! ECS systems (transform propagation, robot sync).

pub mod transform;

pub use transform::{sync_robot_transforms, transform_system};
