//! ECS components (transform, rendering).

pub mod rendering;
pub mod transform;

pub use rendering::*;
pub use transform::*;
