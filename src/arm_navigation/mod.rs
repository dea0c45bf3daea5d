//! Arm navigation
//!
//! Planar serial arm kinematics and a circle-obstacle world implementing the
//! contact interfaces, used to exercise the edge evaluator end to end.

pub mod planar_arm;
pub mod planar_world;

pub use planar_arm::{normalize_angle, LinkSegment, PlanarArm};
pub use planar_world::{CircleObstacle, PlanarWorld};
