//! ladder_planning - collision-checked ladder graphs for joint-space motion planning
//!
//! Candidate joint configurations are grouped into rungs, one per waypoint.
//! An edge evaluator decides which transitions between adjacent rungs are
//! collision-free and costs them; a ladder graph search then picks the
//! cheapest chain of configurations.

// Core modules
pub mod common;
pub mod collision;
pub mod utils;

// Algorithm modules
pub mod path_planning;
pub mod arm_navigation;

// Re-export common types for convenience
pub use common::{Edge, EdgeList, Path2D, Point2D, Rung};
pub use common::{EdgeEvaluator, StateSolver};
pub use common::{RoboticsError, RoboticsResult};
pub use path_planning::{CollisionEdgeEvaluator, EdgeEvaluatorConfig, EuclideanEdgeEvaluator, LadderGraph};
