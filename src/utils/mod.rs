//! Utility modules for ladder_planning

pub mod visualization;

pub use visualization::{colors, PathStyle, Visualizer};
