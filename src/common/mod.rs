//! Common types, traits, and error definitions for ladder_planning
//!
//! This module provides the foundational building blocks shared by the
//! collision layer, the edge evaluators and the ladder graph.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
