//! Collision layer
//!
//! - `allowed_collision`: symmetric table of excused body pairs
//! - `contact`: contact results and the manager/environment interfaces
//! - `classifier`: reduction of raw contacts to unresolved violations

pub mod allowed_collision;
pub mod classifier;
pub mod contact;

#[cfg(test)]
pub(crate) mod test_support;

pub use allowed_collision::AllowedCollisionMatrix;
pub use classifier::ContactClassifier;
pub use contact::{
    ContactEnvironment, ContactQueryError, ContactResult, ContinuousContactManager,
    DiscreteContactManager,
};
