//! Contact query interfaces
//!
//! The geometry behind these traits lives outside the edge evaluator: it only
//! needs a list of body pairs with signed distances for a state (discrete) or
//! for the swept motion between two states (continuous).

use nalgebra::RealField;
use thiserror::Error;

use crate::collision::allowed_collision::AllowedCollisionMatrix;
use crate::common::error::RoboticsError;

/// Contact between two bodies reported by a contact manager.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactResult<T> {
    pub link_names: [String; 2],
    /// Signed distance, negative when penetrating
    pub distance: T,
}

impl<T: RealField + Copy> ContactResult<T> {
    pub fn new(a: &str, b: &str, distance: T) -> Self {
        Self {
            link_names: [a.to_string(), b.to_string()],
            distance,
        }
    }

    pub fn involves(&self, link: &str) -> bool {
        self.link_names[0] == link || self.link_names[1] == link
    }
}

/// Failure of a contact manager to produce a verdict
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContactQueryError {
    #[error("state rejected: {0}")]
    StateRejected(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
}

impl From<ContactQueryError> for RoboticsError {
    fn from(e: ContactQueryError) -> Self {
        RoboticsError::ContactQuery(e.to_string())
    }
}

/// Collision queries at a single static state
pub trait DiscreteContactManager<T> {
    fn set_state(&mut self, joint_names: &[String], state: &[T]) -> Result<(), ContactQueryError>;

    /// Contacts closer than `margin` at the current state
    fn contact_test(&mut self, margin: T) -> Result<Vec<ContactResult<T>>, ContactQueryError>;
}

/// Collision queries across the motion between two states
pub trait ContinuousContactManager<T> {
    fn set_states(
        &mut self,
        joint_names: &[String],
        start: &[T],
        end: &[T],
    ) -> Result<(), ContactQueryError>;

    /// Contacts closer than `margin` anywhere along the current motion
    fn contact_test(&mut self, margin: T) -> Result<Vec<ContactResult<T>>, ContactQueryError>;
}

/// Read-only snapshot of a collision scene.
///
/// Contact managers are mutated on every query, so the environment hands out
/// a fresh instance to each worker instead of sharing one.
pub trait ContactEnvironment<T>: Send + Sync {
    /// Joint ordering of the configurations the managers accept
    fn joint_names(&self) -> Vec<String>;

    /// Links whose contacts are checked
    fn active_link_names(&self) -> Vec<String>;

    fn allowed_collision_matrix(&self) -> AllowedCollisionMatrix;

    fn discrete_contact_manager(&self) -> Box<dyn DiscreteContactManager<T>>;

    fn continuous_contact_manager(&self) -> Box<dyn ContinuousContactManager<T>>;
}
