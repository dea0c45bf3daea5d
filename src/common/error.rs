//! Error types for ladder_planning

use thiserror::Error;

/// Main error type for ladder graph planning
#[derive(Debug, Error)]
pub enum RoboticsError {
    /// A configuration or rung does not match the joint layout it is used with
    #[error("Dimension mismatch: expected {expected} joint values, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// A contact manager could not produce a verdict
    #[error("Contact query error: {0}")]
    ContactQuery(String),
    /// Graph construction or search failed
    #[error("Planning error: {0}")]
    PlanningError(String),
    /// Numerical computation failed (NaN costs, failed conversions, etc.)
    #[error("Numerical error: {0}")]
    NumericalError(String),
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Visualization error
    #[error("Visualization error: {0}")]
    VisualizationError(String),
}

impl RoboticsError {
    pub(crate) fn dimension_mismatch(expected: usize, found: usize) -> Self {
        RoboticsError::DimensionMismatch { expected, found }
    }
}

/// Result type alias for robotics operations
pub type RoboticsResult<T> = Result<T, RoboticsError>;
