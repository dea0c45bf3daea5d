//! Joint-space segment sampling
//!
//! Splits the straight joint-space motion between two configurations into
//! pieces no longer than a maximum step, so each piece can be handed to a
//! continuous collision check.

use nalgebra::{DVector, RealField};

use crate::common::error::{RoboticsError, RoboticsResult};

/// Upper bound on the pieces a single segment may be split into
pub const MAX_SEGMENT_STEPS: usize = 1 << 20;

fn check_same_dof<T>(start: &[T], end: &[T]) -> RoboticsResult<()> {
    if start.len() != end.len() {
        return Err(RoboticsError::dimension_mismatch(start.len(), end.len()));
    }
    Ok(())
}

/// Euclidean distance between two configurations
pub fn joint_distance<T: RealField + Copy>(a: &[T], b: &[T]) -> RoboticsResult<T> {
    check_same_dof(a, b)?;
    Ok((DVector::from_column_slice(b) - DVector::from_column_slice(a)).norm())
}

/// Ordered samples from `start` to `end`, inclusive, with consecutive
/// samples at most `max_step` apart.
///
/// A zero-length segment yields the single start point; a segment no longer
/// than `max_step` yields just its two endpoints. Fails with
/// `NumericalError` when the split would exceed [`MAX_SEGMENT_STEPS`].
pub fn interpolate_segment<T: RealField + Copy>(
    start: &[T],
    end: &[T],
    max_step: T,
) -> RoboticsResult<Vec<DVector<T>>> {
    check_same_dof(start, end)?;
    if !max_step.is_finite() || max_step <= T::zero() {
        return Err(RoboticsError::InvalidParameter(format!(
            "segment step must be positive and finite, got {}",
            max_step
        )));
    }

    let start = DVector::from_column_slice(start);
    let end = DVector::from_column_slice(end);
    let norm = (&end - &start).norm();

    if norm == T::zero() {
        return Ok(vec![start]);
    }
    if norm <= max_step {
        return Ok(vec![start, end]);
    }

    let steps = (norm / max_step)
        .ceil()
        .to_subset()
        .filter(|s: &f64| s.is_finite() && *s <= MAX_SEGMENT_STEPS as f64)
        .map(|s| s as usize)
        .ok_or_else(|| {
            RoboticsError::NumericalError(format!("cannot split segment of length {}", norm))
        })?;
    let steps_t: T = nalgebra::convert(steps as f64);

    let mut samples = Vec::with_capacity(steps + 1);
    samples.push(start.clone());
    for k in 1..steps {
        let t = nalgebra::convert::<f64, T>(k as f64) / steps_t;
        samples.push(start.lerp(&end, t));
    }
    samples.push(end);
    Ok(samples)
}
