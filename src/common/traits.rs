//! Common traits defining interfaces for ladder graph planning

use nalgebra::RealField;

use crate::common::error::RoboticsResult;
use crate::common::types::*;

/// Trait for edge evaluation strategies between two adjacent rungs
pub trait EdgeEvaluator<T: RealField + Copy> {
    /// Evaluate every transition from `from` into `to`.
    ///
    /// Returns one edge list per configuration of `to`, indexed by destination.
    fn evaluate(&self, from: &Rung<T>, to: &Rung<T>) -> RoboticsResult<Vec<EdgeList<T>>>;
}

/// Trait for resolving joint values into link geometry (forward kinematics)
pub trait StateSolver<T: RealField + Copy> {
    /// Resolved state, e.g. link poses or link segments
    type State;

    /// Resolve `joint_values`, ordered as `joint_names`
    fn solve(&self, joint_names: &[String], joint_values: &[T]) -> RoboticsResult<Self::State>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test that traits compile correctly
    struct DummyEvaluator;

    impl EdgeEvaluator<f64> for DummyEvaluator {
        fn evaluate(&self, _from: &Rung<f64>, to: &Rung<f64>) -> RoboticsResult<Vec<EdgeList<f64>>> {
            Ok(vec![Vec::new(); to.len()])
        }
    }

    #[test]
    fn test_edge_evaluator_trait() {
        let from = Rung::from_configurations(1, vec![[0.0]]).unwrap();
        let to = Rung::from_configurations(1, vec![[1.0], [2.0]]).unwrap();
        let edges = DummyEvaluator.evaluate(&from, &to).unwrap();
        assert_eq!(edges.len(), 2);
    }
}
