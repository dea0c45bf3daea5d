//
// Planar serial arm kinematics
//
// Forward kinematics of an n-link planar arm and the closed-form inverse
// kinematics of the two-link case (elbow-up and elbow-down solutions).
//

use std::f64::consts::PI;

use crate::common::{Point2D, RoboticsError, RoboticsResult, StateSolver};

/// One rigid link between two consecutive joints
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSegment {
    pub name: String,
    pub start: Point2D,
    pub end: Point2D,
}

/// Planar arm with revolute joints, based at the origin
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarArm {
    link_lengths: Vec<f64>,
    joint_names: Vec<String>,
    link_names: Vec<String>,
}

/// Wrap an angle to [-pi, pi]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

impl PlanarArm {
    pub fn new(link_lengths: Vec<f64>) -> RoboticsResult<Self> {
        if link_lengths.is_empty() {
            return Err(RoboticsError::InvalidParameter("arm needs at least one link".to_string()));
        }
        if let Some(bad) = link_lengths.iter().find(|l| !l.is_finite() || **l <= 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "link length must be positive, got {}",
                bad
            )));
        }
        let n = link_lengths.len();
        Ok(Self {
            link_lengths,
            joint_names: (1..=n).map(|i| format!("joint_{}", i)).collect(),
            link_names: (1..=n).map(|i| format!("link_{}", i)).collect(),
        })
    }

    pub fn two_joint(l1: f64, l2: f64) -> RoboticsResult<Self> {
        Self::new(vec![l1, l2])
    }

    pub fn dof(&self) -> usize {
        self.link_lengths.len()
    }

    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    pub fn link_names(&self) -> &[String] {
        &self.link_names
    }

    pub fn link_lengths(&self) -> &[f64] {
        &self.link_lengths
    }

    /// Maximum distance of the end effector from the base
    pub fn reach(&self) -> f64 {
        self.link_lengths.iter().sum()
    }

    /// Link segments for joint angles given in the arm's own joint order
    pub fn forward_kinematics(&self, joints: &[f64]) -> RoboticsResult<Vec<LinkSegment>> {
        if joints.len() != self.dof() {
            return Err(RoboticsError::dimension_mismatch(self.dof(), joints.len()));
        }
        let mut segments = Vec::with_capacity(self.dof());
        let mut start = Point2D::origin();
        let mut theta = 0.0;
        for ((length, angle), name) in self.link_lengths.iter().zip(joints).zip(&self.link_names) {
            theta += angle;
            let end = Point2D::new(start.x + length * theta.cos(), start.y + length * theta.sin());
            segments.push(LinkSegment {
                name: name.clone(),
                start,
                end,
            });
            start = end;
        }
        Ok(segments)
    }

    pub fn end_effector(&self, joints: &[f64]) -> RoboticsResult<Point2D> {
        let segments = self.forward_kinematics(joints)?;
        Ok(segments.last().map(|s| s.end).unwrap_or_else(Point2D::origin))
    }

    /// Joint solutions placing the tip of a two-link arm at `target`.
    ///
    /// Returns both elbow solutions (one when they coincide), or none when the
    /// target is out of reach.
    pub fn inverse_kinematics(&self, target: Point2D) -> RoboticsResult<Vec<[f64; 2]>> {
        if self.dof() != 2 {
            return Err(RoboticsError::InvalidParameter(format!(
                "closed-form inverse kinematics needs a two-link arm, got {} links",
                self.dof()
            )));
        }
        let (l1, l2) = (self.link_lengths[0], self.link_lengths[1]);
        let (x, y) = (target.x, target.y);
        let distance = (x.powi(2) + y.powi(2)).sqrt();
        if distance > l1 + l2 || distance < (l1 - l2).abs() {
            return Ok(Vec::new());
        }

        // Law of cosines, clamped against rounding
        let cos_theta2 = ((x.powi(2) + y.powi(2) - l1.powi(2) - l2.powi(2)) / (2.0 * l1 * l2)).clamp(-1.0, 1.0);
        let elbow = cos_theta2.acos();

        let mut solutions = Vec::with_capacity(2);
        for theta2 in [elbow, -elbow] {
            let tmp = (l2 * theta2.sin()).atan2(l1 + l2 * theta2.cos());
            let theta1 = normalize_angle(y.atan2(x) - tmp);
            let candidate = [theta1, theta2];
            if !solutions.contains(&candidate) {
                solutions.push(candidate);
            }
        }
        Ok(solutions)
    }
}

impl StateSolver<f64> for PlanarArm {
    type State = Vec<LinkSegment>;

    fn solve(&self, joint_names: &[String], joint_values: &[f64]) -> RoboticsResult<Self::State> {
        if joint_names.len() != joint_values.len() {
            return Err(RoboticsError::dimension_mismatch(joint_names.len(), joint_values.len()));
        }
        let ordered = self
            .joint_names
            .iter()
            .map(|name| {
                joint_names
                    .iter()
                    .position(|n| n == name)
                    .map(|i| joint_values[i])
                    .ok_or_else(|| RoboticsError::InvalidParameter(format!("missing joint {}", name)))
            })
            .collect::<RoboticsResult<Vec<f64>>>()?;
        self.forward_kinematics(&ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_forward_kinematics() {
        let arm = PlanarArm::two_joint(1.0, 1.0).unwrap();
        let tip = arm.end_effector(&[0.0, 0.0]).unwrap();
        assert_relative_eq!(tip.x, 2.0);
        assert_relative_eq!(tip.y, 0.0);

        let segments = arm.forward_kinematics(&[PI / 2.0, -PI / 2.0]).unwrap();
        assert_relative_eq!(segments[0].end.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(segments[1].end.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(segments[1].end.y, 1.0, epsilon = 1e-12);
        assert_eq!(segments[1].name, "link_2");
    }

    #[test]
    fn test_inverse_kinematics_round_trip() {
        let arm = PlanarArm::two_joint(1.0, 0.8).unwrap();
        let target = Point2D::new(1.2, 0.5);
        let solutions = arm.inverse_kinematics(target).unwrap();
        assert_eq!(solutions.len(), 2);
        for joints in solutions {
            let tip = arm.end_effector(&joints).unwrap();
            assert_relative_eq!(tip.x, target.x, epsilon = 1e-9);
            assert_relative_eq!(tip.y, target.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_inverse_kinematics_unreachable() {
        let arm = PlanarArm::two_joint(1.0, 1.0).unwrap();
        assert_relative_eq!(arm.reach(), 2.0);
        assert!(arm.inverse_kinematics(Point2D::new(arm.reach() + 1.0, 0.0)).unwrap().is_empty());
        let three = PlanarArm::new(vec![1.0, 1.0, 1.0]).unwrap();
        assert!(three.inverse_kinematics(Point2D::new(1.0, 0.0)).is_err());
    }

    #[test]
    fn test_state_solver_reorders_joints() {
        let arm = PlanarArm::two_joint(1.0, 1.0).unwrap();
        let names = vec!["joint_2".to_string(), "joint_1".to_string()];
        let segments = arm.solve(&names, &[0.0, PI / 2.0]).unwrap();
        assert_relative_eq!(segments[1].end.y, 2.0, epsilon = 1e-12);
        assert!(arm.solve(&names, &[0.0]).is_err());
    }

    #[test]
    fn test_invalid_links() {
        assert!(PlanarArm::new(Vec::new()).is_err());
        assert!(PlanarArm::new(vec![1.0, -0.5]).is_err());
    }

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(normalize_angle(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(-3.0 * PI / 2.0), PI / 2.0, epsilon = 1e-12);
    }
}
