//! Planar collision world
//!
//! A [`PlanarArm`] among circular obstacles. Links are line segments; the
//! signed distance of a link to an obstacle is the distance from the circle
//! center to the segment minus the radius. Links also collide with each other,
//! except adjacent links, which share a joint and are listed in the allowed
//! collision matrix.
//!
//! Continuous checks sub-sample the joint motion so that no joint moves more
//! than `continuous_resolution` radians between two samples, and report the
//! closest approach of every body pair along the motion.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::collision::{
    AllowedCollisionMatrix, ContactEnvironment, ContactQueryError, ContactResult,
    ContinuousContactManager, DiscreteContactManager,
};
use crate::common::{Point2D, RoboticsError, RoboticsResult, StateSolver};

use super::planar_arm::{LinkSegment, PlanarArm};

#[derive(Debug, Clone, PartialEq)]
pub struct CircleObstacle {
    pub name: String,
    pub center: Point2D,
    pub radius: f64,
}

impl CircleObstacle {
    pub fn new(name: &str, center: Point2D, radius: f64) -> Self {
        Self {
            name: name.to_string(),
            center,
            radius,
        }
    }
}

fn point_segment_distance(p: Point2D, a: Point2D, b: Point2D) -> f64 {
    let ab = b.to_vector() - a.to_vector();
    let ap = p.to_vector() - a.to_vector();
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return ap.norm();
    }
    let t = (ap.dot(&ab) / len_sq).clamp(0.0, 1.0);
    (ap - ab * t).norm()
}

fn cross(o: Point2D, a: Point2D, b: Point2D) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn segments_intersect(a: &LinkSegment, b: &LinkSegment) -> bool {
    let d1 = cross(b.start, b.end, a.start);
    let d2 = cross(b.start, b.end, a.end);
    let d3 = cross(a.start, a.end, b.start);
    let d4 = cross(a.start, a.end, b.end);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Distance between two links, zero when they cross
fn segment_distance(a: &LinkSegment, b: &LinkSegment) -> f64 {
    if segments_intersect(a, b) {
        return 0.0;
    }
    [
        point_segment_distance(a.start, b.start, b.end),
        point_segment_distance(a.end, b.start, b.end),
        point_segment_distance(b.start, a.start, a.end),
        point_segment_distance(b.end, a.start, a.end),
    ]
    .iter()
    .fold(f64::INFINITY, |m, &d| m.min(d))
}

#[derive(Debug, Clone)]
pub struct PlanarWorld {
    arm: PlanarArm,
    obstacles: Vec<CircleObstacle>,
    acm: AllowedCollisionMatrix,
    continuous_resolution: f64,
}

impl PlanarWorld {
    pub fn new(arm: PlanarArm) -> Self {
        let mut acm = AllowedCollisionMatrix::new();
        for (a, b) in arm.link_names().iter().tuple_windows() {
            acm.add_allowed_collision(a, b, "Adjacent");
        }
        Self {
            arm,
            obstacles: Vec::new(),
            acm,
            continuous_resolution: 0.02,
        }
    }

    pub fn with_obstacle(mut self, obstacle: CircleObstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    pub fn with_continuous_resolution(mut self, resolution: f64) -> RoboticsResult<Self> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(RoboticsError::InvalidParameter(format!(
                "continuous resolution must be positive, got {}",
                resolution
            )));
        }
        self.continuous_resolution = resolution;
        Ok(self)
    }

    pub fn arm(&self) -> &PlanarArm {
        &self.arm
    }

    pub fn obstacles(&self) -> &[CircleObstacle] {
        &self.obstacles
    }

    pub fn allowed_collisions_mut(&mut self) -> &mut AllowedCollisionMatrix {
        &mut self.acm
    }

    /// Every body pair closer than `margin`, links against obstacles first
    fn contacts(&self, segments: &[LinkSegment], margin: f64) -> Vec<ContactResult<f64>> {
        let mut contacts = Vec::new();
        for link in segments {
            for obstacle in &self.obstacles {
                let d = point_segment_distance(obstacle.center, link.start, link.end) - obstacle.radius;
                if d < margin {
                    contacts.push(ContactResult::new(&link.name, &obstacle.name, d));
                }
            }
        }
        for (a, b) in segments.iter().tuple_combinations() {
            let d = segment_distance(a, b);
            if d < margin {
                contacts.push(ContactResult::new(&a.name, &b.name, d));
            }
        }
        contacts
    }

    fn solve(&self, joint_names: &[String], state: &[f64]) -> Result<Vec<LinkSegment>, ContactQueryError> {
        self.arm
            .solve(joint_names, state)
            .map_err(|e| ContactQueryError::StateRejected(e.to_string()))
    }
}

struct PlanarDiscreteManager {
    world: PlanarWorld,
    segments: Option<Vec<LinkSegment>>,
}

impl DiscreteContactManager<f64> for PlanarDiscreteManager {
    fn set_state(&mut self, joint_names: &[String], state: &[f64]) -> Result<(), ContactQueryError> {
        self.segments = Some(self.world.solve(joint_names, state)?);
        Ok(())
    }

    fn contact_test(&mut self, margin: f64) -> Result<Vec<ContactResult<f64>>, ContactQueryError> {
        let segments = self
            .segments
            .as_ref()
            .ok_or_else(|| ContactQueryError::QueryFailed("no state set".to_string()))?;
        Ok(self.world.contacts(segments, margin))
    }
}

struct PlanarContinuousManager {
    world: PlanarWorld,
    joint_names: Vec<String>,
    motion: Option<(Vec<f64>, Vec<f64>)>,
}

impl ContinuousContactManager<f64> for PlanarContinuousManager {
    fn set_states(
        &mut self,
        joint_names: &[String],
        start: &[f64],
        end: &[f64],
    ) -> Result<(), ContactQueryError> {
        self.world.solve(joint_names, start)?;
        self.world.solve(joint_names, end)?;
        self.joint_names = joint_names.to_vec();
        self.motion = Some((start.to_vec(), end.to_vec()));
        Ok(())
    }

    fn contact_test(&mut self, margin: f64) -> Result<Vec<ContactResult<f64>>, ContactQueryError> {
        let (start, end) = self
            .motion
            .as_ref()
            .ok_or_else(|| ContactQueryError::QueryFailed("no motion set".to_string()))?;
        let largest_move = start
            .iter()
            .zip(end)
            .fold(0.0_f64, |m, (a, b)| m.max((b - a).abs()));
        let steps = ((largest_move / self.world.continuous_resolution).ceil() as usize).max(1);

        // Closest approach per body pair along the motion
        let mut closest: BTreeMap<(String, String), f64> = BTreeMap::new();
        for k in 0..=steps {
            let t = k as f64 / steps as f64;
            let state: Vec<f64> = start.iter().zip(end).map(|(a, b)| a + (b - a) * t).collect();
            let segments = self.world.solve(&self.joint_names, &state)?;
            for c in self.world.contacts(&segments, margin) {
                let [a, b] = c.link_names;
                let entry = closest.entry((a, b)).or_insert(f64::INFINITY);
                *entry = entry.min(c.distance);
            }
        }
        Ok(closest
            .into_iter()
            .map(|((a, b), distance)| ContactResult::new(&a, &b, distance))
            .collect())
    }
}

impl ContactEnvironment<f64> for PlanarWorld {
    fn joint_names(&self) -> Vec<String> {
        self.arm.joint_names().to_vec()
    }

    fn active_link_names(&self) -> Vec<String> {
        self.arm.link_names().to_vec()
    }

    fn allowed_collision_matrix(&self) -> AllowedCollisionMatrix {
        self.acm.clone()
    }

    fn discrete_contact_manager(&self) -> Box<dyn DiscreteContactManager<f64>> {
        Box::new(PlanarDiscreteManager {
            world: self.clone(),
            segments: None,
        })
    }

    fn continuous_contact_manager(&self) -> Box<dyn ContinuousContactManager<f64>> {
        Box::new(PlanarContinuousManager {
            world: self.clone(),
            joint_names: Vec::new(),
            motion: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{EdgeEvaluator, Rung};
    use crate::path_planning::{CollisionEdgeEvaluator, EdgeEvaluatorConfig};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;
    use std::sync::Arc;

    fn world() -> PlanarWorld {
        PlanarWorld::new(PlanarArm::two_joint(1.0, 1.0).unwrap())
            .with_obstacle(CircleObstacle::new("pillar", Point2D::new(1.5, 0.0), 0.2))
    }

    #[test]
    fn test_point_segment_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(2.0, 0.0);
        assert_relative_eq!(point_segment_distance(Point2D::new(1.0, 1.0), a, b), 1.0);
        assert_relative_eq!(point_segment_distance(Point2D::new(3.0, 0.0), a, b), 1.0);
        assert_relative_eq!(point_segment_distance(Point2D::new(1.0, 0.0), a, a), 1.0);
    }

    #[test]
    fn test_adjacent_links_are_allowed() {
        let world = PlanarWorld::new(PlanarArm::new(vec![1.0, 1.0, 1.0]).unwrap());
        let acm = world.allowed_collision_matrix();
        assert!(acm.is_collision_allowed("link_2", "link_1"));
        assert!(acm.is_collision_allowed("link_2", "link_3"));
        assert!(!acm.is_collision_allowed("link_1", "link_3"));
    }

    #[test]
    fn test_discrete_contacts() {
        let world = world();
        let names = world.joint_names();
        let mut manager = world.discrete_contact_manager();

        manager.set_state(&names, &[0.0, 0.0]).unwrap();
        let contacts = manager.contact_test(0.025).unwrap();
        let pillar: Vec<_> = contacts.iter().filter(|c| c.involves("pillar")).collect();
        assert_eq!(pillar.len(), 1);
        assert_eq!(pillar[0].link_names[0], "link_2");
        assert_relative_eq!(pillar[0].distance, -0.2);

        manager.set_state(&names, &[PI / 2.0, 0.0]).unwrap();
        assert!(manager
            .contact_test(0.025)
            .unwrap()
            .iter()
            .all(|c| !c.involves("pillar")));
    }

    #[test]
    fn test_continuous_catches_sweep_through_obstacle() {
        let world = world();
        let names = world.joint_names();
        let mut manager = world.continuous_contact_manager();
        // Both endpoints are clear, the sweep passes the arm through the pillar
        manager.set_states(&names, &[-0.5, 0.0], &[0.5, 0.0]).unwrap();
        let contacts = manager.contact_test(0.025).unwrap();
        let hit = contacts.iter().find(|c| c.involves("pillar")).unwrap();
        assert!(hit.distance < 0.0);
    }

    #[test]
    fn test_manager_without_state_fails() {
        let world = world();
        assert!(world.discrete_contact_manager().contact_test(0.0).is_err());
        assert!(world.continuous_contact_manager().contact_test(0.0).is_err());
        let mut manager = world.discrete_contact_manager();
        let wrong = vec!["elbow".to_string(), "wrist".to_string()];
        assert!(matches!(
            manager.set_state(&wrong, &[0.0, 0.0]),
            Err(ContactQueryError::StateRejected(_))
        ));
    }

    #[test]
    fn test_evaluator_blocks_sweep_through_pillar() {
        let world = Arc::new(world());
        let config = EdgeEvaluatorConfig::default().with_longest_valid_segment_length(0.3);
        let evaluator = CollisionEdgeEvaluator::from_environment(world, config).unwrap();

        let from = Rung::from_configurations(2, vec![[-0.5, 0.0], [1.5, 0.0]]).unwrap();
        let to = Rung::from_configurations(2, vec![[0.5, 0.0]]).unwrap();
        let edges = evaluator.evaluate(&from, &to).unwrap();
        // Swinging up from below passes through the pillar, swinging down from above does not
        assert_eq!(edges[0].len(), 1);
        assert_eq!(edges[0][0].source, 1);
    }

    #[test]
    fn test_allowed_obstacle_contacts_unblock_sweep() {
        let mut world = world();
        for link in ["link_1", "link_2"] {
            world.allowed_collisions_mut().add_allowed_collision(link, "pillar", "Soft");
        }
        assert!(world.allowed_collision_matrix().is_collision_allowed("pillar", "link_2"));

        let config = EdgeEvaluatorConfig::default().with_longest_valid_segment_length(0.3);
        let evaluator = CollisionEdgeEvaluator::from_environment(Arc::new(world), config).unwrap();
        let from = Rung::from_configurations(2, vec![[-0.5, 0.0], [1.5, 0.0]]).unwrap();
        let to = Rung::from_configurations(2, vec![[0.5, 0.0]]).unwrap();
        let edges = evaluator.evaluate(&from, &to).unwrap();
        assert_eq!(edges[0].len(), 2);
        assert!(edges[0].iter().all(|e| e.collision_free));
    }
}
