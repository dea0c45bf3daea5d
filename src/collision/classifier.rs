//! Contact classification
//!
//! Reduces the raw contact lists of the discrete and continuous managers to
//! the unresolved violations: contacts closer than the safety margin that
//! involve an active link and are not excused by the allowed collision matrix.

use std::collections::BTreeSet;
use std::sync::Arc;

use nalgebra::RealField;
use tracing::debug;

use crate::collision::allowed_collision::AllowedCollisionMatrix;
use crate::collision::contact::{ContactResult, ContinuousContactManager, DiscreteContactManager};
use crate::common::error::{RoboticsError, RoboticsResult};

#[derive(Debug, Clone)]
pub struct ContactClassifier<T> {
    acm: Arc<AllowedCollisionMatrix>,
    active_links: BTreeSet<String>,
    joint_names: Vec<String>,
    margin: T,
    debug: bool,
}

impl<T: RealField + Copy> ContactClassifier<T> {
    pub fn new(
        acm: Arc<AllowedCollisionMatrix>,
        active_links: Vec<String>,
        joint_names: Vec<String>,
        margin: T,
        debug: bool,
    ) -> Self {
        Self {
            acm,
            active_links: active_links.into_iter().collect(),
            joint_names,
            margin,
            debug,
        }
    }

    pub fn dof(&self) -> usize {
        self.joint_names.len()
    }

    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    pub fn margin(&self) -> T {
        self.margin
    }

    pub fn is_contact_allowed(&self, a: &str, b: &str) -> bool {
        self.acm.is_collision_allowed(a, b)
    }

    fn is_active(&self, contact: &ContactResult<T>) -> bool {
        contact
            .link_names
            .iter()
            .any(|name| self.active_links.contains(name))
    }

    /// Keep only contacts that count as violations
    pub fn filter(&self, contacts: Vec<ContactResult<T>>) -> Vec<ContactResult<T>> {
        contacts
            .into_iter()
            // NaN fails every comparison and must not read as clear
            .filter(|c| !(c.distance >= self.margin))
            .filter(|c| self.is_active(c))
            .filter(|c| !self.is_contact_allowed(&c.link_names[0], &c.link_names[1]))
            .collect()
    }

    fn check_dof(&self, state: &[T]) -> RoboticsResult<()> {
        if state.len() != self.dof() {
            return Err(RoboticsError::dimension_mismatch(self.dof(), state.len()));
        }
        Ok(())
    }

    /// Unresolved contacts at a single configuration
    pub fn discrete_check(
        &self,
        manager: &mut dyn DiscreteContactManager<T>,
        state: &[T],
    ) -> RoboticsResult<Vec<ContactResult<T>>> {
        self.check_dof(state)?;
        let raw = manager
            .set_state(&self.joint_names, state)
            .and_then(|_| manager.contact_test(self.margin));
        self.finish("discrete", raw.map_err(RoboticsError::from))
    }

    /// Unresolved contacts along the motion from `start` to `end`
    pub fn continuous_check(
        &self,
        manager: &mut dyn ContinuousContactManager<T>,
        start: &[T],
        end: &[T],
    ) -> RoboticsResult<Vec<ContactResult<T>>> {
        self.check_dof(start)?;
        self.check_dof(end)?;
        let raw = manager
            .set_states(&self.joint_names, start, end)
            .and_then(|_| manager.contact_test(self.margin));
        self.finish("continuous", raw.map_err(RoboticsError::from))
    }

    fn finish(
        &self,
        kind: &str,
        raw: RoboticsResult<Vec<ContactResult<T>>>,
    ) -> RoboticsResult<Vec<ContactResult<T>>> {
        let result = raw.and_then(|contacts| {
            let violations = self.filter(contacts);
            match violations.iter().find(|c| !c.distance.is_finite()) {
                Some(c) => Err(RoboticsError::ContactQuery(format!(
                    "no usable distance between {} and {}",
                    c.link_names[0], c.link_names[1]
                ))),
                None => Ok(violations),
            }
        });
        match result {
            Ok(violations) => {
                if self.debug {
                    for c in &violations {
                        debug!(
                            check = kind,
                            link_a = %c.link_names[0],
                            link_b = %c.link_names[1],
                            distance = %c.distance,
                            "contact violation"
                        );
                    }
                }
                Ok(violations)
            }
            Err(e) => {
                if self.debug {
                    debug!(check = kind, error = %e, "contact query produced no verdict");
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::contact::ContactQueryError;
    use crate::collision::test_support::ScriptedEnvironment;
    use crate::collision::ContactEnvironment;

    fn classifier(acm: AllowedCollisionMatrix) -> ContactClassifier<f64> {
        ContactClassifier::new(
            Arc::new(acm),
            vec!["link_1".to_string(), "link_2".to_string()],
            vec!["joint_1".to_string(), "joint_2".to_string()],
            0.025,
            true,
        )
    }

    #[test]
    fn test_filter_drops_allowed_inactive_and_distant() {
        let mut acm = AllowedCollisionMatrix::new();
        acm.add_allowed_collision("link_1", "link_2", "Adjacent");
        let c = classifier(acm);
        let contacts = vec![
            ContactResult::new("link_2", "link_1", -0.5),
            ContactResult::new("base", "table", -0.5),
            ContactResult::new("link_1", "box", 0.1),
            ContactResult::new("box", "link_2", 0.01),
        ];
        let kept = c.filter(contacts);
        assert_eq!(kept, vec![ContactResult::new("box", "link_2", 0.01)]);
    }

    #[test]
    fn test_unusable_distance_is_no_verdict() {
        let env = ScriptedEnvironment::new(2)
            .with_discrete(|_| Ok(vec![ContactResult::new("link_1", "box", f64::NAN)]));
        let c = classifier(AllowedCollisionMatrix::new());
        assert_eq!(c.margin(), 0.025);
        assert_eq!(c.filter(vec![ContactResult::new("link_1", "box", f64::NAN)]).len(), 1);
        let mut manager = env.discrete_contact_manager();
        assert!(matches!(
            c.discrete_check(manager.as_mut(), &[0.0, 0.0]),
            Err(RoboticsError::ContactQuery(_))
        ));
    }

    #[test]
    fn test_allowed_pair_never_reported() {
        let mut acm = AllowedCollisionMatrix::new();
        acm.add_allowed_collision("box", "link_1", "Fixture");
        let c = classifier(acm);
        for distance in [-10.0, -0.1, 0.0, 0.02] {
            let kept = c.filter(vec![ContactResult::new("link_1", "box", distance)]);
            assert!(kept.is_empty());
        }
    }

    #[test]
    fn test_discrete_check_uses_manager() {
        let env = ScriptedEnvironment::new(2).with_discrete(|state| {
            Ok(vec![ContactResult::new("link_1", "box", 0.01 - state[0])])
        });
        let c = classifier(AllowedCollisionMatrix::new());
        let mut manager = env.discrete_contact_manager();
        assert_eq!(c.discrete_check(manager.as_mut(), &[0.0, 0.0]).unwrap().len(), 1);
        assert!(c.discrete_check(manager.as_mut(), &[-1.0, 0.0]).unwrap().is_empty());
    }

    #[test]
    fn test_continuous_check_reports_query_failure() {
        let env = ScriptedEnvironment::new(2)
            .with_continuous(|_, _| Err(ContactQueryError::QueryFailed("narrowphase".to_string())));
        let c = classifier(AllowedCollisionMatrix::new());
        let mut manager = env.continuous_contact_manager();
        let result = c.continuous_check(manager.as_mut(), &[0.0, 0.0], &[1.0, 0.0]);
        assert!(matches!(result, Err(RoboticsError::ContactQuery(_))));
    }

    #[test]
    fn test_dof_mismatch_fails_fast() {
        let env = ScriptedEnvironment::new(2);
        let c = classifier(AllowedCollisionMatrix::new());
        let mut discrete = env.discrete_contact_manager();
        let mut continuous = env.continuous_contact_manager();
        assert!(matches!(
            c.discrete_check(discrete.as_mut(), &[0.0]),
            Err(RoboticsError::DimensionMismatch { expected: 2, found: 1 })
        ));
        assert!(matches!(
            c.continuous_check(continuous.as_mut(), &[0.0, 0.0], &[0.0, 0.0, 0.0]),
            Err(RoboticsError::DimensionMismatch { expected: 2, found: 3 })
        ));
        assert_eq!(env.discrete_queries(), 0);
        assert_eq!(env.continuous_queries(), 0);
    }
}
