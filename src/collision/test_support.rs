//! Scripted contact environment for unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::collision::allowed_collision::AllowedCollisionMatrix;
use crate::collision::contact::*;

type QueryResult = Result<Vec<ContactResult<f64>>, ContactQueryError>;
type DiscreteFn = Arc<dyn Fn(&[f64]) -> QueryResult + Send + Sync>;
type ContinuousFn = Arc<dyn Fn(&[f64], &[f64]) -> QueryResult + Send + Sync>;

/// Environment whose contacts are computed by closures over joint values
#[derive(Clone)]
pub(crate) struct ScriptedEnvironment {
    dof: usize,
    acm: AllowedCollisionMatrix,
    discrete: DiscreteFn,
    continuous: ContinuousFn,
    discrete_queries: Arc<AtomicUsize>,
    continuous_queries: Arc<AtomicUsize>,
}

impl ScriptedEnvironment {
    /// Collision-free environment with joints `joint_1..` and links `link_1..`
    pub(crate) fn new(dof: usize) -> Self {
        Self {
            dof,
            acm: AllowedCollisionMatrix::new(),
            discrete: Arc::new(|_| Ok(Vec::new())),
            continuous: Arc::new(|_, _| Ok(Vec::new())),
            discrete_queries: Arc::new(AtomicUsize::new(0)),
            continuous_queries: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn with_discrete<F>(mut self, f: F) -> Self
    where
        F: Fn(&[f64]) -> QueryResult + Send + Sync + 'static,
    {
        self.discrete = Arc::new(f);
        self
    }

    pub(crate) fn with_continuous<F>(mut self, f: F) -> Self
    where
        F: Fn(&[f64], &[f64]) -> QueryResult + Send + Sync + 'static,
    {
        self.continuous = Arc::new(f);
        self
    }

    pub(crate) fn with_acm(mut self, acm: AllowedCollisionMatrix) -> Self {
        self.acm = acm;
        self
    }

    pub(crate) fn discrete_queries(&self) -> usize {
        self.discrete_queries.load(Ordering::SeqCst)
    }

    pub(crate) fn continuous_queries(&self) -> usize {
        self.continuous_queries.load(Ordering::SeqCst)
    }
}

struct ScriptedDiscrete {
    script: DiscreteFn,
    queries: Arc<AtomicUsize>,
    state: Vec<f64>,
}

impl DiscreteContactManager<f64> for ScriptedDiscrete {
    fn set_state(&mut self, _joint_names: &[String], state: &[f64]) -> Result<(), ContactQueryError> {
        self.state = state.to_vec();
        Ok(())
    }

    fn contact_test(&mut self, _margin: f64) -> QueryResult {
        self.queries.fetch_add(1, Ordering::SeqCst);
        (self.script)(&self.state)
    }
}

struct ScriptedContinuous {
    script: ContinuousFn,
    queries: Arc<AtomicUsize>,
    start: Vec<f64>,
    end: Vec<f64>,
}

impl ContinuousContactManager<f64> for ScriptedContinuous {
    fn set_states(
        &mut self,
        _joint_names: &[String],
        start: &[f64],
        end: &[f64],
    ) -> Result<(), ContactQueryError> {
        self.start = start.to_vec();
        self.end = end.to_vec();
        Ok(())
    }

    fn contact_test(&mut self, _margin: f64) -> QueryResult {
        self.queries.fetch_add(1, Ordering::SeqCst);
        (self.script)(&self.start, &self.end)
    }
}

impl ContactEnvironment<f64> for ScriptedEnvironment {
    fn joint_names(&self) -> Vec<String> {
        (1..=self.dof).map(|i| format!("joint_{}", i)).collect()
    }

    fn active_link_names(&self) -> Vec<String> {
        (1..=self.dof).map(|i| format!("link_{}", i)).collect()
    }

    fn allowed_collision_matrix(&self) -> AllowedCollisionMatrix {
        self.acm.clone()
    }

    fn discrete_contact_manager(&self) -> Box<dyn DiscreteContactManager<f64>> {
        Box::new(ScriptedDiscrete {
            script: Arc::clone(&self.discrete),
            queries: Arc::clone(&self.discrete_queries),
            state: Vec::new(),
        })
    }

    fn continuous_contact_manager(&self) -> Box<dyn ContinuousContactManager<f64>> {
        Box::new(ScriptedContinuous {
            script: Arc::clone(&self.continuous),
            queries: Arc::clone(&self.continuous_queries),
            start: Vec::new(),
            end: Vec::new(),
        })
    }
}
