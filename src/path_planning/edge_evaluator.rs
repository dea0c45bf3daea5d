//! Edge evaluation between adjacent rungs of a ladder graph
//!
//! `CollisionEdgeEvaluator` admits a transition only when the sampled joint
//! motion between the two configurations is clear in every continuous check
//! (consecutive samples) and every discrete check (interior samples). The
//! endpoints themselves are not re-checked: they were validated when their
//! rung was populated.
//!
//! Admissible edges cost their joint-space distance. When a destination ends
//! up without any admissible edge and `allow_collision` is set, the least
//! violating transition is kept as a single fallback edge so the graph search
//! does not dead-end on one bad waypoint. The fallback decision is made per
//! destination.
//!
//! All `(source, destination)` pairs are independent and are evaluated on the
//! rayon pool. Each worker owns its own contact managers, because managers are
//! mutated on every query.

use std::cmp::Ordering;
use std::sync::Arc;

use itertools::iproduct;
use nalgebra::RealField;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::collision::{
    ContactClassifier, ContactEnvironment, ContactResult, ContinuousContactManager,
    DiscreteContactManager,
};
use crate::common::{Edge, EdgeEvaluator, EdgeList, RoboticsError, RoboticsResult, Rung};

use super::segment_sampler::{interpolate_segment, joint_distance};

/// Configuration for CollisionEdgeEvaluator
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeEvaluatorConfig<T> {
    /// Contacts closer than this distance are violations
    pub collision_safety_margin: T,
    /// Motions longer than this are split before continuous checking
    pub longest_valid_segment_length: T,
    /// Keep a destination reachable through its least violating edge
    pub allow_collision: bool,
    /// Log every violation and failed contact query
    pub debug: bool,
    /// Evaluate transitions on the rayon thread pool
    pub parallel: bool,
}

impl<T: RealField + Copy> Default for EdgeEvaluatorConfig<T> {
    fn default() -> Self {
        Self {
            collision_safety_margin: nalgebra::convert(0.025),
            longest_valid_segment_length: nalgebra::convert(0.5),
            allow_collision: false,
            debug: false,
            parallel: true,
        }
    }
}

impl<T: RealField + Copy> EdgeEvaluatorConfig<T> {
    pub fn with_collision_safety_margin(mut self, margin: T) -> Self {
        self.collision_safety_margin = margin;
        self
    }

    pub fn with_longest_valid_segment_length(mut self, length: T) -> Self {
        self.longest_valid_segment_length = length;
        self
    }

    pub fn with_allow_collision(mut self, allow: bool) -> Self {
        self.allow_collision = allow;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> RoboticsResult<()> {
        if !self.collision_safety_margin.is_finite() {
            return Err(RoboticsError::InvalidParameter(format!(
                "collision safety margin must be finite, got {}",
                self.collision_safety_margin
            )));
        }
        let length = self.longest_valid_segment_length;
        if !length.is_finite() || length <= T::zero() {
            return Err(RoboticsError::InvalidParameter(format!(
                "longest valid segment length must be positive, got {}",
                length
            )));
        }
        Ok(())
    }
}

/// How badly a transition violates the collision constraints
#[derive(Debug, Clone, Copy, PartialEq)]
enum Violation<T> {
    /// Deepest intrusion into the safety margin, `margin - distance`
    Contact(T),
    /// A contact manager gave no verdict
    QueryFailed,
}

impl<T: RealField + Copy> Violation<T> {
    fn severity_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Violation::Contact(a), Violation::Contact(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (Violation::Contact(_), Violation::QueryFailed) => Ordering::Less,
            (Violation::QueryFailed, Violation::Contact(_)) => Ordering::Greater,
            (Violation::QueryFailed, Violation::QueryFailed) => Ordering::Equal,
        }
    }
}

fn worst<T: RealField + Copy>(
    current: Option<Violation<T>>,
    next: Option<Violation<T>>,
) -> Option<Violation<T>> {
    match (current, next) {
        (Some(a), Some(b)) => Some(if b.severity_cmp(&a) == Ordering::Greater { b } else { a }),
        (a, b) => a.or(b),
    }
}

#[derive(Debug, Clone, Copy)]
struct EdgeOutcome<T> {
    cost: T,
    violation: Option<Violation<T>>,
}

impl<T: RealField + Copy> EdgeOutcome<T> {
    fn is_admissible(&self) -> bool {
        self.violation.is_none()
    }

    /// Admissible first, then lower severity, then lower cost
    fn rank_cmp(&self, other: &Self) -> Ordering {
        let by_violation = match (&self.violation, &other.violation) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.severity_cmp(b),
        };
        by_violation.then_with(|| self.cost.partial_cmp(&other.cost).unwrap_or(Ordering::Equal))
    }
}

/// First candidate in source order among the best ranked
fn best_candidate<T: RealField + Copy>(outcomes: &[EdgeOutcome<T>]) -> Option<(usize, &EdgeOutcome<T>)> {
    let mut best: Option<(usize, &EdgeOutcome<T>)> = None;
    for (i, outcome) in outcomes.iter().enumerate() {
        match best {
            Some((_, b)) if outcome.rank_cmp(b) != Ordering::Less => {}
            _ => best = Some((i, outcome)),
        }
    }
    best
}

/// Contact managers owned by one worker
struct ContactManagers<T> {
    discrete: Box<dyn DiscreteContactManager<T>>,
    continuous: Box<dyn ContinuousContactManager<T>>,
}

/// Edge evaluator that rejects transitions in collision
pub struct CollisionEdgeEvaluator<T, E> {
    environment: Arc<E>,
    classifier: ContactClassifier<T>,
    config: EdgeEvaluatorConfig<T>,
}

pub type CollisionEdgeEvaluatorF<E> = CollisionEdgeEvaluator<f32, E>;
pub type CollisionEdgeEvaluatorD<E> = CollisionEdgeEvaluator<f64, E>;

impl<T, E> CollisionEdgeEvaluator<T, E>
where
    T: RealField + Copy,
    E: ContactEnvironment<T>,
{
    /// Create an evaluator checking `active_links`, with configurations ordered as `joint_names`.
    pub fn new(
        environment: Arc<E>,
        active_links: Vec<String>,
        joint_names: Vec<String>,
        config: EdgeEvaluatorConfig<T>,
    ) -> RoboticsResult<Self> {
        config.validate()?;
        if joint_names.is_empty() {
            return Err(RoboticsError::InvalidParameter(
                "edge evaluator needs at least one joint".to_string(),
            ));
        }
        let acm = Arc::new(environment.allowed_collision_matrix());
        debug!(
            dof = joint_names.len(),
            active_links = active_links.len(),
            allowed_pairs = acm.len(),
            "collision edge evaluator created"
        );
        let classifier = ContactClassifier::new(
            acm,
            active_links,
            joint_names,
            config.collision_safety_margin,
            config.debug,
        );
        Ok(Self {
            environment,
            classifier,
            config,
        })
    }

    /// Create an evaluator using the environment's own joint ordering and active links
    pub fn from_environment(environment: Arc<E>, config: EdgeEvaluatorConfig<T>) -> RoboticsResult<Self> {
        let active_links = environment.active_link_names();
        let joint_names = environment.joint_names();
        Self::new(environment, active_links, joint_names, config)
    }

    pub fn config(&self) -> &EdgeEvaluatorConfig<T> {
        &self.config
    }

    pub fn dof(&self) -> usize {
        self.classifier.dof()
    }

    pub fn joint_names(&self) -> &[String] {
        self.classifier.joint_names()
    }

    pub fn environment(&self) -> &Arc<E> {
        &self.environment
    }

    fn contact_managers(&self) -> ContactManagers<T> {
        ContactManagers {
            discrete: self.environment.discrete_contact_manager(),
            continuous: self.environment.continuous_contact_manager(),
        }
    }

    fn check_rung(&self, rung: &Rung<T>) -> RoboticsResult<()> {
        if rung.dof() != self.dof() {
            return Err(RoboticsError::dimension_mismatch(self.dof(), rung.dof()));
        }
        Ok(())
    }

    /// Query errors count as violations; shape errors propagate
    fn classify(
        &self,
        result: RoboticsResult<Vec<ContactResult<T>>>,
    ) -> RoboticsResult<Option<Violation<T>>> {
        match result {
            Ok(contacts) => Ok(contacts
                .iter()
                .map(|c| self.config.collision_safety_margin - c.distance)
                .fold(None, |depth: Option<T>, d| match depth {
                    Some(max) if max >= d => Some(max),
                    _ => Some(d),
                })
                .map(Violation::Contact)),
            Err(RoboticsError::ContactQuery(_)) => Ok(Some(Violation::QueryFailed)),
            Err(e) => Err(e),
        }
    }

    fn consider_edge(
        &self,
        managers: &mut ContactManagers<T>,
        start: &[T],
        end: &[T],
    ) -> RoboticsResult<EdgeOutcome<T>> {
        let cost = joint_distance(start, end)?;
        let samples = interpolate_segment(start, end, self.config.longest_valid_segment_length)?;
        // Ranking fallback candidates needs the full picture of each edge
        let exhaustive = self.config.allow_collision;
        let last = samples.len() - 1;

        let mut violation = None;
        for k in 0..last {
            let swept = self.classifier.continuous_check(
                managers.continuous.as_mut(),
                samples[k].as_slice(),
                samples[k + 1].as_slice(),
            );
            violation = worst(violation, self.classify(swept)?);
            if violation.is_some() && !exhaustive {
                break;
            }

            if k + 1 < last {
                let state = self
                    .classifier
                    .discrete_check(managers.discrete.as_mut(), samples[k + 1].as_slice());
                violation = worst(violation, self.classify(state)?);
                if violation.is_some() && !exhaustive {
                    break;
                }
            }
        }

        Ok(EdgeOutcome { cost, violation })
    }

    fn assemble(&self, destination: usize, outcomes: &[EdgeOutcome<T>]) -> EdgeList<T> {
        let mut edges: EdgeList<T> = outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_admissible())
            .map(|(i, o)| Edge::new(i, o.cost))
            .collect();

        if edges.is_empty() && self.config.allow_collision {
            if let Some((source, outcome)) = best_candidate(outcomes) {
                warn!(
                    destination,
                    source,
                    cost = %outcome.cost,
                    "no collision-free edge, keeping least violating transition"
                );
                edges.push(Edge::fallback(source, outcome.cost));
            }
        }
        edges
    }
}

impl<T, E> EdgeEvaluator<T> for CollisionEdgeEvaluator<T, E>
where
    T: RealField + Copy,
    E: ContactEnvironment<T>,
{
    fn evaluate(&self, from: &Rung<T>, to: &Rung<T>) -> RoboticsResult<Vec<EdgeList<T>>> {
        self.check_rung(from)?;
        self.check_rung(to)?;

        let n_sources = from.len();
        if n_sources == 0 {
            return Ok(vec![Vec::new(); to.len()]);
        }

        // Destination-major so each destination's outcomes are contiguous
        let pairs: Vec<(usize, usize)> = iproduct!(0..to.len(), 0..n_sources).collect();
        let evaluate_pair = |managers: &mut ContactManagers<T>, &(j, i): &(usize, usize)| {
            self.consider_edge(managers, from.configuration(i), to.configuration(j))
        };

        let outcomes: Vec<EdgeOutcome<T>> = if self.config.parallel {
            pairs
                .par_iter()
                .map_init(|| self.contact_managers(), evaluate_pair)
                .collect::<RoboticsResult<_>>()?
        } else {
            let mut managers = self.contact_managers();
            pairs
                .iter()
                .map(|pair| evaluate_pair(&mut managers, pair))
                .collect::<RoboticsResult<_>>()?
        };

        let edges: Vec<EdgeList<T>> = outcomes
            .chunks(n_sources)
            .enumerate()
            .map(|(j, row)| self.assemble(j, row))
            .collect();

        if self.config.debug {
            debug!(
                sources = n_sources,
                destinations = to.len(),
                edges = edges.iter().map(Vec::len).sum::<usize>(),
                "rung pair evaluated"
            );
        }
        Ok(edges)
    }
}

/// Edge evaluator that performs no collision checking.
///
/// Every transition is admissible and costs its joint-space distance.
#[derive(Debug, Clone, Copy)]
pub struct EuclideanEdgeEvaluator {
    dof: usize,
}

impl EuclideanEdgeEvaluator {
    pub fn new(dof: usize) -> Self {
        Self { dof }
    }

    pub fn dof(&self) -> usize {
        self.dof
    }
}

impl<T: RealField + Copy> EdgeEvaluator<T> for EuclideanEdgeEvaluator {
    fn evaluate(&self, from: &Rung<T>, to: &Rung<T>) -> RoboticsResult<Vec<EdgeList<T>>> {
        for rung in [from, to] {
            if rung.dof() != self.dof {
                return Err(RoboticsError::dimension_mismatch(self.dof, rung.dof()));
            }
        }
        let mut edges = Vec::with_capacity(to.len());
        for end in to.iter() {
            let list = from
                .iter()
                .enumerate()
                .map(|(i, start)| joint_distance(start, end).map(|cost| Edge::new(i, cost)))
                .collect::<RoboticsResult<EdgeList<T>>>()?;
            edges.push(list);
        }
        Ok(edges)
    }
}
