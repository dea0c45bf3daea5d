//! Ladder graph
//!
//! Stores the rungs of a planning problem together with the edges an
//! [`EdgeEvaluator`] produced between each adjacent pair, and finds the
//! cheapest chain of configurations through them. Edges only ever connect
//! rung `k` to rung `k + 1`, so the search is a single forward sweep.

use nalgebra::RealField;
use ordered_float::NotNan;
use tracing::{debug, info};

use crate::common::{has_edges, EdgeEvaluator, EdgeList, RoboticsError, RoboticsResult, Rung};

/// Cheapest chain through the ladder
#[derive(Debug, Clone, PartialEq)]
pub struct LadderPath<T> {
    /// Chosen configuration index in every rung
    pub indices: Vec<usize>,
    pub configurations: Vec<Vec<T>>,
    /// Sum of edge costs along the chain
    pub cost: f64,
    /// Number of fallback (colliding) edges used
    pub fallback_edges: usize,
}

impl<T> LadderPath<T> {
    pub fn is_collision_free(&self) -> bool {
        self.fallback_edges == 0
    }
}

#[derive(Debug, Clone)]
pub struct LadderGraph<T> {
    rungs: Vec<Rung<T>>,
    /// `edges[k][j]` lists the edges from rung `k` into configuration `j` of rung `k + 1`
    edges: Vec<Vec<EdgeList<T>>>,
}

fn not_nan(value: f64) -> RoboticsResult<NotNan<f64>> {
    NotNan::new(value).map_err(|_| RoboticsError::NumericalError("edge cost is NaN".to_string()))
}

impl<T: RealField + Copy> LadderGraph<T> {
    /// Graph over `rungs` with no edges yet. All rungs must share one dof.
    pub fn new(rungs: Vec<Rung<T>>) -> RoboticsResult<Self> {
        if let Some(first) = rungs.first() {
            if let Some(bad) = rungs.iter().find(|r| r.dof() != first.dof()) {
                return Err(RoboticsError::dimension_mismatch(first.dof(), bad.dof()));
            }
        }
        let pairs = rungs.len().saturating_sub(1);
        Ok(Self {
            rungs,
            edges: vec![Vec::new(); pairs],
        })
    }

    /// Evaluate every adjacent rung pair with `evaluator`.
    ///
    /// Fails if some pair ends up with no edge at all, since no chain can
    /// cross it.
    pub fn build<E: EdgeEvaluator<T> + ?Sized>(rungs: Vec<Rung<T>>, evaluator: &E) -> RoboticsResult<Self> {
        let mut graph = Self::new(rungs)?;
        for k in 0..graph.edges.len() {
            let edges = evaluator.evaluate(&graph.rungs[k], &graph.rungs[k + 1])?;
            if !has_edges(&edges) {
                return Err(RoboticsError::PlanningError(format!(
                    "no edges between rung {} and rung {}",
                    k,
                    k + 1
                )));
            }
            debug!(
                rung = k,
                edges = edges.iter().map(Vec::len).sum::<usize>(),
                "rung pair connected"
            );
            graph.insert_edges(k, edges)?;
        }
        info!(rungs = graph.num_rungs(), "ladder graph built");
        Ok(graph)
    }

    /// Replace the edges from rung `index` into rung `index + 1`
    pub fn insert_edges(&mut self, index: usize, edges: Vec<EdgeList<T>>) -> RoboticsResult<()> {
        if index >= self.edges.len() {
            return Err(RoboticsError::InvalidParameter(format!(
                "rung pair {} does not exist",
                index
            )));
        }
        let sources = self.rungs[index].len();
        let destinations = self.rungs[index + 1].len();
        if edges.len() != destinations {
            return Err(RoboticsError::InvalidParameter(format!(
                "expected {} edge lists, got {}",
                destinations,
                edges.len()
            )));
        }
        if let Some(edge) = edges.iter().flatten().find(|e| e.source >= sources) {
            return Err(RoboticsError::InvalidParameter(format!(
                "edge source {} out of range for rung of size {}",
                edge.source, sources
            )));
        }
        self.edges[index] = edges;
        Ok(())
    }

    pub fn num_rungs(&self) -> usize {
        self.rungs.len()
    }

    pub fn rung(&self, index: usize) -> Option<&Rung<T>> {
        self.rungs.get(index)
    }

    /// Edges into rung `index + 1`
    pub fn edges(&self, index: usize) -> Option<&[EdgeList<T>]> {
        self.edges.get(index).map(Vec::as_slice)
    }

    /// Cheapest chain from any configuration of the first rung to any of the last
    pub fn shortest_path(&self) -> RoboticsResult<LadderPath<T>> {
        let first = self
            .rungs
            .first()
            .ok_or_else(|| RoboticsError::PlanningError("ladder graph has no rungs".to_string()))?;

        let zero = not_nan(0.0)?;
        let mut cost: Vec<Option<NotNan<f64>>> = vec![Some(zero); first.len()];
        // predecessor[k][j]: (source in rung k, edge used) for configuration j of rung k + 1
        let mut predecessor: Vec<Vec<Option<(usize, bool)>>> = Vec::with_capacity(self.edges.len());

        for (k, lists) in self.edges.iter().enumerate() {
            if lists.len() != self.rungs[k + 1].len() {
                return Err(RoboticsError::PlanningError(format!(
                    "rung pair {} has not been evaluated",
                    k
                )));
            }
            let mut next_cost = Vec::with_capacity(lists.len());
            let mut next_pred = Vec::with_capacity(lists.len());
            for list in lists {
                let mut best: Option<(NotNan<f64>, usize, bool)> = None;
                for edge in list {
                    let Some(reached) = cost[edge.source] else {
                        continue;
                    };
                    let step = edge.cost.to_subset().ok_or_else(|| {
                        RoboticsError::NumericalError("edge cost is not representable".to_string())
                    })?;
                    let total = reached + not_nan(step)?;
                    if best.map_or(true, |(c, _, _)| total < c) {
                        best = Some((total, edge.source, edge.collision_free));
                    }
                }
                next_cost.push(best.map(|(c, _, _)| c));
                next_pred.push(best.map(|(_, source, free)| (source, free)));
            }
            cost = next_cost;
            predecessor.push(next_pred);
        }

        let (mut index, total) = cost
            .iter()
            .enumerate()
            .filter_map(|(j, c)| c.map(|c| (j, c)))
            .min_by_key(|(_, c)| *c)
            .ok_or_else(|| {
                RoboticsError::PlanningError("no configuration of the last rung is reachable".to_string())
            })?;

        let mut indices = vec![index];
        let mut fallback_edges = 0;
        for pred in predecessor.iter().rev() {
            let (source, collision_free) = pred[index].ok_or_else(|| {
                RoboticsError::PlanningError("broken predecessor chain".to_string())
            })?;
            if !collision_free {
                fallback_edges += 1;
            }
            index = source;
            indices.push(index);
        }
        indices.reverse();

        let configurations = indices
            .iter()
            .zip(&self.rungs)
            .map(|(&i, rung)| rung.configuration(i).to_vec())
            .collect();

        Ok(LadderPath {
            indices,
            configurations,
            cost: total.into_inner(),
            fallback_edges,
        })
    }
}
