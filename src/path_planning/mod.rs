// Ladder graph planning module

pub mod segment_sampler;
pub mod edge_evaluator;
pub mod ladder_graph;

pub use segment_sampler::*;
pub use edge_evaluator::*;
pub use ladder_graph::*;
