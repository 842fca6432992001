//! Per-run mutable state: the seeded random stream and the constraint usage counters.
//!
//! One context is built per `generate` call after the room graph exists, threaded by `&mut`
//! through selection and hallway mask matching, and dropped when the level is returned.

use crate::constraints::{Constraint, ConstraintTarget, ConstraintUsage};
use crate::graph::RoomGraph;
use crate::rng::GenRng;

pub struct GenerationContext<'a> {
    pub constraints: &'a [Constraint],
    pub rng: GenRng,
    pub usage: ConstraintUsage,
}

impl<'a> GenerationContext<'a> {
    /// Takes over the run's random stream. `AtMost` quotas are drawn here, after the graph and
    /// before any template is selected.
    pub fn new(constraints: &'a [Constraint], mut rng: GenRng, graph: &RoomGraph) -> Self {
        let usage =
            ConstraintUsage::new(constraints, &mut rng, |target| room_bucket_total(graph, target));
        Self { constraints, rng, usage }
    }
}

/// Number of graph nodes a room target governs. Hallway buckets are only known after routing.
pub fn room_bucket_total(graph: &RoomGraph, target: ConstraintTarget) -> Option<usize> {
    (target != ConstraintTarget::Hallways)
        .then(|| graph.nodes().iter().filter(|node| target.applies_to(node.node_type)).count())
}
