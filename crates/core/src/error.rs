//! Error taxonomy for a generation run.
//!
//! Configuration problems, template selection dead ends and separation non-convergence abort a
//! run. Routing failures are recoverable and live in the level diagnostics instead.

use serde::Serialize;
use thiserror::Error;

use crate::assembly::DoorId;
use crate::graph::{NodeId, NodeType};

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("critical path length {critical_path_length} must be at least 2")]
    CriticalPathTooShort { critical_path_length: usize },
    #[error("critical path length {critical_path_length} exceeds room count {room_count}")]
    CriticalPathTooLong { critical_path_length: usize, room_count: usize },
    #[error("max doors {max_doors} must be at least 3")]
    MaxDoorsTooSmall { max_doors: usize },
    #[error("distribution {value} must be a finite number in 0..=1")]
    DistributionOutOfRange { value: f32 },
    #[error("`{field}` must be strictly positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("room padding {room_padding} is narrower than the door width {door_width}")]
    PaddingBelowDoorWidth { room_padding: f32, door_width: f32 },
    #[error("max separation iterations must be at least 1")]
    ZeroSeparationIterations,
    #[error("constraint `{constraint}` has relative amount {value} outside 0..=1")]
    RelativeAmountOutOfRange { constraint: String, value: f32 },
    #[error("constraint `{constraint}` has range min {min} above max {max}")]
    InvertedRange { constraint: String, min: f32, max: f32 },
    #[error("template library is empty")]
    EmptyLibrary,
    #[error("template `{template}` has door range {min_doors}..={max_doors}")]
    InvertedDoorRange { template: String, min_doors: usize, max_doors: usize },
    #[error("template `{template}` offers {slots} door slots but allows up to {max_doors} doors")]
    NotEnoughDoorSlots { template: String, slots: usize, max_doors: usize },
    #[error("template `{template}` has a non-positive footprint")]
    EmptyFootprint { template: String },
}

/// No template satisfies a node's door count and the active constraints.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("no template fits node {node} ({room_type:?}) with {door_count} doors")]
pub struct TemplateSelectionError {
    pub node: NodeId,
    pub room_type: NodeType,
    pub door_count: usize,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("template selection failed for seed {seed}: {source}")]
    TemplateSelection {
        seed: u64,
        #[source]
        source: TemplateSelectionError,
    },
    #[error(
        "rooms did not separate for seed {seed} after {iterations} iterations \
         ({overlapping_pairs} overlapping pairs left)"
    )]
    LayoutNonconvergence { seed: u64, iterations: usize, overlapping_pairs: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RoutingFailureReason {
    /// A door cell fell outside the routing grid.
    DoorOutsideGrid,
    /// The open list ran dry before reaching the goal door.
    Exhausted,
    /// A door cell lies inside another room's footprint and was never opened.
    DoorSealed,
}

/// A door pair the router could not connect. Recorded, never fatal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoutingFailure {
    pub from_room: NodeId,
    pub to_room: NodeId,
    pub from_door: DoorId,
    pub to_door: DoorId,
    pub reason: RoutingFailureReason,
}
