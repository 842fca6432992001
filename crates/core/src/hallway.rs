//! Hallway output: one segment per routed cell, matched against authored pieces where possible
//! and meshed procedurally otherwise.
//!
//! Segments are keyed by grid coordinate, so a junction cell shared by several paths is emitted
//! exactly once.

mod mesh;
mod pieces;

use std::collections::BTreeMap;

use log::debug;

use crate::context::GenerationContext;
use crate::library::TemplateLibrary;
use crate::routing::{HallwayPath, RoutingGrid};
use crate::types::{CellCoord, Direction, DirectionSet, Vec2};

pub use mesh::{HallwayMesh, mesh_segments};
pub use pieces::{HallwayPiece, assign_pieces};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HallwaySegment {
    pub cell: CellCoord,
    pub position: Vec2,
    /// Sides without a wall: links to neighbouring path cells plus the room side of a door cell.
    pub open: DirectionSet,
    /// Side facing into the room, for door cells.
    pub door_side: Option<Direction>,
}

pub fn collect_segments(
    grid: &RoutingGrid,
    paths: &[HallwayPath],
) -> BTreeMap<CellCoord, HallwaySegment> {
    let mut segments = BTreeMap::new();
    for coord in paths.iter().flat_map(HallwayPath::cells) {
        if segments.contains_key(&coord) {
            continue;
        }
        let Some(cell) = grid.cell(coord) else {
            continue;
        };
        let door_side = cell.door_direction.map(Direction::opposite);
        let open = door_side.map_or(cell.links, |side| cell.links.with(side));
        let segment = HallwaySegment { cell: coord, position: cell.position, open, door_side };
        segments.insert(coord, segment);
    }
    segments
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HallwayOutput {
    pub segment_count: usize,
    pub pieces: Vec<HallwayPiece>,
    pub mesh: HallwayMesh,
}

/// Assigns authored pieces, then meshes every segment no piece claimed.
pub fn build_hallways(
    grid: &RoutingGrid,
    paths: &[HallwayPath],
    library: &TemplateLibrary,
    context: &mut GenerationContext<'_>,
    height: f32,
) -> HallwayOutput {
    let mut segments = collect_segments(grid, paths);
    let segment_count = segments.len();
    let pieces = assign_pieces(&segments, library, context);
    for piece in &pieces {
        segments.remove(&piece.cell);
    }
    let mesh = mesh_segments(segments.values(), grid.cell_size(), height);
    debug!(
        "{} hallway segments: {} authored pieces, {} meshed ({} triangles)",
        segment_count,
        pieces.len(),
        segments.len(),
        mesh.triangle_count()
    );
    HallwayOutput { segment_count, pieces, mesh }
}
