//! Authored hallway pieces chosen per segment through the `Hallways` constraint bucket.

use std::collections::BTreeMap;

use serde::Serialize;

use super::HallwaySegment;
use crate::constraints::{Constraint, ConstraintTarget};
use crate::context::GenerationContext;
use crate::library::{GeometryRef, MaskId, TemplateLibrary};
use crate::types::{CellCoord, Vec3};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HallwayPiece {
    pub cell: CellCoord,
    pub mask: String,
    pub geometry: GeometryRef,
    /// Counter-clockwise quarter turns applied to the authored pose.
    pub rotation: u8,
    pub position: Vec3,
}

/// Walks segments in grid-coordinate order and picks a shape-compatible mask for each one the
/// constraints allow. Segments without a candidate keep their slot as a non-match.
pub fn assign_pieces(
    segments: &BTreeMap<CellCoord, HallwaySegment>,
    library: &TemplateLibrary,
    context: &mut GenerationContext<'_>,
) -> Vec<HallwayPiece> {
    let mut pieces = Vec::new();
    if library.masks().next().is_none() {
        return pieces;
    }
    let constraints = context.constraints;
    context.usage.open_bucket(constraints, ConstraintTarget::Hallways, segments.len());
    let active: Vec<(usize, &Constraint)> = constraints
        .iter()
        .enumerate()
        .filter(|(_, constraint)| constraint.target == ConstraintTarget::Hallways)
        .collect();

    for segment in segments.values() {
        let mut candidates: Vec<(MaskId, u8, Vec<bool>)> = Vec::new();
        let mut weights = Vec::new();
        for (id, mask) in library.masks() {
            let Some(rotation) = mask.rotation_for(segment.open) else {
                continue;
            };
            let matches: Vec<bool> =
                active.iter().map(|(_, constraint)| constraint.predicate_matches(mask)).collect();
            let permitted = active.iter().zip(&matches).all(|(&(index, constraint), &matched)| {
                context.usage.permits(index, constraint, matched)
            });
            if !permitted {
                continue;
            }
            let bonus: f32 = active
                .iter()
                .zip(&matches)
                .map(|(&(index, constraint), &matched)| {
                    context.usage.priority_bonus(index, constraint, matched)
                })
                .sum();
            weights.push(1.0 + bonus);
            candidates.push((id, rotation, matches));
        }

        let Some(pick) = context.rng.weighted_index(&weights) else {
            for &(index, _) in &active {
                context.usage.record(index, false);
            }
            continue;
        };
        let (id, rotation, matches) = &candidates[pick];
        for (&(index, _), &matched) in active.iter().zip(matches) {
            context.usage.record(index, matched);
        }
        let mask = library.mask(*id);
        pieces.push(HallwayPiece {
            cell: segment.cell,
            mask: mask.name.clone(),
            geometry: mask.geometry.clone(),
            rotation: *rotation,
            position: Vec3::on_plane(segment.position, 0.0),
        });
    }
    pieces
}
