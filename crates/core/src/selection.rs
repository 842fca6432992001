//! Template selection for one graph node: door-count filter, constraint gate, weighted pick.

use log::debug;

use crate::constraints::Constraint;
use crate::context::GenerationContext;
use crate::error::TemplateSelectionError;
use crate::graph::RoomNode;
use crate::library::{TemplateId, TemplateLibrary};

struct Candidate {
    id: TemplateId,
    matches: Vec<bool>,
    weight: f32,
}

/// Picks a template for `node` and records the choice against every constraint governing it.
///
/// Candidates keep library insertion order. Each survivor weighs `1 + Σ bonus`, where the bonus
/// grows for templates that help a still-unmet `AtLeast`/`Exactly` quota.
pub fn select_template(
    library: &TemplateLibrary,
    node: &RoomNode,
    context: &mut GenerationContext<'_>,
) -> Result<TemplateId, TemplateSelectionError> {
    let door_count = node.door_count();
    let constraints = context.constraints;
    let active: Vec<(usize, &Constraint)> = constraints
        .iter()
        .enumerate()
        .filter(|(_, constraint)| constraint.target.applies_to(node.node_type))
        .collect();

    let mut candidates = Vec::new();
    for (id, template) in library.templates() {
        if !template.accepts_door_count(door_count) {
            continue;
        }
        let subject = library.subject(id);
        let matches: Vec<bool> =
            active.iter().map(|(_, constraint)| constraint.predicate_matches(&subject)).collect();
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
        candidates.push(Candidate { id, matches, weight: 1.0 + bonus });
    }

    let failure = TemplateSelectionError { node: node.id, room_type: node.node_type, door_count };
    let weights: Vec<f32> = candidates.iter().map(|candidate| candidate.weight).collect();
    let Some(pick) = context.rng.weighted_index(&weights) else {
        return Err(failure);
    };
    let chosen = &candidates[pick];
    for (&(index, _), &matched) in active.iter().zip(&chosen.matches) {
        context.usage.record(index, matched);
    }

    debug!(
        "node {} ({:?}, {} doors): `{}` out of {} candidates",
        node.id,
        node.node_type,
        door_count,
        library.template(chosen.id).name,
        candidates.len()
    );
    Ok(chosen.id)
}
