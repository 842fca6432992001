//! Small built-in library used by the CLI when no preset is given, and by tests.

use super::{DoorSlot, MaskSpec, TemplateLibrary, TemplateSpec};
use crate::types::{Direction, Vec2};

fn room(name: &str, width: f32, depth: f32, doors: (usize, usize), tags: &[&str]) -> TemplateSpec {
    TemplateSpec {
        name: name.to_string(),
        size: Vec2::new(width, depth),
        min_doors: doors.0,
        max_doors: doors.1,
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        door_slots: Vec::new(),
        geometry: Some(format!("rooms/{name}")),
    }
}

fn mask(name: &str, openings: &[Direction], tags: &[&str]) -> MaskSpec {
    MaskSpec {
        name: name.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        openings: openings.to_vec(),
        geometry: Some(format!("hallways/{name}")),
    }
}

/// Eight room templates covering one to six doors, plus junction pieces for tees and crossings.
/// Straight runs, bends and dead ends are left to the procedural mesher.
pub fn starter_library() -> TemplateLibrary {
    use Direction::{NegX, NegZ, PosX, PosZ};

    let mut great_hall = room("great_hall", 20.0, 16.0, (3, 6), &["lit", "grand"]);
    great_hall.door_slots = DoorSlot::two_per_side(great_hall.size);

    let templates = vec![
        room("cell", 8.0, 8.0, (1, 1), &["stone"]),
        room("guard_post", 10.0, 8.0, (1, 2), &["stone", "lit"]),
        room("gallery", 16.0, 6.0, (1, 3), &["hall", "lit"]),
        room("crossroads", 12.0, 12.0, (2, 4), &["stone", "hub"]),
        great_hall,
        room("shrine", 10.0, 10.0, (1, 3), &["shrine", "lit"]),
        room("vault", 8.0, 10.0, (1, 2), &["treasure"]),
        room("cistern", 14.0, 14.0, (1, 4), &["wet", "stone"]),
    ];
    let masks = vec![
        mask("tee", &[PosX, NegX, PosZ], &["stone", "junction"]),
        mask("arched_tee", &[PosX, NegX, PosZ], &["arched", "junction"]),
        mask("cross", &[PosX, PosZ, NegX, NegZ], &["stone", "junction"]),
    ];

    TemplateLibrary::from_specs(templates, masks)
}
