//! Structural checks every generated level must pass. Shared by the fuzz harness and the
//! invariant tests of both crates.

use std::collections::BTreeSet;

use crate::config::GenerationConfig;
use crate::constraints::Cardinality;
use crate::graph::NodeType;
use crate::library::TemplateLibrary;
use crate::model::{CellState, GeneratedLevel};
use crate::types::CellCoord;

/// Returns a description of the first broken invariant.
pub fn check_level(
    level: &GeneratedLevel,
    config: &GenerationConfig,
    library: &TemplateLibrary,
) -> Result<(), String> {
    let seed = level.seed;
    if level.rooms.len() != config.room_count {
        return Err(format!("seed {seed}: {} rooms for {}", level.rooms.len(), config.room_count));
    }
    let count = |node_type| level.rooms.iter().filter(|room| room.node_type == node_type).count();
    if count(NodeType::Start) != 1
        || count(NodeType::End) != 1
        || count(NodeType::Middle) != config.critical_path_length - 2
    {
        return Err(format!("seed {seed}: critical path does not match its configured length"));
    }
    if level.connections.len() + 1 != level.rooms.len() {
        return Err(format!("seed {seed}: {} connections", level.connections.len()));
    }

    let mut seen = BTreeSet::new();
    for pair in &level.connections {
        for door in [pair.from_door, pair.to_door] {
            if !seen.insert(door) {
                return Err(format!("seed {seed}: door {door} appears in two pairs"));
            }
        }
    }
    for room in &level.rooms {
        let edges = level
            .connections
            .iter()
            .filter(|pair| pair.from_room == room.node || pair.to_room == room.node)
            .count();
        if room.doors.len() != edges {
            return Err(format!(
                "seed {seed}: room {} has {} doors and {edges} edges",
                room.node,
                room.doors.len()
            ));
        }

        let subject = library
            .templates()
            .find(|(_, template)| template.name == room.template_name)
            .map(|(id, _)| library.subject(id))
            .ok_or_else(|| format!("seed {seed}: template {} not in library", room.template_name))?;
        let broken = config.constraints.iter().find(|constraint| {
            constraint.cardinality == Cardinality::All
                && constraint.target.applies_to(room.node_type)
                && !constraint.predicate_matches(&subject)
        });
        if let Some(constraint) = broken {
            return Err(format!("seed {seed}: room {} breaks `{}`", room.node, constraint.name));
        }
    }

    check_grid(level)?;

    let routed: BTreeSet<_> =
        level.paths.iter().flat_map(|path| [path.from_door, path.to_door]).collect();
    for door in &level.doors {
        if door.matched != routed.contains(&door.id) {
            let id = door.id;
            return Err(format!("seed {seed}: door {id} matched flag disagrees with routing"));
        }
    }
    for path in &level.paths {
        if path.steps.is_empty() {
            let (from, to) = (path.from_door, path.to_door);
            return Err(format!("seed {seed}: empty path between doors {from} and {to}"));
        }
    }
    if level.diagnostics.aborted == level.diagnostics.routing_failures.is_empty() {
        return Err(format!("seed {seed}: aborted flag disagrees with the failure list"));
    }
    Ok(())
}

/// Cells strictly inside a room footprint grown by half a cell are blocked, apart from the
/// cells holding that room's own doors.
fn check_grid(level: &GeneratedLevel) -> Result<(), String> {
    let seed = level.seed;
    let grid = &level.diagnostics.grid;
    for room in &level.rooms {
        let footprint = room.rect().inflated(grid.cell_size * 0.5);
        let own_doors: BTreeSet<CellCoord> = room
            .doors
            .iter()
            .filter_map(|&id| level.doors.get(id.index()))
            .filter_map(|door| grid.coord_at(door.position))
            .collect();
        for j in 0..grid.height {
            for i in 0..grid.width {
                let coord = CellCoord::new(i, j);
                if !footprint.contains_strict(grid.cell_center(coord)) {
                    continue;
                }
                match grid.state(coord) {
                    Some(CellState::Blocked) => {}
                    Some(CellState::Door) if own_doors.contains(&coord) => {}
                    state => {
                        return Err(format!(
                            "seed {seed}: cell {coord:?} inside room {} is {state:?}",
                            room.node
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use crate::library::starter_library;

    #[test]
    fn default_levels_pass() {
        let library = starter_library();
        for seed in 0..8 {
            let config = GenerationConfig { seed, ..Default::default() };
            let level = generate(&config, &library).expect("default config generates");
            check_level(&level, &config, &library).expect("invariants hold");
        }
    }

    #[test]
    fn door_reuse_is_reported() {
        let library = starter_library();
        let config = GenerationConfig { seed: 4, ..Default::default() };
        let mut level = generate(&config, &library).expect("default config generates");
        let first = level.connections[0].from_door;
        level.connections[1].to_door = first;

        let error = check_level(&level, &config, &library).expect_err("door used twice");
        assert!(error.contains("appears in two pairs"), "{error}");
    }

    #[test]
    fn foreign_door_inside_a_room_is_reported() {
        let library = starter_library();
        let config = GenerationConfig { seed: 13, room_count: 16, ..Default::default() };
        let mut level = generate(&config, &library).expect("default config generates");
        let room = &level.rooms[0];
        let footprint = room.rect().inflated(level.diagnostics.grid.cell_size * 0.5);
        let center_cell = level.diagnostics.grid.coord_at(room.center).expect("room on grid");
        assert!(footprint.contains_strict(level.diagnostics.grid.cell_center(center_cell)));

        let grid = &mut level.diagnostics.grid;
        let index = (center_cell.j * grid.width + center_cell.i) as usize;
        grid.cells[index] = CellState::Door;
        let error = check_level(&level, &config, &library).expect_err("door cell in a room");
        assert!(error.contains("inside room"), "{error}");
    }

    #[test]
    fn matched_flag_follows_routing() {
        let library = starter_library();
        let config = GenerationConfig { seed: 2, ..Default::default() };
        let mut level = generate(&config, &library).expect("default config generates");
        let door = level.paths[0].from_door;
        level.doors[door.index()].matched = false;

        let error = check_level(&level, &config, &library).expect_err("flag cleared");
        assert!(error.contains("matched flag"), "{error}");
    }
}
