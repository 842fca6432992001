//! Hallway routing over the shared grid.
//!
//! Pairs are routed one at a time in connection order. Every committed path marks its cells as
//! used, which lowers the cost for later pairs and lets corridors merge, so the order matters and
//! routing never runs in parallel.

mod astar;
mod grid;

use log::warn;
use serde::Serialize;

use crate::assembly::{Assembly, Door, DoorId, DoorPair};
use crate::config::RoutingCosts;
use crate::error::{RoutingFailure, RoutingFailureReason};
use crate::graph::NodeId;
use crate::types::{CellCoord, Direction, Vec2};

pub use grid::{GridCell, RoutingGrid};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PathStep {
    pub cell: CellCoord,
    pub position: Vec2,
    /// Direction of travel into this cell; the first cell carries its door's outward direction.
    pub direction: Direction,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HallwayPath {
    pub from_room: NodeId,
    pub to_room: NodeId,
    pub from_door: DoorId,
    pub to_door: DoorId,
    pub steps: Vec<PathStep>,
    /// In cell widths.
    pub cost: f32,
    pub turns: usize,
}

impl HallwayPath {
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.steps.iter().map(|step| step.cell)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoutingOutcome {
    pub paths: Vec<HallwayPath>,
    pub failures: Vec<RoutingFailure>,
}

/// Routes one door pair and commits the path to the grid on success.
pub fn route_pair(
    grid: &mut RoutingGrid,
    pair: &DoorPair,
    doors: &[Door],
    costs: &RoutingCosts,
) -> Result<HallwayPath, RoutingFailure> {
    let failure = |reason| RoutingFailure {
        from_room: pair.from_room,
        to_room: pair.to_room,
        from_door: pair.from_door,
        to_door: pair.to_door,
        reason,
    };
    if grid.is_sealed(pair.from_door) || grid.is_sealed(pair.to_door) {
        return Err(failure(RoutingFailureReason::DoorSealed));
    }
    let from = &doors[pair.from_door.index()];
    let to = &doors[pair.to_door.index()];
    let (Some(start), Some(goal)) = (grid.coord_at(from.position), grid.coord_at(to.position))
    else {
        return Err(failure(RoutingFailureReason::DoorOutsideGrid));
    };

    let found = astar::find_path(grid, start, from.direction, goal, costs)
        .ok_or_else(|| failure(RoutingFailureReason::Exhausted))?;
    let coords: Vec<CellCoord> = found.cells.iter().map(|(coord, _)| *coord).collect();
    grid.commit_path(&coords);

    let steps: Vec<PathStep> = found
        .cells
        .iter()
        .filter_map(|&(cell, direction)| {
            let position = grid.cell(cell)?.position;
            Some(PathStep { cell, position, direction })
        })
        .collect();
    let turns = steps.windows(2).filter(|pair| pair[0].direction != pair[1].direction).count();
    Ok(HallwayPath {
        from_room: pair.from_room,
        to_room: pair.to_room,
        from_door: pair.from_door,
        to_door: pair.to_door,
        steps,
        cost: found.cost_tenths as f32 / 10.0,
        turns,
    })
}

/// Routes every connection of the assembly in order and marks the doors of each routed pair as
/// matched. Failures are recorded, never fatal.
pub fn route_hallways(
    grid: &mut RoutingGrid,
    assembly: &mut Assembly,
    costs: &RoutingCosts,
) -> RoutingOutcome {
    let mut outcome = RoutingOutcome::default();
    for index in 0..assembly.connections.len() {
        let pair = assembly.connections[index];
        match route_pair(grid, &pair, &assembly.doors, costs) {
            Ok(path) => {
                assembly.doors[pair.from_door.index()].matched = true;
                assembly.doors[pair.to_door.index()].matched = true;
                outcome.paths.push(path);
            }
            Err(failure) => {
                warn!(
                    "no hallway between rooms {} and {} (doors {} and {}): {:?}",
                    failure.from_room,
                    failure.to_room,
                    failure.from_door,
                    failure.to_door,
                    failure.reason
                );
                outcome.failures.push(failure);
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::RoomInstance;
    use crate::config::GenerationConfig;
    use crate::graph::NodeType;
    use crate::library::{GeometryRef, TemplateId};

    fn door(id: u32, room: u32, position: Vec2, direction: Direction) -> Door {
        Door {
            id: DoorId(id),
            room: NodeId(room),
            slot: 0,
            offset: Vec2::ZERO,
            position,
            direction,
            paired: true,
            matched: false,
        }
    }

    fn pair() -> DoorPair {
        DoorPair {
            from_room: NodeId(0),
            to_room: NodeId(1),
            from_door: DoorId(0),
            to_door: DoorId(1),
        }
    }

    #[test]
    fn routed_pair_is_committed_and_linked() {
        let mut grid = RoutingGrid::open(Vec2::ZERO, 2.0, 8, 3);
        let doors = vec![
            door(0, 0, Vec2::new(1.0, 3.0), Direction::PosX),
            door(1, 1, Vec2::new(9.0, 3.0), Direction::NegX),
        ];
        grid.mark_door(CellCoord::new(0, 1), DoorId(0), NodeId(0), Direction::PosX);
        grid.mark_door(CellCoord::new(4, 1), DoorId(1), NodeId(1), Direction::NegX);

        let path =
            route_pair(&mut grid, &pair(), &doors, &RoutingCosts::default()).expect("open row");
        assert_eq!(path.steps.len(), 5);
        assert_eq!(path.turns, 0);
        assert!((path.cost - 6.0).abs() < 1e-6);
        assert_eq!(path.steps[2].position, Vec2::new(5.0, 3.0));
        for coord in path.cells() {
            assert!(grid.cell(coord).expect("on grid").used_by_path);
        }
        let middle = grid.cell(CellCoord::new(2, 1)).expect("on grid");
        assert!(middle.links.contains(Direction::PosX) && middle.links.contains(Direction::NegX));
    }

    #[test]
    fn door_off_the_grid_is_a_routing_failure() {
        let mut grid = RoutingGrid::open(Vec2::ZERO, 2.0, 4, 4);
        let doors = vec![
            door(0, 0, Vec2::new(1.0, 1.0), Direction::PosX),
            door(1, 1, Vec2::new(40.0, 1.0), Direction::NegX),
        ];
        let failure = route_pair(&mut grid, &pair(), &doors, &RoutingCosts::default())
            .expect_err("off grid");
        assert_eq!(failure.reason, RoutingFailureReason::DoorOutsideGrid);
        assert!(grid.cells().iter().all(|cell| !cell.used_by_path));
    }

    fn square(node: u32, center: Vec2, door: DoorId) -> RoomInstance {
        RoomInstance {
            node: NodeId(node),
            node_type: NodeType::Side,
            critical: false,
            template: TemplateId::default(),
            template_name: "square".to_string(),
            geometry: GeometryRef::default(),
            center,
            size: Vec2::new(8.0, 8.0),
            doors: vec![door],
        }
    }

    fn two_rooms(second_center: Vec2, second_door: Vec2) -> Assembly {
        let mut doors = vec![
            door(0, 0, Vec2::new(4.0, 0.0), Direction::PosX),
            door(1, 1, second_door, Direction::NegX),
        ];
        doors[0].offset = Vec2::new(4.0, 0.0);
        doors[1].offset = second_door - second_center;
        Assembly {
            rooms: vec![
                square(0, Vec2::ZERO, DoorId(0)),
                square(1, second_center, DoorId(1)),
            ],
            doors,
            connections: vec![pair()],
            separation_iterations: 0,
        }
    }

    #[test]
    fn routed_doors_are_marked_matched() {
        let mut assembly = two_rooms(Vec2::new(20.0, 0.0), Vec2::new(16.0, 0.0));
        let config = GenerationConfig { door_width: 2.0, grid_margin: 3, ..Default::default() };
        let mut grid = RoutingGrid::build(&assembly, &config);

        let outcome = route_hallways(&mut grid, &mut assembly, &config.routing);
        assert_eq!(outcome.paths.len(), 1);
        assert!(outcome.failures.is_empty());
        assert!(assembly.doors.iter().all(|door| door.matched));
    }

    #[test]
    fn door_buried_in_a_neighbour_is_a_sealed_failure() {
        // Room 1 starts half a unit past room 0's east wall, so door d0's cell lies inside it.
        let mut assembly = two_rooms(Vec2::new(8.5, 0.0), Vec2::new(4.5, 0.0));
        let config = GenerationConfig { door_width: 2.0, grid_margin: 3, ..Default::default() };
        let mut grid = RoutingGrid::build(&assembly, &config);
        assert!(grid.is_sealed(DoorId(0)));

        let outcome = route_hallways(&mut grid, &mut assembly, &config.routing);
        assert!(outcome.paths.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].reason, RoutingFailureReason::DoorSealed);
        assert!(assembly.doors.iter().all(|door| !door.matched));
        assert!(grid.cells().iter().all(|cell| !cell.used_by_path));
    }
}
