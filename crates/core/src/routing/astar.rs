//! Four-directional A* between two door cells.
//!
//! Costs are integer tenths of a cell width so the open set orders exactly. A step into a cell an
//! earlier hallway already uses is discounted, clearance-band cells cost extra, and a step whose
//! direction differs from the current cell's travel direction pays the turn penalty.

use std::collections::{BTreeMap, BTreeSet};

use super::grid::RoutingGrid;
use crate::config::RoutingCosts;
use crate::types::{CellCoord, Direction};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    j: i32,
    i: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Tenths {
    step: u32,
    reuse_step: u32,
    turn: u32,
    clearance: u32,
}

impl Tenths {
    fn from_costs(costs: &RoutingCosts) -> Self {
        let tenths = |value: f32| (value * 10.0).round().max(0.0) as u32;
        Self {
            step: tenths(costs.step).max(1),
            reuse_step: tenths(costs.reuse_step).max(1),
            turn: tenths(costs.turn_penalty),
            clearance: tenths(costs.clearance_penalty),
        }
    }

    /// Cheapest possible step, so the Manhattan estimate never overshoots.
    fn floor(self) -> u32 {
        self.step.min(self.reuse_step)
    }
}

/// Cell sequence with the travel direction into each cell, plus the cost in tenths.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct FoundPath {
    pub cells: Vec<(CellCoord, Direction)>,
    pub cost_tenths: u32,
}

/// Searches from `start` (leaving along `start_direction`) to `goal`. Door cells other than the
/// two endpoints are never used as waypoints.
pub(super) fn find_path(
    grid: &RoutingGrid,
    start: CellCoord,
    start_direction: Direction,
    goal: CellCoord,
    costs: &RoutingCosts,
) -> Option<FoundPath> {
    if !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return None;
    }
    let tenths = Tenths::from_costs(costs);
    let heuristic = |coord: CellCoord| coord.manhattan(goal) * tenths.floor();

    let mut open_set = BTreeSet::new();
    let mut closed = BTreeSet::new();
    let mut g_score: BTreeMap<CellCoord, u32> = BTreeMap::new();
    let mut travel: BTreeMap<CellCoord, Direction> = BTreeMap::new();
    let mut came_from: BTreeMap<CellCoord, CellCoord> = BTreeMap::new();

    let h = heuristic(start);
    open_set.insert(OpenNode { f: h, h, j: start.j, i: start.i });
    g_score.insert(start, 0);
    travel.insert(start, start_direction);

    while let Some(current) = open_set.pop_first() {
        let coord = CellCoord::new(current.i, current.j);
        if !closed.insert(coord) {
            continue;
        }
        if coord == goal {
            let cost = g_score.get(&goal).copied().unwrap_or(0);
            return Some(reconstruct(&came_from, &travel, start, goal, cost));
        }
        let current_g = g_score.get(&coord).copied().unwrap_or(u32::MAX);
        let current_direction = travel.get(&coord).copied().unwrap_or(start_direction);

        for direction in Direction::ALL {
            let next = coord.step(direction);
            if closed.contains(&next) {
                continue;
            }
            let Some(cell) = grid.cell(next) else {
                continue;
            };
            if !cell.accessible || (cell.door.is_some() && next != goal) {
                continue;
            }
            let mut step = if cell.used_by_path { tenths.reuse_step } else { tenths.step };
            if cell.clearance {
                step += tenths.clearance;
            }
            if direction != current_direction {
                step += tenths.turn;
            }
            let tentative = current_g.saturating_add(step);
            if tentative < g_score.get(&next).copied().unwrap_or(u32::MAX) {
                came_from.insert(next, coord);
                travel.insert(next, direction);
                g_score.insert(next, tentative);
                let h = heuristic(next);
                open_set.insert(OpenNode { f: tentative + h, h, j: next.j, i: next.i });
            }
        }
    }
    None
}

fn reconstruct(
    came_from: &BTreeMap<CellCoord, CellCoord>,
    travel: &BTreeMap<CellCoord, Direction>,
    start: CellCoord,
    goal: CellCoord,
    cost_tenths: u32,
) -> FoundPath {
    let mut cells = Vec::new();
    let mut cursor = goal;
    loop {
        if let Some(&direction) = travel.get(&cursor) {
            cells.push((cursor, direction));
        }
        if cursor == start {
            break;
        }
        match came_from.get(&cursor) {
            Some(&previous) => cursor = previous,
            None => break,
        }
    }
    cells.reverse();
    FoundPath { cells, cost_tenths }
}
