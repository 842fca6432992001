//! Uniform routing grid over the placed rooms.
//!
//! Cell size is one door width. Blocking runs in two passes: every room rect grown by half a door
//! width plus the wall clearance blocks the cells whose centers fall strictly inside it, then the
//! cells outside the half-door-width rect are reopened as a clearance band that routing avoids
//! through a cost penalty. Door cells are forced open last, unless the cell lies inside another
//! room's footprint; such doors stay sealed and their hallways are reported as failures.

use std::collections::BTreeSet;

use crate::assembly::{Assembly, DoorId};
use crate::config::GenerationConfig;
use crate::graph::NodeId;
use crate::model::{CellState, GridSnapshot};
use crate::types::{CellCoord, Direction, DirectionSet, Rect, Vec2};

#[derive(Clone, Debug, PartialEq)]
pub struct GridCell {
    pub coord: CellCoord,
    /// World position of the cell center.
    pub position: Vec2,
    pub accessible: bool,
    /// Room whose footprint or clearance band covers this cell, or whose door opens onto it.
    pub room: Option<NodeId>,
    pub door: Option<DoorId>,
    pub door_direction: Option<Direction>,
    pub clearance: bool,
    pub used_by_path: bool,
    /// Sides shared with the next or previous cell of a routed path.
    pub links: DirectionSet,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoutingGrid {
    /// World position of the minimum corner of cell (0, 0).
    origin: Vec2,
    cell_size: f32,
    width: i32,
    height: i32,
    cells: Vec<GridCell>,
    sealed: BTreeSet<DoorId>,
}

impl RoutingGrid {
    /// All cells accessible, covering `width × height` cells from `origin`.
    pub fn open(origin: Vec2, cell_size: f32, width: i32, height: i32) -> Self {
        let mut cells = Vec::with_capacity((width.max(0) * height.max(0)) as usize);
        for j in 0..height {
            for i in 0..width {
                let coord = CellCoord::new(i, j);
                let offset = Vec2::new((i as f32 + 0.5) * cell_size, (j as f32 + 0.5) * cell_size);
                cells.push(GridCell {
                    coord,
                    position: origin + offset,
                    accessible: true,
                    room: None,
                    door: None,
                    door_direction: None,
                    clearance: false,
                    used_by_path: false,
                    links: DirectionSet::EMPTY,
                });
            }
        }
        Self { origin, cell_size, width, height, cells, sealed: BTreeSet::new() }
    }

    pub fn build(assembly: &Assembly, config: &GenerationConfig) -> Self {
        let cell_size = config.door_width;
        let bounds = assembly
            .rooms
            .iter()
            .map(|room| room.rect())
            .reduce(Rect::union)
            .unwrap_or_else(|| Rect::new(Vec2::ZERO, Vec2::new(cell_size, cell_size)));
        let margin = config.grid_margin as f32 * cell_size;
        let origin = bounds.min() - Vec2::new(margin, margin);
        let width = ((bounds.size.x + 2.0 * margin) / cell_size).ceil() as i32;
        let height = ((bounds.size.z + 2.0 * margin) / cell_size).ceil() as i32;
        let mut grid = Self::open(origin, cell_size, width.max(1), height.max(1));

        let half = cell_size * 0.5;
        for room in &assembly.rooms {
            grid.block_inside(room.rect().inflated(half + config.wall_clearance), room.node);
        }
        let footprints: Vec<Rect> =
            assembly.rooms.iter().map(|room| room.rect().inflated(half)).collect();
        grid.reopen_clearance_band(&footprints);
        for door in &assembly.doors {
            let Some(coord) = grid.coord_at(door.position) else {
                continue;
            };
            let Some(center) = grid.cell(coord).map(|cell| cell.position) else {
                continue;
            };
            let buried = assembly
                .rooms
                .iter()
                .zip(&footprints)
                .any(|(room, rect)| room.node != door.room && rect.contains_strict(center));
            if buried {
                grid.sealed.insert(door.id);
                continue;
            }
            if let Some(cell) = grid.cell_mut(coord)
                && cell.door.is_none()
            {
                cell.accessible = true;
                cell.clearance = false;
                cell.room = Some(door.room);
                cell.door = Some(door.id);
                cell.door_direction = Some(door.direction);
            }
        }
        grid
    }

    fn block_inside(&mut self, rect: Rect, owner: NodeId) {
        for cell in &mut self.cells {
            if cell.accessible && rect.contains_strict(cell.position) {
                cell.accessible = false;
                cell.room = Some(owner);
            }
        }
    }

    fn reopen_clearance_band(&mut self, footprints: &[Rect]) {
        for cell in &mut self.cells {
            if !cell.accessible
                && !footprints.iter().any(|rect| rect.contains_strict(cell.position))
            {
                cell.accessible = true;
                cell.clearance = true;
            }
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        let inside = (0..self.width).contains(&coord.i) && (0..self.height).contains(&coord.j);
        inside.then(|| (coord.j * self.width + coord.i) as usize)
    }

    pub fn cell(&self, coord: CellCoord) -> Option<&GridCell> {
        self.index(coord).map(|index| &self.cells[index])
    }

    pub fn cell_mut(&mut self, coord: CellCoord) -> Option<&mut GridCell> {
        self.index(coord).map(|index| &mut self.cells[index])
    }

    /// Cell containing a world position, if it lies on the grid.
    pub fn coord_at(&self, position: Vec2) -> Option<CellCoord> {
        let local = position - self.origin;
        let coord = CellCoord::new(
            (local.x / self.cell_size).floor() as i32,
            (local.z / self.cell_size).floor() as i32,
        );
        self.index(coord).map(|_| coord)
    }

    /// Door whose cell lies inside another room and was left blocked.
    pub fn is_sealed(&self, door: DoorId) -> bool {
        self.sealed.contains(&door)
    }

    pub fn is_walkable(&self, coord: CellCoord) -> bool {
        self.cell(coord).is_some_and(|cell| cell.accessible)
    }

    /// Tags a cell as a door opening. Used by hand-built grids.
    pub fn mark_door(
        &mut self,
        coord: CellCoord,
        door: DoorId,
        room: NodeId,
        direction: Direction,
    ) {
        if let Some(cell) = self.cell_mut(coord) {
            cell.accessible = true;
            cell.room = Some(room);
            cell.door = Some(door);
            cell.door_direction = Some(direction);
        }
    }

    pub fn set_blocked(&mut self, coord: CellCoord, room: Option<NodeId>) {
        if let Some(cell) = self.cell_mut(coord) {
            cell.accessible = false;
            cell.room = room;
        }
    }

    /// Marks a routed cell sequence as used and links consecutive cells.
    pub fn commit_path(&mut self, coords: &[CellCoord]) {
        for &coord in coords {
            if let Some(cell) = self.cell_mut(coord) {
                cell.used_by_path = true;
            }
        }
        for pair in coords.windows(2) {
            let Some(direction) = Direction::between(pair[0], pair[1]) else {
                continue;
            };
            if let Some(cell) = self.cell_mut(pair[0]) {
                cell.links.insert(direction);
            }
            if let Some(cell) = self.cell_mut(pair[1]) {
                cell.links.insert(direction.opposite());
            }
        }
    }

    pub fn snapshot(&self) -> GridSnapshot {
        let cells = self
            .cells
            .iter()
            .map(|cell| {
                if cell.door.is_some() {
                    CellState::Door
                } else if cell.used_by_path {
                    CellState::Path
                } else if !cell.accessible {
                    CellState::Blocked
                } else if cell.clearance {
                    CellState::Clearance
                } else {
                    CellState::Free
                }
            })
            .collect();
        GridSnapshot {
            origin: self.origin,
            cell_size: self.cell_size,
            width: self.width,
            height: self.height,
            cells,
        }
    }
}
