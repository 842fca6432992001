//! Finished level returned by a generation run, with its diagnostics and a stable fingerprint.

use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

use crate::assembly::{Door, DoorPair, RoomInstance};
use crate::error::{RoutingFailure, RoutingFailureReason};
use crate::graph::NodeType;
use crate::hallway::{HallwayMesh, HallwayPiece};
use crate::routing::HallwayPath;
use crate::types::{CellCoord, Direction, Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CellState {
    Blocked,
    Free,
    Clearance,
    Door,
    Path,
}

impl CellState {
    pub fn glyph(self) -> char {
        match self {
            Self::Blocked => '#',
            Self::Free => '.',
            Self::Clearance => '+',
            Self::Door => 'D',
            Self::Path => 'o',
        }
    }
}

/// Per-cell routing state at the end of the run, row-major from cell (0, 0).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GridSnapshot {
    pub origin: Vec2,
    pub cell_size: f32,
    pub width: i32,
    pub height: i32,
    pub cells: Vec<CellState>,
}

impl GridSnapshot {
    pub fn state(&self, coord: CellCoord) -> Option<CellState> {
        let inside = (0..self.width).contains(&coord.i) && (0..self.height).contains(&coord.j);
        inside.then(|| self.cells[(coord.j * self.width + coord.i) as usize])
    }

    pub fn cell_center(&self, coord: CellCoord) -> Vec2 {
        let offset = Vec2::new(coord.i as f32 + 0.5, coord.j as f32 + 0.5) * self.cell_size;
        self.origin + offset
    }

    /// Cell containing a world position, if it lies on the grid.
    pub fn coord_at(&self, position: Vec2) -> Option<CellCoord> {
        let local = position - self.origin;
        let coord = CellCoord::new(
            (local.x / self.cell_size).floor() as i32,
            (local.z / self.cell_size).floor() as i32,
        );
        self.state(coord).map(|_| coord)
    }

    /// One text row per grid row, +Z at the top.
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height.max(0)) as usize);
        for j in (0..self.height).rev() {
            for i in 0..self.width {
                out.push(self.state(CellCoord::new(i, j)).map_or(' ', CellState::glyph));
            }
            out.push('\n');
        }
        out
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub grid: GridSnapshot,
    pub routing_failures: Vec<RoutingFailure>,
    /// Set when at least one connection could not be routed.
    pub aborted: bool,
    pub separation_iterations: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeneratedLevel {
    pub seed: u64,
    pub rooms: Vec<RoomInstance>,
    pub doors: Vec<Door>,
    pub connections: Vec<DoorPair>,
    pub paths: Vec<HallwayPath>,
    pub pieces: Vec<HallwayPiece>,
    pub mesh: HallwayMesh,
    pub diagnostics: Diagnostics,
}

#[derive(Default)]
struct CanonicalWriter {
    bytes: Vec<u8>,
}

impl CanonicalWriter {
    fn u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    fn u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn u64(&mut self, value: u64) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn f32(&mut self, value: f32) {
        self.u32(value.to_bits());
    }

    fn count(&mut self, value: usize) {
        self.u64(value as u64);
    }

    fn text(&mut self, value: &str) {
        self.count(value.len());
        self.bytes.extend_from_slice(value.as_bytes());
    }

    fn vec2(&mut self, value: Vec2) {
        self.f32(value.x);
        self.f32(value.z);
    }

    fn vec3(&mut self, value: Vec3) {
        self.f32(value.x);
        self.f32(value.y);
        self.f32(value.z);
    }

    fn cell(&mut self, value: CellCoord) {
        self.i32(value.i);
        self.i32(value.j);
    }

    fn direction(&mut self, value: Direction) {
        self.u8(match value {
            Direction::PosX => 0,
            Direction::NegX => 1,
            Direction::PosZ => 2,
            Direction::NegZ => 3,
        });
    }

    fn indices(&mut self, values: &[u32]) {
        self.count(values.len());
        for &value in values {
            self.u32(value);
        }
    }
}

impl GeneratedLevel {
    /// Little-endian encoding of everything a host consumes, floats by bit pattern.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = CanonicalWriter::default();
        out.u64(self.seed);

        out.count(self.rooms.len());
        for room in &self.rooms {
            out.u32(room.node.0);
            out.u8(match room.node_type {
                NodeType::Start => 0,
                NodeType::Middle => 1,
                NodeType::End => 2,
                NodeType::Side => 3,
            });
            out.u8(u8::from(room.critical));
            out.text(&room.template_name);
            out.text(&room.geometry.0);
            out.vec2(room.center);
            out.vec2(room.size);
            out.count(room.doors.len());
            for door in &room.doors {
                out.u32(door.0);
            }
        }

        out.count(self.doors.len());
        for door in &self.doors {
            out.u32(door.id.0);
            out.u32(door.room.0);
            out.vec2(door.position);
            out.direction(door.direction);
            out.u8(u8::from(door.paired));
            out.u8(u8::from(door.matched));
        }

        out.count(self.connections.len());
        for pair in &self.connections {
            out.u32(pair.from_door.0);
            out.u32(pair.to_door.0);
        }

        out.count(self.paths.len());
        for path in &self.paths {
            out.u32(path.from_door.0);
            out.u32(path.to_door.0);
            out.count(path.steps.len());
            for step in &path.steps {
                out.cell(step.cell);
                out.direction(step.direction);
            }
            out.f32(path.cost);
            out.count(path.turns);
        }

        out.count(self.pieces.len());
        for piece in &self.pieces {
            out.cell(piece.cell);
            out.text(&piece.mask);
            out.u8(piece.rotation);
        }

        out.count(self.mesh.vertices.len());
        for &vertex in &self.mesh.vertices {
            out.vec3(vertex);
        }
        out.indices(&self.mesh.ceiling);
        out.indices(&self.mesh.floor);
        out.indices(&self.mesh.walls);

        out.u8(u8::from(self.diagnostics.aborted));
        out.count(self.diagnostics.routing_failures.len());
        for failure in &self.diagnostics.routing_failures {
            out.u32(failure.from_door.0);
            out.u32(failure.to_door.0);
            out.u8(match failure.reason {
                RoutingFailureReason::DoorOutsideGrid => 0,
                RoutingFailureReason::Exhausted => 1,
                RoutingFailureReason::DoorSealed => 2,
            });
        }
        out.bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}
