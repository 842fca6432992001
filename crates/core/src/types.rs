//! Geometry primitives shared by layout, assembly, routing, and meshing.
//!
//! The level lives on the XZ plane; `Vec2` keeps that naming so door directions read as `±X/±Z`.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub z: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, z: 0.0 };

    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    pub fn from_polar(radius: f32, angle: f32) -> Self {
        Self { x: radius * angle.cos(), z: radius * angle.sin() }
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.z * self.z
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.z * other.z
    }

    /// Unit vector in the same direction, or zero when the input has no length.
    pub fn normalized(self) -> Self {
        let length = self.length();
        if length <= f32::EPSILON { Self::ZERO } else { self * (1.0 / length) }
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, z: self.z + rhs.z }
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, z: self.z - rhs.z }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, z: self.z * rhs }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn on_plane(point: Vec2, y: f32) -> Self {
        Self { x: point.x, y, z: point.z }
    }
}

/// Axis-aligned rectangle described by its center and full size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    pub fn min(self) -> Vec2 {
        self.center - self.size * 0.5
    }

    pub fn max(self) -> Vec2 {
        self.center + self.size * 0.5
    }

    pub fn inflated(self, amount: f32) -> Self {
        let size = Vec2::new(self.size.x + 2.0 * amount, self.size.z + 2.0 * amount);
        Self { center: self.center, size }
    }

    /// Strict intersection: rectangles that only share an edge do not overlap.
    pub fn overlaps(self, other: Self) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.z < b_max.z && a_max.z > b_min.z
    }

    /// Strict containment: points on the boundary are outside.
    pub fn contains_strict(self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x > min.x && point.x < max.x && point.z > min.z && point.z < max.z
    }

    pub fn union(self, other: Self) -> Self {
        let min = Vec2::new(self.min().x.min(other.min().x), self.min().z.min(other.min().z));
        let max = Vec2::new(self.max().x.max(other.max().x), self.max().z.max(other.max().z));
        Self { center: (min + max) * 0.5, size: max - min }
    }
}

/// Outward direction of a door or travel direction of a hallway step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    PosX,
    NegX,
    PosZ,
    NegZ,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::PosX, Self::PosZ, Self::NegX, Self::NegZ];

    pub fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }

    /// Next direction turning counter-clockwise when viewed from +Y.
    pub fn rotated(self) -> Self {
        match self {
            Self::PosX => Self::PosZ,
            Self::PosZ => Self::NegX,
            Self::NegX => Self::NegZ,
            Self::NegZ => Self::PosX,
        }
    }

    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::PosX => (1, 0),
            Self::NegX => (-1, 0),
            Self::PosZ => (0, 1),
            Self::NegZ => (0, -1),
        }
    }

    pub fn unit(self) -> Vec2 {
        let (dx, dz) = self.offset();
        Vec2::new(dx as f32, dz as f32)
    }

    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        match (to.i - from.i, to.j - from.j) {
            (1, 0) => Some(Self::PosX),
            (-1, 0) => Some(Self::NegX),
            (0, 1) => Some(Self::PosZ),
            (0, -1) => Some(Self::NegZ),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::PosX => 0b0001,
            Self::PosZ => 0b0010,
            Self::NegX => 0b0100,
            Self::NegZ => 0b1000,
        }
    }
}

/// Compact set of the four directions; used for cell links and hallway openings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const EMPTY: Self = Self(0);

    pub fn from_directions(directions: &[Direction]) -> Self {
        directions.iter().fold(Self::EMPTY, |set, &direction| set.with(direction))
    }

    pub fn with(self, direction: Direction) -> Self {
        Self(self.0 | direction.bit())
    }

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    pub fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |&direction| self.contains(direction))
    }

    /// Rotates every member by `quarter_turns` counter-clockwise steps.
    pub fn rotated(self, quarter_turns: u8) -> Self {
        self.iter().fold(Self::EMPTY, |set, direction| {
            let mut turned = direction;
            for _ in 0..(quarter_turns % 4) {
                turned = turned.rotated();
            }
            set.with(turned)
        })
    }
}

/// Integer grid coordinate: `i` runs along X, `j` along Z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub i: i32,
    pub j: i32,
}

impl CellCoord {
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (di, dj) = direction.offset();
        Self { i: self.i + di, j: self.j + dj }
    }

    pub fn manhattan(self, other: Self) -> u32 {
        self.i.abs_diff(other.i) + self.j.abs_diff(other.j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rects_sharing_an_edge_do_not_overlap() {
        let left = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let right = Rect::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(!left.overlaps(right));
        assert!(left.overlaps(right.inflated(0.5)));
    }

    #[test]
    fn direction_set_rotation_maps_corner_onto_every_corner() {
        use Direction::{NegX, NegZ, PosX, PosZ};
        let corner = DirectionSet::from_directions(&[PosX, PosZ]);
        let rotations: Vec<DirectionSet> = (0..4).map(|turns| corner.rotated(turns)).collect();
        assert_eq!(rotations[1], DirectionSet::from_directions(&[PosZ, NegX]));
        assert_eq!(rotations[2], DirectionSet::from_directions(&[NegX, NegZ]));
        assert_eq!(rotations[3], DirectionSet::from_directions(&[NegZ, PosX]));
        assert_eq!(corner.rotated(4), corner);
    }

    #[test]
    fn direction_between_adjacent_cells_round_trips_through_step() {
        let origin = CellCoord::new(3, 3);
        for direction in Direction::ALL {
            assert_eq!(Direction::between(origin, origin.step(direction)), Some(direction));
        }
        assert_eq!(Direction::between(origin, CellCoord::new(4, 4)), None);
    }
}
