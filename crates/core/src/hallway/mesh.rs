//! Box cross-section meshing for hallway segments.

use serde::Serialize;

use super::HallwaySegment;
use crate::types::{Direction, Vec3};

/// Indexed triangle mesh with one index list per material slot.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HallwayMesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<[f32; 2]>,
    pub ceiling: Vec<u32>,
    pub floor: Vec<u32>,
    pub walls: Vec<u32>,
}

#[derive(Clone, Copy)]
enum Submesh {
    Ceiling,
    Floor,
    Walls,
}

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z)
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.y * b.z - a.z * b.y, a.z * b.x - a.x * b.z, a.x * b.y - a.y * b.x)
}

fn dot(a: Vec3, b: Vec3) -> f32 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

impl HallwayMesh {
    pub fn triangle_count(&self) -> usize {
        (self.ceiling.len() + self.floor.len() + self.walls.len()) / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Appends a quad, flipping the corner order when needed so both triangles face `normal`.
    fn push_quad(&mut self, submesh: Submesh, corners: [Vec3; 4], normal: Vec3) {
        let base = self.vertices.len() as u32;
        let facing = dot(cross(sub(corners[1], corners[0]), sub(corners[2], corners[0])), normal);
        let order: [u32; 6] = if facing >= 0.0 { [0, 1, 2, 0, 2, 3] } else { [0, 2, 1, 0, 3, 2] };

        self.vertices.extend(corners);
        self.normals.extend([normal; 4]);
        self.uvs.extend([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        let indices = match submesh {
            Submesh::Ceiling => &mut self.ceiling,
            Submesh::Floor => &mut self.floor,
            Submesh::Walls => &mut self.walls,
        };
        indices.extend(order.iter().map(|offset| base + offset));
    }
}

/// Floor and ceiling for every segment, plus an inward-facing wall on every closed side.
pub fn mesh_segments<'a>(
    segments: impl IntoIterator<Item = &'a HallwaySegment>,
    cell_size: f32,
    height: f32,
) -> HallwayMesh {
    let mut mesh = HallwayMesh::default();
    let half = cell_size * 0.5;
    for segment in segments {
        let (x, z) = (segment.position.x, segment.position.z);
        let (x0, x1, z0, z1) = (x - half, x + half, z - half, z + half);
        let at = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);

        mesh.push_quad(
            Submesh::Floor,
            [at(x0, 0.0, z0), at(x1, 0.0, z0), at(x1, 0.0, z1), at(x0, 0.0, z1)],
            Vec3::new(0.0, 1.0, 0.0),
        );
        mesh.push_quad(
            Submesh::Ceiling,
            [at(x0, height, z0), at(x1, height, z0), at(x1, height, z1), at(x0, height, z1)],
            Vec3::new(0.0, -1.0, 0.0),
        );

        for side in Direction::ALL {
            if segment.open.contains(side) {
                continue;
            }
            // Bottom edge along the cell side, then up to the ceiling.
            let ((ax, az), (bx, bz)) = match side {
                Direction::PosX => ((x1, z0), (x1, z1)),
                Direction::NegX => ((x0, z1), (x0, z0)),
                Direction::PosZ => ((x1, z1), (x0, z1)),
                Direction::NegZ => ((x0, z0), (x1, z0)),
            };
            let corners =
                [at(ax, 0.0, az), at(bx, 0.0, bz), at(bx, height, bz), at(ax, height, az)];
            let inward = side.opposite().unit();
            mesh.push_quad(Submesh::Walls, corners, Vec3::new(inward.x, 0.0, inward.z));
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellCoord, DirectionSet, Vec2};

    fn segment(open: &[Direction]) -> HallwaySegment {
        HallwaySegment {
            cell: CellCoord::new(0, 0),
            position: Vec2::new(1.0, 1.0),
            open: DirectionSet::from_directions(open),
            door_side: None,
        }
    }

    fn assert_triangles_face_their_normals(mesh: &HallwayMesh) {
        for indices in [&mesh.ceiling, &mesh.floor, &mesh.walls] {
            for triangle in indices.chunks(3) {
                let [a, b, c] = [0, 1, 2].map(|corner| mesh.vertices[triangle[corner] as usize]);
                let face = cross(sub(b, a), sub(c, a));
                assert!(dot(face, mesh.normals[triangle[0] as usize]) > 0.0);
            }
        }
    }

    #[test]
    fn straight_segment_has_two_walls() {
        let mesh = mesh_segments(&[segment(&[Direction::PosX, Direction::NegX])], 2.0, 3.0);
        assert_eq!(mesh.floor.len(), 6);
        assert_eq!(mesh.ceiling.len(), 6);
        assert_eq!(mesh.walls.len(), 12);
        assert_eq!(mesh.vertices.len(), 16);
        assert_eq!(mesh.vertices.len(), mesh.normals.len());
        assert_eq!(mesh.vertices.len(), mesh.uvs.len());
        assert_triangles_face_their_normals(&mesh);
    }

    #[test]
    fn dead_end_is_capped_and_crossing_is_wall_free() {
        let dead_end = mesh_segments(&[segment(&[Direction::PosZ])], 2.0, 3.0);
        assert_eq!(dead_end.walls.len() / 6, 3);
        let crossing = mesh_segments(&[segment(&Direction::ALL)], 2.0, 3.0);
        assert!(crossing.walls.is_empty());
        assert_eq!(crossing.triangle_count(), 4);
        assert_triangles_face_their_normals(&dead_end);
    }

    #[test]
    fn walls_span_floor_to_ceiling_on_the_cell_edge() {
        let tee = segment(&[Direction::PosX, Direction::NegX, Direction::NegZ]);
        let mesh = mesh_segments(&[tee], 2.0, 3.0);
        let wall_vertices: Vec<Vec3> =
            mesh.walls.iter().map(|&index| mesh.vertices[index as usize]).collect();
        assert!(wall_vertices.iter().all(|vertex| vertex.z == 2.0));
        assert!(wall_vertices.iter().any(|vertex| vertex.y == 3.0));
        assert!(wall_vertices.iter().any(|vertex| vertex.y == 0.0));
    }
}
