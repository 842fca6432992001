//! Iterative overlap relaxation between room rectangles.

use std::f32::consts::TAU;

use thiserror::Error;

use super::RoomInstance;
use crate::types::{Rect, Vec2};

/// World units a room moves per iteration.
const STEP: f32 = 1.0;
/// Spreads the escape directions of rooms that share a center.
const GOLDEN_ANGLE: f32 = TAU * 0.381_966;

/// Separation hit its iteration cap with rooms still overlapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{overlapping_pairs} room pairs still overlap after {iterations} iterations")]
pub struct Unsettled {
    pub iterations: usize,
    pub overlapping_pairs: usize,
}

fn padded_rects(rooms: &[RoomInstance], padding: f32) -> Vec<Rect> {
    rooms.iter().map(|room| room.rect().inflated(padding * 0.5)).collect()
}

/// Overlapping pairs once every rect is grown by half the padding.
pub fn count_overlaps(rooms: &[RoomInstance], padding: f32) -> usize {
    let rects = padded_rects(rooms, padding);
    let mut count = 0;
    for (index, rect) in rects.iter().enumerate() {
        count += rects[index + 1..].iter().filter(|other| rect.overlaps(**other)).count();
    }
    count
}

/// Pushes overlapping rooms apart until none overlap, returning the iterations it took.
///
/// Each overlapping pair adds a repulsion of `delta / |delta|²` to both rooms (opposite signs);
/// every room then moves `STEP` along its normalized net vector.
pub fn separate(
    rooms: &mut [RoomInstance],
    padding: f32,
    max_iterations: usize,
) -> Result<usize, Unsettled> {
    for iteration in 0..max_iterations {
        let rects = padded_rects(rooms, padding);
        let mut forces = vec![Vec2::ZERO; rooms.len()];
        let mut overlapping = 0;
        for first in 0..rects.len() {
            for second in first + 1..rects.len() {
                if !rects[first].overlaps(rects[second]) {
                    continue;
                }
                overlapping += 1;
                let mut delta = rects[first].center - rects[second].center;
                if delta.length_squared() <= f32::EPSILON {
                    delta = Vec2::from_polar(1.0, GOLDEN_ANGLE * (first + second) as f32);
                }
                let push = delta * (1.0 / delta.length_squared());
                forces[first] = forces[first] + push;
                forces[second] = forces[second] - push;
            }
        }
        if overlapping == 0 {
            return Ok(iteration);
        }
        for (room, force) in rooms.iter_mut().zip(forces) {
            room.center = room.center + force.normalized() * STEP;
        }
    }

    match count_overlaps(rooms, padding) {
        0 => Ok(max_iterations),
        overlapping_pairs => Err(Unsettled { iterations: max_iterations, overlapping_pairs }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeId, NodeType};
    use crate::library::{GeometryRef, TemplateId};

    fn room(index: u32, center: Vec2, size: Vec2) -> RoomInstance {
        RoomInstance {
            node: NodeId(index),
            node_type: NodeType::Side,
            critical: false,
            template: TemplateId::default(),
            template_name: "box".to_string(),
            geometry: GeometryRef::default(),
            center,
            size,
            doors: Vec::new(),
        }
    }

    #[test]
    fn rooms_overlapping_by_two_units_settle_apart() {
        let size = Vec2::new(10.0, 10.0);
        let mut rooms = vec![room(0, Vec2::ZERO, size), room(1, Vec2::new(8.0, 0.0), size)];
        assert_eq!(count_overlaps(&rooms, 0.0), 1);

        let iterations = separate(&mut rooms, 0.0, 100).expect("two rooms separate quickly");
        assert!(iterations > 0 && iterations < 100);
        assert_eq!(count_overlaps(&rooms, 0.0), 0);
        assert!(rooms[0].center.x < rooms[1].center.x, "rooms keep their relative order");
        assert_eq!(rooms[0].center.z, 0.0);
    }

    #[test]
    fn coincident_rooms_still_separate() {
        let size = Vec2::new(6.0, 6.0);
        let mut rooms: Vec<RoomInstance> =
            (0..3).map(|index| room(index, Vec2::ZERO, size)).collect();
        separate(&mut rooms, 1.0, 1_000).expect("coincident rooms separate");
        assert_eq!(count_overlaps(&rooms, 1.0), 0);
    }

    #[test]
    fn padding_keeps_a_gap_between_rooms() {
        let size = Vec2::new(4.0, 4.0);
        let mut rooms = vec![room(0, Vec2::ZERO, size), room(1, Vec2::new(4.5, 0.0), size)];
        separate(&mut rooms, 2.0, 100).expect("settles");
        let gap = (rooms[1].center.x - rooms[0].center.x).abs() - size.x;
        assert!(gap >= 2.0, "gap {gap}");
    }

    #[test]
    fn iteration_cap_reports_unsettled_rooms() {
        let size = Vec2::new(10.0, 10.0);
        let mut rooms = vec![room(0, Vec2::ZERO, size), room(1, Vec2::new(1.0, 0.0), size)];
        let error = separate(&mut rooms, 0.0, 2).expect_err("two steps are not enough");
        assert_eq!(error, Unsettled { iterations: 2, overlapping_pairs: 1 });
    }
}
