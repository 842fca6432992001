//! Door slot picking and per-edge door pairing.

use serde::Serialize;

use super::{Door, DoorId, RoomInstance};
use crate::graph::{NodeId, RoomGraph};
use crate::library::RoomTemplate;

/// Two doors joined by one graph edge, parent side first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DoorPair {
    pub from_room: NodeId,
    pub to_room: NodeId,
    pub from_door: DoorId,
    pub to_door: DoorId,
}

/// Gives `node` one door per neighbour. For each neighbour in graph order the unused slot whose
/// outward direction points most directly at it wins; ties go to the lower slot index.
pub(super) fn instantiate_doors(
    graph: &RoomGraph,
    node: NodeId,
    template: &RoomTemplate,
    rooms: &mut [RoomInstance],
    doors: &mut Vec<Door>,
) {
    let origin = graph.node(node).position;
    let mut used = vec![false; template.door_slots.len()];
    for neighbor in graph.node(node).neighbors() {
        let toward = (graph.node(neighbor).position - origin).normalized();
        let mut best: Option<(usize, f32)> = None;
        for (index, slot) in template.door_slots.iter().enumerate() {
            if used[index] {
                continue;
            }
            let score = slot.direction.unit().dot(toward);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }
        let Some((index, _)) = best else {
            break;
        };
        used[index] = true;

        let slot = template.door_slots[index];
        let id = DoorId(doors.len() as u32);
        let room = &mut rooms[node.index()];
        doors.push(Door {
            id,
            room: node,
            slot: index,
            offset: slot.offset,
            position: room.center + slot.offset,
            direction: slot.direction,
            paired: false,
            matched: false,
        });
        room.doors.push(id);
    }
}

/// Pairs doors edge by edge in depth-first order, taking the closest free pair each time.
pub fn match_doors(graph: &RoomGraph, rooms: &[RoomInstance], doors: &mut [Door]) -> Vec<DoorPair> {
    let mut pairs = Vec::with_capacity(graph.len().saturating_sub(1));
    for (parent, child) in graph.edges() {
        let mut best: Option<(DoorId, DoorId, f32)> = None;
        for &from in &rooms[parent.index()].doors {
            if doors[from.index()].paired {
                continue;
            }
            for &to in &rooms[child.index()].doors {
                if doors[to.index()].paired {
                    continue;
                }
                let distance = doors[from.index()].position.distance(doors[to.index()].position);
                if best.is_none_or(|(_, _, best_distance)| distance < best_distance) {
                    best = Some((from, to, distance));
                }
            }
        }
        if let Some((from_door, to_door, _)) = best {
            doors[from_door.index()].paired = true;
            doors[to_door.index()].paired = true;
            pairs.push(DoorPair { from_room: parent, to_room: child, from_door, to_door });
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::graph::NodeType;
    use crate::library::{GeometryRef, TemplateId, TemplateSpec};
    use crate::types::{Direction, Vec2};

    fn square_template() -> RoomTemplate {
        RoomTemplate::from_spec(TemplateSpec {
            name: "square".to_string(),
            size: Vec2::new(8.0, 8.0),
            min_doors: 1,
            max_doors: 4,
            tags: Vec::new(),
            door_slots: Vec::new(),
            geometry: None,
        })
    }

    fn instance(graph: &RoomGraph, node: NodeId) -> RoomInstance {
        RoomInstance {
            node,
            node_type: graph.node(node).node_type,
            critical: graph.node(node).critical,
            template: TemplateId::default(),
            template_name: "square".to_string(),
            geometry: GeometryRef::default(),
            center: graph.node(node).position * 20.0,
            size: Vec2::new(8.0, 8.0),
            doors: Vec::new(),
        }
    }

    /// Hub at the origin with neighbours east, north and west.
    fn star() -> RoomGraph {
        let mut graph = RoomGraph::with_root(NodeType::Start, true);
        let hub = graph.root();
        for (position, node_type) in [
            (Vec2::new(1.0, 0.0), NodeType::Middle),
            (Vec2::new(0.0, 1.0), NodeType::Side),
            (Vec2::new(-1.0, 0.0), NodeType::Side),
        ] {
            let child = graph.add_child(hub, node_type, node_type == NodeType::Middle);
            graph.node_mut(child).position = position;
        }
        graph
    }

    #[test]
    fn slots_face_their_neighbours() {
        let graph = star();
        let template = square_template();
        let mut rooms: Vec<RoomInstance> =
            graph.nodes().iter().map(|node| instance(&graph, node.id)).collect();
        let mut doors = Vec::new();
        instantiate_doors(&graph, graph.root(), &template, &mut rooms, &mut doors);

        let directions: Vec<Direction> = doors.iter().map(|door| door.direction).collect();
        assert_eq!(directions, vec![Direction::PosX, Direction::PosZ, Direction::NegX]);
        assert_eq!(rooms[0].doors.len(), 3);
    }

    #[test]
    fn each_door_is_paired_at_most_once() {
        let graph = star();
        let template = square_template();
        let mut rooms: Vec<RoomInstance> =
            graph.nodes().iter().map(|node| instance(&graph, node.id)).collect();
        let mut doors = Vec::new();
        for id in graph.depth_first_order() {
            instantiate_doors(&graph, id, &template, &mut rooms, &mut doors);
        }
        let pairs = match_doors(&graph, &rooms, &mut doors);

        assert_eq!(pairs.len(), 3);
        let mut seen = BTreeSet::new();
        for pair in &pairs {
            assert!(seen.insert(pair.from_door));
            assert!(seen.insert(pair.to_door));
            assert_eq!(doors[pair.from_door.index()].room, pair.from_room);
            assert_eq!(doors[pair.to_door.index()].room, pair.to_room);
        }
        assert!(doors.iter().all(|door| door.paired && !door.matched));
        let east = pairs[0];
        assert_eq!(doors[east.from_door.index()].direction, Direction::PosX);
        assert_eq!(doors[east.to_door.index()].direction, Direction::NegX);
    }
}
