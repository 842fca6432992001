//! Room placement: instantiate selected templates at their layout positions, give every room one
//! door per graph edge, pair doors across edges and push overlapping rooms apart.

mod doors;
mod separation;

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::config::GenerationConfig;
use crate::graph::{NodeId, NodeType, RoomGraph};
use crate::library::{GeometryRef, TemplateId, TemplateLibrary};
use crate::types::{Direction, Rect, Vec2};

pub use doors::{DoorPair, match_doors};
pub use separation::{Unsettled, count_overlaps, separate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DoorId(pub u32);

impl DoorId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DoorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Door {
    pub id: DoorId,
    pub room: NodeId,
    /// Index into the template's door slot list.
    pub slot: usize,
    pub offset: Vec2,
    /// World position; follows the room through separation.
    pub position: Vec2,
    pub direction: Direction,
    /// Taken by a door pair during matching.
    pub paired: bool,
    /// Consumed by a routed hallway.
    pub matched: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoomInstance {
    pub node: NodeId,
    pub node_type: NodeType,
    pub critical: bool,
    #[serde(skip)]
    pub template: TemplateId,
    pub template_name: String,
    pub geometry: GeometryRef,
    pub center: Vec2,
    pub size: Vec2,
    pub doors: Vec<DoorId>,
}

impl RoomInstance {
    pub fn rect(&self) -> Rect {
        Rect::new(self.center, self.size)
    }
}

/// Rooms indexed by node id, doors indexed by door id.
#[derive(Clone, Debug, PartialEq)]
pub struct Assembly {
    pub rooms: Vec<RoomInstance>,
    pub doors: Vec<Door>,
    pub connections: Vec<DoorPair>,
    pub separation_iterations: usize,
}

impl Assembly {
    pub fn room(&self, node: NodeId) -> &RoomInstance {
        &self.rooms[node.index()]
    }

    pub fn door(&self, id: DoorId) -> &Door {
        &self.doors[id.index()]
    }
}

/// Places every room, instantiates and pairs its doors, then separates overlapping rooms.
/// `selections` holds the chosen template per node, indexed by node id.
pub fn assemble(
    graph: &RoomGraph,
    library: &TemplateLibrary,
    selections: &[TemplateId],
    config: &GenerationConfig,
) -> Result<Assembly, Unsettled> {
    let mut rooms: Vec<RoomInstance> = graph
        .nodes()
        .iter()
        .map(|node| {
            let template = library.template(selections[node.id.index()]);
            RoomInstance {
                node: node.id,
                node_type: node.node_type,
                critical: node.critical,
                template: selections[node.id.index()],
                template_name: template.name.clone(),
                geometry: template.geometry.clone(),
                center: node.position * config.room_distance,
                size: template.size,
                doors: Vec::new(),
            }
        })
        .collect();

    let mut all_doors = Vec::new();
    for id in graph.depth_first_order() {
        let template = library.template(selections[id.index()]);
        doors::instantiate_doors(graph, id, template, &mut rooms, &mut all_doors);
    }

    let connections = match_doors(graph, &rooms, &mut all_doors);
    let separation_iterations =
        separate(&mut rooms, config.separation_padding(), config.max_separation_iterations)?;
    for door in &mut all_doors {
        door.position = rooms[door.room.index()].center + door.offset;
    }

    debug!(
        "assembled {} rooms with {} doors, separation settled after {} iterations",
        rooms.len(),
        all_doors.len(),
        separation_iterations
    );
    Ok(Assembly { rooms, doors: all_doors, connections, separation_iterations })
}
