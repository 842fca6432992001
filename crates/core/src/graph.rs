//! Room relationship tree stored as an arena of nodes addressed by `NodeId`.
//!
//! Parent and child links are plain index lists, so re-rooting rewrites a few arrays instead of
//! rebuilding nodes. `reroot` hands back a `TopologySnapshot` that `restore` replays, which keeps
//! temporary re-rooting (tree centering) from leaking into the builder's tree.

pub mod builder;
pub mod layout;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Vec2;

pub use builder::{GraphParams, generate_graph};
pub use layout::{LayoutWedge, layout_tree};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Start,
    Middle,
    End,
    Side,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoomNode {
    pub id: NodeId,
    pub node_type: NodeType,
    pub critical: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Layout-space position, assigned by `layout_tree`.
    pub position: Vec2,
}

impl RoomNode {
    /// One door per incident edge.
    pub fn door_count(&self) -> usize {
        self.children.len() + usize::from(self.parent.is_some())
    }

    pub fn neighbors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.parent.into_iter().chain(self.children.iter().copied())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoomGraph {
    nodes: Vec<RoomNode>,
    root: NodeId,
}

/// Parent/child links of every node a re-root touched, plus the previous root.
#[derive(Clone, Debug)]
pub struct TopologySnapshot {
    root: NodeId,
    saved: Vec<(NodeId, Option<NodeId>, Vec<NodeId>)>,
}

impl RoomGraph {
    pub fn with_root(node_type: NodeType, critical: bool) -> Self {
        let root = RoomNode {
            id: NodeId(0),
            node_type,
            critical,
            parent: None,
            children: Vec::new(),
            position: Vec2::ZERO,
        };
        Self { nodes: vec![root], root: NodeId(0) }
    }

    pub fn add_child(&mut self, parent: NodeId, node_type: NodeType, critical: bool) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(RoomNode {
            id,
            node_type,
            critical,
            parent: Some(parent),
            children: Vec::new(),
            position: Vec2::ZERO,
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &RoomNode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut RoomNode {
        &mut self.nodes[id.index()]
    }

    pub fn nodes(&self) -> &[RoomNode] {
        &self.nodes
    }

    /// Preorder walk from the root, children in insertion order.
    pub fn depth_first_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        order
    }

    /// `(parent, child)` pairs in depth-first order.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.depth_first_order()
            .into_iter()
            .filter_map(|id| self.node(id).parent.map(|parent| (parent, id)))
            .collect()
    }

    pub fn count_of(&self, node_type: NodeType) -> usize {
        self.nodes.iter().filter(|node| node.node_type == node_type).count()
    }

    /// Makes `new_root` the root by flipping every link on its path to the current root.
    pub fn reroot(&mut self, new_root: NodeId) -> TopologySnapshot {
        let mut snapshot = TopologySnapshot { root: self.root, saved: Vec::new() };
        let mut path = vec![new_root];
        let mut cursor = new_root;
        while let Some(parent) = self.node(cursor).parent {
            path.push(parent);
            cursor = parent;
        }
        for &id in &path {
            self.save(&mut snapshot, id);
        }
        for pair in path.windows(2) {
            let (child, parent) = (pair[0], pair[1]);
            self.nodes[parent.index()].children.retain(|&id| id != child);
            self.nodes[parent.index()].parent = Some(child);
            self.nodes[child.index()].children.push(parent);
        }
        self.nodes[new_root.index()].parent = None;
        self.root = new_root;
        snapshot
    }

    /// Cuts `child` loose from its parent so it can act as a second root.
    pub fn detach(&mut self, snapshot: &mut TopologySnapshot, child: NodeId) {
        let Some(parent) = self.node(child).parent else {
            return;
        };
        self.save(snapshot, parent);
        self.save(snapshot, child);
        self.nodes[parent.index()].children.retain(|&id| id != child);
        self.nodes[child.index()].parent = None;
    }

    pub fn restore(&mut self, snapshot: TopologySnapshot) {
        for (id, parent, children) in snapshot.saved {
            let node = &mut self.nodes[id.index()];
            node.parent = parent;
            node.children = children;
        }
        self.root = snapshot.root;
    }

    fn save(&self, snapshot: &mut TopologySnapshot, id: NodeId) {
        if snapshot.saved.iter().all(|(saved, _, _)| *saved != id) {
            let node = self.node(id);
            snapshot.saved.push((id, node.parent, node.children.clone()));
        }
    }
}
