//! Radial "free tree" drawing: the tree is centered, then every subtree gets an angular wedge
//! proportional to its leaf count on concentric rings.

use std::collections::VecDeque;
use std::f32::consts::{PI, TAU};

use serde::Serialize;

use super::{NodeId, RoomGraph};
use crate::types::Vec2;

/// Angular span assigned to a node, on the ring at `radius`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LayoutWedge {
    pub node: NodeId,
    pub radius: f32,
    pub start: f32,
    pub end: f32,
}

/// Writes a layout-space position into every node and returns the wedge each one received.
///
/// The tree is temporarily re-rooted at its center(s); the original parent/child links are
/// restored before returning, only positions change.
pub fn layout_tree(graph: &mut RoomGraph, ring_distance: f32) -> Vec<LayoutWedge> {
    let mut wedges = Vec::with_capacity(graph.len());
    if graph.len() == 1 {
        let root = graph.root();
        graph.node_mut(root).position = Vec2::ZERO;
        wedges.push(LayoutWedge { node: root, radius: 0.0, start: 0.0, end: TAU });
        return wedges;
    }

    let centers = find_centers(graph);
    let mut snapshot = graph.reroot(centers[0]);
    if let Some(&second) = centers.get(1) {
        graph.detach(&mut snapshot, second);
    }

    let leaf_counts = leaf_counts(graph, &centers);
    let mut drawing = Drawing { leaf_counts: &leaf_counts, ring_distance, wedges: &mut wedges };
    match centers[..] {
        [center] => drawing.draw_subtree(graph, center, 0.0, 0.0, TAU),
        [first, second, ..] => {
            let radius = ring_distance * 0.5;
            drawing.draw_subtree(graph, first, radius, 0.0, PI);
            drawing.draw_subtree(graph, second, radius, PI, TAU);
        }
        [] => {}
    }

    graph.restore(snapshot);
    wedges
}

/// Peels leaves layer by layer; the nodes removed in the last layer are the center (one node,
/// or two adjacent nodes).
pub(crate) fn find_centers(graph: &RoomGraph) -> Vec<NodeId> {
    let count = graph.len();
    if count <= 2 {
        return graph.nodes().iter().map(|node| node.id).collect();
    }

    let mut degree: Vec<usize> = graph.nodes().iter().map(|node| node.door_count()).collect();
    let mut depth = vec![0_u32; count];
    let mut marked = vec![false; count];
    let mut queued = vec![false; count];
    let mut queue = VecDeque::new();
    for node in graph.nodes() {
        if degree[node.id.index()] < 2 {
            queued[node.id.index()] = true;
            queue.push_back(node.id);
        }
    }

    while let Some(id) = queue.pop_front() {
        marked[id.index()] = true;
        for neighbor in graph.node(id).neighbors() {
            let slot = neighbor.index();
            if marked[slot] {
                continue;
            }
            degree[slot] = degree[slot].saturating_sub(1);
            if degree[slot] == 1 && !queued[slot] {
                queued[slot] = true;
                depth[slot] = depth[id.index()] + 1;
                queue.push_back(neighbor);
            }
        }
    }

    let deepest = depth.iter().copied().max().unwrap_or(0);
    let mut centers: Vec<NodeId> = graph
        .nodes()
        .iter()
        .map(|node| node.id)
        .filter(|id| depth[id.index()] == deepest)
        .collect();
    let adjacent =
        centers.len() == 2 && graph.node(centers[0]).neighbors().any(|id| id == centers[1]);
    if !adjacent {
        centers.truncate(1);
    }
    centers
}

fn leaf_counts(graph: &RoomGraph, roots: &[NodeId]) -> Vec<usize> {
    let mut counts = vec![0_usize; graph.len()];
    for &root in roots {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(graph.node(id).children.iter().copied());
        }
        for &id in order.iter().rev() {
            let children = &graph.node(id).children;
            counts[id.index()] = if children.is_empty() {
                1
            } else {
                children.iter().map(|child| counts[child.index()]).sum()
            };
        }
    }
    counts
}

struct Drawing<'a> {
    leaf_counts: &'a [usize],
    ring_distance: f32,
    wedges: &'a mut Vec<LayoutWedge>,
}

impl Drawing<'_> {
    fn draw_subtree(
        &mut self,
        graph: &mut RoomGraph,
        node: NodeId,
        radius: f32,
        start: f32,
        end: f32,
    ) {
        let middle = (start + end) * 0.5;
        graph.node_mut(node).position = Vec2::from_polar(radius, middle);
        self.wedges.push(LayoutWedge { node, radius, start, end });

        let children = graph.node(node).children.clone();
        if children.is_empty() {
            return;
        }

        // Children on the next ring must stay inside the tangent cone of this ring.
        let (mut span_start, mut span_end) = (start, end);
        if radius > 0.0 {
            let limit = 2.0 * (radius / (radius + self.ring_distance)).acos();
            if limit < end - start {
                span_start = middle - limit * 0.5;
                span_end = middle + limit * 0.5;
            }
        }

        let total_leaves: usize =
            children.iter().map(|child| self.leaf_counts[child.index()]).sum();
        let span = span_end - span_start;
        let mut cursor = span_start;
        for child in children {
            let share = span * self.leaf_counts[child.index()] as f32 / total_leaves.max(1) as f32;
            self.draw_subtree(graph, child, radius + self.ring_distance, cursor, cursor + share);
            cursor += share;
        }
    }
}
