//! Critical path construction and recursive side-branch distribution.

use log::debug;

use super::{NodeId, NodeType, RoomGraph};
use crate::config::GenerationConfig;
use crate::error::ConfigurationError;
use crate::rng::GenRng;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraphParams {
    pub room_count: usize,
    pub critical_path_length: usize,
    pub max_doors: usize,
    pub distribution: f32,
}

impl GraphParams {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            room_count: config.room_count,
            critical_path_length: config.critical_path_length,
            max_doors: config.max_doors,
            distribution: config.distribution,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        if self.critical_path_length < 2 {
            return Err(ConfigurationError::CriticalPathTooShort {
                critical_path_length: self.critical_path_length,
            });
        }
        if self.critical_path_length > self.room_count {
            return Err(ConfigurationError::CriticalPathTooLong {
                critical_path_length: self.critical_path_length,
                room_count: self.room_count,
            });
        }
        if self.max_doors < 3 {
            return Err(ConfigurationError::MaxDoorsTooSmall { max_doors: self.max_doors });
        }
        if !self.distribution.is_finite() || !(0.0..=1.0).contains(&self.distribution) {
            return Err(ConfigurationError::DistributionOutOfRange { value: self.distribution });
        }
        Ok(())
    }
}

/// Builds `Start -> Middle* -> End` and hangs the remaining rooms off it as side branches.
/// The result always holds exactly `room_count` nodes.
pub fn generate_graph(
    params: &GraphParams,
    rng: &mut GenRng,
) -> Result<RoomGraph, ConfigurationError> {
    params.validate()?;

    let mut graph = RoomGraph::with_root(NodeType::Start, true);
    let mut critical_path = vec![graph.root()];
    for index in 1..params.critical_path_length {
        let node_type =
            if index + 1 == params.critical_path_length { NodeType::End } else { NodeType::Middle };
        let previous = critical_path[critical_path.len() - 1];
        critical_path.push(graph.add_child(previous, node_type, true));
    }

    let mut remaining = params.room_count - params.critical_path_length;
    while remaining > 0 {
        let mut order = critical_path.clone();
        rng.shuffle(&mut order);

        let mut attached_this_pass = 0;
        for node in order {
            if remaining == 0 {
                break;
            }
            let even_share = remaining.div_ceil(params.critical_path_length);
            let skew = rng.unit_f32().clamp(0.0, 1.0 - params.distribution);
            let supply = (even_share + (remaining as f32 * skew).round() as usize).min(remaining);
            let attached = attach_branch(&mut graph, rng, node, supply, params.max_doors);
            remaining -= attached;
            attached_this_pass += attached;
        }
        if attached_this_pass == 0 {
            break;
        }
    }

    debug!(
        "room graph built: {} nodes, {} on the critical path, {} unplaced",
        graph.len(),
        params.critical_path_length,
        remaining
    );
    Ok(graph)
}

/// Attaches up to `supply` side rooms below `node`, returning how many were created.
/// A node without free doors forwards its supply into one of its side children.
fn attach_branch(
    graph: &mut RoomGraph,
    rng: &mut GenRng,
    node: NodeId,
    supply: usize,
    max_doors: usize,
) -> usize {
    if supply == 0 {
        return 0;
    }

    let free_doors = max_doors.saturating_sub(graph.node(node).door_count());
    if free_doors == 0 {
        let side_children: Vec<NodeId> = graph
            .node(node)
            .children
            .iter()
            .copied()
            .filter(|&child| graph.node(child).node_type == NodeType::Side)
            .collect();
        if side_children.is_empty() {
            return 0;
        }
        let pick = side_children[rng.range_usize(0, side_children.len() - 1)];
        return attach_branch(graph, rng, pick, supply, max_doors);
    }

    let child_count = rng.range_usize(1, supply.min(free_doors));
    let children: Vec<NodeId> =
        (0..child_count).map(|_| graph.add_child(node, NodeType::Side, false)).collect();

    let mut leftover = supply - child_count;
    let mut attached = child_count;
    for (index, &child) in children.iter().enumerate() {
        let share = leftover.div_ceil(child_count - index);
        leftover -= share;
        attached += attach_branch(graph, rng, child, share, max_doors);
    }
    attached
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn params(
        room_count: usize,
        critical_path_length: usize,
        max_doors: usize,
        distribution: f32,
    ) -> GraphParams {
        GraphParams { room_count, critical_path_length, max_doors, distribution }
    }

    #[test]
    fn even_distribution_hangs_one_side_room_per_critical_node() {
        let mut rng = GenRng::from_seed(42);
        let graph = generate_graph(&params(5, 3, 4, 1.0), &mut rng).expect("valid params");

        assert_eq!(graph.len(), 5);
        assert_eq!(graph.count_of(NodeType::Side), 2);
        for node in graph.nodes().iter().filter(|node| node.node_type == NodeType::Side) {
            let parent = node.parent.expect("side rooms hang off a parent");
            assert!(
                graph.node(parent).critical,
                "side room {} should attach to the critical path",
                node.id
            );
        }
        let door_total: usize = graph.nodes().iter().map(|node| node.door_count()).sum();
        assert_eq!(door_total, 2 * graph.edges().len());
    }

    #[test]
    fn critical_path_runs_start_to_end() {
        let mut rng = GenRng::from_seed(7);
        let graph = generate_graph(&params(9, 4, 4, 0.5), &mut rng).expect("valid params");
        let mut cursor = graph.root();
        let mut types = vec![graph.node(cursor).node_type];
        while let Some(next) =
            graph.node(cursor).children.iter().copied().find(|&child| graph.node(child).critical)
        {
            types.push(graph.node(next).node_type);
            cursor = next;
        }
        assert_eq!(types, vec![NodeType::Start, NodeType::Middle, NodeType::Middle, NodeType::End]);
    }

    #[test]
    fn rejects_invalid_preconditions() {
        let mut rng = GenRng::from_seed(1);
        assert!(matches!(
            generate_graph(&params(3, 4, 4, 1.0), &mut rng),
            Err(ConfigurationError::CriticalPathTooLong { .. })
        ));
        assert!(matches!(
            generate_graph(&params(3, 1, 4, 1.0), &mut rng),
            Err(ConfigurationError::CriticalPathTooShort { .. })
        ));
        assert!(matches!(
            generate_graph(&params(6, 3, 2, 1.0), &mut rng),
            Err(ConfigurationError::MaxDoorsTooSmall { .. })
        ));
    }

    #[test]
    fn critical_path_only_graph_has_no_side_rooms() {
        let mut rng = GenRng::from_seed(3);
        let graph = generate_graph(&params(2, 2, 3, 1.0), &mut rng).expect("valid params");
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.count_of(NodeType::Start), 1);
        assert_eq!(graph.count_of(NodeType::End), 1);
        assert_eq!(graph.count_of(NodeType::Side), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]
        #[test]
        fn generated_graphs_hit_exact_counts_and_respect_door_limits(
            seed in any::<u64>(),
            room_count in 2_usize..80,
            critical_fraction in 0.0_f32..=1.0,
            max_doors in 3_usize..7,
            distribution in 0.0_f32..=1.0,
        ) {
            let critical_path_length =
                (2 + ((room_count - 2) as f32 * critical_fraction) as usize).min(room_count);
            let mut rng = GenRng::from_seed(seed);
            let graph = generate_graph(
                &params(room_count, critical_path_length, max_doors, distribution),
                &mut rng,
            ).expect("valid params");

            prop_assert_eq!(graph.len(), room_count);
            prop_assert_eq!(graph.count_of(NodeType::Start), 1);
            prop_assert_eq!(graph.count_of(NodeType::End), 1);
            prop_assert_eq!(graph.count_of(NodeType::Middle), critical_path_length - 2);
            for node in graph.nodes() {
                prop_assert!(
                    node.door_count() <= max_doors,
                    "node {} has {} doors",
                    node.id,
                    node.door_count()
                );
                let incident =
                    graph.edges().iter().filter(|(a, b)| *a == node.id || *b == node.id).count();
                prop_assert_eq!(node.door_count(), incident);
            }
        }
    }
}
