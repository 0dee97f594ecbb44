use crate::graph::TopologyGraph;
use netdesign_core::NodeId;
use std::collections::{HashSet, VecDeque};

/// Unweighted breadth-first search over the undirected link relation.
///
/// Returns the node ids from `from` to `to` inclusive, or an empty path when
/// `to` is unreachable. Neighbours expand in link insertion order and a node is
/// never enqueued twice, so the result is shortest in hop count.
pub fn find_path(graph: &TopologyGraph, from: &NodeId, to: &NodeId) -> Vec<NodeId> {
    if !graph.contains_node(from) {
        return Vec::new();
    }

    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<(NodeId, Vec<NodeId>)> = VecDeque::new();

    visited.insert(from.clone());
    queue.push_back((from.clone(), vec![from.clone()]));

    while let Some((current, path)) = queue.pop_front() {
        if &current == to {
            return path;
        }
        for neighbor in graph.neighbor_ids(&current) {
            if visited.insert(neighbor.clone()) {
                let mut next = path.clone();
                next.push(neighbor.clone());
                queue.push_back((neighbor, next));
            }
        }
    }

    Vec::new()
}

impl TopologyGraph {
    pub fn find_path(&self, from: &NodeId, to: &NodeId) -> Vec<NodeId> {
        find_path(self, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netdesign_core::{DeviceData, Edge, Node, SwitchData};
    use proptest::prelude::*;

    fn ids(names: &[&str]) -> Vec<NodeId> {
        names.iter().map(|n| NodeId::new(*n)).collect()
    }

    fn star() -> TopologyGraph {
        let mut graph = TopologyGraph::new();
        graph.add_node(Node::switch("S1", "S1", SwitchData::default()));
        graph.add_node(Node::device("D1", "D1", DeviceData::default()));
        graph.add_node(Node::device("D2", "D2", DeviceData::default()));
        graph.add_edge(Edge::new("E1", NodeId::new("S1"), NodeId::new("D1")));
        graph.add_edge(Edge::new("E2", NodeId::new("S1"), NodeId::new("D2")));
        graph
    }

    #[test]
    fn test_path_through_switch() {
        let graph = star();
        assert_eq!(
            graph.find_path(&NodeId::new("D1"), &NodeId::new("D2")),
            ids(&["D1", "S1", "D2"])
        );
    }

    #[test]
    fn test_unreachable_and_trivial_paths() {
        let mut graph = star();
        graph.add_node(Node::device("D3", "D3", DeviceData::default()));
        assert!(graph.find_path(&NodeId::new("D1"), &NodeId::new("D3")).is_empty());
        assert!(graph.find_path(&NodeId::new("ghost"), &NodeId::new("D1")).is_empty());
        assert_eq!(
            graph.find_path(&NodeId::new("D1"), &NodeId::new("D1")),
            ids(&["D1"])
        );
    }

    #[test]
    fn test_shortest_in_hops_first_discovery_wins() {
        // a - b - d and a - c - d: b is linked first so it wins.
        let mut graph = TopologyGraph::new();
        for id in ["a", "b", "c", "d"] {
            graph.add_node(Node::switch(id, id, SwitchData::default()));
        }
        graph.add_edge(Edge::new("1", NodeId::new("a"), NodeId::new("b")));
        graph.add_edge(Edge::new("2", NodeId::new("c"), NodeId::new("a")));
        graph.add_edge(Edge::new("3", NodeId::new("c"), NodeId::new("d")));
        graph.add_edge(Edge::new("4", NodeId::new("b"), NodeId::new("d")));
        assert_eq!(
            graph.find_path(&NodeId::new("a"), &NodeId::new("d")),
            ids(&["a", "b", "d"])
        );
    }

    fn random_graph() -> impl Strategy<Value = TopologyGraph> {
        proptest::collection::vec((0usize..8, 0usize..8), 0..16).prop_map(|pairs| {
            let mut graph = TopologyGraph::new();
            for i in 0..8 {
                graph.add_node(Node::switch(format!("n{i}"), "", SwitchData::default()));
            }
            for (idx, (a, b)) in pairs.into_iter().enumerate() {
                if a != b {
                    graph.add_edge(Edge::new(
                        format!("e{idx}"),
                        NodeId::new(format!("n{a}")),
                        NodeId::new(format!("n{b}")),
                    ));
                }
            }
            graph
        })
    }

    proptest! {
        #[test]
        fn prop_reachability_is_symmetric(graph in random_graph(), a in 0usize..8, b in 0usize..8) {
            let a = NodeId::new(format!("n{a}"));
            let b = NodeId::new(format!("n{b}"));
            let forward = graph.find_path(&a, &b);
            let backward = graph.find_path(&b, &a);
            prop_assert_eq!(forward.is_empty(), backward.is_empty());
            prop_assert_eq!(forward.len(), backward.len());
            if let (Some(first), Some(last)) = (forward.first(), forward.last()) {
                prop_assert_eq!(first, &a);
                prop_assert_eq!(last, &b);
            }
        }
    }
}
