use crate::graph::TopologyGraph;
use netdesign_core::{
    ItemType, Node, NodeId, TopologyItem, ValidationError, ValidationErrorKind, ValidationRules,
};
use std::collections::HashSet;

const LINK_PROPERTY: &str = "link";

/// Duplicate check on `property` across validatable nodes.
///
/// Nodes are stably sorted by the attribute value with empty values first,
/// then every adjacent equal pair flags both members. A node shared by two
/// adjacent pairs is flagged once.
pub fn check_unique(nodes: &[Node], property: &str) -> Vec<ValidationError> {
    let mut candidates: Vec<(&Node, Option<String>)> = nodes
        .iter()
        .filter(|n| n.is_validatable())
        .map(|n| (n, n.attribute(property).filter(|v| !v.is_empty())))
        .collect();
    candidates.sort_by(|a, b| a.1.cmp(&b.1));

    let mut flagged: Vec<&NodeId> = Vec::new();
    for pair in candidates.windows(2) {
        let (left, right) = (&pair[0], &pair[1]);
        let (Some(lv), Some(rv)) = (&left.1, &right.1) else {
            continue;
        };
        if lv != rv {
            continue;
        }
        if flagged.last() != Some(&&left.0.id) {
            flagged.push(&left.0.id);
        }
        flagged.push(&right.0.id);
    }

    let kind = match property {
        "IP" => ValidationErrorKind::IpIsUsed,
        "MAC" => ValidationErrorKind::MacIsUsed,
        _ => ValidationErrorKind::WrongValue,
    };
    flagged
        .into_iter()
        .map(|id| ValidationError::new(id.as_str(), ItemType::Node, property, kind))
        .collect()
}

fn apply_errors<T: TopologyItem>(item: &mut T, errors: &[ValidationError]) {
    for error in errors {
        item.push_error(error.clone());
    }
    item.set_error_style(true);
}

impl TopologyGraph {
    /// Whole-graph validation. Previous results are cleared first; every
    /// returned error is also attached to its item and sets its error style.
    pub fn validate(&mut self, rules: &ValidationRules) -> Vec<Vec<ValidationError>> {
        self.clear_validation();

        let mut unique = check_unique(self.nodes(), "IP");
        unique.extend(check_unique(self.nodes(), "MAC"));

        let mut result = Vec::new();
        for node in self.nodes_mut() {
            if !node.is_validatable() {
                continue;
            }
            let mut errors = node.validate(&rules.nodes);
            errors.extend(unique.iter().filter(|e| e.item_id == node.item_id()).cloned());
            if !errors.is_empty() {
                apply_errors(node, &errors);
                result.push(errors);
            }
        }

        let mut flag_handles: HashSet<NodeId> = HashSet::new();
        let unconnected: HashSet<_> = self
            .edges()
            .iter()
            .filter(|edge| !self.transient_ends(edge).is_empty())
            .map(|edge| edge.id.clone())
            .collect();
        let handles_by_edge: Vec<_> = self
            .edges()
            .iter()
            .map(|edge| self.transient_ends(edge))
            .collect();

        for (edge, handles) in self.edges_mut().iter_mut().zip(handles_by_edge) {
            if !edge.is_validatable() {
                continue;
            }
            let mut errors = edge.validate(&rules.links);
            if unconnected.contains(&edge.id) {
                errors.push(ValidationError::new(
                    edge.item_id(),
                    ItemType::Link,
                    LINK_PROPERTY,
                    ValidationErrorKind::LinkNotConnected,
                ));
            }
            if !errors.is_empty() {
                apply_errors(edge, &errors);
                flag_handles.extend(handles);
                result.push(errors);
            }
        }

        for node in self.nodes_mut() {
            if flag_handles.contains(&node.id) {
                node.set_error_style(true);
            }
        }

        tracing::info!(
            items = result.len(),
            errors = result.iter().map(Vec::len).sum::<usize>(),
            "validation finished"
        );
        result
    }

    pub fn clear_validation(&mut self) {
        for node in self.nodes_mut() {
            node.clear_errors();
            node.set_error_style(false);
        }
        for edge in self.edges_mut() {
            edge.clear_errors();
            edge.set_error_style(false);
        }
    }

    /// Clears one node or link. Returns false when no item has that id.
    pub fn clear_item_validation(&mut self, id: &str) -> bool {
        if let Some(node) = self.nodes_mut().iter_mut().find(|n| n.item_id() == id) {
            node.clear_errors();
            node.set_error_style(false);
            return true;
        }
        if let Some(edge) = self.edges_mut().iter_mut().find(|e| e.item_id() == id) {
            edge.clear_errors();
            edge.set_error_style(false);
            return true;
        }
        false
    }

    /// Every group needs an address pair and only devices present in the graph.
    pub fn check_multicast_groups(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for group in self.multicast_groups() {
            for (property, value) in [("IP", &group.ip), ("MAC", &group.mac)] {
                if value.trim().is_empty() {
                    errors.push(ValidationError::new(
                        group.id.as_str(),
                        ItemType::MulticastGroup,
                        property,
                        ValidationErrorKind::Required,
                    ));
                }
            }
            let unknown = group
                .devices
                .iter()
                .any(|device| !self.node(device).is_some_and(Node::is_device));
            if unknown {
                errors.push(ValidationError::new(
                    group.id.as_str(),
                    ItemType::MulticastGroup,
                    "devices",
                    ValidationErrorKind::WrongValue,
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netdesign_core::{
        DeviceData, Edge, EndpointSide, ItemRules, MulticastGroup, Point, Size,
    };

    fn device(id: &str, ip: &str, mac: &str) -> Node {
        Node::device(
            id,
            id,
            DeviceData {
                ip: ip.into(),
                mac: mac.into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_duplicate_ip_flags_both_nodes() {
        let mut graph = TopologyGraph::new();
        graph.add_node(device("D1", "10.0.0.1", "aa"));
        graph.add_node(device("D2", "10.0.0.1", "bb"));

        let result = graph.validate(&ValidationRules::default());
        let ip_errors: Vec<_> = result
            .iter()
            .flatten()
            .filter(|e| e.kind == ValidationErrorKind::IpIsUsed)
            .collect();
        assert_eq!(ip_errors.len(), 2);
        assert!(ip_errors.iter().any(|e| e.item_id == "D1"));
        assert!(ip_errors.iter().any(|e| e.item_id == "D2"));
        assert!(graph.nodes().iter().all(|n| n.has_error_style()));
        assert_eq!(graph.nodes()[0].errors().len(), 1);
    }

    #[test]
    fn test_runs_of_three_flag_each_node_once() {
        let nodes = vec![
            device("D3", "10.0.0.5", ""),
            device("D1", "10.0.0.5", ""),
            device("D2", "10.0.0.5", ""),
            device("D4", "", ""),
            device("D5", "", ""),
        ];
        let errors = check_unique(&nodes, "IP");
        let ids: Vec<_> = errors.iter().map(|e| e.item_id.as_str()).collect();
        assert_eq!(ids, vec!["D3", "D1", "D2"]);
        assert!(check_unique(&nodes, "MAC").is_empty());
    }

    #[test]
    fn test_required_rules_and_unconnected_link() {
        let mut graph = TopologyGraph::new();
        graph.add_node(device("D1", "10.0.0.1", ""));
        graph.add_node(Node::transient(
            "t1",
            EndpointSide::To,
            Point::new(0.0, 0.0),
            Size::square(14.0),
        ));
        graph.add_edge(Edge::pending("e1", NodeId::new("D1"), NodeId::new("t1")));

        let rules = ValidationRules {
            nodes: ItemRules::required(["label", "MAC"]),
            links: ItemRules::required(["speed"]),
        };
        let result = graph.validate(&rules);
        assert_eq!(result.len(), 2);
        let link_errors = &result[1];
        assert_eq!(link_errors.len(), 2);
        assert_eq!(link_errors[1].kind, ValidationErrorKind::LinkNotConnected);
        assert!(graph.node(&NodeId::new("t1")).unwrap().has_error_style());

        graph.clear_validation();
        assert!(graph.nodes().iter().all(|n| !n.has_error_style() && n.errors().is_empty()));
        assert!(graph.edges()[0].errors().is_empty());
    }

    #[test]
    fn test_validate_does_not_accumulate() {
        let mut graph = TopologyGraph::new();
        graph.add_node(device("D1", "", ""));
        let rules = ValidationRules {
            nodes: ItemRules::required(["IP"]),
            links: ItemRules::default(),
        };
        graph.validate(&rules);
        graph.validate(&rules);
        assert_eq!(graph.nodes()[0].errors().len(), 1);
        assert!(graph.clear_item_validation("D1"));
        assert!(!graph.clear_item_validation("nope"));
        assert!(!graph.nodes()[0].has_error_style());
    }

    #[test]
    fn test_multicast_group_membership() {
        let mut graph = TopologyGraph::new();
        graph.add_node(device("D1", "10.0.0.1", "aa"));
        let mut group = MulticastGroup::new("mg1", "239.0.0.1", "");
        group.devices = vec![NodeId::new("D1"), NodeId::new("ghost")];
        graph.add_multicast_group(group);

        let errors = graph.check_multicast_groups();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].kind, ValidationErrorKind::Required);
        assert_eq!(errors[1].property, "devices");
        assert_eq!(errors[1].item_type, ItemType::MulticastGroup);
    }
}
