use crate::graph::TopologyGraph;
use netdesign_core::{EdgeId, NodeId, PortId};
use std::collections::HashSet;

/// Selection and highlight classes handed to the Renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightState {
    selected_nodes: HashSet<NodeId>,
    selected_links: HashSet<EdgeId>,
    highlighted_nodes: HashSet<NodeId>,
    highlighted_links: HashSet<EdgeId>,
    highlighted_ports: HashSet<(NodeId, PortId)>,
    error_links: HashSet<EdgeId>,
}

impl HighlightState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current selection with one node.
    pub fn select_node(&mut self, id: NodeId) {
        self.clear_selection();
        self.selected_nodes.insert(id);
    }

    pub fn select_link(&mut self, id: EdgeId) {
        self.clear_selection();
        self.selected_links.insert(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected_nodes.clear();
        self.selected_links.clear();
    }

    pub fn highlight_node(&mut self, id: NodeId) {
        self.highlighted_nodes.insert(id);
    }

    pub fn highlight_link(&mut self, id: EdgeId) {
        self.highlighted_links.insert(id);
    }

    pub fn highlight_port(&mut self, node: NodeId, port: PortId) {
        self.highlighted_ports.insert((node, port));
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted_nodes.clear();
        self.highlighted_links.clear();
        self.highlighted_ports.clear();
    }

    /// Highlights the nodes of `path` and every link between consecutive ones.
    pub fn highlight_path(&mut self, graph: &TopologyGraph, path: &[NodeId]) {
        self.clear_highlight();
        for id in path {
            self.highlighted_nodes.insert(id.clone());
        }
        for pair in path.windows(2) {
            for link in graph.links_between(&pair[0], &pair[1]) {
                self.highlighted_links.insert(link.id.clone());
            }
        }
    }

    pub fn set_error_links(&mut self, links: impl IntoIterator<Item = EdgeId>) {
        self.error_links = links.into_iter().collect();
    }

    pub fn clear_error_links(&mut self) {
        self.error_links.clear();
    }

    pub fn is_node_selected(&self, id: &NodeId) -> bool {
        self.selected_nodes.contains(id)
    }

    pub fn is_link_selected(&self, id: &EdgeId) -> bool {
        self.selected_links.contains(id)
    }

    pub fn is_node_highlighted(&self, id: &NodeId) -> bool {
        self.highlighted_nodes.contains(id)
    }

    pub fn is_link_highlighted(&self, id: &EdgeId) -> bool {
        self.highlighted_links.contains(id)
    }

    pub fn is_port_highlighted(&self, node: &NodeId, port: &PortId) -> bool {
        self.highlighted_ports
            .iter()
            .any(|(n, p)| n == node && p == port)
    }

    pub fn is_error_link(&self, id: &EdgeId) -> bool {
        self.error_links.contains(id)
    }

    pub fn error_link_count(&self) -> usize {
        self.error_links.len()
    }

    /// Drops every reference to `node` and the given links.
    pub fn forget(&mut self, node: Option<&NodeId>, links: &[EdgeId]) {
        if let Some(node) = node {
            self.selected_nodes.remove(node);
            self.highlighted_nodes.remove(node);
            self.highlighted_ports.retain(|(n, _)| n != node);
        }
        for link in links {
            self.selected_links.remove(link);
            self.highlighted_links.remove(link);
            self.error_links.remove(link);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
