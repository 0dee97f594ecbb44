use crate::collision::RoutingEngine;
use crate::graph::TopologyGraph;
use crate::highlight::HighlightState;
use netdesign_core::{EdgeId, NodeId, TopologyItem};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFrame {
    pub id: NodeId,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub transient: bool,
    pub selected: bool,
    pub highlighted: bool,
    pub error: bool,
    /// Drag handle drawn with its dashed link.
    pub dashed: bool,
    /// End of the link disabled for the simulation.
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeFrame {
    pub id: EdgeId,
    pub path: String,
    pub color: String,
    pub selected: bool,
    pub highlighted: bool,
    pub error: bool,
    pub dashed: bool,
    pub disabled: bool,
    pub clickable: bool,
}

/// Everything the Renderer needs to draw one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub nodes: Vec<NodeFrame>,
    pub edges: Vec<EdgeFrame>,
}

impl RenderFrame {
    /// Links without a computed path are left out.
    pub fn build(graph: &TopologyGraph, routing: &RoutingEngine, highlight: &HighlightState) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| NodeFrame {
                id: node.id.clone(),
                label: node.label.clone(),
                x: node.position.x,
                y: node.position.y,
                transient: node.is_transient(),
                selected: highlight.is_node_selected(&node.id),
                highlighted: highlight.is_node_highlighted(&node.id),
                error: node.has_error_style(),
                dashed: node.is_transient(),
                disabled: graph.links_of(&node.id).iter().any(|e| e.disabled),
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .filter_map(|edge| {
                let path = routing.path(&edge.id)?;
                let error = edge.has_error_style() || highlight.is_error_link(&edge.id);
                let color = if error {
                    netdesign_core::LinkColor::Error
                } else {
                    edge.color()
                };
                Some(EdgeFrame {
                    id: edge.id.clone(),
                    path: path.to_string(),
                    color: color.hex().to_string(),
                    selected: highlight.is_link_selected(&edge.id),
                    highlighted: highlight.is_link_highlighted(&edge.id),
                    error,
                    dashed: edge.dashed,
                    disabled: edge.disabled,
                    clickable: edge.clickable,
                })
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn node(&self, id: &NodeId) -> Option<&NodeFrame> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&EdgeFrame> {
        self.edges.iter().find(|e| &e.id == id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netdesign_core::{DeviceData, Edge, EndpointSide, Node, Point, Size};

    #[test]
    fn test_frame_carries_classes() {
        let mut graph = TopologyGraph::new();
        graph.add_node(Node::device("D1", "a", DeviceData::default()).with_size(Size::square(40.0)));
        graph.add_node(
            Node::device("D2", "b", DeviceData::default())
                .with_size(Size::square(40.0))
                .at(Point::new(100.0, 0.0)),
        );
        graph.add_edge(Edge::new("E1", NodeId::new("D1"), NodeId::new("D2")).with_speed(Some(100.0)));

        let mut routing = RoutingEngine::default();
        routing.recompute(&graph);
        let mut highlight = HighlightState::new();
        highlight.select_node(NodeId::new("D2"));
        highlight.set_error_links([EdgeId::new("E1")]);

        let frame = RenderFrame::build(&graph, &routing, &highlight);
        assert_eq!(frame.nodes.len(), 2);
        assert!(frame.node(&NodeId::new("D2")).unwrap().selected);
        let edge = frame.edge(&EdgeId::new("E1")).unwrap();
        assert_eq!(edge.path, "M20 20 L20 20 L20 20 L120 20 L120 20");
        assert!(edge.error);
        assert_eq!(edge.color, "#E53030");

        let json = frame.to_json().unwrap();
        assert!(json.contains("\"path\""));
    }

    #[test]
    fn test_node_frames_follow_link_state() {
        let mut graph = TopologyGraph::new();
        graph.add_node(Node::device("D1", "a", DeviceData::default()).with_size(Size::square(40.0)));
        graph.add_node(Node::device("D2", "b", DeviceData::default()).with_size(Size::square(40.0)));
        graph.add_node(Node::transient(
            "t1",
            EndpointSide::To,
            Point::new(200.0, 200.0),
            Size::square(14.0),
        ));
        let mut disabled = Edge::new("E1", NodeId::new("D1"), NodeId::new("D2"));
        disabled.disable();
        graph.add_edge(disabled);
        graph.add_edge(Edge::pending("E2", NodeId::new("D2"), NodeId::new("t1")));

        let mut routing = RoutingEngine::default();
        routing.recompute(&graph);
        let frame = RenderFrame::build(&graph, &routing, &HighlightState::new());

        let d1 = frame.node(&NodeId::new("D1")).unwrap();
        assert!(d1.disabled && !d1.dashed);
        let handle = frame.node(&NodeId::new("t1")).unwrap();
        assert!(handle.dashed && !handle.disabled);
        assert!(frame.edge(&EdgeId::new("E2")).unwrap().dashed);
    }
}
