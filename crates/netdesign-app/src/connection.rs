use netdesign_core::{
    Edge, EdgeId, EndpointSide, Node, NodeId, Point, PortId, Size, generate_id,
};
use netdesign_graph::{GraphError, TopologyGraph};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("No link end is being dragged")]
    NoDragInProgress,
    #[error("Node {0} has no free port")]
    NoFreePort(NodeId),
    #[error("Link would join node {0} to itself")]
    SelfLoop(NodeId),
    #[error("Port {port} is not offered on node {node}")]
    UnknownPort { node: NodeId, port: PortId },
    #[error("No port choice is pending")]
    NotAwaitingPortChoice,
    #[error("Node not found: {0}")]
    UnknownNode(NodeId),
    #[error("{0} is not a link handle")]
    NotAHandle(NodeId),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Idle,
    Dragging {
        edge: EdgeId,
        /// Transient handle following the pointer.
        endpoint: NodeId,
    },
    PendingPortChoice {
        edge: EdgeId,
        endpoint: NodeId,
        node: NodeId,
        ports: Vec<PortId>,
    },
}

/// Link end committed to a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub edge: EdgeId,
    pub node: NodeId,
    pub port: PortId,
    /// Both ends are now concrete nodes.
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Dropped away from any node; the link and its handles are gone.
    Discarded(Edge),
    Attached(Attachment),
    PortChoice { node: NodeId, ports: Vec<PortId> },
}

/// Drag-to-connect protocol. Owns only the gesture state; every graph change
/// goes through `TopologyGraph` operations.
#[derive(Debug, Clone)]
pub struct ConnectionProtocol {
    state: ConnectionState,
    endpoint_size: f64,
    id_length: usize,
}

impl Default for ConnectionProtocol {
    fn default() -> Self {
        Self::new(14.0, 5)
    }
}

impl ConnectionProtocol {
    pub fn new(endpoint_size: f64, id_length: usize) -> Self {
        Self {
            state: ConnectionState::Idle,
            endpoint_size,
            id_length,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ConnectionState::Idle
    }

    pub fn reset(&mut self) {
        self.state = ConnectionState::Idle;
    }

    fn handle(&self, side: EndpointSide, position: Point) -> Node {
        Node::transient(
            generate_id(self.id_length),
            side,
            position,
            Size::square(self.endpoint_size),
        )
    }

    /// Drops a fresh palette link: two handles offset from `drop` by `offset`
    /// and a dashed link between them. The to-side handle is being dragged.
    pub fn start_new_link(&mut self, graph: &mut TopologyGraph, drop: Point, offset: f64) -> EdgeId {
        let from = self.handle(EndpointSide::From, drop.offset(offset, 0.0));
        let to = self.handle(EndpointSide::To, drop.offset(0.0, offset));
        let edge = Edge::pending(generate_id(self.id_length), from.id.clone(), to.id.clone());
        let edge_id = edge.id.clone();
        let endpoint = to.id.clone();
        graph.add_node(from);
        graph.add_node(to);
        graph.add_edge(edge);
        tracing::debug!(edge = %edge_id, "new link dropped");
        self.state = ConnectionState::Dragging {
            edge: edge_id.clone(),
            endpoint,
        };
        edge_id
    }

    /// Starts dragging an existing handle.
    pub fn begin_drag(
        &mut self,
        graph: &TopologyGraph,
        handle: &NodeId,
    ) -> Result<EdgeId, ConnectionError> {
        let node = graph
            .node(handle)
            .ok_or_else(|| ConnectionError::UnknownNode(handle.clone()))?;
        if !node.is_transient() {
            return Err(ConnectionError::NotAHandle(handle.clone()));
        }
        let edge = graph
            .links_of(handle)
            .first()
            .map(|edge| edge.id.clone())
            .ok_or_else(|| ConnectionError::NotAHandle(handle.clone()))?;
        self.state = ConnectionState::Dragging {
            edge: edge.clone(),
            endpoint: handle.clone(),
        };
        Ok(edge)
    }

    /// Pulls the `node` end of `edge` off its port onto a new handle under
    /// the pointer and starts dragging it.
    pub fn detach(
        &mut self,
        graph: &mut TopologyGraph,
        edge: &EdgeId,
        node: &NodeId,
        cursor: Point,
    ) -> Result<NodeId, ConnectionError> {
        let link = graph
            .edge(edge)
            .ok_or_else(|| GraphError::EdgeNotFound(edge.clone()))?;
        let side = if &link.from == node {
            EndpointSide::From
        } else {
            EndpointSide::To
        };
        let handle = self.handle(side, cursor);
        let handle_id = handle.id.clone();
        graph.detach_endpoint(edge, node, handle)?;
        self.state = ConnectionState::Dragging {
            edge: edge.clone(),
            endpoint: handle_id.clone(),
        };
        Ok(handle_id)
    }

    /// Moves the dragged handle. Returns its id so the caller can refresh
    /// the links touching it.
    pub fn drag_to(
        &mut self,
        graph: &mut TopologyGraph,
        position: Point,
    ) -> Result<NodeId, ConnectionError> {
        let ConnectionState::Dragging { endpoint, .. } = &self.state else {
            return Err(ConnectionError::NoDragInProgress);
        };
        graph.move_node(endpoint, position)?;
        Ok(endpoint.clone())
    }

    pub fn drop_on(
        &mut self,
        graph: &mut TopologyGraph,
        target: Option<&NodeId>,
    ) -> Result<DropOutcome, ConnectionError> {
        let ConnectionState::Dragging { edge, endpoint } = &self.state else {
            return Err(ConnectionError::NoDragInProgress);
        };
        let (edge, endpoint) = (edge.clone(), endpoint.clone());
        self.state = ConnectionState::Idle;

        let target = target.filter(|id| graph.node(id).is_none_or(|n| !n.is_transient()));
        let Some(target) = target else {
            let removed = graph
                .remove_edge(&edge)
                .ok_or_else(|| GraphError::EdgeNotFound(edge.clone()))?;
            tracing::debug!(edge = %edge, "link dropped on empty canvas");
            return Ok(DropOutcome::Discarded(removed));
        };

        let node = graph
            .node(target)
            .ok_or_else(|| ConnectionError::UnknownNode(target.clone()))?;
        let link = graph
            .edge(&edge)
            .ok_or_else(|| GraphError::EdgeNotFound(edge.clone()))?;
        if link.other_end(&endpoint) == Some(target) {
            return Err(ConnectionError::SelfLoop(target.clone()));
        }

        let ports: Vec<PortId> = node.free_ports().map(|p| p.id.clone()).collect();
        match ports.as_slice() {
            [] => Err(ConnectionError::NoFreePort(target.clone())),
            [port] => {
                let port = port.clone();
                self.attach(graph, edge, endpoint, target.clone(), port)
                    .map(DropOutcome::Attached)
            }
            _ => {
                tracing::debug!(edge = %edge, node = %target, free = ports.len(), "port choice");
                self.state = ConnectionState::PendingPortChoice {
                    edge,
                    endpoint,
                    node: target.clone(),
                    ports: ports.clone(),
                };
                Ok(DropOutcome::PortChoice {
                    node: target.clone(),
                    ports,
                })
            }
        }
    }

    /// Completes a pending choice. An unknown port keeps the choice pending.
    pub fn choose_port(
        &mut self,
        graph: &mut TopologyGraph,
        port: &PortId,
    ) -> Result<Attachment, ConnectionError> {
        let ConnectionState::PendingPortChoice {
            edge,
            endpoint,
            node,
            ports,
        } = &self.state
        else {
            return Err(ConnectionError::NotAwaitingPortChoice);
        };
        if !ports.contains(port) {
            return Err(ConnectionError::UnknownPort {
                node: node.clone(),
                port: port.clone(),
            });
        }
        let (edge, endpoint, node) = (edge.clone(), endpoint.clone(), node.clone());
        self.state = ConnectionState::Idle;
        self.attach(graph, edge, endpoint, node, port.clone())
    }

    /// Leaves the link dashed with its handle where it was dropped.
    pub fn cancel_port_choice(&mut self) -> Result<EdgeId, ConnectionError> {
        match std::mem::take(&mut self.state) {
            ConnectionState::PendingPortChoice { edge, .. } => Ok(edge),
            other => {
                self.state = other;
                Err(ConnectionError::NotAwaitingPortChoice)
            }
        }
    }

    fn attach(
        &mut self,
        graph: &mut TopologyGraph,
        edge: EdgeId,
        endpoint: NodeId,
        node: NodeId,
        port: PortId,
    ) -> Result<Attachment, ConnectionError> {
        graph.attach_endpoint(&edge, &endpoint, &node, &port)?;
        let connected = graph.is_connected(&edge);
        Ok(Attachment {
            edge,
            node,
            port,
            connected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netdesign_core::{DeviceData, Port, SwitchData};

    fn graph() -> TopologyGraph {
        let mut graph = TopologyGraph::new();
        graph.add_node(Node::device("D1", "pc", DeviceData::default()));
        graph.add_node(
            Node::switch("S1", "sw", SwitchData::default())
                .with_ports(vec![Port::new("GE-0", "1G"), Port::new("GE-1", "1G")]),
        );
        graph
    }

    fn dragged_handle(protocol: &ConnectionProtocol) -> NodeId {
        match protocol.state() {
            ConnectionState::Dragging { endpoint, .. } => endpoint.clone(),
            other => panic!("expected a drag, got {other:?}"),
        }
    }

    #[test]
    fn test_new_link_places_handles_around_drop() {
        let mut graph = TopologyGraph::new();
        let mut protocol = ConnectionProtocol::default();
        let edge = protocol.start_new_link(&mut graph, Point::new(100.0, 100.0), 60.0);

        let link = graph.edge(&edge).unwrap();
        assert!(link.dashed && !link.clickable);
        let from = graph.node(&link.from).unwrap();
        let to = graph.node(&link.to).unwrap();
        assert_eq!(from.position, Point::new(160.0, 100.0));
        assert_eq!(to.position, Point::new(100.0, 160.0));
        assert_eq!(dragged_handle(&protocol), to.id);
    }

    #[test]
    fn test_single_free_port_attaches_immediately() {
        let mut graph = graph();
        let mut protocol = ConnectionProtocol::default();
        let edge = protocol.start_new_link(&mut graph, Point::new(0.0, 0.0), 60.0);
        let handle = dragged_handle(&protocol);
        protocol.drag_to(&mut graph, Point::new(5.0, 5.0)).unwrap();
        assert_eq!(graph.node(&handle).unwrap().position, Point::new(5.0, 5.0));

        let outcome = protocol.drop_on(&mut graph, Some(&NodeId::new("D1"))).unwrap();
        let DropOutcome::Attached(attachment) = outcome else {
            panic!("expected an attachment");
        };
        assert_eq!(attachment.port, PortId::new("DEVICE-0"));
        assert!(!attachment.connected);
        assert!(protocol.is_idle());
        assert!(graph.node(&handle).is_none());
        assert_eq!(graph.edge(&edge).unwrap().to, NodeId::new("D1"));
    }

    #[test]
    fn test_multiple_free_ports_ask_for_a_choice() {
        let mut graph = graph();
        let mut protocol = ConnectionProtocol::default();
        let edge = protocol.start_new_link(&mut graph, Point::new(0.0, 0.0), 60.0);
        let handle = dragged_handle(&protocol);

        let outcome = protocol.drop_on(&mut graph, Some(&NodeId::new("S1"))).unwrap();
        assert_eq!(
            outcome,
            DropOutcome::PortChoice {
                node: NodeId::new("S1"),
                ports: vec![PortId::new("GE-0"), PortId::new("GE-1")],
            }
        );

        let err = protocol.choose_port(&mut graph, &PortId::new("GE-9")).unwrap_err();
        assert!(matches!(err, ConnectionError::UnknownPort { .. }));
        assert!(!protocol.is_idle());

        assert_eq!(protocol.cancel_port_choice().unwrap(), edge);
        assert!(graph.node(&handle).is_some());
        assert!(graph.edge(&edge).unwrap().dashed);

        protocol.begin_drag(&graph, &handle).unwrap();
        protocol.drop_on(&mut graph, Some(&NodeId::new("S1"))).unwrap();
        let attachment = protocol.choose_port(&mut graph, &PortId::new("GE-1")).unwrap();
        assert_eq!(attachment.port, PortId::new("GE-1"));
        let switch = graph.node(&NodeId::new("S1")).unwrap();
        assert_eq!(switch.link_port_id(&edge), Some(&PortId::new("GE-1")));
    }

    #[test]
    fn test_full_node_and_self_loop_are_rejected() {
        let mut graph = graph();
        let mut protocol = ConnectionProtocol::default();
        protocol.start_new_link(&mut graph, Point::new(0.0, 0.0), 60.0);
        protocol.drop_on(&mut graph, Some(&NodeId::new("D1"))).unwrap();

        let edge = protocol.start_new_link(&mut graph, Point::new(0.0, 0.0), 60.0);
        let err = protocol.drop_on(&mut graph, Some(&NodeId::new("D1"))).unwrap_err();
        assert!(matches!(err, ConnectionError::NoFreePort(_)));
        assert!(protocol.is_idle());
        assert!(graph.edge(&edge).is_some());

        // First link: from-handle still free, to-end on D1.
        let first = graph.edges()[0].clone();
        protocol.begin_drag(&graph, &first.from).unwrap();
        let err = protocol.drop_on(&mut graph, Some(&NodeId::new("D1"))).unwrap_err();
        assert!(matches!(err, ConnectionError::SelfLoop(_)));
        assert!(graph.node(&first.from).is_some());
    }

    #[test]
    fn test_drop_on_canvas_discards_link() {
        let mut graph = graph();
        let mut protocol = ConnectionProtocol::default();
        protocol.start_new_link(&mut graph, Point::new(0.0, 0.0), 60.0);
        protocol.drop_on(&mut graph, Some(&NodeId::new("D1"))).unwrap();
        let edge = graph.edges()[0].id.clone();
        let handle = graph.edges()[0].from.clone();

        protocol.begin_drag(&graph, &handle).unwrap();
        let outcome = protocol.drop_on(&mut graph, None).unwrap();
        assert!(matches!(outcome, DropOutcome::Discarded(ref e) if e.id == edge));
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 2);
        assert!(graph.node(&NodeId::new("D1")).unwrap().free_ports().count() == 1);

        assert!(matches!(
            protocol.drop_on(&mut graph, None),
            Err(ConnectionError::NoDragInProgress)
        ));
    }

    #[test]
    fn test_detach_frees_port_and_drags_new_handle() {
        let mut graph = graph();
        let mut protocol = ConnectionProtocol::default();
        let edge = protocol.start_new_link(&mut graph, Point::new(0.0, 0.0), 60.0);
        protocol.drop_on(&mut graph, Some(&NodeId::new("D1"))).unwrap();
        let from_handle = graph.edge(&edge).unwrap().from.clone();
        protocol.begin_drag(&graph, &from_handle).unwrap();
        protocol.drop_on(&mut graph, Some(&NodeId::new("S1"))).unwrap();
        protocol.choose_port(&mut graph, &PortId::new("GE-0")).unwrap();
        assert!(graph.is_connected(&edge));

        let handle = protocol
            .detach(&mut graph, &edge, &NodeId::new("D1"), Point::new(50.0, 50.0))
            .unwrap();
        assert_eq!(dragged_handle(&protocol), handle);
        assert!(!graph.is_connected(&edge));
        assert!(graph.edge(&edge).unwrap().dashed);
        assert_eq!(
            graph.node(&handle).unwrap().endpoint_side(),
            Some(EndpointSide::To)
        );
    }
}
