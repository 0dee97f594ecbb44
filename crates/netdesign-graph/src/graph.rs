use crate::error::GraphError;
use netdesign_core::{
    CoreError, Edge, EdgeId, MulticastGroup, Node, NodeId, Point, PortId, SwitchRole,
    TopologyItem,
};

/// A node taken out of the graph together with every link that touched it.
#[derive(Debug, Clone)]
pub struct NodeRemoval {
    pub node: Node,
    pub edges: Vec<Edge>,
    /// Drag handles that lost their link and were dropped with it.
    pub transients: Vec<NodeId>,
}

/// Arena of nodes and links keyed by id. Cross references between ports,
/// links and nodes are ids resolved through this graph.
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    multicast_groups: Vec<MulticastGroup>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.multicast_groups.clear();
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    pub fn multicast_groups(&self) -> &[MulticastGroup] {
        &self.multicast_groups
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn node_index(&self, id: &NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| &n.id == id)
    }

    fn edge_index(&self, id: &EdgeId) -> Option<usize> {
        self.edges.iter().position(|e| &e.id == id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_index(id).is_some()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == id)
    }

    pub fn edge_mut(&mut self, id: &EdgeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| &e.id == id)
    }

    /// Appends without a duplicate check. Ids come from the Backend or from
    /// the random id generator.
    pub fn add_node(&mut self, node: Node) {
        tracing::debug!(node = %node.id, "add node");
        self.nodes.push(node);
    }

    pub fn add_edge(&mut self, edge: Edge) {
        for end in [&edge.from, &edge.to] {
            if !self.contains_node(end) {
                tracing::warn!(
                    "Link {} references node {} which is missing from the graph",
                    edge.id,
                    end
                );
            }
        }
        tracing::debug!(edge = %edge.id, from = %edge.from, to = %edge.to, "add link");
        self.edges.push(edge);
    }

    fn take_node(&mut self, id: &NodeId) -> Option<Node> {
        self.node_index(id).map(|idx| self.nodes.remove(idx))
    }

    fn is_concrete(&self, id: &NodeId) -> bool {
        self.node(id).is_some_and(Node::is_concrete)
    }

    /// Removes the node and every link touching it. A concrete node on the
    /// far end of such a link gets its port freed, a transient one is removed.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<NodeRemoval> {
        let node = self.take_node(id)?;
        let (touching, kept): (Vec<Edge>, Vec<Edge>) =
            std::mem::take(&mut self.edges)
                .into_iter()
                .partition(|edge| edge.touches(id));
        self.edges = kept;

        let mut transients = Vec::new();
        for edge in &touching {
            let Some(other) = edge.other_end(id) else {
                continue;
            };
            if self.is_concrete(other) {
                if let Some(other_node) = self.node_mut(other) {
                    other_node.disconnect_link(&edge.id);
                }
            } else if self.take_node(other).is_some() {
                transients.push(other.clone());
            }
        }

        tracing::debug!(
            node = %id,
            edges = touching.len(),
            transients = transients.len(),
            "remove node"
        );
        Some(NodeRemoval {
            node,
            edges: touching,
            transients,
        })
    }

    /// Removes the link, frees the ports it occupied and drops transient ends.
    pub fn remove_edge(&mut self, id: &EdgeId) -> Option<Edge> {
        let idx = self.edge_index(id)?;
        let edge = self.edges.remove(idx);
        for end in [&edge.from, &edge.to] {
            if self.is_concrete(end) {
                if let Some(node) = self.node_mut(end) {
                    node.disconnect_link(&edge.id);
                }
            } else {
                self.take_node(end);
            }
        }
        tracing::debug!(edge = %id, "remove link");
        Some(edge)
    }

    /// Nodes directly joined to `id`, following link insertion order.
    pub fn neighbors(&self, id: &NodeId) -> Vec<&Node> {
        self.neighbor_ids(id)
            .iter()
            .filter_map(|n| self.node(n))
            .collect()
    }

    pub fn neighbor_ids(&self, id: &NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter_map(|edge| edge.other_end(id).cloned())
            .collect()
    }

    pub fn links_of(&self, id: &NodeId) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.touches(id)).collect()
    }

    pub fn links_between(&self, a: &NodeId, b: &NodeId) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.joins(a, b)).collect()
    }

    pub fn node_by_label(&self, label: &str) -> Option<&Node> {
        let label = label.trim();
        self.nodes.iter().find(|n| n.label == label)
    }

    /// Case-insensitive lookup on any node attribute, skipping nodes where it
    /// is empty.
    pub fn node_by_key(&self, value: &str, key: &str) -> Option<&Node> {
        let value = value.trim().to_uppercase();
        self.nodes.iter().find(|n| {
            n.attribute(key)
                .is_some_and(|v| !v.is_empty() && v.to_uppercase() == value)
        })
    }

    pub fn devices(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_device())
    }

    pub fn switches(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_switch())
    }

    pub fn concrete_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_concrete())
    }

    /// Both ends resolve to concrete nodes.
    pub fn is_connected(&self, edge: &EdgeId) -> bool {
        self.edge(edge)
            .is_some_and(|e| self.is_concrete(&e.from) && self.is_concrete(&e.to))
    }

    pub fn transient_ends(&self, edge: &Edge) -> Vec<NodeId> {
        [&edge.from, &edge.to]
            .into_iter()
            .filter(|end| self.node(end).is_some_and(Node::is_transient))
            .cloned()
            .collect()
    }

    pub fn move_node(&mut self, id: &NodeId, position: Point) -> Result<(), GraphError> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
        node.position = position;
        Ok(())
    }

    /// Repoints the `endpoint` end of `edge` from a drag handle to `port` on
    /// `target`, then drops the handle. Nothing changes on error.
    pub fn attach_endpoint(
        &mut self,
        edge_id: &EdgeId,
        endpoint: &NodeId,
        target: &NodeId,
        port: &PortId,
    ) -> Result<(), GraphError> {
        let edge = self
            .edge(edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.clone()))?;
        let other = edge
            .other_end(endpoint)
            .cloned()
            .ok_or_else(|| GraphError::NotAnEndpoint {
                edge: edge_id.clone(),
                node: endpoint.clone(),
            })?;
        if &other == target {
            return Err(GraphError::SelfLoop {
                edge: edge_id.clone(),
                node: target.clone(),
            });
        }
        if self.is_concrete(endpoint) {
            return Err(GraphError::NotTransient(endpoint.clone()));
        }

        let target_node = self
            .node_mut(target)
            .ok_or_else(|| GraphError::NodeNotFound(target.clone()))?;
        target_node.connect_link_to_port(edge_id, port)?;

        let other_concrete = self.is_concrete(&other);
        if other_concrete {
            if let Some(node) = self.node_mut(target) {
                node.set_port_node(edge_id, Some(other.clone()));
            }
            if let Some(node) = self.node_mut(&other) {
                node.set_port_node(edge_id, Some(target.clone()));
            }
        }
        if let Some(edge) = self.edge_mut(edge_id) {
            edge.replace_endpoint(endpoint, target.clone());
        }
        self.take_node(endpoint);

        tracing::debug!(edge = %edge_id, node = %target, port = %port, "link end attached");
        Ok(())
    }

    /// Pulls the `node` end of `edge` off its port and hands it to a fresh
    /// drag handle. The link becomes pending again.
    pub fn detach_endpoint(
        &mut self,
        edge_id: &EdgeId,
        node_id: &NodeId,
        handle: Node,
    ) -> Result<(), GraphError> {
        let edge = self
            .edge(edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.clone()))?;
        let other = edge
            .other_end(node_id)
            .cloned()
            .ok_or_else(|| GraphError::NotAnEndpoint {
                edge: edge_id.clone(),
                node: node_id.clone(),
            })?;
        if !self.is_concrete(node_id) {
            return Err(GraphError::AlreadyDetached {
                edge: edge_id.clone(),
                node: node_id.clone(),
            });
        }

        if let Some(node) = self.node_mut(node_id) {
            node.disconnect_link(edge_id);
        }
        if let Some(node) = self.node_mut(&other) {
            node.set_port_node(edge_id, None);
        }
        let handle_id = handle.id.clone();
        self.add_node(handle);
        if let Some(edge) = self.edge_mut(edge_id) {
            edge.replace_endpoint(node_id, handle_id);
            edge.mark_pending();
        }
        tracing::debug!(edge = %edge_id, node = %node_id, "link end detached");
        Ok(())
    }

    /// Replaces a provisional link id with the one the Backend assigned.
    pub fn rename_edge(&mut self, old: &EdgeId, new: EdgeId) -> Result<(), GraphError> {
        let edge = self
            .edge_mut(old)
            .ok_or_else(|| GraphError::EdgeNotFound(old.clone()))?;
        edge.id = new.clone();
        let ends = [edge.from.clone(), edge.to.clone()];
        for end in &ends {
            if let Some(node) = self.node_mut(end) {
                node.rename_link(old, &new);
            }
        }
        Ok(())
    }

    /// Makes `id` controller (`state == true`) or agent and every other
    /// switch an agent. Returns the resulting role of every switch in node
    /// order.
    pub fn assign_controller(
        &mut self,
        id: &NodeId,
        state: bool,
    ) -> Result<Vec<(NodeId, SwitchRole)>, GraphError> {
        let target = self
            .node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
        if !target.is_switch() {
            return Err(CoreError::NotASwitch(id.clone()).into());
        }

        let mut roles = Vec::new();
        for node in self.nodes.iter_mut().filter(|n| n.is_switch()) {
            let is_target = &node.id == id;
            node.set_controller(is_target && state)?;
            if let Some(role) = node.role() {
                roles.push((node.id.clone(), role));
            }
        }
        Ok(roles)
    }

    pub fn add_multicast_group(&mut self, group: MulticastGroup) {
        self.multicast_groups.push(group);
    }

    pub fn multicast_group(&self, id: &str) -> Option<&MulticastGroup> {
        self.multicast_groups.iter().find(|g| g.id == id)
    }

    pub fn remove_multicast_group(&mut self, id: &str) -> Option<MulticastGroup> {
        let idx = self.multicast_groups.iter().position(|g| g.id == id)?;
        Some(self.multicast_groups.remove(idx))
    }
}
