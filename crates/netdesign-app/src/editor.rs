use crate::connection::{Attachment, ConnectionProtocol, ConnectionState, DropOutcome};
use crate::error::EditorError;
use crate::settings::EditorSettings;
use netdesign_backend::{
    Backend, BackendCall, BackendError, BackendResult, BackendSnapshot, LinkEndpoint,
    NodeProfile, NodeQuery, NodeType, RouteModel,
};
use netdesign_core::{
    DeviceData, Edge, EdgeId, MulticastGroup, Node, NodeId, NodeKind, Point, Port, PortId,
    Size, SwitchData, SwitchRole, TopologyItem, ValidationError, ValidationRules,
};
use netdesign_events::telemetry::CallSpan;
use netdesign_events::{EditorContext, Event};
use netdesign_graph::{HighlightState, RenderFrame, RoutingEngine, TopologyGraph};
use serde_json::{Map, Value};
use std::future::Future;

const CREATE_NODE_FAILED: &str = "Failed to create the node.";
const CREATE_LINK_FAILED: &str = "Failed to create the link.";
const UPDATE_NODE_FAILED: &str = "Failed to update the node.";
const REMOVE_NODE_FAILED: &str = "Failed to remove the node.";
const REMOVE_LINK_FAILED: &str = "Failed to remove the link.";
const LOAD_BANDWIDTH_FAILED: &str = "Failed to load traffics bandwidth.";
const LOAD_ROUTE_FAILED: &str = "Failed to load the route.";
const LOAD_TOPOLOGY_FAILED: &str = "Failed to load the topology.";

async fn traced<T>(
    call: BackendCall,
    future: impl Future<Output = BackendResult<T>>,
) -> BackendResult<T> {
    let span = CallSpan::begin(call.as_str());
    span.finish(future.await)
}

/// Builds the canvas node for a Backend profile. Devices keep their default
/// port when the profile lists none.
pub fn node_from_profile(profile: &NodeProfile, settings: &EditorSettings) -> Node {
    let ports: Vec<Port> = profile.ports.iter().cloned().map(Port::from).collect();
    let ip = profile.ip.clone().unwrap_or_default();
    let mac = profile.mac.clone().unwrap_or_default();
    let node = match profile.node_type {
        NodeType::Switch => Node::switch(
            profile.id.as_str(),
            profile.name.as_str(),
            SwitchData {
                ip,
                mac,
                role: profile.role.unwrap_or_default(),
            },
        )
        .with_ports(ports)
        .with_size(Size::square(settings.palette.router_size)),
        NodeType::Device => {
            let node = Node::device(
                profile.id.as_str(),
                profile.name.as_str(),
                DeviceData {
                    ip,
                    mac,
                    ..Default::default()
                },
            )
            .with_size(Size::square(settings.palette.device_size));
            if ports.is_empty() {
                node
            } else {
                node.with_ports(ports)
            }
        }
    };
    node.with_category(profile.model.as_str())
}

/// Single-document editor tying the graph engine to a Backend.
///
/// Every mutating operation takes `&mut self`, so at most one Backend round
/// trip is applied at a time. Requests are not cancelled when their subject
/// is removed locally in the meantime.
pub struct TopologyEditor<B> {
    backend: B,
    ctx: EditorContext,
    settings: EditorSettings,
    graph: TopologyGraph,
    routing: RoutingEngine,
    highlight: HighlightState,
    connection: ConnectionProtocol,
    disabled_link: Option<EdgeId>,
}

impl<B: Backend> TopologyEditor<B> {
    pub fn new(backend: B, settings: EditorSettings, ctx: EditorContext) -> Self {
        let routing = RoutingEngine::new(settings.router()).with_id_length(settings.id_length);
        let connection = ConnectionProtocol::new(settings.palette.endpoint_size, settings.id_length);
        Self {
            backend,
            ctx,
            settings,
            graph: TopologyGraph::new(),
            routing,
            highlight: HighlightState::new(),
            connection,
            disabled_link: None,
        }
    }

    pub fn with_backend(backend: B) -> Self {
        Self::new(backend, EditorSettings::default(), EditorContext::default())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn context(&self) -> &EditorContext {
        &self.ctx
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn graph(&self) -> &TopologyGraph {
        &self.graph
    }

    pub fn routing(&self) -> &RoutingEngine {
        &self.routing
    }

    pub fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    pub fn connection_state(&self) -> &ConnectionState {
        self.connection.state()
    }

    pub fn disabled_link(&self) -> Option<&EdgeId> {
        self.disabled_link.as_ref()
    }

    pub fn frame(&self) -> RenderFrame {
        RenderFrame::build(&self.graph, &self.routing, &self.highlight)
    }

    /// Full geometry recompute after any change to positions or the link set.
    fn topology_changed(&mut self) {
        self.routing.recompute(&self.graph);
        self.ctx.publish(Event::TopologyChanged);
    }

    // Nodes

    pub async fn create_node(
        &mut self,
        query: NodeQuery,
        position: Point,
    ) -> Result<NodeId, EditorError> {
        let _busy = self.ctx.busy();
        let profile = match traced(BackendCall::CreateNode, self.backend.create_node(query)).await {
            Ok(profile) => profile,
            Err(err) => {
                self.ctx.error(CREATE_NODE_FAILED);
                return Err(err.into());
            }
        };
        let node = node_from_profile(&profile, &self.settings).at(position);
        let id = node.id.clone();
        self.graph.add_node(node);
        tracing::info!(node = %id, kind = ?profile.node_type, "node created");
        self.ctx.publish(Event::NodeAdded { id: id.clone() });
        self.topology_changed();
        Ok(id)
    }

    /// Applies the edit locally, then persists it. A Backend failure only
    /// notifies; the local edit stays.
    pub async fn edit_node(&mut self, id: &NodeId, query: NodeQuery) -> Result<(), EditorError> {
        let node = self
            .graph
            .node_mut(id)
            .ok_or_else(|| EditorError::NodeNotFound(id.clone()))?;
        if let Some(name) = &query.name {
            node.label = name.clone();
        }
        if let Some(model) = &query.model {
            node.category = model.clone();
        }
        match &mut node.kind {
            NodeKind::Device(DeviceData { ip, mac, .. })
            | NodeKind::Switch(SwitchData { ip, mac, .. }) => {
                if let Some(value) = &query.ip {
                    *ip = value.clone();
                }
                if let Some(value) = &query.mac {
                    *mac = value.clone();
                }
            }
            NodeKind::TransientEndpoint(_) => {}
        }

        let _busy = self.ctx.busy();
        if let Err(err) = traced(BackendCall::EditNode, self.backend.edit_node(id, query)).await {
            self.ctx.error(UPDATE_NODE_FAILED);
            return Err(err.into());
        }
        Ok(())
    }

    /// Removes a node with every link touching it. Connected links and the
    /// node itself are removed from the Backend first; local removal happens
    /// regardless of the outcome.
    pub async fn remove_node(&mut self, id: &NodeId) -> Result<(), EditorError> {
        let node = self
            .graph
            .node(id)
            .ok_or_else(|| EditorError::NodeNotFound(id.clone()))?;
        let concrete = node.is_concrete();
        let connected: Vec<EdgeId> = self
            .graph
            .links_of(id)
            .into_iter()
            .filter(|edge| self.graph.is_connected(&edge.id))
            .map(|edge| edge.id.clone())
            .collect();

        let mut failed = false;
        if concrete {
            let _busy = self.ctx.busy();
            for link in &connected {
                if traced(BackendCall::RemoveLink, self.backend.remove_link(link))
                    .await
                    .is_err()
                {
                    failed = true;
                }
            }
            if traced(BackendCall::RemoveNode, self.backend.remove_node(id))
                .await
                .is_err()
            {
                failed = true;
            }
        }
        if failed {
            self.ctx.error(REMOVE_NODE_FAILED);
        }

        if let Some(removal) = self.graph.remove_node(id) {
            let links: Vec<EdgeId> = removal.edges.iter().map(|e| e.id.clone()).collect();
            self.forget(Some(id), &links);
            for link in links {
                self.ctx.publish(Event::LinkRemoved { id: link });
            }
            self.ctx.publish(Event::NodeRemoved { id: id.clone() });
        }
        self.topology_changed();
        Ok(())
    }

    pub async fn remove_link(&mut self, id: &EdgeId) -> Result<(), EditorError> {
        if self.graph.edge(id).is_none() {
            return Err(EditorError::EdgeNotFound(id.clone()));
        }
        if self.graph.is_connected(id) {
            let _busy = self.ctx.busy();
            if traced(BackendCall::RemoveLink, self.backend.remove_link(id))
                .await
                .is_err()
            {
                self.ctx.error(REMOVE_LINK_FAILED);
            }
        }
        self.graph.remove_edge(id);
        self.forget(None, std::slice::from_ref(id));
        self.ctx.publish(Event::LinkRemoved { id: id.clone() });
        self.topology_changed();
        Ok(())
    }

    fn forget(&mut self, node: Option<&NodeId>, links: &[EdgeId]) {
        self.highlight.forget(node, links);
        if self
            .disabled_link
            .as_ref()
            .is_some_and(|disabled| links.contains(disabled))
        {
            self.disabled_link = None;
        }
    }

    pub fn move_node(&mut self, id: &NodeId, position: Point) -> Result<(), EditorError> {
        self.graph.move_node(id, position)?;
        self.topology_changed();
        Ok(())
    }

    // Connection protocol

    /// Drops a palette link at `drop` and starts dragging its to-side handle.
    pub fn start_new_link(&mut self, drop: Point) -> EdgeId {
        let edge = self
            .connection
            .start_new_link(&mut self.graph, drop, self.settings.palette.router_size);
        self.ctx.publish(Event::LinkAdded { id: edge.clone() });
        self.topology_changed();
        edge
    }

    pub fn begin_drag(&mut self, handle: &NodeId) -> Result<EdgeId, EditorError> {
        Ok(self.connection.begin_drag(&self.graph, handle)?)
    }

    /// Pulls a link end off its node. A link that was connected is removed
    /// from the Backend; it is created again once both ends are reattached.
    pub async fn detach_endpoint(
        &mut self,
        edge: &EdgeId,
        node: &NodeId,
        cursor: Point,
    ) -> Result<NodeId, EditorError> {
        let was_connected = self.graph.is_connected(edge);
        let handle = self.connection.detach(&mut self.graph, edge, node, cursor)?;
        self.topology_changed();
        if was_connected {
            let _busy = self.ctx.busy();
            if traced(BackendCall::RemoveLink, self.backend.remove_link(edge))
                .await
                .is_err()
            {
                self.ctx.error(REMOVE_LINK_FAILED);
            }
        }
        Ok(handle)
    }

    /// Pointer move while dragging. Only links touching the handle are
    /// rerouted; crossings are restored on drop.
    pub fn drag_to(&mut self, position: Point) -> Result<(), EditorError> {
        let handle = self.connection.drag_to(&mut self.graph, position)?;
        self.routing.refresh_touching(&self.graph, &handle);
        Ok(())
    }

    /// Ends the drag over `target`, or over empty canvas when `None`. A link
    /// that becomes connected is finalized with the Backend.
    pub async fn drop_endpoint(
        &mut self,
        target: Option<&NodeId>,
    ) -> Result<DropOutcome, EditorError> {
        let result = self.connection.drop_on(&mut self.graph, target);
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                self.topology_changed();
                return Err(err.into());
            }
        };
        match &outcome {
            DropOutcome::Discarded(edge) => {
                self.forget(None, std::slice::from_ref(&edge.id));
                self.ctx.publish(Event::LinkRemoved { id: edge.id.clone() });
                self.topology_changed();
            }
            DropOutcome::PortChoice { node, ports } => {
                self.ctx.publish(Event::PortChoiceRequested {
                    node: node.clone(),
                    ports: ports.clone(),
                });
            }
            DropOutcome::Attached(attachment) => {
                let attachment = attachment.clone();
                return self
                    .after_attach(attachment)
                    .await
                    .map(DropOutcome::Attached);
            }
        }
        Ok(outcome)
    }

    pub async fn choose_port(&mut self, port: &PortId) -> Result<Attachment, EditorError> {
        let attachment = self.connection.choose_port(&mut self.graph, port)?;
        self.after_attach(attachment).await
    }

    pub fn cancel_port_choice(&mut self) -> Result<EdgeId, EditorError> {
        let edge = self.connection.cancel_port_choice()?;
        self.topology_changed();
        Ok(edge)
    }

    async fn after_attach(&mut self, mut attachment: Attachment) -> Result<Attachment, EditorError> {
        self.topology_changed();
        if attachment.connected {
            attachment.edge = self.finalize_link(&attachment.edge).await?;
        }
        Ok(attachment)
    }

    /// Commits a link whose two ends are concrete. The link is shown
    /// connected right away and removed again if the Backend refuses it.
    /// Returns the Backend id.
    pub async fn finalize_link(&mut self, id: &EdgeId) -> Result<EdgeId, EditorError> {
        let edge = self
            .graph
            .edge(id)
            .ok_or_else(|| EditorError::EdgeNotFound(id.clone()))?;
        let endpoints = self.link_endpoints(edge)?;
        if let Some(edge) = self.graph.edge_mut(id) {
            edge.mark_connected();
        }

        let result = {
            let _busy = self.ctx.busy();
            traced(BackendCall::CreateLink, self.backend.create_link(endpoints)).await
        };
        let created = result.and_then(|links| {
            links.into_iter().next().ok_or_else(|| {
                BackendError::rejected(BackendCall::CreateLink.as_str(), "no link returned")
            })
        });
        let created = match created {
            Ok(created) => created,
            Err(err) => {
                self.graph.remove_edge(id);
                self.forget(None, std::slice::from_ref(id));
                self.ctx.publish(Event::LinkRemoved { id: id.clone() });
                self.ctx.error(CREATE_LINK_FAILED);
                self.topology_changed();
                return Err(err.into());
            }
        };

        self.graph.rename_edge(id, created.id.clone())?;
        if let Some(edge) = self.graph.edge_mut(&created.id) {
            edge.set_speed(created.bandwidth);
            edge.protocol = created.protocol;
            edge.mark_connected();
        }
        tracing::info!(link = %created.id, provisional = %id, speed = ?created.bandwidth, "link connected");
        self.ctx.publish(Event::LinkConnected {
            id: created.id.clone(),
        });
        self.topology_changed();
        // The link is committed even when the overlay fails.
        if let Err(err) = self.refresh_bandwidth().await {
            tracing::warn!(link = %created.id, error = %err, "bandwidth overlay not refreshed");
        }
        Ok(created.id)
    }

    fn link_endpoints(&self, edge: &Edge) -> Result<[LinkEndpoint; 2], EditorError> {
        let endpoint = |node_id: &NodeId| -> Result<LinkEndpoint, EditorError> {
            let node = self
                .graph
                .node(node_id)
                .filter(|n| n.is_concrete())
                .ok_or_else(|| EditorError::NotConnected(edge.id.clone()))?;
            let port = node
                .link_port_id(&edge.id)
                .cloned()
                .ok_or_else(|| EditorError::NotConnected(edge.id.clone()))?;
            Ok(LinkEndpoint::new(node_id.clone(), port))
        };
        Ok([endpoint(&edge.from)?, endpoint(&edge.to)?])
    }

    pub fn flip_link(&mut self, id: &EdgeId) -> Result<(), EditorError> {
        self.graph
            .edge_mut(id)
            .ok_or_else(|| EditorError::EdgeNotFound(id.clone()))?
            .flip();
        self.topology_changed();
        Ok(())
    }

    pub fn swap_link(&mut self, id: &EdgeId) -> Result<(), EditorError> {
        self.graph
            .edge_mut(id)
            .ok_or_else(|| EditorError::EdgeNotFound(id.clone()))?
            .swap_endpoints();
        self.topology_changed();
        Ok(())
    }

    // Switch roles

    /// Makes `id` the only controller.
    pub async fn set_controller(&mut self, id: &NodeId) -> Result<(), EditorError> {
        self.assign_role(id, true).await
    }

    /// Controller becomes agent, anything else becomes the controller.
    pub async fn toggle_controller(&mut self, id: &NodeId) -> Result<(), EditorError> {
        let is_controller = self
            .graph
            .node(id)
            .ok_or_else(|| EditorError::NodeNotFound(id.clone()))?
            .role()
            == Some(SwitchRole::Controller);
        self.assign_role(id, !is_controller).await
    }

    /// Every switch's role is persisted on its own. Failures are reported
    /// but the local roles are kept.
    async fn assign_role(&mut self, id: &NodeId, state: bool) -> Result<(), EditorError> {
        let roles = self.graph.assign_controller(id, state)?;
        let _busy = self.ctx.busy();
        let mut failures = 0;
        for (switch, role) in roles {
            self.ctx.publish(Event::RoleChanged {
                id: switch.clone(),
                role,
            });
            if traced(
                BackendCall::SetSwitchRole,
                self.backend.set_switch_role(&switch, role),
            )
            .await
            .is_err()
            {
                failures += 1;
            }
        }
        if failures > 0 {
            self.ctx.error(UPDATE_NODE_FAILED);
        }
        Ok(())
    }

    // Simulation overlays

    /// Reloads per-link load without the disabled link and marks links over
    /// their speed. Returns the number of overloaded links.
    pub async fn refresh_bandwidth(&mut self) -> Result<usize, EditorError> {
        let result = {
            let _busy = self.ctx.busy();
            traced(
                BackendCall::GetBandwidth,
                self.backend.get_bandwidth(self.disabled_link.as_ref()),
            )
            .await
        };
        let bandwidth = match result {
            Ok(bandwidth) => bandwidth,
            Err(err) => {
                self.ctx.error(LOAD_BANDWIDTH_FAILED);
                return Err(err.into());
            }
        };

        let ids: Vec<EdgeId> = self.graph.edges().iter().map(|e| e.id.clone()).collect();
        for id in &ids {
            if let Some(edge) = self.graph.edge_mut(id) {
                edge.reset_traffic();
            }
        }
        for link in bandwidth {
            match self.graph.edge_mut(&link.link_id) {
                Some(edge) => edge.set_traffic(link.directions),
                None => tracing::warn!(link = %link.link_id, "bandwidth for unknown link"),
            }
        }

        let overloaded: Vec<EdgeId> = self
            .graph
            .edges()
            .iter()
            .filter(|e| e.is_overloaded())
            .map(|e| e.id.clone())
            .collect();
        let count = overloaded.len();
        self.highlight.set_error_links(overloaded);
        if count > 0 {
            self.ctx
                .warning(format!("Max bandwidth exceeded on {count} link(s)."));
            self.ctx.publish(Event::BandwidthExceeded { link_count: count });
        }
        Ok(count)
    }

    /// Disables `id` for the simulation, or enables it again when it already
    /// is the disabled link. At most one link is disabled.
    pub async fn toggle_link_disabled(&mut self, id: &EdgeId) -> Result<bool, EditorError> {
        if self.graph.edge(id).is_none() {
            return Err(EditorError::EdgeNotFound(id.clone()));
        }
        if !self.graph.is_connected(id) {
            return Err(EditorError::NotConnected(id.clone()));
        }
        if let Some(previous) = self.disabled_link.take() {
            if let Some(edge) = self.graph.edge_mut(&previous) {
                edge.enable();
            }
            if &previous == id {
                self.refresh_bandwidth().await?;
                return Ok(false);
            }
        }
        if let Some(edge) = self.graph.edge_mut(id) {
            edge.disable();
        }
        self.disabled_link = Some(id.clone());
        self.refresh_bandwidth().await?;
        Ok(true)
    }

    /// Overlays the Backend's routes for one traffic.
    pub async fn show_route(
        &mut self,
        traffic: &str,
        method: &str,
    ) -> Result<Vec<RouteModel>, EditorError> {
        let result = {
            let _busy = self.ctx.busy();
            traced(
                BackendCall::GetRoute,
                self.backend
                    .get_route(traffic, method, self.disabled_link.as_ref()),
            )
            .await
        };
        let routes = match result {
            Ok(routes) => routes,
            Err(err) => {
                self.ctx.error(LOAD_ROUTE_FAILED);
                return Err(err.into());
            }
        };

        self.highlight.clear_highlight();
        for route in &routes {
            for node in route.nodes() {
                self.highlight.highlight_node(node);
            }
            for hop in &route.links {
                self.highlight.highlight_link(hop.link.clone());
                for end in [&hop.from, &hop.to] {
                    let port = self
                        .graph
                        .node(end)
                        .and_then(|n| n.link_port_id(&hop.link))
                        .cloned();
                    if let Some(port) = port {
                        self.highlight.highlight_port(end.clone(), port);
                    }
                }
            }
        }
        Ok(routes)
    }

    /// Highlights the hop-shortest path between two nodes. Empty when
    /// unreachable.
    pub fn highlight_signal_path(&mut self, from: &NodeId, to: &NodeId) -> Vec<NodeId> {
        let path = self.graph.find_path(from, to);
        self.highlight.highlight_path(&self.graph, &path);
        path
    }

    pub fn select_node(&mut self, id: &NodeId) {
        self.highlight.select_node(id.clone());
    }

    pub fn select_link(&mut self, id: &EdgeId) {
        self.highlight.select_link(id.clone());
    }

    pub fn clear_selection(&mut self) {
        self.highlight.clear_selection();
        self.highlight.clear_highlight();
    }

    // Validation

    pub fn validate(&mut self, rules: &ValidationRules) -> Vec<Vec<ValidationError>> {
        let result = self.graph.validate(rules);
        let error_count = result.iter().map(Vec::len).sum();
        self.ctx.publish(Event::ValidationFinished { error_count });
        result
    }

    pub fn clear_validation(&mut self) {
        self.graph.clear_validation();
    }

    pub fn clear_item_validation(&mut self, id: &str) -> bool {
        self.graph.clear_item_validation(id)
    }

    pub fn add_multicast_group(&mut self, group: MulticastGroup) {
        self.graph.add_multicast_group(group);
    }

    pub fn remove_multicast_group(&mut self, id: &str) -> Option<MulticastGroup> {
        self.graph.remove_multicast_group(id)
    }

    pub fn check_multicast_groups(&self) -> Vec<ValidationError> {
        self.graph.check_multicast_groups()
    }

    // Documents

    /// Canvas state worth saving next to the Backend document, keyed by id.
    pub fn save_data(&self) -> Value {
        let mut data = Map::new();
        for node in self.graph.concrete_nodes() {
            data.insert(node.id.to_string(), node.save_data());
        }
        for edge in self.graph.edges() {
            data.insert(edge.id.to_string(), edge.save_data());
        }
        Value::Object(data)
    }

    pub async fn load_from_backend(&mut self) -> Result<(), EditorError> {
        let result = {
            let _busy = self.ctx.busy();
            traced(BackendCall::GetAllData, self.backend.get_all_data()).await
        };
        self.apply_loaded(result)
    }

    pub async fn load_document(&mut self, document: Value) -> Result<(), EditorError> {
        let result = {
            let _busy = self.ctx.busy();
            traced(BackendCall::Load, self.backend.load(document)).await
        };
        self.apply_loaded(result)
    }

    pub async fn import_file(&mut self, name: &str, contents: Vec<u8>) -> Result<(), EditorError> {
        let result = {
            let _busy = self.ctx.busy();
            traced(
                BackendCall::ImportFile,
                self.backend.import_file(name, contents),
            )
            .await
        };
        self.apply_loaded(result)
    }

    pub async fn dump(&self) -> Result<Value, EditorError> {
        Ok(traced(BackendCall::Dump, self.backend.dump()).await?)
    }

    pub async fn generate_policies(&self) -> Result<Vec<u8>, EditorError> {
        Ok(traced(BackendCall::GeneratePolicies, self.backend.generate_policies()).await?)
    }

    fn apply_loaded(&mut self, result: BackendResult<BackendSnapshot>) -> Result<(), EditorError> {
        match result {
            Ok(snapshot) => {
                self.apply_snapshot(&snapshot);
                Ok(())
            }
            Err(err) => {
                self.ctx.error(LOAD_TOPOLOGY_FAILED);
                Err(err.into())
            }
        }
    }

    /// Replaces the whole graph with a Backend document laid out on the grid.
    pub fn apply_snapshot(&mut self, snapshot: &BackendSnapshot) {
        self.reset_document();
        for profile in &snapshot.nodes {
            self.graph.add_node(node_from_profile(profile, &self.settings));
        }
        self.graph.apply_layout(&self.settings.grid());

        for link in &snapshot.links {
            let [from, to] = match link.endpoints.as_slice() {
                [from, to] => [from, to],
                _ => {
                    tracing::warn!(link = %link.id, "link without two endpoints skipped");
                    continue;
                }
            };
            if let Err(err) = self.attach_loaded_link(&link.id, from, to) {
                tracing::warn!(link = %link.id, error = %err, "link skipped");
                continue;
            }
            let edge = Edge::new(link.id.as_str(), from.node.clone(), to.node.clone())
                .with_speed(link.bandwidth)
                .with_protocol(link.protocol.as_str());
            self.graph.add_edge(edge);
        }

        for group in &snapshot.multicast_groups {
            self.graph.add_multicast_group(group.clone());
        }
        for traffic in &snapshot.traffics {
            match self.graph.node_mut(&traffic.source) {
                Some(node) => node.add_ip_message(traffic.id.as_str()),
                None => tracing::warn!(traffic = %traffic.id, "traffic from unknown node"),
            }
        }

        tracing::info!(
            nodes = self.graph.node_count(),
            links = self.graph.edge_count(),
            "topology loaded"
        );
        self.topology_changed();
    }

    /// Puts a loaded link on both of its ports or on neither.
    fn attach_loaded_link(
        &mut self,
        link: &EdgeId,
        from: &LinkEndpoint,
        to: &LinkEndpoint,
    ) -> Result<(), EditorError> {
        let mut attached: Vec<&NodeId> = Vec::with_capacity(2);
        for (end, other) in [(from, to), (to, from)] {
            let result = match self.graph.node_mut(&end.node) {
                Some(node) => node
                    .connect_link_to_port(link, &end.port)
                    .map(|()| {
                        node.set_port_node(link, Some(other.node.clone()));
                    })
                    .map_err(EditorError::from),
                None => Err(EditorError::NodeNotFound(end.node.clone())),
            };
            if let Err(err) = result {
                for node_id in attached {
                    if let Some(node) = self.graph.node_mut(node_id) {
                        node.disconnect_link(link);
                    }
                }
                return Err(err);
            }
            attached.push(&end.node);
        }
        Ok(())
    }

    fn reset_document(&mut self) {
        self.graph.clear();
        self.routing.clear();
        self.highlight.reset();
        self.connection.reset();
        self.disabled_link = None;
    }

    /// Empties the canvas.
    pub fn clear(&mut self) {
        self.reset_document();
        self.topology_changed();
    }
}
