use crate::error::BackendError;
use crate::model::{
    BackendSnapshot, LinkBandwidth, LinkEndpoint, LinkResult, NodeProfile, NodeQuery, NodeType,
    RouteModel,
};
use crate::{Backend, BackendCall, BackendResult};
use netdesign_core::{BandwidthDirection, EdgeId, NodeId, PortId, PortProfile, SwitchRole};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};

const DEFAULT_SWITCH_PORTS: usize = 4;
const SWITCH_PORT_BANDWIDTH: f64 = 1000.0;

#[derive(Debug, Default)]
struct BackendState {
    snapshot: BackendSnapshot,
    bandwidth: HashMap<EdgeId, Vec<BandwidthDirection>>,
    routes: Vec<RouteModel>,
    next_id: u64,
}

impl BackendState {
    /// Next `<prefix><n>` id not already used by a node or link of the
    /// document.
    fn next_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_id += 1;
            let id = format!("{prefix}{}", self.next_id);
            if !self.id_taken(&id) {
                return id;
            }
        }
    }

    fn id_taken(&self, id: &str) -> bool {
        self.snapshot.nodes.iter().any(|n| n.id.as_str() == id)
            || self.snapshot.links.iter().any(|l| l.id.as_str() == id)
    }

    fn replace_snapshot(&mut self, snapshot: BackendSnapshot) {
        self.snapshot = snapshot;
        self.bandwidth.clear();
    }

    fn port_in_use(&self, endpoint: &LinkEndpoint) -> Option<&EdgeId> {
        self.snapshot
            .links
            .iter()
            .find(|l| l.endpoints.contains(endpoint))
            .map(|l| &l.id)
    }
}

/// Local Backend keeping the document in memory. Simulation results are
/// seeded by the caller. Any call can be made to fail on demand.
#[derive(Debug)]
pub struct InMemoryBackend {
    state: Mutex<BackendState>,
    failures: Mutex<HashSet<BackendCall>>,
    calls: Mutex<Vec<(BackendCall, String)>>,
    switch_ports: usize,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BackendState::default()),
            failures: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            switch_ports: DEFAULT_SWITCH_PORTS,
        }
    }

    pub fn with_snapshot(snapshot: BackendSnapshot) -> Self {
        let backend = Self::new();
        backend.state.lock().snapshot = snapshot;
        backend
    }

    /// Number of ports given to switches created through `create_node`.
    pub fn with_switch_ports(mut self, ports: usize) -> Self {
        self.switch_ports = ports;
        self
    }

    pub fn fail_on(&self, call: BackendCall) {
        self.failures.lock().insert(call);
    }

    pub fn recover(&self, call: BackendCall) {
        self.failures.lock().remove(&call);
    }

    pub fn set_bandwidth(&self, link: EdgeId, directions: Vec<BandwidthDirection>) {
        self.state.lock().bandwidth.insert(link, directions);
    }

    pub fn set_routes(&self, routes: Vec<RouteModel>) {
        self.state.lock().routes = routes;
    }

    pub fn snapshot(&self) -> BackendSnapshot {
        self.state.lock().snapshot.clone()
    }

    /// Every call made so far with its subject id (empty for bulk calls).
    pub fn calls(&self) -> Vec<(BackendCall, String)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, call: BackendCall) -> usize {
        self.calls.lock().iter().filter(|(c, _)| *c == call).count()
    }

    fn enter(&self, call: BackendCall, subject: &str) -> BackendResult<()> {
        self.calls.lock().push((call, subject.to_string()));
        if self.failures.lock().contains(&call) {
            tracing::debug!(call = call.as_str(), "injected failure");
            return Err(BackendError::Transport(format!(
                "{} failed",
                call.as_str()
            )));
        }
        Ok(())
    }

    fn switch_profile_ports(&self) -> Vec<PortProfile> {
        (0..self.switch_ports)
            .map(|i| PortProfile {
                id: PortId::new(format!("GE-{i}")),
                bandwidth: Some(SWITCH_PORT_BANDWIDTH),
                port_type: "1G".to_string(),
            })
            .collect()
    }

    fn policies(snapshot: &BackendSnapshot) -> Value {
        let switches: Vec<Value> = snapshot
            .nodes
            .iter()
            .filter(|n| n.node_type == NodeType::Switch)
            .map(|n| {
                let links: Vec<&EdgeId> = snapshot
                    .links
                    .iter()
                    .filter(|l| l.endpoints.iter().any(|e| e.node == n.id))
                    .map(|l| &l.id)
                    .collect();
                json!({
                    "switch": n.id,
                    "role": n.role.unwrap_or_default(),
                    "links": links,
                })
            })
            .collect();
        json!({ "policies": switches })
    }
}

impl Backend for InMemoryBackend {
    async fn create_node(&self, query: NodeQuery) -> BackendResult<NodeProfile> {
        self.enter(BackendCall::CreateNode, "")?;
        let node_type = query.node_type.unwrap_or(NodeType::Device);
        let ports = match node_type {
            NodeType::Switch => self.switch_profile_ports(),
            NodeType::Device => Vec::new(),
        };
        let mut state = self.state.lock();
        let profile = NodeProfile {
            id: NodeId::new(state.next_id("N")),
            ports,
            name: query.name.unwrap_or_default(),
            node_type,
            model: query.model.unwrap_or_default(),
            ip: query.ip,
            mac: query.mac,
            role: (node_type == NodeType::Switch).then_some(SwitchRole::Agent),
        };
        state.snapshot.nodes.push(profile.clone());
        Ok(profile)
    }

    async fn edit_node(&self, id: &NodeId, query: NodeQuery) -> BackendResult<()> {
        self.enter(BackendCall::EditNode, id.as_str())?;
        let mut state = self.state.lock();
        let node = state
            .snapshot
            .nodes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| BackendError::not_found("node", id.as_str()))?;
        if let Some(name) = query.name {
            node.name = name;
        }
        if query.ip.is_some() {
            node.ip = query.ip;
        }
        if query.mac.is_some() {
            node.mac = query.mac;
        }
        if let Some(model) = query.model {
            node.model = model;
        }
        Ok(())
    }

    async fn remove_node(&self, id: &NodeId) -> BackendResult<()> {
        self.enter(BackendCall::RemoveNode, id.as_str())?;
        let mut state = self.state.lock();
        let before = state.snapshot.nodes.len();
        state.snapshot.nodes.retain(|n| &n.id != id);
        if state.snapshot.nodes.len() == before {
            return Err(BackendError::not_found("node", id.as_str()));
        }
        state
            .snapshot
            .links
            .retain(|l| l.endpoints.iter().all(|e| &e.node != id));
        Ok(())
    }

    async fn create_link(&self, endpoints: [LinkEndpoint; 2]) -> BackendResult<Vec<LinkResult>> {
        let call = BackendCall::CreateLink;
        self.enter(call, "")?;
        if endpoints[0].node == endpoints[1].node {
            return Err(BackendError::rejected(call.as_str(), "link joins a node to itself"));
        }

        let mut state = self.state.lock();
        let mut speed: Option<f64> = None;
        for endpoint in &endpoints {
            let node = state
                .snapshot
                .node(&endpoint.node)
                .ok_or_else(|| BackendError::not_found("node", endpoint.node.as_str()))?;
            let port_bandwidth = node
                .ports
                .iter()
                .find(|p| p.id == endpoint.port)
                .and_then(|p| p.bandwidth);
            speed = match (speed, port_bandwidth) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
            if let Some(link) = state.port_in_use(endpoint) {
                return Err(BackendError::rejected(
                    call.as_str(),
                    format!("port {} on {} is used by {link}", endpoint.port, endpoint.node),
                ));
            }
        }

        let link = LinkResult {
            id: EdgeId::new(state.next_id("L")),
            bandwidth: speed,
            endpoints: endpoints.to_vec(),
            protocol: "ETHERNET".to_string(),
        };
        state.snapshot.links.push(link.clone());
        Ok(vec![link])
    }

    async fn remove_link(&self, id: &EdgeId) -> BackendResult<()> {
        self.enter(BackendCall::RemoveLink, id.as_str())?;
        let mut state = self.state.lock();
        let before = state.snapshot.links.len();
        state.snapshot.links.retain(|l| &l.id != id);
        if state.snapshot.links.len() == before {
            return Err(BackendError::not_found("link", id.as_str()));
        }
        state.bandwidth.remove(id);
        Ok(())
    }

    async fn set_switch_role(&self, id: &NodeId, role: SwitchRole) -> BackendResult<()> {
        self.enter(BackendCall::SetSwitchRole, id.as_str())?;
        let mut state = self.state.lock();
        let node = state
            .snapshot
            .nodes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| BackendError::not_found("node", id.as_str()))?;
        node.role = Some(role);
        Ok(())
    }

    async fn get_bandwidth(&self, excluded: Option<&EdgeId>) -> BackendResult<Vec<LinkBandwidth>> {
        self.enter(BackendCall::GetBandwidth, "")?;
        let state = self.state.lock();
        let mut result: Vec<LinkBandwidth> = state
            .bandwidth
            .iter()
            .filter(|(link, _)| Some(*link) != excluded)
            .map(|(link, directions)| LinkBandwidth {
                link_id: link.clone(),
                directions: directions.clone(),
            })
            .collect();
        result.sort_by(|a, b| a.link_id.cmp(&b.link_id));
        Ok(result)
    }

    async fn get_route(
        &self,
        traffic: &str,
        method: &str,
        excluded: Option<&EdgeId>,
    ) -> BackendResult<Vec<RouteModel>> {
        self.enter(BackendCall::GetRoute, traffic)?;
        let state = self.state.lock();
        Ok(state
            .routes
            .iter()
            .filter(|r| r.traffic == traffic && r.method == method)
            .filter(|r| excluded.is_none_or(|link| !r.uses_link(link)))
            .cloned()
            .collect())
    }

    async fn get_all_data(&self) -> BackendResult<BackendSnapshot> {
        self.enter(BackendCall::GetAllData, "")?;
        Ok(self.snapshot())
    }

    async fn dump(&self) -> BackendResult<Value> {
        self.enter(BackendCall::Dump, "")?;
        Ok(serde_json::to_value(self.snapshot())?)
    }

    async fn load(&self, data: Value) -> BackendResult<BackendSnapshot> {
        self.enter(BackendCall::Load, "")?;
        let snapshot: BackendSnapshot = if data.is_null() {
            BackendSnapshot::default()
        } else {
            serde_json::from_value(data)?
        };
        self.state.lock().replace_snapshot(snapshot.clone());
        Ok(snapshot)
    }

    async fn import_file(&self, name: &str, contents: Vec<u8>) -> BackendResult<BackendSnapshot> {
        self.enter(BackendCall::ImportFile, name)?;
        let snapshot: BackendSnapshot = serde_json::from_slice(&contents)?;
        self.state.lock().replace_snapshot(snapshot.clone());
        Ok(snapshot)
    }

    async fn generate_policies(&self) -> BackendResult<Vec<u8>> {
        self.enter(BackendCall::GeneratePolicies, "")?;
        let policies = Self::policies(&self.state.lock().snapshot);
        Ok(serde_json::to_vec_pretty(&policies)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn two_nodes(backend: &InMemoryBackend) -> (NodeProfile, NodeProfile) {
        let switch = backend
            .create_node(NodeQuery::new(NodeType::Switch, "sw"))
            .await
            .unwrap();
        let device = backend
            .create_node(NodeQuery::new(NodeType::Device, "dev"))
            .await
            .unwrap();
        (switch, device)
    }

    #[tokio::test]
    async fn test_create_link_reports_speed_and_rejects_used_ports() {
        let backend = InMemoryBackend::new();
        let (switch, device) = two_nodes(&backend).await;
        assert_eq!(switch.ports.len(), DEFAULT_SWITCH_PORTS);
        assert_eq!(switch.role, Some(SwitchRole::Agent));

        let endpoints = [
            LinkEndpoint::new(switch.id.clone(), PortId::new("GE-0")),
            LinkEndpoint::new(device.id.clone(), PortId::new("DEVICE-0")),
        ];
        let result = backend.create_link(endpoints.clone()).await.unwrap();
        assert_eq!(result[0].bandwidth, Some(SWITCH_PORT_BANDWIDTH));

        let err = backend.create_link(endpoints).await.unwrap_err();
        assert!(matches!(err, BackendError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_remove_node_drops_its_links() {
        let backend = InMemoryBackend::new();
        let (switch, device) = two_nodes(&backend).await;
        backend
            .create_link([
                LinkEndpoint::new(switch.id.clone(), PortId::new("GE-1")),
                LinkEndpoint::new(device.id.clone(), PortId::new("DEVICE-0")),
            ])
            .await
            .unwrap();
        backend.remove_node(&device.id).await.unwrap();
        assert!(backend.snapshot().links.is_empty());
        assert!(matches!(
            backend.remove_node(&device.id).await,
            Err(BackendError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_injected_failures_and_call_log() {
        let backend = InMemoryBackend::new();
        backend.fail_on(BackendCall::SetSwitchRole);
        let err = backend
            .set_switch_role(&NodeId::new("S1"), SwitchRole::Controller)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
        backend.recover(BackendCall::SetSwitchRole);
        assert_eq!(backend.call_count(BackendCall::SetSwitchRole), 1);
        assert_eq!(backend.calls()[0].1, "S1");
    }

    #[tokio::test]
    async fn test_bandwidth_excludes_disabled_link() {
        let backend = InMemoryBackend::new();
        let direction = BandwidthDirection {
            bandwidth: 10.0,
            traffic: Vec::new(),
            from: NodeId::new("a"),
            to: NodeId::new("b"),
        };
        backend.set_bandwidth(EdgeId::new("L1"), vec![direction.clone()]);
        backend.set_bandwidth(EdgeId::new("L2"), vec![direction]);

        assert_eq!(backend.get_bandwidth(None).await.unwrap().len(), 2);
        let filtered = backend.get_bandwidth(Some(&EdgeId::new("L1"))).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].link_id, EdgeId::new("L2"));
    }

    #[tokio::test]
    async fn test_dump_load_and_policies() {
        let backend = InMemoryBackend::new();
        two_nodes(&backend).await;
        let dump = backend.dump().await.unwrap();

        let other = InMemoryBackend::new();
        let snapshot = other.load(dump).await.unwrap();
        assert_eq!(snapshot.nodes.len(), 2);

        let policies: Value =
            serde_json::from_slice(&other.generate_policies().await.unwrap()).unwrap();
        assert_eq!(policies["policies"].as_array().unwrap().len(), 1);

        assert!(other.load(Value::Null).await.unwrap().nodes.is_empty());
        assert!(other.import_file("bad.json", b"not json".to_vec()).await.is_err());
    }

    #[tokio::test]
    async fn test_ids_after_load_skip_loaded_ones() {
        let loaded = InMemoryBackend::new();
        two_nodes(&loaded).await;
        let dump = loaded.dump().await.unwrap();

        let backend = InMemoryBackend::new();
        backend.load(dump).await.unwrap();
        let (switch, device) = two_nodes(&backend).await;
        assert_eq!(switch.id, NodeId::new("N3"));
        assert_eq!(device.id, NodeId::new("N4"));

        let link = backend
            .create_link([
                LinkEndpoint::new(switch.id.clone(), PortId::new("GE-0")),
                LinkEndpoint::new(device.id.clone(), PortId::new("DEVICE-0")),
            ])
            .await
            .unwrap();
        assert_eq!(link[0].id, EdgeId::new("L5"));
    }
}
