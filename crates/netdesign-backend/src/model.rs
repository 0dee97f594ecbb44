use netdesign_core::{
    BandwidthDirection, EdgeId, MulticastGroup, NodeId, PortId, PortProfile, SwitchRole,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeType {
    Switch,
    Device,
}

/// Attributes sent on node create/edit. Unset fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "IP", default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(rename = "MAC", default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
}

impl NodeQuery {
    pub fn new(node_type: NodeType, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            node_type: Some(node_type),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeProfile {
    pub id: NodeId,
    #[serde(default)]
    pub ports: Vec<PortProfile>,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub model: String,
    #[serde(rename = "IP", default)]
    pub ip: Option<String>,
    #[serde(rename = "MAC", default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub role: Option<SwitchRole>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkEndpoint {
    pub node: NodeId,
    pub port: PortId,
}

impl LinkEndpoint {
    pub fn new(node: NodeId, port: PortId) -> Self {
        Self { node, port }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkResult {
    pub id: EdgeId,
    /// Link speed, when the Backend knows it.
    #[serde(default)]
    pub bandwidth: Option<f64>,
    pub endpoints: Vec<LinkEndpoint>,
    #[serde(default)]
    pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkBandwidth {
    #[serde(rename = "linkId")]
    pub link_id: EdgeId,
    pub directions: Vec<BandwidthDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLink {
    pub from: NodeId,
    pub to: NodeId,
    pub link: EdgeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteModel {
    pub src: NodeId,
    pub dst: NodeId,
    pub method: String,
    #[serde(default)]
    pub traffic: String,
    #[serde(default)]
    pub links: Vec<RouteLink>,
}

impl RouteModel {
    pub fn uses_link(&self, link: &EdgeId) -> bool {
        self.links.iter().any(|l| &l.link == link)
    }

    /// Nodes on the route in hop order, starting at `src`.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = vec![self.src.clone()];
        for link in &self.links {
            for end in [&link.from, &link.to] {
                if !nodes.contains(end) {
                    nodes.push(end.clone());
                }
            }
        }
        nodes
    }
}

/// IP traffic as it appears in the document; only the source is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficProfile {
    pub id: String,
    pub source: NodeId,
    #[serde(default)]
    pub method: String,
}

/// Whole Backend document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeProfile>,
    #[serde(default)]
    pub links: Vec<LinkResult>,
    #[serde(default)]
    pub multicast_groups: Vec<MulticastGroup>,
    #[serde(default)]
    pub traffics: Vec<TrafficProfile>,
}

impl BackendSnapshot {
    pub fn node(&self, id: &NodeId) -> Option<&NodeProfile> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn link(&self, id: &EdgeId) -> Option<&LinkResult> {
        self.links.iter().find(|l| &l.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_query_skips_unset_fields() {
        let query = NodeQuery::new(NodeType::Switch, "core");
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "core", "node_type": "SWITCH" }));
    }

    #[test]
    fn test_profile_parses_backend_shape() {
        let profile: NodeProfile = serde_json::from_str(
            r#"{"id":"S1","name":"sw","type":"SWITCH","model":"x","role":"CONTROLLER",
                "ports":[{"id":"GE-0","bandwidth":1000,"portType":"1G"}]}"#,
        )
        .unwrap();
        assert_eq!(profile.role, Some(SwitchRole::Controller));
        assert_eq!(profile.ports.len(), 1);
        assert!(profile.ip.is_none());
    }

    #[test]
    fn test_route_nodes_in_hop_order() {
        let route = RouteModel {
            src: NodeId::new("D1"),
            dst: NodeId::new("D2"),
            method: "UNICAST".into(),
            traffic: "t1".into(),
            links: vec![
                RouteLink {
                    from: NodeId::new("D1"),
                    to: NodeId::new("S1"),
                    link: EdgeId::new("E1"),
                },
                RouteLink {
                    from: NodeId::new("S1"),
                    to: NodeId::new("D2"),
                    link: EdgeId::new("E2"),
                },
            ],
        };
        assert_eq!(
            route.nodes(),
            vec![NodeId::new("D1"), NodeId::new("S1"), NodeId::new("D2")]
        );
        assert!(route.uses_link(&EdgeId::new("E2")));
    }
}
