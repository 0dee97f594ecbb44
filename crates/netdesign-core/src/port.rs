use crate::{EdgeId, NodeId, PortId};
use serde::{Deserialize, Serialize};

/// Port description as delivered by the Backend node profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortProfile {
    pub id: PortId,
    #[serde(default)]
    pub bandwidth: Option<f64>,
    #[serde(rename = "portType", default)]
    pub port_type: String,
}

/// Attachment slot owned by a node. Holds at most one link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    pub bandwidth: Option<f64>,
    pub port_type: String,
    link: Option<EdgeId>,
    connected_node: Option<NodeId>,
}

impl Port {
    pub fn new(id: impl Into<String>, port_type: impl Into<String>) -> Self {
        Self {
            id: PortId::new(id),
            bandwidth: None,
            port_type: port_type.into(),
            link: None,
            connected_node: None,
        }
    }

    pub fn with_bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = Some(bandwidth);
        self
    }

    pub fn link(&self) -> Option<&EdgeId> {
        self.link.as_ref()
    }

    pub fn connected_node(&self) -> Option<&NodeId> {
        self.connected_node.as_ref()
    }

    pub fn is_free(&self) -> bool {
        self.link.is_none()
    }

    pub fn holds(&self, edge: &EdgeId) -> bool {
        self.link.as_ref() == Some(edge)
    }

    pub fn attach_link(&mut self, edge: EdgeId) {
        self.link = Some(edge);
    }

    pub fn set_connected_node(&mut self, node: Option<NodeId>) {
        self.connected_node = node;
    }

    pub fn detach(&mut self) {
        self.link = None;
        self.connected_node = None;
    }
}

impl From<PortProfile> for Port {
    fn from(profile: PortProfile) -> Self {
        Self {
            id: profile.id,
            bandwidth: profile.bandwidth,
            port_type: profile.port_type,
            link: None,
            connected_node: None,
        }
    }
}
