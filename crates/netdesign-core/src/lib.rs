use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod bandwidth;
pub mod edge;
pub mod error;
pub mod geometry;
pub mod node;
pub mod port;
pub mod validation;

pub use bandwidth::{BandwidthDirection, TrafficShare};
pub use edge::{Edge, LinkColor};
pub use error::CoreError;
pub use geometry::{Point, Size, is_between};
pub use node::{DeviceData, EndpointSide, Node, NodeKind, SwitchData, SwitchRole};
pub use port::{Port, PortProfile};
pub use validation::{
    ItemRules, ItemType, TopologyItem, ValidationError, ValidationErrorKind, ValidationRules,
};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(pub String);

impl PortId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Random alphanumeric id for locally created items (link handles, provisional
/// links, collisions). Backend-owned items keep the id the Backend assigned.
pub fn generate_id(length: usize) -> String {
    let raw = Uuid::new_v4().simple().to_string();
    raw.chars().take(length.clamp(1, raw.len())).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MulticastGroup {
    pub id: String,
    #[serde(rename = "IP")]
    pub ip: String,
    #[serde(rename = "MAC")]
    pub mac: String,
    #[serde(default)]
    pub devices: Vec<NodeId>,
}

impl MulticastGroup {
    pub fn new(id: impl Into<String>, ip: impl Into<String>, mac: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ip: ip.into(),
            mac: mac.into(),
            devices: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_length() {
        assert_eq!(generate_id(5).len(), 5);
        assert_eq!(generate_id(0).len(), 1);
        assert_eq!(generate_id(100).len(), 32);
        assert!(generate_id(8).chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(generate_id(16), generate_id(16));
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = NodeId::new("S1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"S1\"");
        let group: MulticastGroup = serde_json::from_str(
            r#"{"id":"mg1","IP":"239.0.0.1","MAC":"01:00:5e:00:00:01","devices":["D1"]}"#,
        )
        .unwrap();
        assert_eq!(group.devices, vec![NodeId::new("D1")]);
    }
}
