use crate::{EdgeId, NodeId, PortId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Node {node} has no port {port}")]
    PortNotFound { node: NodeId, port: PortId },
    #[error("Port {port} on node {node} is already occupied by link {link}")]
    PortOccupied {
        node: NodeId,
        port: PortId,
        link: EdgeId,
    },
    #[error("Node {0} is not a switch")]
    NotASwitch(NodeId),
}
