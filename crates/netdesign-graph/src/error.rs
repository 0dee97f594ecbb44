use netdesign_core::{CoreError, EdgeId, NodeId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("Link not found: {0}")]
    EdgeNotFound(EdgeId),
    #[error("Node {node} is not an end of link {edge}")]
    NotAnEndpoint { edge: EdgeId, node: NodeId },
    #[error("Node {0} is not a link drag handle")]
    NotTransient(NodeId),
    #[error("Link {edge} already ends on drag handle {node}")]
    AlreadyDetached { edge: EdgeId, node: NodeId },
    #[error("Link {edge} cannot join node {node} to itself")]
    SelfLoop { edge: EdgeId, node: NodeId },
    #[error(transparent)]
    Core(#[from] CoreError),
}
