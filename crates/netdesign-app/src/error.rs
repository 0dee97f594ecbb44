use crate::connection::ConnectionError;
use netdesign_backend::BackendError;
use netdesign_core::{CoreError, EdgeId, NodeId};
use netdesign_graph::GraphError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("Link not found: {0}")]
    EdgeNotFound(EdgeId),
    #[error("Link {0} is not connected on both ends")]
    NotConnected(EdgeId),
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}
