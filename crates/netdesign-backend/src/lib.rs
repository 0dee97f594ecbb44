//! Contract of the Backend collaborator: node/link CRUD plus simulation
//! queries. Everything async returns a `Result` the editor continues from.

use std::future::Future;

use netdesign_core::{EdgeId, NodeId, SwitchRole};

pub mod error;
pub mod memory;
pub mod model;

pub use error::BackendError;
pub use memory::InMemoryBackend;
pub use model::{
    BackendSnapshot, LinkBandwidth, LinkEndpoint, LinkResult, NodeProfile, NodeQuery, NodeType,
    RouteLink, RouteModel, TrafficProfile,
};

pub type BackendResult<T> = Result<T, BackendError>;

/// Names of the Backend calls, used for telemetry and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendCall {
    CreateNode,
    EditNode,
    RemoveNode,
    CreateLink,
    RemoveLink,
    SetSwitchRole,
    GetBandwidth,
    GetRoute,
    GetAllData,
    Dump,
    Load,
    ImportFile,
    GeneratePolicies,
}

impl BackendCall {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendCall::CreateNode => "CreateNode",
            BackendCall::EditNode => "EditNode",
            BackendCall::RemoveNode => "RemoveNode",
            BackendCall::CreateLink => "CreateLink",
            BackendCall::RemoveLink => "RemoveLink",
            BackendCall::SetSwitchRole => "SetSwitchRole",
            BackendCall::GetBandwidth => "GetBandwidth",
            BackendCall::GetRoute => "GetRoute",
            BackendCall::GetAllData => "GetAllData",
            BackendCall::Dump => "Dump",
            BackendCall::Load => "Load",
            BackendCall::ImportFile => "ImportFile",
            BackendCall::GeneratePolicies => "GeneratePolicies",
        }
    }
}

pub trait Backend {
    fn create_node(&self, query: NodeQuery) -> impl Future<Output = BackendResult<NodeProfile>> + Send;

    fn edit_node(&self, id: &NodeId, query: NodeQuery) -> impl Future<Output = BackendResult<()>> + Send;

    fn remove_node(&self, id: &NodeId) -> impl Future<Output = BackendResult<()>> + Send;

    /// Creates a link between two `(node, port)` pairs. The first result
    /// carries the Backend id and speed.
    fn create_link(
        &self,
        endpoints: [LinkEndpoint; 2],
    ) -> impl Future<Output = BackendResult<Vec<LinkResult>>> + Send;

    fn remove_link(&self, id: &EdgeId) -> impl Future<Output = BackendResult<()>> + Send;

    fn set_switch_role(
        &self,
        id: &NodeId,
        role: SwitchRole,
    ) -> impl Future<Output = BackendResult<()>> + Send;

    /// Per-link simulated load. `excluded` is the soft-disabled link.
    fn get_bandwidth(
        &self,
        excluded: Option<&EdgeId>,
    ) -> impl Future<Output = BackendResult<Vec<LinkBandwidth>>> + Send;

    fn get_route(
        &self,
        traffic: &str,
        method: &str,
        excluded: Option<&EdgeId>,
    ) -> impl Future<Output = BackendResult<Vec<RouteModel>>> + Send;

    fn get_all_data(&self) -> impl Future<Output = BackendResult<BackendSnapshot>> + Send;

    fn dump(&self) -> impl Future<Output = BackendResult<serde_json::Value>> + Send;

    fn load(&self, data: serde_json::Value)
    -> impl Future<Output = BackendResult<BackendSnapshot>> + Send;

    fn import_file(
        &self,
        name: &str,
        contents: Vec<u8>,
    ) -> impl Future<Output = BackendResult<BackendSnapshot>> + Send;

    fn generate_policies(&self) -> impl Future<Output = BackendResult<Vec<u8>>> + Send;
}
