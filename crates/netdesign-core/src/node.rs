use crate::error::CoreError;
use crate::geometry::{Point, Size};
use crate::port::Port;
use crate::validation::{ItemType, TopologyItem, ValidationError};
use crate::{EdgeId, NodeId, PortId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const DEVICE_PORT_ID: &str = "DEVICE-0";
pub const DEVICE_PORT_TYPE: &str = "DEVICE0";
pub const ENDPOINT_PORT_ID: &str = "ENDPOINT-0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwitchRole {
    #[default]
    Agent,
    Controller,
}

impl SwitchRole {
    pub fn as_str(self) -> &'static str {
        match self {
            SwitchRole::Agent => "AGENT",
            SwitchRole::Controller => "CONTROLLER",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceData {
    #[serde(rename = "IP", default)]
    pub ip: String,
    #[serde(rename = "MAC", default)]
    pub mac: String,
    /// Ids of the IP messages this device sends.
    #[serde(default)]
    pub ip_messages: Vec<String>,
    #[serde(default)]
    pub traffics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchData {
    #[serde(rename = "IP", default)]
    pub ip: String,
    #[serde(rename = "MAC", default)]
    pub mac: String,
    #[serde(default)]
    pub role: SwitchRole,
}

/// Which end of an in-progress link a transient handle stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointSide {
    From,
    To,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Device(DeviceData),
    Switch(SwitchData),
    TransientEndpoint(EndpointSide),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    /// Top-left corner of the node's icon box.
    pub position: Point,
    pub size: Size,
    pub icon: String,
    pub category: String,
    pub group: String,
    pub kind: NodeKind,
    pub ports: Vec<Port>,
    validatable: bool,
    errors: Vec<ValidationError>,
    error_style: bool,
}

impl Node {
    fn base(id: NodeId, label: String, kind: NodeKind) -> Self {
        Self {
            id,
            label,
            position: Point::default(),
            size: Size::default(),
            icon: String::new(),
            category: String::new(),
            group: String::new(),
            kind,
            ports: Vec::new(),
            validatable: true,
            errors: Vec::new(),
            error_style: false,
        }
    }

    /// End device with its single default port.
    pub fn device(id: impl Into<String>, label: impl Into<String>, data: DeviceData) -> Self {
        let mut node = Self::base(NodeId::new(id), label.into(), NodeKind::Device(data));
        node.ports.push(Port::new(DEVICE_PORT_ID, DEVICE_PORT_TYPE));
        node
    }

    pub fn switch(id: impl Into<String>, label: impl Into<String>, data: SwitchData) -> Self {
        Self::base(NodeId::new(id), label.into(), NodeKind::Switch(data))
    }

    /// Link-drag handle. Never validated, never persisted.
    pub fn transient(id: impl Into<String>, side: EndpointSide, position: Point, size: Size) -> Self {
        let mut node = Self::base(
            NodeId::new(id),
            String::new(),
            NodeKind::TransientEndpoint(side),
        );
        node.position = position;
        node.size = size;
        node.validatable = false;
        node.ports.push(Port::new(ENDPOINT_PORT_ID, ""));
        node
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Replaces the port list (Backend profiles override the device default).
    pub fn with_ports(mut self, ports: Vec<Port>) -> Self {
        self.ports = ports;
        self
    }

    pub fn is_transient(&self) -> bool {
        matches!(self.kind, NodeKind::TransientEndpoint(_))
    }

    pub fn is_concrete(&self) -> bool {
        !self.is_transient()
    }

    pub fn is_device(&self) -> bool {
        matches!(self.kind, NodeKind::Device(_))
    }

    pub fn is_switch(&self) -> bool {
        matches!(self.kind, NodeKind::Switch(_))
    }

    pub fn endpoint_side(&self) -> Option<EndpointSide> {
        match self.kind {
            NodeKind::TransientEndpoint(side) => Some(side),
            _ => None,
        }
    }

    pub fn set_validatable(&mut self, validatable: bool) {
        self.validatable = validatable;
    }

    pub fn center(&self) -> Point {
        self.position
            .offset(self.size.width / 2.0, self.size.height / 2.0)
    }

    pub fn ip(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Device(d) => Some(&d.ip),
            NodeKind::Switch(s) => Some(&s.ip),
            NodeKind::TransientEndpoint(_) => None,
        }
    }

    pub fn mac(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Device(d) => Some(&d.mac),
            NodeKind::Switch(s) => Some(&s.mac),
            NodeKind::TransientEndpoint(_) => None,
        }
    }

    pub fn role(&self) -> Option<SwitchRole> {
        match &self.kind {
            NodeKind::Switch(s) => Some(s.role),
            _ => None,
        }
    }

    /// Returns whether the role actually changed.
    pub fn set_controller(&mut self, state: bool) -> Result<bool, CoreError> {
        let NodeKind::Switch(data) = &mut self.kind else {
            return Err(CoreError::NotASwitch(self.id.clone()));
        };
        let role = if state {
            SwitchRole::Controller
        } else {
            SwitchRole::Agent
        };
        let changed = data.role != role;
        data.role = role;
        Ok(changed)
    }

    pub fn add_ip_message(&mut self, message_id: impl Into<String>) {
        if let NodeKind::Device(data) = &mut self.kind {
            data.ip_messages.push(message_id.into());
        }
    }

    pub fn has_multiple_ports(&self) -> bool {
        self.ports.len() > 1
    }

    pub fn free_ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter().filter(|p| p.is_free())
    }

    pub fn port(&self, id: &PortId) -> Option<&Port> {
        self.ports.iter().find(|p| &p.id == id)
    }

    pub fn port_by_link(&self, edge: &EdgeId) -> Option<&Port> {
        self.ports.iter().find(|p| p.holds(edge))
    }

    fn port_by_link_mut(&mut self, edge: &EdgeId) -> Option<&mut Port> {
        self.ports.iter_mut().find(|p| p.holds(edge))
    }

    pub fn link_port_id(&self, edge: &EdgeId) -> Option<&PortId> {
        self.port_by_link(edge).map(|p| &p.id)
    }

    pub fn connect_link_to_port(&mut self, edge: &EdgeId, port_id: &PortId) -> Result<(), CoreError> {
        let node = self.id.clone();
        let port = self
            .ports
            .iter_mut()
            .find(|p| &p.id == port_id)
            .ok_or_else(|| CoreError::PortNotFound {
                node: node.clone(),
                port: port_id.clone(),
            })?;
        if let Some(link) = port.link().filter(|link| *link != edge) {
            return Err(CoreError::PortOccupied {
                node,
                port: port_id.clone(),
                link: link.clone(),
            });
        }
        port.attach_link(edge.clone());
        Ok(())
    }

    /// Records the neighbour reached through `edge` on the port holding it.
    pub fn set_port_node(&mut self, edge: &EdgeId, neighbor: Option<NodeId>) -> bool {
        match self.port_by_link_mut(edge) {
            Some(port) => {
                port.set_connected_node(neighbor);
                true
            }
            None => false,
        }
    }

    pub fn disconnect_link(&mut self, edge: &EdgeId) -> bool {
        match self.port_by_link_mut(edge) {
            Some(port) => {
                port.detach();
                true
            }
            None => false,
        }
    }

    pub fn rename_link(&mut self, old: &EdgeId, new: &EdgeId) {
        if let Some(port) = self.port_by_link_mut(old) {
            port.attach_link(new.clone());
        }
    }
}

impl TopologyItem for Node {
    fn item_id(&self) -> &str {
        self.id.as_str()
    }

    fn item_type(&self) -> ItemType {
        ItemType::Node
    }

    fn is_validatable(&self) -> bool {
        self.validatable
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.0.clone()),
            "label" | "name" => Some(self.label.clone()),
            "icon" => Some(self.icon.clone()),
            "category" => Some(self.category.clone()),
            "group" => Some(self.group.clone()),
            "IP" => self.ip().map(str::to_string),
            "MAC" => self.mac().map(str::to_string),
            "role" => self.role().map(|r| r.as_str().to_string()),
            _ => None,
        }
    }

    fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    fn push_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    fn clear_errors(&mut self) {
        self.errors.clear();
    }

    fn set_error_style(&mut self, is_error: bool) {
        self.error_style = is_error;
    }

    fn has_error_style(&self) -> bool {
        self.error_style
    }

    fn save_data(&self) -> Value {
        match self.kind {
            NodeKind::TransientEndpoint(_) => json!({}),
            _ => json!({ "x": self.position.x, "y": self.position.y }),
        }
    }
}
