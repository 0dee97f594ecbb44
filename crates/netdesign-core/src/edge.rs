use crate::bandwidth::BandwidthDirection;
use crate::validation::{ItemType, TopologyItem, ValidationError};
use crate::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkColor {
    /// Link still being dragged.
    NewLink,
    Ethernet,
    Gigabit,
    FastEthernet,
    Error,
}

impl LinkColor {
    pub fn for_speed(speed: Option<f64>) -> Self {
        match speed {
            None => LinkColor::Ethernet,
            Some(s) if s == 100.0 => LinkColor::FastEthernet,
            Some(_) => LinkColor::Gigabit,
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            LinkColor::NewLink => "#808080",
            LinkColor::Ethernet => "#3DE8E8",
            LinkColor::Gigabit => "#00F0EC",
            LinkColor::FastEthernet => "#008280",
            LinkColor::Error => "#E53030",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub speed: Option<f64>,
    pub protocol: String,
    pub dashed: bool,
    /// Bend at `(to.x, from.y)` instead of `(from.x, to.y)`.
    pub flipped: bool,
    pub clickable: bool,
    pub disabled: bool,
    pub traffic: Vec<BandwidthDirection>,
    base_color: LinkColor,
    validatable: bool,
    errors: Vec<ValidationError>,
    error_style: bool,
}

impl Edge {
    pub fn new(id: impl Into<String>, from: NodeId, to: NodeId) -> Self {
        Self {
            id: EdgeId::new(id),
            from,
            to,
            speed: None,
            protocol: String::new(),
            dashed: false,
            flipped: false,
            clickable: true,
            disabled: false,
            traffic: Vec::new(),
            base_color: LinkColor::Ethernet,
            validatable: true,
            errors: Vec::new(),
            error_style: false,
        }
    }

    /// Dashed, non-clickable link between two drag handles.
    pub fn pending(id: impl Into<String>, from: NodeId, to: NodeId) -> Self {
        let mut edge = Self::new(id, from, to);
        edge.dashed = true;
        edge.clickable = false;
        edge.base_color = LinkColor::NewLink;
        edge
    }

    pub fn with_speed(mut self, speed: Option<f64>) -> Self {
        self.set_speed(speed);
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn set_speed(&mut self, speed: Option<f64>) {
        self.speed = speed;
        self.base_color = LinkColor::for_speed(speed);
    }

    pub fn color(&self) -> LinkColor {
        if self.error_style {
            LinkColor::Error
        } else {
            self.base_color
        }
    }

    pub fn touches(&self, node: &NodeId) -> bool {
        &self.from == node || &self.to == node
    }

    /// True when the link joins `a` and `b` in either direction.
    pub fn joins(&self, a: &NodeId, b: &NodeId) -> bool {
        (&self.from == a && &self.to == b) || (&self.from == b && &self.to == a)
    }

    pub fn other_end(&self, node: &NodeId) -> Option<&NodeId> {
        if &self.from == node {
            Some(&self.to)
        } else if &self.to == node {
            Some(&self.from)
        } else {
            None
        }
    }

    /// Repoints whichever end currently references `old`.
    pub fn replace_endpoint(&mut self, old: &NodeId, new: NodeId) -> bool {
        if &self.from == old {
            self.from = new;
            true
        } else if &self.to == old {
            self.to = new;
            true
        } else {
            false
        }
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    pub fn swap_endpoints(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }

    /// Solid, clickable link with the colour of its speed.
    pub fn mark_connected(&mut self) {
        self.dashed = false;
        self.clickable = true;
        self.base_color = LinkColor::for_speed(self.speed);
    }

    pub fn mark_pending(&mut self) {
        self.dashed = true;
        self.clickable = false;
    }

    pub fn disable(&mut self) {
        self.disabled = true;
        self.dashed = true;
        self.traffic.clear();
    }

    /// Pending links stay dashed.
    pub fn enable(&mut self) {
        self.disabled = false;
        self.dashed = !self.clickable;
    }

    pub fn set_traffic(&mut self, traffic: Vec<BandwidthDirection>) {
        self.traffic = traffic;
    }

    pub fn reset_traffic(&mut self) {
        self.traffic.clear();
    }

    pub fn is_overloaded(&self) -> bool {
        self.speed
            .is_some_and(|speed| self.traffic.iter().any(|d| d.is_overloaded(speed)))
    }
}

impl TopologyItem for Edge {
    fn item_id(&self) -> &str {
        self.id.as_str()
    }

    fn item_type(&self) -> ItemType {
        ItemType::Link
    }

    fn is_validatable(&self) -> bool {
        self.validatable
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.0.clone()),
            "from" => Some(self.from.0.clone()),
            "to" => Some(self.to.0.clone()),
            "speed" => self.speed.map(|s| s.to_string()),
            "protocol" => Some(self.protocol.clone()),
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
        json!({ "isFlipped": self.flipped })
    }
}
