use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    Required,
    WrongValue,
    LinkNotConnected,
    TooManyPorts,
    PortNotSpecified,
    MacIsUsed,
    IpIsUsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Node,
    Link,
    Message,
    Signal,
    MulticastGroup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub item_id: String,
    pub item_type: ItemType,
    pub property: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(
        item_id: impl Into<String>,
        item_type: ItemType,
        property: impl Into<String>,
        kind: ValidationErrorKind,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            item_type,
            property: property.into(),
            kind,
        }
    }

    /// One-line text shown next to the offending item.
    pub fn message(&self) -> String {
        match self.kind {
            ValidationErrorKind::Required => format!("{} property is NOT specified", self.property),
            ValidationErrorKind::WrongValue => format!("{} has wrong value", self.property),
            ValidationErrorKind::LinkNotConnected => "Link must be connected to a node".to_string(),
            ValidationErrorKind::TooManyPorts => "Too many 1 Gb ports".to_string(),
            ValidationErrorKind::PortNotSpecified => "1 Gb port is NOT specified".to_string(),
            ValidationErrorKind::MacIsUsed => "MAC address already in use".to_string(),
            ValidationErrorKind::IpIsUsed => "IP address already in use".to_string(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item_id, self.message())
    }
}

/// Required attributes for one item collection.
///
/// Accepts either a plain list of names or a JSON-schema style object whose
/// keys are the attribute names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawItemRules")]
pub struct ItemRules {
    pub properties: Vec<String>,
}

impl ItemRules {
    pub fn required<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize)]
struct RawItemRules {
    #[serde(default)]
    properties: PropertyList,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PropertyList {
    Names(Vec<String>),
    Schema(serde_json::Map<String, Value>),
}

impl Default for PropertyList {
    fn default() -> Self {
        PropertyList::Names(Vec::new())
    }
}

impl From<RawItemRules> for ItemRules {
    fn from(raw: RawItemRules) -> Self {
        let properties = match raw.properties {
            PropertyList::Names(names) => names,
            PropertyList::Schema(map) => map.keys().cloned().collect(),
        };
        Self { properties }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(rename = "netNodes", default)]
    pub nodes: ItemRules,
    #[serde(rename = "netLinks", default)]
    pub links: ItemRules,
}

impl ValidationRules {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Operations shared by every validatable topology item (nodes and links).
pub trait TopologyItem {
    fn item_id(&self) -> &str;
    fn item_type(&self) -> ItemType;
    fn is_validatable(&self) -> bool;

    /// Value of a named attribute as used by validation rules, `None` when the
    /// item has no such attribute.
    fn attribute(&self, name: &str) -> Option<String>;

    fn errors(&self) -> &[ValidationError];
    fn push_error(&mut self, error: ValidationError);
    fn clear_errors(&mut self);
    fn set_error_style(&mut self, is_error: bool);
    fn has_error_style(&self) -> bool;

    /// Layout data persisted alongside the Backend document.
    fn save_data(&self) -> Value;

    fn has_validation_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    /// Every rule-listed attribute must be present and non-empty.
    fn validate(&self, rules: &ItemRules) -> Vec<ValidationError> {
        rules
            .properties
            .iter()
            .filter(|property| {
                self.attribute(property)
                    .is_none_or(|value| value.trim().is_empty())
            })
            .map(|property| {
                ValidationError::new(
                    self.item_id(),
                    self.item_type(),
                    property.as_str(),
                    ValidationErrorKind::Required,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_accept_name_lists() {
        let rules = ValidationRules::from_json(
            r#"{"netNodes":{"properties":["label","IP"]},"netLinks":{"properties":["speed"]}}"#,
        )
        .unwrap();
        assert_eq!(rules.nodes.properties, vec!["label", "IP"]);
        assert_eq!(rules.links.properties, vec!["speed"]);
    }

    #[test]
    fn test_rules_accept_schema_objects() {
        let rules = ValidationRules::from_json(
            r#"{"netNodes":{"properties":{"MAC":{"type":"string"},"IP":{"type":"string"}}}}"#,
        )
        .unwrap();
        assert_eq!(rules.nodes.properties.len(), 2);
        assert!(rules.nodes.properties.contains(&"MAC".to_string()));
        assert!(rules.links.properties.is_empty());
    }

    #[test]
    fn test_error_messages() {
        let err = ValidationError::new("n1", ItemType::Node, "IP", ValidationErrorKind::Required);
        assert_eq!(err.message(), "IP property is NOT specified");
        let err = ValidationError::new("n1", ItemType::Node, "IP", ValidationErrorKind::IpIsUsed);
        assert_eq!(err.to_string(), "n1: IP address already in use");
    }
}
