use crate::NodeId;
use serde::{Deserialize, Serialize};

/// Portion of a direction's load contributed by one traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficShare {
    pub bandwidth: f64,
    #[serde(rename = "trafficId", alias = "ID")]
    pub traffic_id: String,
}

/// Simulated load over a link in one direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandwidthDirection {
    pub bandwidth: f64,
    #[serde(default)]
    pub traffic: Vec<TrafficShare>,
    pub from: NodeId,
    pub to: NodeId,
}

impl BandwidthDirection {
    pub fn is_overloaded(&self, speed: f64) -> bool {
        self.bandwidth > speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overload_is_strict() {
        let direction: BandwidthDirection = serde_json::from_str(
            r#"{"bandwidth":100,"traffic":[{"bandwidth":100,"ID":"t1"}],"from":"D1","to":"S1"}"#,
        )
        .unwrap();
        assert_eq!(direction.traffic[0].traffic_id, "t1");
        assert!(!direction.is_overloaded(100.0));
        assert!(direction.is_overloaded(99.5));
    }
}
