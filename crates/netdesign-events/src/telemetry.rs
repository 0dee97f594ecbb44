use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{error, info};
use uuid::Uuid;

const TELEMETRY_TARGET: &str = "netdesign::events::telemetry";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CallLifecycle {
    Start,
    Success,
    Failure,
}

impl fmt::Display for CallLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "call_start"),
            Self::Success => write!(f, "call_success"),
            Self::Failure => write!(f, "call_failure"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTelemetry {
    pub correlation_id: String,
    pub call: String,
    pub lifecycle: CallLifecycle,
    pub error_reason: Option<String>,
    pub duration_ms: Option<u128>,
}

impl CallTelemetry {
    pub fn start(call: impl Into<String>, correlation_id: &str) -> Self {
        Self {
            correlation_id: correlation_id.to_string(),
            call: call.into(),
            lifecycle: CallLifecycle::Start,
            error_reason: None,
            duration_ms: None,
        }
    }

    pub fn success(call: impl Into<String>, correlation_id: &str, duration_ms: Option<u128>) -> Self {
        Self {
            correlation_id: correlation_id.to_string(),
            call: call.into(),
            lifecycle: CallLifecycle::Success,
            error_reason: None,
            duration_ms,
        }
    }

    pub fn failure(call: impl Into<String>, correlation_id: &str, reason: Option<String>) -> Self {
        Self {
            correlation_id: correlation_id.to_string(),
            call: call.into(),
            lifecycle: CallLifecycle::Failure,
            error_reason: reason,
            duration_ms: None,
        }
    }

    fn now_unix_ms() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
    }
}

pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn call_start(call: &str, correlation_id: &str) -> CallTelemetry {
    let telemetry = CallTelemetry::start(call, correlation_id);
    info!(
        target: TELEMETRY_TARGET,
        call = %telemetry.call,
        correlation_id = %telemetry.correlation_id,
        lifecycle = %telemetry.lifecycle,
        timestamp_ms = CallTelemetry::now_unix_ms(),
        "call_start"
    );
    telemetry
}

pub fn call_success(call: &str, correlation_id: &str, duration_ms: Option<u128>) -> CallTelemetry {
    let telemetry = CallTelemetry::success(call, correlation_id, duration_ms);
    info!(
        target: TELEMETRY_TARGET,
        call = %telemetry.call,
        correlation_id = %telemetry.correlation_id,
        lifecycle = %telemetry.lifecycle,
        duration_ms = ?telemetry.duration_ms,
        timestamp_ms = CallTelemetry::now_unix_ms(),
        "call_success"
    );
    telemetry
}

pub fn call_failure(call: &str, correlation_id: &str, reason: Option<String>) -> CallTelemetry {
    let telemetry = CallTelemetry::failure(call, correlation_id, reason);
    let error_reason = telemetry.error_reason.as_deref().unwrap_or("unclassified");

    error!(
        target: TELEMETRY_TARGET,
        call = %telemetry.call,
        correlation_id = %telemetry.correlation_id,
        lifecycle = %telemetry.lifecycle,
        error = %error_reason,
        timestamp_ms = CallTelemetry::now_unix_ms(),
        "call_failure"
    );

    telemetry
}

/// One timed Backend round trip. Logs the start on creation and exactly one
/// outcome when finished.
pub struct CallSpan {
    call: &'static str,
    correlation_id: String,
    started: Instant,
}

impl CallSpan {
    pub fn begin(call: &'static str) -> Self {
        let correlation_id = new_correlation_id();
        call_start(call, &correlation_id);
        Self {
            call,
            correlation_id,
            started: Instant::now(),
        }
    }

    pub fn success(self) -> CallTelemetry {
        let elapsed = self.started.elapsed().as_millis();
        call_success(self.call, &self.correlation_id, Some(elapsed))
    }

    pub fn failure(self, reason: impl fmt::Display) -> CallTelemetry {
        call_failure(self.call, &self.correlation_id, Some(reason.to_string()))
    }

    /// Logs the outcome of `result` and hands it back.
    pub fn finish<T, E: fmt::Display>(self, result: Result<T, E>) -> Result<T, E> {
        match &result {
            Ok(_) => {
                self.success();
            }
            Err(err) => {
                self.failure(err);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_ids_are_uuid_like() {
        let id = new_correlation_id();
        assert_eq!(id.len(), 36);
    }

    #[test]
    fn call_telemetry_lifecycle() {
        let correlation_id = new_correlation_id();
        let start = CallTelemetry::start("CreateLink", &correlation_id);
        let success = CallTelemetry::success("CreateLink", &correlation_id, Some(12));
        let failure =
            CallTelemetry::failure("RemoveNode", &correlation_id, Some("boom".to_string()));

        assert_eq!(start.lifecycle, CallLifecycle::Start);
        assert!(start.duration_ms.is_none());
        assert_eq!(success.duration_ms, Some(12));
        assert_eq!(failure.lifecycle, CallLifecycle::Failure);
        assert_eq!(failure.error_reason.as_deref(), Some("boom"));
    }

    #[test]
    fn call_span_reports_outcome() {
        let span = CallSpan::begin("GetRoute");
        let id = span.correlation_id.clone();
        let telemetry = span.failure("route missing");
        assert_eq!(telemetry.correlation_id, id);
        assert_eq!(telemetry.call, "GetRoute");
        assert_eq!(telemetry.lifecycle, CallLifecycle::Failure);

        let ok: Result<u8, String> = CallSpan::begin("GetBandwidth").finish(Ok(3));
        assert_eq!(ok, Ok(3));
    }
}
