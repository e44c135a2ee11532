//! Fire-and-forget event tracking.
use serde_json::Value;

pub trait Telemetry {
    fn track(&self, event_type: &str, payload: &Value);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn track(&self, _event_type: &str, _payload: &Value) {}
}

/// Writes events to the log at info level under the `telemetry` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTelemetry;

impl Telemetry for LogTelemetry {
    fn track(&self, event_type: &str, payload: &Value) {
        log::info!(target: "telemetry", "{} {}", event_type, payload);
    }
}
