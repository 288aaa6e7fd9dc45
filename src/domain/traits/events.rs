//! Telemetry event sink

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One structured pipeline event, already sanitized of sensitive header
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEvent {
    pub level: EventLevel,
    pub chat_id: String,
    pub message: String,
    pub data: Value,
}

/// Optional forwarding target for pipeline events (e.g. a per-request SSE
/// writer). Infallible by contract: implementations must swallow their own
/// failures — telemetry never aborts a run.
pub trait EventSink: Send + Sync + Debug {
    fn emit(&self, event: &GraphEvent);
}
