//! Structured pipeline event logging
//!
//! Every event goes to the tracing subscriber; an optional sink (typically
//! a per-request SSE writer) receives a copy. Event payloads are built by
//! the caller and must never contain the raw user message past the redact
//! node.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::domain::traits::{EventLevel, EventSink, GraphEvent};

const SENSITIVE_KEYS: &[&str] = &["authorization", "cookie"];

/// Strip credential-bearing keys from an event payload, at any depth.
fn sanitize(data: Value) -> Value {
    match data {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| !SENSITIVE_KEYS.contains(&k.to_lowercase().as_str()))
                .map(|(k, v)| (k, sanitize(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        other => other,
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventLogger {
    sink: Option<Arc<dyn EventSink>>,
}

impl EventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: Arc<dyn EventSink>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn emit(&self, level: EventLevel, chat_id: &str, message: &str, data: Value) {
        let data = sanitize(data);
        match level {
            EventLevel::Debug => debug!(chat_id, %data, "{message}"),
            EventLevel::Info => info!(chat_id, %data, "{message}"),
            EventLevel::Warn => warn!(chat_id, %data, "{message}"),
            EventLevel::Error => error!(chat_id, %data, "{message}"),
        }

        if let Some(sink) = &self.sink {
            sink.emit(&GraphEvent {
                level,
                chat_id: chat_id.to_string(),
                message: message.to_string(),
                data,
            });
        }
    }

    pub fn debug(&self, chat_id: &str, message: &str, data: Value) {
        self.emit(EventLevel::Debug, chat_id, message, data);
    }

    pub fn info(&self, chat_id: &str, message: &str, data: Value) {
        self.emit(EventLevel::Info, chat_id, message, data);
    }

    pub fn warn(&self, chat_id: &str, message: &str, data: Value) {
        self.emit(EventLevel::Warn, chat_id, message, data);
    }

    pub fn error(&self, chat_id: &str, message: &str, data: Value) {
        self.emit(EventLevel::Error, chat_id, message, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingSink {
        events: Mutex<Vec<GraphEvent>>,
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: &GraphEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn test_events_forwarded_to_sink() {
        let sink = Arc::new(RecordingSink::default());
        let logger = EventLogger::with_sink(sink.clone());

        logger.info("chat-1", "node:redact output", json!({"items": 0}));
        logger.warn("chat-1", "similar questions lookup failed", json!({}));

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].level, EventLevel::Info);
        assert_eq!(events[0].chat_id, "chat-1");
        assert_eq!(events[1].level, EventLevel::Warn);
    }

    #[test]
    fn test_logger_without_sink_is_a_tracing_passthrough() {
        let logger = EventLogger::new();
        logger.debug("chat-1", "node:init input", json!({}));
    }

    #[test]
    fn test_credential_keys_stripped_from_payloads() {
        let sink = Arc::new(RecordingSink::default());
        let logger = EventLogger::with_sink(sink.clone());

        logger.info(
            "chat-1",
            "workflow started",
            json!({
                "headers": { "Authorization": "Bearer secret", "user-agent": "test" },
                "cookie": "session=abc",
                "workflow": "DefaultGraph",
            }),
        );

        let events = sink.events.lock().unwrap();
        let data = &events[0].data;
        assert!(data.get("cookie").is_none());
        assert!(data["headers"].get("Authorization").is_none());
        assert_eq!(data["headers"]["user-agent"], "test");
        assert_eq!(data["workflow"], "DefaultGraph");
    }
}
