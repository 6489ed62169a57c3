//! Decoded plan-stream events

use std::fmt;

use tracing::debug;

/// Kind of a decoded plan-stream event, taken from the frame's `event:` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Progress message for the user ("Generating your plan...")
    Status,

    /// Fragment of the generated plan text
    PlanChunk,

    /// Server finished generating and initializing the board
    Complete,

    /// Server failed after the stream started (e.g. plan could not be parsed)
    Error,

    /// Any other event name; never dispatched
    Unknown(String),
}

impl EventKind {
    /// Map an SSE event name to a kind
    pub fn from_name(name: &str) -> Self {
        debug!(%name, "EventKind::from_name: called");
        match name {
            "status" => Self::Status,
            "plan_chunk" => Self::PlanChunk,
            "complete" => Self::Complete,
            "error" => Self::Error,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The wire name of this kind
    pub fn name(&self) -> &str {
        match self {
            Self::Status => "status",
            Self::PlanChunk => "plan_chunk",
            Self::Complete => "complete",
            Self::Error => "error",
            Self::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded frame, dispatched immediately and then dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub kind: EventKind,

    /// Decoded JSON payload: string payloads verbatim, anything else as compact JSON
    pub payload: String,
}

impl StreamEvent {
    pub fn new(kind: EventKind, payload: impl Into<String>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    pub fn status(payload: impl Into<String>) -> Self {
        Self::new(EventKind::Status, payload)
    }

    pub fn plan_chunk(payload: impl Into<String>) -> Self {
        Self::new(EventKind::PlanChunk, payload)
    }

    /// Build an event from a parsed JSON data field
    pub fn from_json(kind: EventKind, value: serde_json::Value) -> Self {
        let payload = match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Self { kind, payload }
    }
}
