use serde::Serialize;
use serde_json::Value;

/// Trait for getting the event type name a transport labels a push with
pub trait EventType {
    fn event_type(&self) -> &str;
}

/// A payload delivered to exactly one connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Push {
    #[serde(rename = "type")]
    event_type: String,
    data: Value,
}

impl Push {
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Serialized data body as written to the wire.
    pub fn data_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.data)
    }
}

impl EventType for Push {
    fn event_type(&self) -> &str {
        &self.event_type
    }
}
