use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One raw event as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolMessage {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl ProtocolMessage {
    pub fn new(method: &str, params: Value) -> Self {
        Self {
            method: method.to_string(),
            params,
        }
    }

    /// Looks up a string at a `/`-separated path inside `params`.
    pub fn param_str(&self, pointer: &str) -> Option<&str> {
        self.params.pointer(pointer).and_then(Value::as_str)
    }
}
