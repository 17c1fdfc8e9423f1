use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

const REDIRECT_SUFFIX: &str = ":redirect";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id of the hop that follows this one after a redirect.
    pub fn redirected(&self) -> Self {
        Self(format!("{}{}", self.0, REDIRECT_SUFFIX))
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResourceType {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    TextTrack,
    #[serde(rename = "XHR")]
    Xhr,
    Fetch,
    Prefetch,
    EventSource,
    WebSocket,
    Manifest,
    SignedExchange,
    Ping,
    #[serde(rename = "CSPViolationReport")]
    CspViolationReport,
    Preflight,
    #[default]
    Other,
}

impl ResourceType {
    /// Maps the protocol's `type` string; unknown names become `Other`.
    pub fn from_protocol(name: &str) -> Self {
        serde_json::from_value(Value::String(name.to_string())).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    pub request_id: RequestId,
    pub url: String,
    pub resource_type: ResourceType,
    pub document_url: Option<String>,
    pub frame_id: Option<String>,
    pub status_code: Option<u16>,
    pub mime_type: Option<String>,
    pub finished: bool,
    pub failed: bool,
    pub from_redirect: bool,
}

impl NetworkRecord {
    pub fn new(request_id: impl Into<String>, url: &str, resource_type: ResourceType) -> Self {
        Self {
            request_id: RequestId::new(request_id),
            url: url.to_string(),
            resource_type,
            document_url: None,
            frame_id: None,
            status_code: None,
            mime_type: None,
            finished: false,
            failed: false,
            from_redirect: false,
        }
    }
}
