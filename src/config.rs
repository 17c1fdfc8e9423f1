use std::env;

use serde::Serialize;
use tracing::warn;

use crate::gather::CollectionProtocol;
use crate::run::RunMode;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime settings for a collection run, read from `PAGELENS_*` variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatherConfig {
    pub mode: RunMode,
    pub protocol: CollectionProtocol,
    /// Falls back to the first document request of the session when unset.
    pub target_url: Option<String>,
    pub log_filter: String,
}

impl Default for GatherConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Navigation,
            protocol: CollectionProtocol::Window,
            target_url: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl GatherConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unrecognized values keep the default and log a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("PAGELENS_MODE") {
            match RunMode::parse(&raw) {
                Some(mode) => config.mode = mode,
                None => warn!("Unknown PAGELENS_MODE '{}', using {:?}", raw, config.mode),
            }
        }

        if let Some(raw) = lookup("PAGELENS_PROTOCOL") {
            match CollectionProtocol::parse(&raw) {
                Some(protocol) => config.protocol = protocol,
                None => warn!(
                    "Unknown PAGELENS_PROTOCOL '{}', using {}",
                    raw,
                    config.protocol.as_str()
                ),
            }
        }

        config.target_url = lookup("PAGELENS_TARGET_URL")
            .map(|raw| raw.trim().to_string())
            .filter(|url| !url.is_empty());

        if let Some(filter) = lookup("PAGELENS_LOG").filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }

        config
    }
}
