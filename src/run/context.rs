use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::artifacts::ArtifactMap;
use crate::computed::ComputedFactCache;
use crate::protocol::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Collection spans a page load of `target_url`.
    #[default]
    Navigation,
    /// Collection spans arbitrary user activity; there may be no main document.
    Timespan,
}

impl RunMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "navigation" => Some(RunMode::Navigation),
            "timespan" => Some(RunMode::Timespan),
            _ => None,
        }
    }
}

/// Everything one run owns. Dropping it discards the artifacts and the fact cache.
pub struct RunContext {
    run_id: Uuid,
    mode: RunMode,
    target_url: String,
    transport: Arc<dyn Transport>,
    artifacts: ArtifactMap,
    cache: ComputedFactCache,
}

impl RunContext {
    pub fn new(mode: RunMode, target_url: &str, transport: Arc<dyn Transport>) -> Self {
        let run_id = Uuid::new_v4();
        debug!("Run {} created ({:?}, {})", run_id, mode, target_url);
        Self {
            run_id,
            mode,
            target_url: target_url.to_string(),
            transport,
            artifacts: ArtifactMap::new(),
            cache: ComputedFactCache::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn artifacts(&self) -> &ArtifactMap {
        &self.artifacts
    }

    pub fn cache(&self) -> &ComputedFactCache {
        &self.cache
    }
}

impl Drop for RunContext {
    fn drop(&mut self) {
        debug!(
            "Run {} torn down, discarding {} computed fact(s)",
            self.run_id,
            self.cache.len()
        );
    }
}
