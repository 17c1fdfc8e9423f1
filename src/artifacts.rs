//! Raw artifacts: named, immutable results produced once per run by a collector.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Serialize, Serializer};
use tracing::info;

use crate::error::GatherError;
use crate::gather::InspectorIssues;
use crate::protocol::ProtocolMessage;

/// Every protocol message observed during the window, in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub struct DevtoolsLog {
    messages: Arc<[ProtocolMessage]>,
}

impl DevtoolsLog {
    pub fn new(messages: impl Into<Arc<[ProtocolMessage]>>) -> Self {
        Self {
            messages: messages.into(),
        }
    }

    pub fn messages(&self) -> &[ProtocolMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Serialize for DevtoolsLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.messages.iter())
    }
}

#[derive(Debug, Clone)]
pub enum Artifact {
    DevtoolsLog(Arc<DevtoolsLog>),
    InspectorIssues(Arc<InspectorIssues>),
}

impl Artifact {
    pub fn name(&self) -> &'static str {
        match self {
            Artifact::DevtoolsLog(_) => "DevtoolsLog",
            Artifact::InspectorIssues(_) => "InspectorIssues",
        }
    }
}

/// Run-scoped artifact mapping. Each name is written once.
#[derive(Debug, Default)]
pub struct ArtifactMap {
    artifacts: Mutex<BTreeMap<&'static str, Artifact>>,
}

impl ArtifactMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<&'static str, Artifact>> {
        self.artifacts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, artifact: Artifact) -> Result<(), GatherError> {
        let name = artifact.name();
        let mut artifacts = self.lock();
        if artifacts.contains_key(name) {
            return Err(GatherError::DuplicateArtifact(name));
        }
        artifacts.insert(name, artifact);
        info!("Stored artifact {}", name);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Artifact> {
        self.lock().get(name).cloned()
    }

    pub fn devtools_log(&self) -> Option<Arc<DevtoolsLog>> {
        match self.get("DevtoolsLog")? {
            Artifact::DevtoolsLog(log) => Some(log),
            _ => None,
        }
    }

    pub fn inspector_issues(&self) -> Option<Arc<InspectorIssues>> {
        match self.get("InspectorIssues")? {
            Artifact::InspectorIssues(issues) => Some(issues),
            _ => None,
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.lock().keys().copied().collect()
    }
}
