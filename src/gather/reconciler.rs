use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use tracing::debug;

use super::event::{IssueCategory, ProtocolEvent};
use crate::network::NetworkRecordIndex;

/// Finalized inspector issues, one ordered list per known category.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectorIssues {
    buckets: BTreeMap<IssueCategory, Vec<Value>>,
}

impl InspectorIssues {
    fn empty() -> Self {
        Self {
            buckets: IssueCategory::ALL
                .iter()
                .map(|category| (*category, Vec::new()))
                .collect(),
        }
    }

    pub fn get(&self, category: IssueCategory) -> &[Value] {
        self.buckets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IssueCategory, &[Value])> {
        self.buckets
            .iter()
            .map(|(category, issues)| (*category, issues.as_slice()))
    }
}

impl Serialize for InspectorIssues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (category, issues) in &self.buckets {
            map.serialize_entry(category.artifact_key(), issues)?;
        }
        map.end()
    }
}

pub struct IssueReconciler;

impl IssueReconciler {
    /// Pure function: buffered events + index -> categorized artifact.
    ///
    /// An event naming a request survives only if the run observed that request.
    /// Events with no request reference always pass. This filters, it does not dedupe.
    pub fn reconcile(events: &[ProtocolEvent], index: &NetworkRecordIndex) -> InspectorIssues {
        let mut issues = InspectorIssues::empty();
        let mut dropped = 0usize;

        for event in events {
            if let Some(request_id) = &event.request_ref {
                if index.lookup(request_id).is_none() {
                    dropped += 1;
                    continue;
                }
            }
            issues
                .buckets
                .entry(event.category)
                .or_default()
                .push(event.payload.clone());
        }

        if dropped > 0 {
            debug!(
                "Dropped {} issue(s) referencing requests outside the network records",
                dropped
            );
        }
        issues
    }
}
