use async_trait::async_trait;
use url::Url;

use super::cache::{ComputedFact, FactKind, FactValue};
use super::network_records::NetworkRecords;
use crate::artifacts::DevtoolsLog;
use crate::error::FactError;
use crate::network::{NetworkRecord, ResourceType};
use crate::run::{RunContext, RunMode};

#[derive(Debug, Clone, PartialEq)]
pub enum MainResourceStatus {
    Found(NetworkRecord),
    /// Timespan runs need not load a document; consumers treat this as unscored.
    NotApplicable { reason: String },
}

impl MainResourceStatus {
    pub fn record(&self) -> Option<&NetworkRecord> {
        match self {
            MainResourceStatus::Found(record) => Some(record),
            MainResourceStatus::NotApplicable { .. } => None,
        }
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self, MainResourceStatus::NotApplicable { .. })
    }
}

/// The top-level document request for the run's target URL.
///
/// Only `Document` records that did not fail qualify, and when the log names the
/// top-level frame, only records loaded in it.
pub struct MainResource;

#[async_trait]
impl ComputedFact for MainResource {
    type Input = DevtoolsLog;
    type Output = MainResourceStatus;

    const KIND: FactKind = FactKind::MainResource;

    async fn compute(log: &DevtoolsLog, ctx: &RunContext) -> Result<Self::Output, FactError> {
        let records = NetworkRecords::request(log, ctx).await?;
        let target = without_fragment(ctx.target_url());
        let main_frame = main_frame_id(log);

        let found = records.iter().find(|record| {
            record.resource_type == ResourceType::Document
                && !record.failed
                && in_frame(record, main_frame)
                && without_fragment(&record.url) == target
        });

        match (found, ctx.mode()) {
            (Some(record), _) => Ok(MainResourceStatus::Found(record.clone())),
            (None, RunMode::Navigation) => Err(FactError::MainResourceNotFound {
                url: ctx.target_url().to_string(),
            }),
            (None, RunMode::Timespan) => Ok(MainResourceStatus::NotApplicable {
                reason: format!("No main document request for {} in this timespan", ctx.target_url()),
            }),
        }
    }

    fn into_value(output: Self::Output) -> FactValue {
        FactValue::MainResource(output)
    }

    fn from_value(value: &FactValue) -> Option<Self::Output> {
        match value {
            FactValue::MainResource(status) => Some(status.clone()),
            _ => None,
        }
    }
}

/// Top-level frame of the session, when the log carries its navigation.
fn main_frame_id(log: &DevtoolsLog) -> Option<&str> {
    log.messages()
        .iter()
        .filter(|m| m.method == "Page.frameNavigated")
        .find(|m| m.params.pointer("/frame/parentId").is_none())
        .and_then(|m| m.param_str("/frame/id"))
}

/// Records without a frame id are kept; they cannot be placed in a subframe.
fn in_frame(record: &NetworkRecord, main_frame: Option<&str>) -> bool {
    match (main_frame, record.frame_id.as_deref()) {
        (Some(main), Some(frame)) => main == frame,
        _ => true,
    }
}

fn without_fragment(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.into()
        }
        Err(_) => raw.split('#').next().unwrap_or(raw).to_string(),
    }
}
