use std::sync::Arc;

use async_trait::async_trait;

use super::cache::{ComputedFact, FactKind, FactValue};
use crate::artifacts::DevtoolsLog;
use crate::error::FactError;
use crate::network::{NetworkRecord, NetworkRecorder};
use crate::run::RunContext;

/// The run's finalized network records, derived from its devtools log.
pub struct NetworkRecords;

#[async_trait]
impl ComputedFact for NetworkRecords {
    type Input = DevtoolsLog;
    type Output = Arc<Vec<NetworkRecord>>;

    const KIND: FactKind = FactKind::NetworkRecords;

    async fn compute(log: &DevtoolsLog, _ctx: &RunContext) -> Result<Self::Output, FactError> {
        Ok(Arc::new(NetworkRecorder::records_from_log(log.messages())))
    }

    fn into_value(output: Self::Output) -> FactValue {
        FactValue::NetworkRecords(output)
    }

    fn from_value(value: &FactValue) -> Option<Self::Output> {
        match value {
            FactValue::NetworkRecords(records) => Some(records.clone()),
            _ => None,
        }
    }
}
