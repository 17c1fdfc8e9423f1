use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use super::buffer::SharedEventBuffer;
use super::event::{ProtocolEvent, ISSUE_ADDED};
use super::lifecycle::{
    CollectionProtocol, Dependencies, LegacyCollector, Lifecycle, LoadData, Phase, WindowCollector,
};
use super::reconciler::{InspectorIssues, IssueReconciler};
use crate::computed::{ComputedFact, NetworkRecords};
use crate::error::{FactError, GatherError, LifecycleError};
use crate::network::{NetworkRecord, NetworkRecordIndex};
use crate::protocol::{ListenerId, ProtocolMessage, Transport};
use crate::run::RunContext;

/// Collects inspector issues under either collection protocol.
///
/// Only this type knows which protocol is driving it. The buffer and the reconciler
/// behave the same either way, so equivalent sessions give equal artifacts.
#[derive(Debug)]
pub struct InspectorIssuesCollector {
    lifecycle: Lifecycle,
    buffer: SharedEventBuffer<ProtocolEvent>,
    listener: Option<ListenerId>,
}

impl Default for InspectorIssuesCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl InspectorIssuesCollector {
    pub const NAME: &'static str = "InspectorIssues";

    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::new(Self::NAME),
            buffer: SharedEventBuffer::new(),
            listener: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    /// Issues delivered outside the window and ignored.
    pub fn discarded(&self) -> usize {
        self.buffer.discarded()
    }

    async fn open_window(&mut self, transport: &dyn Transport) -> Result<(), GatherError> {
        self.buffer.open()?;

        let buffer = self.buffer.clone();
        let id = transport.on(
            ISSUE_ADDED,
            Arc::new(move |message: &ProtocolMessage| {
                if let Some(event) = ProtocolEvent::from_message(message) {
                    buffer.record(event);
                }
            }),
        );
        self.listener = Some(id);

        if let Err(e) = transport.send_command("Audits.enable", json!({})).await {
            self.release(transport);
            return Err(e.into());
        }
        Ok(())
    }

    /// Unsubscribes and drops an open window, leaving the buffer ready to open again.
    fn release(&mut self, transport: &dyn Transport) {
        if let Some(id) = self.listener.take() {
            transport.off(ISSUE_ADDED, id);
        }
        self.buffer.abandon();
    }

    /// Tears down an unfinished collector after a failed run. Sends no commands.
    pub fn abort(&mut self, transport: &dyn Transport) {
        self.release(transport);
        if self.lifecycle.abort() {
            warn!("[{}] aborted, {} event(s) dropped", Self::NAME, self.buffer.discarded());
        }
    }

    async fn close_window(
        &mut self,
        transport: &dyn Transport,
    ) -> Result<Arc<[ProtocolEvent]>, GatherError> {
        if let Some(id) = self.listener.take() {
            transport.off(ISSUE_ADDED, id);
        }
        let events = self.buffer.close()?;
        transport.send_command("Audits.disable", json!({})).await?;
        debug!("Issue window closed with {} event(s)", events.len());
        Ok(events)
    }

    fn reconcile(events: &[ProtocolEvent], records: &[NetworkRecord]) -> InspectorIssues {
        let index = NetworkRecordIndex::build(records);
        IssueReconciler::reconcile(events, &index)
    }
}

#[async_trait]
impl LegacyCollector for InspectorIssuesCollector {
    type Artifact = InspectorIssues;

    async fn before_window(&mut self, ctx: &RunContext) -> Result<(), GatherError> {
        self.lifecycle
            .expect(CollectionProtocol::Legacy, "before_window", Phase::Idle)?;
        self.open_window(ctx.transport()).await?;
        self.lifecycle
            .enter(CollectionProtocol::Legacy, Phase::Instrumenting);
        info!("[{}] legacy window opened for run {}", Self::NAME, ctx.run_id());
        Ok(())
    }

    async fn during_window(&mut self, _ctx: &RunContext) -> Result<(), GatherError> {
        self.lifecycle.expect(
            CollectionProtocol::Legacy,
            "during_window",
            Phase::Instrumenting,
        )?;
        self.lifecycle.enter(CollectionProtocol::Legacy, Phase::Observed);
        Ok(())
    }

    async fn after_window(
        &mut self,
        ctx: &RunContext,
        load: LoadData<'_>,
    ) -> Result<InspectorIssues, GatherError> {
        self.lifecycle
            .expect(CollectionProtocol::Legacy, "after_window", Phase::Observed)?;
        let events = self.close_window(ctx.transport()).await?;
        debug!(
            "Reconciling against {} network record(s), event log of {}",
            load.network_records.len(),
            load.event_log.len()
        );

        let issues = Self::reconcile(&events, load.network_records);
        self.lifecycle
            .enter(CollectionProtocol::Legacy, Phase::Finalized);
        info!("[{}] finalized with {} issue(s)", Self::NAME, issues.total());
        Ok(issues)
    }
}

#[async_trait]
impl WindowCollector for InspectorIssuesCollector {
    type Artifact = InspectorIssues;

    async fn start_instrumentation(&mut self, ctx: &RunContext) -> Result<(), GatherError> {
        self.lifecycle.expect(
            CollectionProtocol::Window,
            "start_instrumentation",
            Phase::Idle,
        )?;
        self.open_window(ctx.transport()).await?;
        self.lifecycle
            .enter(CollectionProtocol::Window, Phase::Instrumenting);
        info!("[{}] instrumentation started for run {}", Self::NAME, ctx.run_id());
        Ok(())
    }

    async fn stop_instrumentation(&mut self, ctx: &RunContext) -> Result<(), GatherError> {
        self.lifecycle.expect(
            CollectionProtocol::Window,
            "stop_instrumentation",
            Phase::Instrumenting,
        )?;
        self.close_window(ctx.transport()).await?;
        self.lifecycle.enter(CollectionProtocol::Window, Phase::Stopped);
        Ok(())
    }

    async fn produce_artifact(
        &mut self,
        ctx: &RunContext,
        deps: &Dependencies,
    ) -> Result<InspectorIssues, GatherError> {
        self.lifecycle.expect(
            CollectionProtocol::Window,
            "produce_artifact",
            Phase::Stopped,
        )?;
        let log = deps
            .devtools_log
            .as_ref()
            .ok_or(FactError::MissingDependency("DevtoolsLog"))?;
        let records = NetworkRecords::request(log.as_ref(), ctx).await?;
        let events = self.buffer.frozen().ok_or(LifecycleError::BufferNotOpen)?;

        let issues = Self::reconcile(&events, &records);
        self.lifecycle
            .enter(CollectionProtocol::Window, Phase::Finalized);
        info!("[{}] produced with {} issue(s)", Self::NAME, issues.total());
        Ok(issues)
    }
}
