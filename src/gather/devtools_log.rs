use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use super::buffer::SharedEventBuffer;
use super::lifecycle::{CollectionProtocol, Dependencies, Lifecycle, Phase, WindowCollector};
use crate::artifacts::DevtoolsLog;
use crate::error::{GatherError, LifecycleError};
use crate::protocol::{ListenerId, ProtocolMessage, Transport, ALL_EVENTS};
use crate::run::RunContext;

const ENABLE_COMMANDS: [&str; 2] = ["Page.enable", "Network.enable"];

/// Records every protocol message of the window, the input of `NetworkRecords`.
#[derive(Debug)]
pub struct DevtoolsLogCollector {
    lifecycle: Lifecycle,
    buffer: SharedEventBuffer<ProtocolMessage>,
    listener: Option<ListenerId>,
}

impl Default for DevtoolsLogCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl DevtoolsLogCollector {
    pub const NAME: &'static str = "DevtoolsLog";

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

    fn unsubscribe(&mut self, transport: &dyn Transport) {
        if let Some(id) = self.listener.take() {
            transport.off(ALL_EVENTS, id);
        }
    }

    /// Tears down an unfinished recording after a failed run. Sends no commands.
    pub fn abort(&mut self, transport: &dyn Transport) {
        self.unsubscribe(transport);
        self.buffer.abandon();
        if self.lifecycle.abort() {
            warn!("[{}] aborted for this run", Self::NAME);
        }
    }
}

#[async_trait]
impl WindowCollector for DevtoolsLogCollector {
    type Artifact = DevtoolsLog;

    async fn start_instrumentation(&mut self, ctx: &RunContext) -> Result<(), GatherError> {
        self.lifecycle.expect(
            CollectionProtocol::Window,
            "start_instrumentation",
            Phase::Idle,
        )?;
        self.buffer.open()?;

        let buffer = self.buffer.clone();
        self.listener = Some(ctx.transport().on(
            ALL_EVENTS,
            Arc::new(move |message: &ProtocolMessage| {
                buffer.record(message.clone());
            }),
        ));

        for method in ENABLE_COMMANDS {
            if let Err(e) = ctx.transport().send_command(method, json!({})).await {
                self.unsubscribe(ctx.transport());
                self.buffer.abandon();
                return Err(e.into());
            }
        }

        self.lifecycle
            .enter(CollectionProtocol::Window, Phase::Instrumenting);
        info!("[{}] recording started for run {}", Self::NAME, ctx.run_id());
        Ok(())
    }

    async fn stop_instrumentation(&mut self, ctx: &RunContext) -> Result<(), GatherError> {
        self.lifecycle.expect(
            CollectionProtocol::Window,
            "stop_instrumentation",
            Phase::Instrumenting,
        )?;
        self.unsubscribe(ctx.transport());
        let messages = self.buffer.close()?;
        self.lifecycle.enter(CollectionProtocol::Window, Phase::Stopped);
        info!("[{}] recorded {} message(s)", Self::NAME, messages.len());
        Ok(())
    }

    async fn produce_artifact(
        &mut self,
        _ctx: &RunContext,
        _deps: &Dependencies,
    ) -> Result<DevtoolsLog, GatherError> {
        self.lifecycle.expect(
            CollectionProtocol::Window,
            "produce_artifact",
            Phase::Stopped,
        )?;
        let messages = self.buffer.frozen().ok_or(LifecycleError::BufferNotOpen)?;
        self.lifecycle
            .enter(CollectionProtocol::Window, Phase::Finalized);
        Ok(DevtoolsLog::new(messages))
    }
}
