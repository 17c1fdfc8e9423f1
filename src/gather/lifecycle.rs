use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::artifacts::DevtoolsLog;
use crate::error::{GatherError, LifecycleError};
use crate::network::NetworkRecord;
use crate::protocol::ProtocolMessage;
use crate::run::RunContext;

/// Which protocol the embedding orchestrator drives collectors with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionProtocol {
    /// before / during / after window, network records handed in directly.
    Legacy,
    /// start / stop instrumentation, then produce from resolved dependencies.
    #[default]
    Window,
}

impl CollectionProtocol {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "legacy" => Some(CollectionProtocol::Legacy),
            "window" => Some(CollectionProtocol::Window),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionProtocol::Legacy => "legacy",
            CollectionProtocol::Window => "window",
        }
    }
}

/// What the legacy finalization phase receives from its caller.
#[derive(Debug, Clone, Copy)]
pub struct LoadData<'a> {
    pub network_records: &'a [NetworkRecord],
    pub event_log: &'a [ProtocolMessage],
}

/// Artifacts resolved from the run's dependency graph for the window protocol.
#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    pub devtools_log: Option<Arc<DevtoolsLog>>,
}

#[async_trait]
pub trait LegacyCollector: Send {
    type Artifact: Send;

    async fn before_window(&mut self, ctx: &RunContext) -> Result<(), GatherError>;

    async fn during_window(&mut self, ctx: &RunContext) -> Result<(), GatherError>;

    async fn after_window(
        &mut self,
        ctx: &RunContext,
        load: LoadData<'_>,
    ) -> Result<Self::Artifact, GatherError>;
}

#[async_trait]
pub trait WindowCollector: Send {
    type Artifact: Send;

    async fn start_instrumentation(&mut self, ctx: &RunContext) -> Result<(), GatherError>;

    async fn stop_instrumentation(&mut self, ctx: &RunContext) -> Result<(), GatherError>;

    async fn produce_artifact(
        &mut self,
        ctx: &RunContext,
        deps: &Dependencies,
    ) -> Result<Self::Artifact, GatherError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Instrumenting,
    /// Legacy only: the navigation/activity phase has been reported.
    Observed,
    /// Window only: instrumentation stopped, artifact not yet produced.
    Stopped,
    Finalized,
    /// Torn down after a failed run; every later call is refused.
    Aborted,
}

impl Phase {
    fn describe(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Instrumenting => "instrumenting",
            Phase::Observed => "observed",
            Phase::Stopped => "stopped",
            Phase::Finalized => "finalized",
            Phase::Aborted => "aborted",
        }
    }
}

/// Phase bookkeeping for one collector instance.
///
/// The first call pins the protocol; calls from the other protocol are refused.
#[derive(Debug)]
pub struct Lifecycle {
    collector: &'static str,
    protocol: Option<CollectionProtocol>,
    phase: Phase,
}

impl Lifecycle {
    pub fn new(collector: &'static str) -> Self {
        Self {
            collector,
            protocol: None,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn protocol(&self) -> Option<CollectionProtocol> {
        self.protocol
    }

    /// Fails unless `method` of `protocol` may run now.
    pub fn expect(
        &self,
        protocol: CollectionProtocol,
        method: &'static str,
        expected: Phase,
    ) -> Result<(), LifecycleError> {
        if let Some(active) = self.protocol {
            if active != protocol {
                return Err(LifecycleError::ProtocolMixed {
                    collector: self.collector,
                    active: active.as_str(),
                    method,
                });
            }
        }
        if self.phase != expected {
            return Err(LifecycleError::OutOfOrder {
                collector: self.collector,
                method,
                phase: self.phase.describe(),
            });
        }
        Ok(())
    }

    /// Moves an unfinished collector to `Aborted`. Returns whether it was unfinished.
    pub fn abort(&mut self) -> bool {
        match self.phase {
            Phase::Finalized | Phase::Aborted => false,
            _ => {
                self.phase = Phase::Aborted;
                true
            }
        }
    }

    /// Commits a transition checked by [`Lifecycle::expect`].
    pub fn enter(&mut self, protocol: CollectionProtocol, next: Phase) {
        self.protocol = Some(protocol);
        self.phase = next;
    }
}
