use std::future::Future;
use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use super::context::RunContext;
use crate::artifacts::Artifact;
use crate::computed::{ComputedFact, NetworkRecords};
use crate::error::GatherError;
use crate::gather::{
    CollectionProtocol, Dependencies, DevtoolsLogCollector, InspectorIssuesCollector,
    LegacyCollector, LoadData, WindowCollector,
};

/// Drives one run's collectors through the selected protocol.
#[derive(Debug, Clone, Copy)]
pub struct Orchestrator {
    protocol: CollectionProtocol,
}

impl Orchestrator {
    pub fn new(protocol: CollectionProtocol) -> Self {
        Self { protocol }
    }

    pub fn protocol(&self) -> CollectionProtocol {
        self.protocol
    }

    /// Runs `activity` inside the instrumentation window and stores the raw artifacts.
    ///
    /// Any error propagates unchanged; nothing is retried here.
    pub async fn collect<A, Fut>(&self, ctx: &RunContext, activity: A) -> Result<(), GatherError>
    where
        A: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), GatherError>>,
    {
        let span = info_span!("collect", run = %ctx.run_id(), protocol = self.protocol.as_str());
        async {
            match self.protocol {
                CollectionProtocol::Legacy => Self::collect_legacy(ctx, activity).await,
                CollectionProtocol::Window => Self::collect_window(ctx, activity).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn collect_legacy<A, Fut>(ctx: &RunContext, activity: A) -> Result<(), GatherError>
    where
        A: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), GatherError>>,
    {
        let mut devtools = DevtoolsLogCollector::new();
        let mut issues = InspectorIssuesCollector::new();

        let result = Self::run_legacy(ctx, &mut devtools, &mut issues, activity).await;
        if result.is_err() {
            Self::abort(ctx, &mut devtools, &mut issues);
        }
        result
    }

    async fn run_legacy<A, Fut>(
        ctx: &RunContext,
        devtools: &mut DevtoolsLogCollector,
        issues: &mut InspectorIssuesCollector,
        activity: A,
    ) -> Result<(), GatherError>
    where
        A: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), GatherError>>,
    {
        // === 1. SETUP ===
        devtools.start_instrumentation(ctx).await?;
        issues.before_window(ctx).await?;

        // === 2. ACTIVITY ===
        activity().await?;
        issues.during_window(ctx).await?;

        // === 3. FINALIZE (the driver hands over finalized records) ===
        devtools.stop_instrumentation(ctx).await?;
        let log = Arc::new(devtools.produce_artifact(ctx, &Dependencies::default()).await?);
        let records = NetworkRecords::request(log.as_ref(), ctx).await?;
        let load = LoadData {
            network_records: &records,
            event_log: log.messages(),
        };
        let artifact = issues.after_window(ctx, load).await?;

        ctx.artifacts().insert(Artifact::DevtoolsLog(log))?;
        ctx.artifacts()
            .insert(Artifact::InspectorIssues(Arc::new(artifact)))?;
        info!("Legacy collection finished");
        Ok(())
    }

    async fn collect_window<A, Fut>(ctx: &RunContext, activity: A) -> Result<(), GatherError>
    where
        A: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), GatherError>>,
    {
        let mut devtools = DevtoolsLogCollector::new();
        let mut issues = InspectorIssuesCollector::new();

        let result = Self::run_window(ctx, &mut devtools, &mut issues, activity).await;
        if result.is_err() {
            Self::abort(ctx, &mut devtools, &mut issues);
        }
        result
    }

    async fn run_window<A, Fut>(
        ctx: &RunContext,
        devtools: &mut DevtoolsLogCollector,
        issues: &mut InspectorIssuesCollector,
        activity: A,
    ) -> Result<(), GatherError>
    where
        A: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), GatherError>>,
    {
        // === 1. START ===
        devtools.start_instrumentation(ctx).await?;
        issues.start_instrumentation(ctx).await?;

        // === 2. ACTIVITY ===
        activity().await?;

        // === 3. STOP ===
        issues.stop_instrumentation(ctx).await?;
        devtools.stop_instrumentation(ctx).await?;

        // === 4. PRODUCE (dependencies first) ===
        let log = Arc::new(devtools.produce_artifact(ctx, &Dependencies::default()).await?);
        ctx.artifacts().insert(Artifact::DevtoolsLog(log.clone()))?;

        let deps = Dependencies {
            devtools_log: Some(log),
        };
        let artifact = issues.produce_artifact(ctx, &deps).await?;
        ctx.artifacts()
            .insert(Artifact::InspectorIssues(Arc::new(artifact)))?;
        info!("Window collection finished");
        Ok(())
    }

    /// No listener or open buffer may outlive a failed run.
    fn abort(
        ctx: &RunContext,
        devtools: &mut DevtoolsLogCollector,
        issues: &mut InspectorIssuesCollector,
    ) {
        issues.abort(ctx.transport());
        devtools.abort(ctx.transport());
    }
}
