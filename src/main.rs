use std::sync::Arc;

use anyhow::{Context, Result};
use pagelens::config::GatherConfig;
use pagelens::protocol::{ProtocolMessage, ScriptedTransport};
use pagelens::{ComputedFact, MainResource, MainResourceStatus, Orchestrator, RunContext};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// First top-level document request in a recorded session.
fn first_document_url(messages: &[ProtocolMessage]) -> Option<String> {
    messages
        .iter()
        .filter(|m| m.method == "Network.requestWillBeSent")
        .find(|m| m.param_str("/type") == Some("Document"))
        .and_then(|m| m.param_str("/request/url"))
        .map(str::to_string)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatherConfig::from_env();

    // Initialize logging/tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: pagelens <session.json>")?;
    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading {}", path))?;
    let messages: Vec<ProtocolMessage> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path))?;

    let target_url = config
        .target_url
        .clone()
        .or_else(|| first_document_url(&messages))
        .unwrap_or_default();
    tracing::info!(
        "Replaying {} message(s) from {} ({:?}, {} protocol)",
        messages.len(),
        path,
        config.mode,
        config.protocol.as_str()
    );

    let transport = Arc::new(ScriptedTransport::new());
    let ctx = RunContext::new(config.mode, &target_url, transport.clone());

    Orchestrator::new(config.protocol)
        .collect(&ctx, move || async move {
            transport.emit_all(messages);
            Ok(())
        })
        .await?;

    let issues = ctx
        .artifacts()
        .inspector_issues()
        .context("InspectorIssues artifact missing after collection")?;
    let log = ctx
        .artifacts()
        .devtools_log()
        .context("DevtoolsLog artifact missing after collection")?;

    let main_resource = match MainResource::request(log.as_ref(), &ctx).await {
        Ok(MainResourceStatus::Found(record)) => json!({ "status": "found", "url": record.url }),
        Ok(MainResourceStatus::NotApplicable { reason }) => {
            json!({ "status": "notApplicable", "reason": reason })
        }
        Err(e) => json!({ "status": "error", "message": e.to_string() }),
    };

    let report = json!({
        "config": &config,
        "runId": ctx.run_id(),
        "mode": ctx.mode(),
        "targetUrl": ctx.target_url(),
        "inspectorIssues": issues.as_ref(),
        "mainResource": main_resource,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
