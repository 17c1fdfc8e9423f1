mod support;

use std::sync::Arc;

use pagelens::artifacts::DevtoolsLog;
use pagelens::gather::{
    Dependencies, DevtoolsLogCollector, InspectorIssuesCollector, IssueCategory, LegacyCollector,
    LoadData, Phase, WindowCollector,
};
use pagelens::network::{NetworkRecord, ResourceType};
use pagelens::protocol::ProtocolMessage;
use pagelens::{FactError, GatherError, LifecycleError, RunMode, TransportError};
use support::*;

#[tokio::test]
async fn test_stop_before_start_is_lifecycle_error() {
    let (_transport, ctx) = run_context(RunMode::Navigation);
    let mut collector = InspectorIssuesCollector::new();

    let err = collector.stop_instrumentation(&ctx).await.unwrap_err();
    assert!(
        matches!(
            err,
            GatherError::Lifecycle(LifecycleError::OutOfOrder { method: "stop_instrumentation", phase: "idle", .. })
        ),
        "got {:?}",
        err
    );
    assert_eq!(collector.phase(), Phase::Idle);
}

#[tokio::test]
async fn test_produce_before_stop_is_lifecycle_error() {
    let (_transport, ctx) = run_context(RunMode::Navigation);
    let mut collector = InspectorIssuesCollector::new();
    collector.start_instrumentation(&ctx).await.unwrap();

    let err = collector
        .produce_artifact(&ctx, &Dependencies::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatherError::Lifecycle(LifecycleError::OutOfOrder { phase: "instrumenting", .. })
    ));
}

#[tokio::test]
async fn test_legacy_finalize_requires_during_phase() {
    let (_transport, ctx) = run_context(RunMode::Navigation);
    let mut collector = InspectorIssuesCollector::new();
    collector.before_window(&ctx).await.unwrap();

    let load = LoadData {
        network_records: &[],
        event_log: &[],
    };
    let err = collector.after_window(&ctx, load).await.unwrap_err();
    assert!(matches!(
        err,
        GatherError::Lifecycle(LifecycleError::OutOfOrder { method: "after_window", .. })
    ));
}

#[tokio::test]
async fn test_protocols_cannot_be_mixed() {
    let (_transport, ctx) = run_context(RunMode::Navigation);
    let mut collector = InspectorIssuesCollector::new();
    collector.start_instrumentation(&ctx).await.unwrap();

    let err = collector.during_window(&ctx).await.unwrap_err();
    assert!(matches!(
        err,
        GatherError::Lifecycle(LifecycleError::ProtocolMixed { active: "window", method: "during_window", .. })
    ));
}

#[tokio::test]
async fn test_finalized_collector_refuses_restart() {
    let (transport, ctx) = run_context(RunMode::Navigation);
    let mut collector = InspectorIssuesCollector::new();

    collector.before_window(&ctx).await.unwrap();
    collector.during_window(&ctx).await.unwrap();
    let load = LoadData {
        network_records: &[],
        event_log: &[],
    };
    collector.after_window(&ctx, load).await.unwrap();
    assert_eq!(collector.phase(), Phase::Finalized);

    assert!(collector.before_window(&ctx).await.is_err());
    assert_eq!(
        transport.sent_commands(),
        vec!["Audits.enable".to_string(), "Audits.disable".to_string()]
    );
}

#[tokio::test]
async fn test_enable_rejection_propagates_and_unsubscribes() {
    let (transport, ctx) = run_context(RunMode::Navigation);
    transport.reject("Audits.enable", "Audits domain unavailable");
    let mut collector = InspectorIssuesCollector::new();

    let err = collector.start_instrumentation(&ctx).await.unwrap_err();

    assert!(matches!(
        err,
        GatherError::Transport(TransportError::CommandRejected { ref method, .. }) if method == "Audits.enable"
    ));
    assert_eq!(transport.listener_count(), 0);
    assert_eq!(collector.phase(), Phase::Idle);
}

#[tokio::test]
async fn test_failed_enable_allows_clean_restart() {
    let (transport, ctx) = run_context(RunMode::Navigation);
    transport.reject("Audits.enable", "Audits domain unavailable");
    let mut collector = InspectorIssuesCollector::new();

    assert!(collector.start_instrumentation(&ctx).await.is_err());
    transport.emit(heavy_ad_issue());

    transport.allow("Audits.enable");
    collector
        .start_instrumentation(&ctx)
        .await
        .expect("restart after a rejected enable");
    transport.emit(heavy_ad_issue());
    collector.stop_instrumentation(&ctx).await.unwrap();

    let deps = Dependencies {
        devtools_log: Some(Arc::new(DevtoolsLog::new(Vec::<ProtocolMessage>::new()))),
    };
    let issues = collector.produce_artifact(&ctx, &deps).await.unwrap();
    assert_eq!(issues.get(IssueCategory::HeavyAd).len(), 1);
}

#[tokio::test]
async fn test_devtools_failed_enable_allows_clean_restart() {
    let (transport, ctx) = run_context(RunMode::Navigation);
    transport.reject("Network.enable", "Network domain unavailable");
    let mut collector = DevtoolsLogCollector::new();

    assert!(collector.start_instrumentation(&ctx).await.is_err());
    assert_eq!(transport.listener_count(), 0);

    transport.allow("Network.enable");
    collector.start_instrumentation(&ctx).await.unwrap();
    assert_eq!(collector.phase(), Phase::Instrumenting);
}

#[tokio::test]
async fn test_abort_releases_listener_and_refuses_later_calls() {
    let (transport, ctx) = run_context(RunMode::Navigation);
    let mut issues = InspectorIssuesCollector::new();
    let mut devtools = DevtoolsLogCollector::new();
    devtools.start_instrumentation(&ctx).await.unwrap();
    issues.start_instrumentation(&ctx).await.unwrap();
    transport.emit(heavy_ad_issue());
    assert_eq!(transport.listener_count(), 2);

    issues.abort(ctx.transport());
    devtools.abort(ctx.transport());

    assert_eq!(transport.listener_count(), 0);
    assert_eq!(issues.phase(), Phase::Aborted);
    assert_eq!(devtools.phase(), Phase::Aborted);
    assert_eq!(issues.discarded(), 1, "the buffered issue is dropped");

    let err = issues.stop_instrumentation(&ctx).await.unwrap_err();
    assert!(matches!(
        err,
        GatherError::Lifecycle(LifecycleError::OutOfOrder { phase: "aborted", .. })
    ));
    // Aborting never talks to the transport.
    assert_eq!(
        transport.sent_commands(),
        vec![
            "Page.enable".to_string(),
            "Network.enable".to_string(),
            "Audits.enable".to_string()
        ]
    );
}

#[tokio::test]
async fn test_closed_connection_propagates() {
    let (transport, ctx) = run_context(RunMode::Navigation);
    transport.close();
    let mut collector = DevtoolsLogCollector::new();

    let err = collector.start_instrumentation(&ctx).await.unwrap_err();
    assert!(matches!(err, GatherError::Transport(TransportError::ConnectionClosed)));
    assert_eq!(transport.listener_count(), 0);
}

#[tokio::test]
async fn test_events_outside_window_are_ignored() {
    let (transport, ctx) = run_context(RunMode::Navigation);
    let mut collector = InspectorIssuesCollector::new();

    transport.emit(heavy_ad_issue()); // before start
    collector.start_instrumentation(&ctx).await.unwrap();
    transport.emit(heavy_ad_issue());
    collector.stop_instrumentation(&ctx).await.unwrap();
    transport.emit(heavy_ad_issue()); // after stop
    assert_eq!(transport.listener_count(), 0);

    let log = Arc::new(DevtoolsLog::new(Vec::<ProtocolMessage>::new()));
    let deps = Dependencies {
        devtools_log: Some(log),
    };
    let issues = collector.produce_artifact(&ctx, &deps).await.unwrap();

    assert_eq!(issues.get(IssueCategory::HeavyAd).len(), 1);
}

#[tokio::test]
async fn test_window_produce_needs_devtools_log() {
    let (_transport, ctx) = run_context(RunMode::Navigation);
    let mut collector = InspectorIssuesCollector::new();
    collector.start_instrumentation(&ctx).await.unwrap();
    collector.stop_instrumentation(&ctx).await.unwrap();

    let err = collector
        .produce_artifact(&ctx, &Dependencies::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatherError::Fact(FactError::MissingDependency("DevtoolsLog"))
    ));
}

#[tokio::test]
async fn test_legacy_uses_supplied_records() {
    let (transport, ctx) = run_context(RunMode::Navigation);
    let mut collector = InspectorIssuesCollector::new();

    collector.before_window(&ctx).await.unwrap();
    transport.emit_all(vec![mixed_content_issue("1"), mixed_content_issue("2")]);
    collector.during_window(&ctx).await.unwrap();

    let records = vec![NetworkRecord::new(
        "2",
        "http://example.com/2.js",
        ResourceType::Script,
    )];
    let load = LoadData {
        network_records: &records,
        event_log: &[],
    };
    let issues = collector.after_window(&ctx, load).await.unwrap();

    let mixed = issues.get(IssueCategory::MixedContent);
    assert_eq!(mixed.len(), 1);
    assert_eq!(mixed[0]["request"]["requestId"], "2");
}

#[tokio::test]
async fn test_devtools_log_records_everything_in_order() {
    let (transport, ctx) = run_context(RunMode::Navigation);
    let mut collector = DevtoolsLogCollector::new();

    collector.start_instrumentation(&ctx).await.unwrap();
    let session = recorded_session();
    transport.emit_all(session.clone());
    collector.stop_instrumentation(&ctx).await.unwrap();
    let log = collector
        .produce_artifact(&ctx, &Dependencies::default())
        .await
        .unwrap();

    assert_eq!(log.messages(), &session[..]);
    assert_eq!(
        transport.sent_commands(),
        vec!["Page.enable".to_string(), "Network.enable".to_string()]
    );
    assert_eq!(collector.phase(), Phase::Finalized);
}
