#![allow(dead_code)]

use std::sync::Arc;

use pagelens::protocol::{ProtocolMessage, ScriptedTransport};
use pagelens::{RunContext, RunMode};
use serde_json::{json, Value};

pub const PAGE_URL: &str = "https://example.com/";

pub fn run_context(mode: RunMode) -> (Arc<ScriptedTransport>, RunContext) {
    let transport = Arc::new(ScriptedTransport::new());
    let ctx = RunContext::new(mode, PAGE_URL, transport.clone());
    (transport, ctx)
}

pub fn request_will_be_sent(id: &str, url: &str, resource_type: &str) -> ProtocolMessage {
    ProtocolMessage::new(
        "Network.requestWillBeSent",
        json!({
            "requestId": id,
            "type": resource_type,
            "documentURL": PAGE_URL,
            "frameId": "main",
            "request": { "url": url, "method": "GET" },
        }),
    )
}

pub fn redirect(id: &str, url: &str, status: u16) -> ProtocolMessage {
    ProtocolMessage::new(
        "Network.requestWillBeSent",
        json!({
            "requestId": id,
            "type": "Document",
            "request": { "url": url, "method": "GET" },
            "redirectResponse": { "status": status },
        }),
    )
}

pub fn response_received(id: &str, status: u16, mime_type: &str) -> ProtocolMessage {
    ProtocolMessage::new(
        "Network.responseReceived",
        json!({ "requestId": id, "response": { "status": status, "mimeType": mime_type } }),
    )
}

pub fn loading_finished(id: &str) -> ProtocolMessage {
    ProtocolMessage::new("Network.loadingFinished", json!({ "requestId": id }))
}

pub fn loading_failed(id: &str) -> ProtocolMessage {
    ProtocolMessage::new(
        "Network.loadingFailed",
        json!({ "requestId": id, "errorText": "net::ERR_FAILED" }),
    )
}

pub fn issue(code: &str, details_key: &str, details: Value) -> ProtocolMessage {
    ProtocolMessage::new(
        "Audits.issueAdded",
        json!({ "issue": { "code": code, "details": { details_key: details } } }),
    )
}

pub fn mixed_content_details(request_id: &str) -> Value {
    json!({
        "resolutionStatus": "MixedContentBlocked",
        "insecureURL": format!("http://example.com/{}.js", request_id),
        "mainResourceURL": PAGE_URL,
        "request": { "requestId": request_id, "url": format!("http://example.com/{}.js", request_id) },
    })
}

pub fn mixed_content_issue(request_id: &str) -> ProtocolMessage {
    issue(
        "MixedContentIssue",
        "mixedContentIssueDetails",
        mixed_content_details(request_id),
    )
}

pub fn heavy_ad_details() -> Value {
    json!({ "resolution": "HeavyAdBlocked", "reason": "NetworkTotalLimit", "frame": { "frameId": "ad" } })
}

pub fn heavy_ad_issue() -> ProtocolMessage {
    issue("HeavyAdIssue", "heavyAdIssueDetails", heavy_ad_details())
}

pub fn cookie_issue(request_id: &str) -> ProtocolMessage {
    issue(
        "CookieIssue",
        "cookieIssueDetails",
        json!({
            "cookieWarningReasons": ["WarnSameSiteUnspecifiedCrossSiteContext"],
            "operation": "SetCookie",
            "request": { "requestId": request_id, "url": "https://third.party/pixel" },
        }),
    )
}

/// A page load with three requests, one of them never observed, and a mix of issues.
pub fn recorded_session() -> Vec<ProtocolMessage> {
    vec![
        request_will_be_sent("1", PAGE_URL, "Document"),
        response_received("1", 200, "text/html"),
        mixed_content_issue("1"),
        request_will_be_sent("3", "https://third.party/pixel", "Image"),
        heavy_ad_issue(),
        mixed_content_issue("2"),
        cookie_issue("3"),
        issue(
            "ContentSecurityPolicyIssue",
            "contentSecurityPolicyIssueDetails",
            json!({ "violatedDirective": "script-src", "isReportOnly": false }),
        ),
        issue("SomeFutureIssue", "someFutureIssueDetails", json!({})),
        loading_finished("1"),
        loading_finished("3"),
    ]
}
