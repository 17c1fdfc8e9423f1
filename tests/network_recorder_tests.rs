mod support;

use pagelens::network::{NetworkRecorder, ResourceType};
use pagelens::protocol::ProtocolMessage;
use serde_json::json;
use support::*;

#[test]
fn test_records_follow_first_seen_order() {
    let records = NetworkRecorder::records_from_log(&recorded_session());

    let ids: Vec<&str> = records.iter().map(|r| r.request_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);

    let document = &records[0];
    assert_eq!(document.resource_type, ResourceType::Document);
    assert_eq!(document.status_code, Some(200));
    assert_eq!(document.mime_type.as_deref(), Some("text/html"));
    assert_eq!(document.document_url.as_deref(), Some(PAGE_URL));
    assert_eq!(document.frame_id.as_deref(), Some("main"));
    assert!(document.finished);
    assert!(!document.failed);
}

#[test]
fn test_redirect_chain_gets_distinct_ids() {
    let log = vec![
        request_will_be_sent("7", "http://example.com/", "Document"),
        redirect("7", "https://example.com/", 301),
        redirect("7", "https://www.example.com/", 302),
        response_received("7", 200, "text/html"),
        loading_finished("7"),
    ];

    let records = NetworkRecorder::records_from_log(&log);

    let ids: Vec<&str> = records.iter().map(|r| r.request_id.as_str()).collect();
    assert_eq!(ids, vec!["7", "7:redirect", "7:redirect:redirect"]);
    assert_eq!(records[0].status_code, Some(301));
    assert_eq!(records[1].status_code, Some(302));
    assert_eq!(records[2].status_code, Some(200));
    assert!(records.iter().all(|r| r.finished));
    assert!(!records[0].from_redirect);
    assert!(records[1].from_redirect && records[2].from_redirect);
}

#[test]
fn test_loading_failed_marks_record() {
    let log = vec![
        request_will_be_sent("5", "https://example.com/api", "XHR"),
        loading_failed("5"),
    ];

    let records = NetworkRecorder::records_from_log(&log);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].resource_type, ResourceType::Xhr);
    assert!(records[0].finished);
    assert!(records[0].failed);
    assert_eq!(records[0].status_code, None);
}

#[test]
fn test_unknown_resource_type_is_other() {
    assert_eq!(ResourceType::from_protocol("Script"), ResourceType::Script);
    assert_eq!(
        ResourceType::from_protocol("CSPViolationReport"),
        ResourceType::CspViolationReport
    );
    assert_eq!(ResourceType::from_protocol("Hologram"), ResourceType::Other);
}

#[test]
fn test_messages_for_unknown_requests_are_ignored() {
    let log = vec![
        response_received("ghost", 404, "text/plain"),
        loading_finished("ghost"),
        ProtocolMessage::new("Network.requestWillBeSent", json!({ "type": "Document" })),
        ProtocolMessage::new("Page.frameNavigated", json!({ "frame": { "id": "main" } })),
    ];

    assert!(NetworkRecorder::records_from_log(&log).is_empty());
}

#[test]
fn test_repeated_request_without_redirect_is_ignored() {
    let log = vec![
        request_will_be_sent("1", PAGE_URL, "Document"),
        request_will_be_sent("1", "https://example.com/elsewhere", "Document"),
    ];

    let records = NetworkRecorder::records_from_log(&log);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, PAGE_URL);
}

#[test]
fn test_unrepresentable_status_is_dropped() {
    let response = |status: serde_json::Value| {
        ProtocolMessage::new(
            "Network.responseReceived",
            json!({ "requestId": "1", "response": { "status": status } }),
        )
    };

    for status in [json!(70000), json!(200.5), json!(-1)] {
        let log = vec![
            request_will_be_sent("1", PAGE_URL, "Document"),
            response(status.clone()),
        ];
        let records = NetworkRecorder::records_from_log(&log);
        assert_eq!(records[0].status_code, None, "status {}", status);
    }

    let log = vec![request_will_be_sent("1", PAGE_URL, "Document"), response(json!(204))];
    assert_eq!(NetworkRecorder::records_from_log(&log)[0].status_code, Some(204));
}
