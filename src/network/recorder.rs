use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::record::{NetworkRecord, RequestId, ResourceType};
use crate::protocol::ProtocolMessage;

/// Folds network protocol messages into finalized records, in first-seen order.
///
/// A redirect reuses the protocol request id, so each new hop is recorded under the
/// previous hop's id with a `:redirect` suffix. Later messages for that protocol id
/// apply to the newest hop.
#[derive(Debug, Default)]
pub struct NetworkRecorder {
    records: Vec<NetworkRecord>,
    latest_hop: HashMap<RequestId, usize>,
}

impl NetworkRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure function: devtools log -> finalized record list.
    pub fn records_from_log(log: &[ProtocolMessage]) -> Vec<NetworkRecord> {
        let mut recorder = Self::new();
        for message in log {
            recorder.record(message);
        }
        recorder.finish()
    }

    pub fn record(&mut self, message: &ProtocolMessage) {
        match message.method.as_str() {
            "Network.requestWillBeSent" => self.on_request_will_be_sent(&message.params),
            "Network.responseReceived" => {
                if let Some(record) = self.hop_mut(&message.params) {
                    record.status_code = status_of(message.params.get("response"));
                    record.mime_type = str_at(&message.params, "/response/mimeType");
                }
            }
            "Network.loadingFinished" => {
                if let Some(record) = self.hop_mut(&message.params) {
                    record.finished = true;
                }
            }
            "Network.loadingFailed" => {
                if let Some(record) = self.hop_mut(&message.params) {
                    record.finished = true;
                    record.failed = true;
                }
            }
            _ => {}
        }
    }

    pub fn finish(self) -> Vec<NetworkRecord> {
        self.records
    }

    fn on_request_will_be_sent(&mut self, params: &Value) {
        let Some(protocol_id) = params.get("requestId").and_then(Value::as_str) else {
            return;
        };
        let protocol_id = RequestId::from(protocol_id);
        let url = params
            .pointer("/request/url")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let resource_type = params
            .get("type")
            .and_then(Value::as_str)
            .map(ResourceType::from_protocol)
            .unwrap_or_default();

        let mut record = NetworkRecord::new(protocol_id.as_str(), url, resource_type);
        record.document_url = str_at(params, "/documentURL");
        record.frame_id = str_at(params, "/frameId");

        if let Some(&previous) = self.latest_hop.get(&protocol_id) {
            let Some(redirect) = params.get("redirectResponse") else {
                debug!("Ignoring repeated requestWillBeSent for {}", protocol_id);
                return;
            };
            let hop = &mut self.records[previous];
            hop.status_code = status_of(Some(redirect));
            hop.finished = true;
            record.request_id = hop.request_id.redirected();
            record.from_redirect = true;
        }

        self.latest_hop.insert(protocol_id, self.records.len());
        self.records.push(record);
    }

    fn hop_mut(&mut self, params: &Value) -> Option<&mut NetworkRecord> {
        let protocol_id = RequestId::from(params.get("requestId").and_then(Value::as_str)?);
        match self.latest_hop.get(&protocol_id) {
            Some(&index) => self.records.get_mut(index),
            None => {
                debug!("Network message for unknown request {}", protocol_id);
                None
            }
        }
    }
}

fn str_at(params: &Value, pointer: &str) -> Option<String> {
    params.pointer(pointer).and_then(Value::as_str).map(str::to_string)
}

fn status_of(response: Option<&Value>) -> Option<u16> {
    response?
        .get("status")?
        .as_u64()
        .and_then(|status| u16::try_from(status).ok())
}
