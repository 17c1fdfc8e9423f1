use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::message::ProtocolMessage;
use crate::error::TransportError;

/// Subscribing to this name delivers every message regardless of method.
pub const ALL_EVENTS: &str = "*";

pub type EventHandler = Arc<dyn Fn(&ProtocolMessage) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Minimal capability surface of the inspected session.
///
/// Handlers run synchronously inside delivery, in the order the transport receives
/// messages. Collectors rely on that to keep their buffers in arrival order.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_command(&self, method: &str, params: Value) -> Result<Value, TransportError>;
    fn on(&self, event_name: &str, handler: EventHandler) -> ListenerId;
    fn off(&self, event_name: &str, id: ListenerId);
}

#[derive(Default)]
struct ScriptState {
    next_listener: u64,
    listeners: Vec<(String, ListenerId, EventHandler)>,
    sent: Vec<String>,
    rejected: HashMap<String, String>,
    closed: bool,
}

/// In-memory transport. Replays recorded sessions and backs the test-suite.
#[derive(Default)]
pub struct ScriptedTransport {
    state: Mutex<ScriptState>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every later `send_command(method, ..)` fails with `CommandRejected`.
    pub fn reject(&self, method: &str, message: &str) {
        self.state().rejected.insert(method.to_string(), message.to_string());
    }

    /// Lifts an earlier [`ScriptedTransport::reject`].
    pub fn allow(&self, method: &str) {
        self.state().rejected.remove(method);
    }

    pub fn close(&self) {
        self.state().closed = true;
    }

    /// Methods of every command sent so far, rejected ones included.
    pub fn sent_commands(&self) -> Vec<String> {
        self.state().sent.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.state().listeners.len()
    }

    /// Delivers `message` to matching listeners in registration order.
    pub fn emit(&self, message: ProtocolMessage) {
        // Handlers are cloned out so they may call back into the transport.
        let handlers: Vec<EventHandler> = self
            .state()
            .listeners
            .iter()
            .filter(|(name, _, _)| name == ALL_EVENTS || *name == message.method)
            .map(|(_, _, handler)| handler.clone())
            .collect();

        if handlers.is_empty() {
            debug!("No listener for {}", message.method);
        }
        for handler in handlers {
            handler(&message);
        }
    }

    pub fn emit_all<I>(&self, messages: I)
    where
        I: IntoIterator<Item = ProtocolMessage>,
    {
        for message in messages {
            self.emit(message);
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_command(&self, method: &str, _params: Value) -> Result<Value, TransportError> {
        let outcome = {
            let mut state = self.state();
            if state.closed {
                Err(TransportError::ConnectionClosed)
            } else {
                state.sent.push(method.to_string());
                match state.rejected.get(method) {
                    Some(message) => Err(TransportError::CommandRejected {
                        method: method.to_string(),
                        message: message.clone(),
                    }),
                    None => Ok(json!({})),
                }
            }
        };

        // Awaiting the reply is a suspension point on a real connection.
        tokio::task::yield_now().await;

        if let Err(e) = &outcome {
            warn!("Scripted command failed: {}", e);
        }
        outcome
    }

    fn on(&self, event_name: &str, handler: EventHandler) -> ListenerId {
        let mut state = self.state();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        state.listeners.push((event_name.to_string(), id, handler));
        id
    }

    fn off(&self, event_name: &str, id: ListenerId) {
        self.state()
            .listeners
            .retain(|(name, listener, _)| !(name == event_name && *listener == id));
    }
}
