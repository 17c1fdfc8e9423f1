//! Protocol plumbing.
//!
//! The wire transport is an external collaborator. Everything in the crate talks to it
//! through the [`Transport`] trait: send a command and await the reply, subscribe to events.

pub mod message;
pub mod transport;

pub use message::ProtocolMessage;
pub use transport::{EventHandler, ListenerId, ScriptedTransport, Transport, ALL_EVENTS};
