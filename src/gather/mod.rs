//! Raw artifact collection.
//!
//! Collectors own an [`EventBuffer`] for exactly one instrumentation window. The
//! inspector-issues collector speaks both collection protocols; the buffer and the
//! reconciler underneath it never know which one is in use.

pub mod buffer;
pub mod collector;
pub mod devtools_log;
pub mod event;
pub mod lifecycle;
pub mod reconciler;

pub use buffer::{EventBuffer, SharedEventBuffer};
pub use collector::InspectorIssuesCollector;
pub use devtools_log::DevtoolsLogCollector;
pub use event::{IssueCategory, ProtocolEvent, ISSUE_ADDED};
pub use lifecycle::{
    CollectionProtocol, Dependencies, LegacyCollector, Lifecycle, LoadData, Phase, WindowCollector,
};
pub use reconciler::{InspectorIssues, IssueReconciler};
