//! Computed facts.
//!
//! Derived values shared by every consumer in a run. Each kind is computed at most
//! once per [`RunContext`](crate::run::RunContext); concurrent callers share the
//! in-flight computation and the settled result, failures included.

pub mod cache;
pub mod main_resource;
pub mod network_records;

pub use cache::{ComputedFact, ComputedFactCache, FactKind, FactOutcome, FactStatus, FactValue};
pub use main_resource::{MainResource, MainResourceStatus};
pub use network_records::NetworkRecords;
