pub mod context;
pub mod orchestrator;

pub use context::{RunContext, RunMode};
pub use orchestrator::Orchestrator;
