pub mod artifacts;
pub mod computed;
pub mod config;
pub mod error;
pub mod gather;
pub mod network;
pub mod protocol;
pub mod run;

// Re-export the pieces an embedding orchestrator needs
pub use artifacts::{Artifact, ArtifactMap, DevtoolsLog};
pub use computed::{ComputedFact, ComputedFactCache, MainResource, MainResourceStatus, NetworkRecords};
pub use error::{FactError, GatherError, LifecycleError, TransportError};
pub use gather::{CollectionProtocol, InspectorIssues, InspectorIssuesCollector, IssueCategory};
pub use run::{Orchestrator, RunContext, RunMode};
