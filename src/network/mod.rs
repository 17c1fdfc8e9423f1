//! Network records for one run.
//!
//! Records are finalized once the run's network collection ends and are only ever read
//! afterwards, either directly or through a [`NetworkRecordIndex`].

pub mod index;
pub mod record;
pub mod recorder;

pub use index::NetworkRecordIndex;
pub use record::{NetworkRecord, RequestId, ResourceType};
pub use recorder::NetworkRecorder;
