use thiserror::Error;

/// Collection methods called out of order. Always a caller bug; never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("{collector}: `{method}` called while {phase}")]
    OutOfOrder {
        collector: &'static str,
        method: &'static str,
        phase: &'static str,
    },

    #[error("{collector}: already driven by the {active} protocol, refusing `{method}`")]
    ProtocolMixed {
        collector: &'static str,
        active: &'static str,
        method: &'static str,
    },

    #[error("event buffer is already open")]
    BufferAlreadyOpen,

    #[error("event buffer was already closed; buffers open once per run")]
    BufferReused,

    #[error("event buffer is not open")]
    BufferNotOpen,
}

/// Failure of a computed fact. Cloned out to every caller sharing the slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactError {
    #[error("Unable to identify the main resource for {url}")]
    MainResourceNotFound { url: String },

    #[error("missing dependency artifact `{0}`")]
    MissingDependency(&'static str),

    #[error("cached value for `{0}` has an unexpected type")]
    KindMismatch(&'static str),

    #[error("computation failed: {0}")]
    Computation(String),
}

/// Failures surfaced by the protocol transport, passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("protocol command `{method}` rejected: {message}")]
    CommandRejected { method: String, message: String },

    #[error("protocol connection closed")]
    ConnectionClosed,
}

#[derive(Debug, Clone, Error)]
pub enum GatherError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Fact(#[from] FactError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("artifact `{0}` was already stored for this run")]
    DuplicateArtifact(&'static str),
}
