use thiserror::Error;

/// Fatal conditions of the simulation. None of them is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// A bug: the game state or a sample broke one of its invariants.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Rejected at startup, before any task runs.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// One of the three task threads panicked.
    #[error("{0} task panicked")]
    TaskPanicked(&'static str),
}

impl SimError {
    pub fn invariant(msg: impl Into<String>) -> Self {
        SimError::InvariantViolation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        SimError::Configuration(msg.into())
    }
}
