//! Error types for the advisor pipeline.
//!
//! Failed HTTP calls are not errors here: fetchers and the executor log
//! them and hand back an empty result. Only failures that must stop a
//! cycle are represented.

/// Errors that end an advisory cycle or prevent it from starting.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    /// A response could not be assembled into market data.
    #[error("Data gathering failed: {0}")]
    Aggregation(String),

    /// The object storage session could not be opened.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
