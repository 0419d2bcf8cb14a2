//! Error types for toydns.

use thiserror::Error;

/// Errors that can occur while setting up or running the server.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error (network, file, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// DNS protocol error
    #[error("DNS protocol error: {0}")]
    Proto(#[from] hickory_proto::ProtoError),

    /// Upstream HTTP error (rate fetches etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Snapshot serialization error
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// An error returned by a service for a single question.
///
/// The message is sent to the client verbatim inside the synthesized
/// `error: ...` TXT record, so keep it short and self-contained.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ServiceError(pub String);

impl ServiceError {
    /// Build an error from any displayable message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<&str> for ServiceError {
    fn from(msg: &str) -> Self {
        Self(msg.to_string())
    }
}

impl From<String> for ServiceError {
    fn from(msg: String) -> Self {
        Self(msg)
    }
}
