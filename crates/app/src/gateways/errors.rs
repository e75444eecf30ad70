//! Gateway errors.

use thiserror::Error;

/// Errors that can occur when talking to an upstream service.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// An HTTP transport, timeout or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered but declared a failure.
    #[error("{0}")]
    Rejected(String),

    /// The service answered with a body we could not interpret.
    #[error("unexpected response: {0}")]
    Malformed(String),
}
