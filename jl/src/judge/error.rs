//! Judge client error types

use thiserror::Error;

/// Errors surfaced by a judge client
///
/// `Network` and `Status` mean the judge was never reached or refused the
/// request outright; `Decode` means it was reached but answered with
/// something other than the expected schema. The engine relies on this
/// distinction: transport failures skip the attempt, decode failures are
/// classified conservatively.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// Connection-level failure (refused, timeout, TLS)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Judge answered with a non-success HTTP status
    #[error("judge returned status {status}")]
    Status { status: u16 },

    /// Judge answered, but the body did not match the expected schema
    #[error("unexpected response shape: {0}")]
    Decode(String),

    /// Credential material could not be turned into request headers
    #[error("invalid credential material: {0}")]
    Credentials(String),
}

impl JudgeError {
    /// Whether this error means the judge never evaluated the submission
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { .. })
    }
}
