//! Transport failure taxonomy.

use thiserror::Error;

/// Why a streaming chat call could not be started.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to reach model endpoint: {0}")]
    Connect(#[from] reqwest::Error),

    #[error("model endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}
