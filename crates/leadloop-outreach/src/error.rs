//! Error types for the outreach generation client.

use leadloop_core::ports::OutreachError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutreachClientError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation api returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("generation response had no choices")]
    EmptyResponse,

    #[error("failed to parse generated copy: {reason}")]
    Parse { reason: String },
}

impl From<OutreachClientError> for OutreachError {
    fn from(err: OutreachClientError) -> Self {
        OutreachError::Generation(err.to_string())
    }
}
