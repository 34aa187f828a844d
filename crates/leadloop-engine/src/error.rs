//! Engine error type.

use leadloop_core::ports::{OutreachError, SocialError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Social(#[from] SocialError),

    #[error(transparent)]
    Outreach(#[from] OutreachError),
}
