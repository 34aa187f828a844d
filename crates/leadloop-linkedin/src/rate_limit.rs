//! Retry utilities for transient LinkedIn API failures.
//!
//! Provides exponential backoff retry logic for 429 responses and
//! network-level errors. Non-retriable errors (auth rejections, unexpected
//! statuses, parse failures) are propagated immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::LinkedinError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
fn is_retriable(err: &LinkedinError) -> bool {
    matches!(
        err,
        LinkedinError::RateLimited { .. } | LinkedinError::Http(_)
    )
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps for
/// `backoff_base_secs * 2^attempt` seconds and tries again, up to
/// `max_retries` additional attempts after the first try. Non-retriable
/// errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, LinkedinError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LinkedinError>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }

                let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_secs,
                    error = %err,
                    "transient LinkedIn API error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                attempt += 1;
            }
        }
    }
}
