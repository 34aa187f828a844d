//! LinkedIn API client for the leadloop engine.
//!
//! Implements the `leadloop_core::ports::SocialNetwork` port: comment
//! fetching for the poller and like/reply/dm/invite execution for the
//! executor. Transient failures (429, network errors) are retried with
//! exponential backoff inside the client; this is independent of the
//! executor's own linear retry schedule for failed actions.

mod client;
mod error;
mod port;
mod rate_limit;
mod types;

pub use client::LinkedinClient;
pub use error::LinkedinError;
