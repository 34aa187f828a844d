//! Campaign execution engine: the poll and execute cycles.
//!
//! The poll cycle walks active campaigns, fetches new comments past each
//! campaign's checkpoint, classifies them, and captures leads. The execute
//! cycle claims due actions, performs them against the social network, and
//! drives leads to completion. Both cycles operate through the ports defined
//! in `leadloop-core`, so they run identically against Postgres in production
//! and in-memory fakes in tests.

mod approval;
mod crm;
mod error;
mod executor;
mod poller;

pub use approval::approve_and_plan;
pub use crm::{NoopCrm, WebhookCrm};
pub use error::EngineError;
pub use executor::{run_execute_cycle, ExecuteReport, RetryPolicy};
pub use poller::{run_poll_cycle, run_poll_one, PollReport};
