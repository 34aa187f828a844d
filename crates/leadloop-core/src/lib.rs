//! Domain types, pure campaign logic, and collaborator ports for leadloop.
//!
//! Everything in this crate is I/O-free: the comment classifier and action
//! scheduler are deterministic functions (the scheduler takes an injectable
//! RNG), and the collaborator traits in [`ports`] are implemented by the
//! `leadloop-db`, `leadloop-linkedin`, and `leadloop-outreach` crates.

mod app_config;
pub mod classifier;
mod config;
pub mod ports;
pub mod scheduler;
mod types;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    Account, Action, ActionDelays, ActionFlags, ActionStatus, ActionType, Campaign,
    CampaignStatus, CaptureMode, Comment, DelayRange, EventKind, InvalidEnumValue, Lead,
    LeadStatus, NewAction, NewLead, OutreachContext, OutreachCopy, PlannedAction,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
