//! Collaborator ports consumed by the engine cycles.
//!
//! Each trait is an external capability from the engine's point of view:
//! the persistent store, the social network, the outreach generator, and
//! CRM synchronization. Cycles take them as injected dependencies so they
//! run against fakes in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::{
    Account, Action, ActionType, Campaign, Comment, EventKind, Lead, NewAction, NewLead,
    OutreachContext, OutreachCopy,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("invalid state transition for {entity} {id}: expected {expected}")]
    InvalidTransition {
        entity: &'static str,
        id: i64,
        expected: &'static str,
    },
    #[error("store error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum SocialError {
    #[error("rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },
    #[error("unauthorized: access token rejected")]
    Unauthorized,
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum OutreachError {
    #[error("generation failed: {0}")]
    Generation(String),
}

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("crm sync failed: {0}")]
    Sync(String),
}

/// Persistent store operations required by the poller and executor.
#[async_trait]
pub trait Store: Send + Sync {
    /// Campaigns with `status = active` and `expires_at > now`.
    async fn list_active_campaigns(&self) -> Result<Vec<Campaign>, StoreError>;

    /// Marks active campaigns whose window has passed as completed and
    /// returns their ids.
    async fn expire_due_campaigns(&self, now: DateTime<Utc>) -> Result<Vec<i64>, StoreError>;

    async fn get_campaign(&self, campaign_id: i64) -> Result<Campaign, StoreError>;

    /// The user's active outbound account, if one is configured.
    async fn active_account(&self, user_id: i64) -> Result<Option<Account>, StoreError>;

    /// Inserts a lead unless one already exists for the same
    /// (campaign, profile) pair. Returns the new lead id, or `None` when the
    /// uniqueness invariant made the insert a no-op.
    async fn insert_lead_if_absent(&self, lead: &NewLead) -> Result<Option<i64>, StoreError>;

    /// Persists the poll checkpoint after a campaign's cycle: last comment
    /// urn, `last_polled_at = now`, and `total_captured += captured`.
    async fn advance_checkpoint(
        &self,
        campaign_id: i64,
        last_comment_urn: &str,
        captured: i32,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn get_lead(&self, lead_id: i64) -> Result<Lead, StoreError>;

    /// Moves a pending lead to approved and bumps `total_approved`.
    async fn approve_lead(&self, lead_id: i64, now: DateTime<Utc>) -> Result<Lead, StoreError>;

    /// Moves a pending or approved lead to skipped with a reason.
    async fn skip_lead(&self, lead_id: i64, reason: &str) -> Result<(), StoreError>;

    /// Creates the queued actions of a lead's plan.
    async fn create_action_plan(
        &self,
        lead_id: i64,
        actions: &[NewAction],
    ) -> Result<(), StoreError>;

    /// Queued actions with `scheduled_for <= now`, oldest first, bounded.
    async fn list_due_actions(
        &self,
        limit: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Action>, StoreError>;

    /// Claims a queued action by marking it executing. Returns `false` when
    /// the action was not in `queued` (already claimed by another pass).
    async fn claim_action(&self, action_id: i64) -> Result<bool, StoreError>;

    async fn mark_action_done(
        &self,
        action_id: i64,
        external_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Returns the action to `queued` with an incremented retry count and a
    /// new scheduled time.
    async fn requeue_action(
        &self,
        action_id: i64,
        scheduled_for: DateTime<Utc>,
        error_message: &str,
    ) -> Result<(), StoreError>;

    /// Marks the action permanently failed.
    async fn fail_action(&self, action_id: i64, error_message: &str) -> Result<(), StoreError>;

    /// Number of actions still queued for a lead.
    async fn count_queued_actions(&self, lead_id: i64) -> Result<i64, StoreError>;

    /// Moves an approved lead to executing when its first action starts.
    async fn mark_lead_executing(&self, lead_id: i64) -> Result<(), StoreError>;

    /// Marks the lead completed and bumps `total_completed`.
    async fn complete_lead(&self, lead_id: i64, now: DateTime<Utc>) -> Result<(), StoreError>;

    /// Records an unrecoverable action failure on the lead.
    async fn record_lead_error(&self, lead_id: i64, message: &str) -> Result<(), StoreError>;

    /// Appends an immutable audit event.
    async fn append_event(
        &self,
        campaign_id: i64,
        lead_id: Option<i64>,
        kind: EventKind,
        payload: serde_json::Value,
    ) -> Result<(), StoreError>;
}

/// Outbound social-network capability.
#[async_trait]
pub trait SocialNetwork: Send + Sync {
    /// Comments on `post_urn` authored after the checkpoint urn `since`,
    /// ordered oldest first. `None` fetches from the beginning.
    async fn fetch_comments(
        &self,
        account: &Account,
        post_urn: &str,
        since: Option<&str>,
    ) -> Result<Vec<Comment>, SocialError>;

    /// Whether `profile_urn` is a first-degree connection of the account.
    async fn check_connection_degree(
        &self,
        account: &Account,
        profile_urn: &str,
    ) -> Result<bool, SocialError>;

    /// Performs one social action against `target` and returns the external
    /// action identifier.
    async fn perform_action(
        &self,
        account: &Account,
        action_type: ActionType,
        target: &str,
        content: Option<&str>,
    ) -> Result<String, SocialError>;
}

/// AI outreach content generation.
#[async_trait]
pub trait OutreachGenerator: Send + Sync {
    async fn generate(&self, context: &OutreachContext) -> Result<OutreachCopy, OutreachError>;
}

/// CRM synchronization, fired when a lead completes.
#[async_trait]
pub trait CrmSync: Send + Sync {
    async fn sync_lead(&self, lead_id: i64) -> Result<(), CrmError>;
}
