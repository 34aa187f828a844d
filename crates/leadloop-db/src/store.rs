//! [`PgStore`]: the Postgres implementation of the engine's store port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use leadloop_core::ports::{Store, StoreError};
use leadloop_core::{Account, Action, Campaign, EventKind, Lead, NewAction, NewLead};

use crate::{accounts, actions, campaigns, events, leads, DbError};

/// Store implementation backed by a Postgres pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => StoreError::NotFound,
            DbError::InvalidTransition {
                entity,
                id,
                expected_status,
            } => StoreError::InvalidTransition {
                entity,
                id,
                expected: expected_status,
            },
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_active_campaigns(&self) -> Result<Vec<Campaign>, StoreError> {
        let rows = campaigns::list_active_campaigns(&self.pool, Utc::now()).await?;
        rows.into_iter()
            .map(|row| row.into_domain().map_err(StoreError::from))
            .collect()
    }

    async fn expire_due_campaigns(&self, now: DateTime<Utc>) -> Result<Vec<i64>, StoreError> {
        Ok(campaigns::expire_due_campaigns(&self.pool, now).await?)
    }

    async fn get_campaign(&self, campaign_id: i64) -> Result<Campaign, StoreError> {
        Ok(campaigns::get_campaign(&self.pool, campaign_id)
            .await?
            .into_domain()?)
    }

    async fn active_account(&self, user_id: i64) -> Result<Option<Account>, StoreError> {
        Ok(accounts::active_account(&self.pool, user_id)
            .await?
            .map(Account::from))
    }

    async fn insert_lead_if_absent(&self, lead: &NewLead) -> Result<Option<i64>, StoreError> {
        Ok(leads::insert_lead_if_absent(&self.pool, lead).await?)
    }

    async fn advance_checkpoint(
        &self,
        campaign_id: i64,
        last_comment_urn: &str,
        captured: i32,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        Ok(
            campaigns::advance_checkpoint(&self.pool, campaign_id, last_comment_urn, captured, now)
                .await?,
        )
    }

    async fn get_lead(&self, lead_id: i64) -> Result<Lead, StoreError> {
        Ok(leads::get_lead(&self.pool, lead_id).await?.into_domain()?)
    }

    async fn approve_lead(&self, lead_id: i64, now: DateTime<Utc>) -> Result<Lead, StoreError> {
        let row = leads::approve_lead(&self.pool, lead_id, now).await?;
        campaigns::bump_total_approved(&self.pool, row.campaign_id).await?;
        Ok(row.into_domain()?)
    }

    async fn skip_lead(&self, lead_id: i64, reason: &str) -> Result<(), StoreError> {
        Ok(leads::skip_lead(&self.pool, lead_id, reason).await?)
    }

    async fn create_action_plan(
        &self,
        lead_id: i64,
        plan: &[NewAction],
    ) -> Result<(), StoreError> {
        Ok(actions::insert_actions(&self.pool, lead_id, plan).await?)
    }

    async fn list_due_actions(
        &self,
        limit: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Action>, StoreError> {
        let rows = actions::list_due_actions(&self.pool, limit, now).await?;
        rows.into_iter()
            .map(|row| row.into_domain().map_err(StoreError::from))
            .collect()
    }

    async fn claim_action(&self, action_id: i64) -> Result<bool, StoreError> {
        Ok(actions::claim_action(&self.pool, action_id).await?)
    }

    async fn mark_action_done(
        &self,
        action_id: i64,
        external_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        Ok(actions::mark_action_done(&self.pool, action_id, external_id, now).await?)
    }

    async fn requeue_action(
        &self,
        action_id: i64,
        scheduled_for: DateTime<Utc>,
        error_message: &str,
    ) -> Result<(), StoreError> {
        Ok(actions::requeue_action(&self.pool, action_id, scheduled_for, error_message).await?)
    }

    async fn fail_action(&self, action_id: i64, error_message: &str) -> Result<(), StoreError> {
        Ok(actions::fail_action(&self.pool, action_id, error_message).await?)
    }

    async fn count_queued_actions(&self, lead_id: i64) -> Result<i64, StoreError> {
        Ok(actions::count_queued_actions(&self.pool, lead_id).await?)
    }

    async fn mark_lead_executing(&self, lead_id: i64) -> Result<(), StoreError> {
        Ok(leads::mark_lead_executing(&self.pool, lead_id).await?)
    }

    async fn complete_lead(&self, lead_id: i64, now: DateTime<Utc>) -> Result<(), StoreError> {
        Ok(leads::complete_lead(&self.pool, lead_id, now).await?)
    }

    async fn record_lead_error(&self, lead_id: i64, message: &str) -> Result<(), StoreError> {
        Ok(leads::record_lead_error(&self.pool, lead_id, message).await?)
    }

    async fn append_event(
        &self,
        campaign_id: i64,
        lead_id: Option<i64>,
        kind: EventKind,
        payload: serde_json::Value,
    ) -> Result<(), StoreError> {
        Ok(events::append_event(&self.pool, campaign_id, lead_id, kind, payload).await?)
    }
}
