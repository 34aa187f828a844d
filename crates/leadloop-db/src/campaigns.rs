//! Database operations for the `campaigns` table.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use leadloop_core::{
    ActionDelays, ActionFlags, Campaign, CampaignStatus, CaptureMode, DelayRange,
};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `campaigns` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CampaignRow {
    pub id: i64,
    pub public_id: Uuid,
    pub user_id: i64,
    pub name: String,
    pub status: String,
    pub post_url: String,
    pub post_urn: String,
    pub post_text: Option<String>,
    pub post_author: Option<String>,
    pub capture_mode: String,
    pub keywords: Vec<String>,
    pub action_like: bool,
    pub action_reply: bool,
    pub action_dm: bool,
    pub action_invite: bool,
    pub delay_like_min_secs: i64,
    pub delay_like_max_secs: i64,
    pub delay_reply_min_secs: i64,
    pub delay_reply_max_secs: i64,
    pub delay_dm_min_secs: i64,
    pub delay_dm_max_secs: i64,
    pub delay_invite_min_secs: i64,
    pub delay_invite_max_secs: i64,
    pub require_approval: bool,
    pub window_days: i32,
    pub expires_at: DateTime<Utc>,
    pub reply_template: Option<String>,
    pub dm_template: Option<String>,
    pub persona_prompt: Option<String>,
    pub lead_magnet: Option<String>,
    pub last_comment_urn: Option<String>,
    pub last_polled_at: Option<DateTime<Utc>>,
    pub total_captured: i32,
    pub total_approved: i32,
    pub total_completed: i32,
    pub created_at: DateTime<Utc>,
}

impl CampaignRow {
    /// Converts the row into the domain type, parsing status and capture
    /// mode strings.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidColumn`] if a stored enum string does not
    /// match any known variant.
    pub fn into_domain(self) -> Result<Campaign, DbError> {
        let status = CampaignStatus::from_str(&self.status).map_err(|e| DbError::InvalidColumn {
            table: "campaigns",
            column: "status",
            id: self.id,
            source: e,
        })?;
        let capture_mode =
            CaptureMode::from_str(&self.capture_mode).map_err(|e| DbError::InvalidColumn {
                table: "campaigns",
                column: "capture_mode",
                id: self.id,
                source: e,
            })?;

        Ok(Campaign {
            id: self.id,
            public_id: self.public_id,
            user_id: self.user_id,
            name: self.name,
            status,
            post_url: self.post_url,
            post_urn: self.post_urn,
            post_text: self.post_text,
            post_author: self.post_author,
            capture_mode,
            keywords: self.keywords,
            actions: ActionFlags {
                like: self.action_like,
                reply: self.action_reply,
                dm: self.action_dm,
                invite: self.action_invite,
            },
            delays: ActionDelays {
                like: DelayRange {
                    min_secs: self.delay_like_min_secs,
                    max_secs: self.delay_like_max_secs,
                },
                reply: DelayRange {
                    min_secs: self.delay_reply_min_secs,
                    max_secs: self.delay_reply_max_secs,
                },
                dm: DelayRange {
                    min_secs: self.delay_dm_min_secs,
                    max_secs: self.delay_dm_max_secs,
                },
                invite: DelayRange {
                    min_secs: self.delay_invite_min_secs,
                    max_secs: self.delay_invite_max_secs,
                },
            },
            require_approval: self.require_approval,
            window_days: self.window_days,
            expires_at: self.expires_at,
            reply_template: self.reply_template,
            dm_template: self.dm_template,
            persona_prompt: self.persona_prompt,
            lead_magnet: self.lead_magnet,
            last_comment_urn: self.last_comment_urn,
            last_polled_at: self.last_polled_at,
            total_captured: self.total_captured,
            total_approved: self.total_approved,
            total_completed: self.total_completed,
            created_at: self.created_at,
        })
    }
}

const CAMPAIGN_COLUMNS: &str = "id, public_id, user_id, name, status, post_url, post_urn, \
     post_text, post_author, capture_mode, keywords, \
     action_like, action_reply, action_dm, action_invite, \
     delay_like_min_secs, delay_like_max_secs, delay_reply_min_secs, delay_reply_max_secs, \
     delay_dm_min_secs, delay_dm_max_secs, delay_invite_min_secs, delay_invite_max_secs, \
     require_approval, window_days, expires_at, reply_template, dm_template, \
     persona_prompt, lead_magnet, last_comment_urn, last_polled_at, \
     total_captured, total_approved, total_completed, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns campaigns eligible for polling: `status = active` and not yet
/// expired, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_campaigns(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<Vec<CampaignRow>, DbError> {
    let rows = sqlx::query_as::<_, CampaignRow>(&format!(
        "SELECT {CAMPAIGN_COLUMNS} FROM campaigns \
         WHERE status = 'active' AND expires_at > $1 \
         ORDER BY created_at, id"
    ))
    .bind(now)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Marks active campaigns whose monitoring window has passed as completed.
/// Returns the affected campaign ids.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn expire_due_campaigns(pool: &PgPool, now: DateTime<Utc>) -> Result<Vec<i64>, DbError> {
    let ids = sqlx::query_scalar::<_, i64>(
        "UPDATE campaigns \
         SET status = 'completed' \
         WHERE status = 'active' AND expires_at <= $1 \
         RETURNING id",
    )
    .bind(now)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Fetches a single campaign by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn get_campaign(pool: &PgPool, id: i64) -> Result<CampaignRow, DbError> {
    let row = sqlx::query_as::<_, CampaignRow>(&format!(
        "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Persists a campaign's poll checkpoint in one statement: last comment urn,
/// `last_polled_at`, and the captured-lead counter bump.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the campaign does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn advance_checkpoint(
    pool: &PgPool,
    campaign_id: i64,
    last_comment_urn: &str,
    captured: i32,
    now: DateTime<Utc>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE campaigns \
         SET last_comment_urn = $1, last_polled_at = $2, \
             total_captured = total_captured + $3 \
         WHERE id = $4",
    )
    .bind(last_comment_urn)
    .bind(now)
    .bind(captured)
    .bind(campaign_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Bumps `total_approved` for a campaign.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn bump_total_approved(pool: &PgPool, campaign_id: i64) -> Result<(), DbError> {
    sqlx::query("UPDATE campaigns SET total_approved = total_approved + 1 WHERE id = $1")
        .bind(campaign_id)
        .execute(pool)
        .await?;

    Ok(())
}
