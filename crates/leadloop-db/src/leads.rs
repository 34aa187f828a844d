//! Database operations for the `leads` table.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use leadloop_core::{Lead, LeadStatus, NewLead};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `leads` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeadRow {
    pub id: i64,
    pub campaign_id: i64,
    pub profile_urn: String,
    pub profile_name: String,
    pub profile_headline: Option<String>,
    pub comment_urn: String,
    pub comment_text: String,
    pub commented_at: DateTime<Utc>,
    pub keyword_matched: Option<String>,
    pub intent_score: i32,
    pub is_connection: bool,
    pub status: String,
    pub generated_reply: Option<String>,
    pub generated_dm: Option<String>,
    pub skipped_reason: Option<String>,
    pub error_message: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl LeadRow {
    /// Converts the row into the domain type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidColumn`] if the stored status string does
    /// not match any known variant.
    pub fn into_domain(self) -> Result<Lead, DbError> {
        let status = LeadStatus::from_str(&self.status).map_err(|e| DbError::InvalidColumn {
            table: "leads",
            column: "status",
            id: self.id,
            source: e,
        })?;

        Ok(Lead {
            id: self.id,
            campaign_id: self.campaign_id,
            profile_urn: self.profile_urn,
            profile_name: self.profile_name,
            profile_headline: self.profile_headline,
            comment_urn: self.comment_urn,
            comment_text: self.comment_text,
            commented_at: self.commented_at,
            keyword_matched: self.keyword_matched,
            intent_score: self.intent_score,
            is_connection: self.is_connection,
            status,
            generated_reply: self.generated_reply,
            generated_dm: self.generated_dm,
            skipped_reason: self.skipped_reason,
            error_message: self.error_message,
            approved_at: self.approved_at,
            completed_at: self.completed_at,
        })
    }
}

const LEAD_COLUMNS: &str = "id, campaign_id, profile_urn, profile_name, profile_headline, \
     comment_urn, comment_text, commented_at, keyword_matched, intent_score, is_connection, \
     status, generated_reply, generated_dm, skipped_reason, error_message, \
     approved_at, completed_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts a lead unless one already exists for the same
/// `(campaign_id, profile_urn)` pair.
///
/// Returns the new lead id, or `None` when the unique constraint made the
/// insert a no-op (the commenter was already captured).
///
/// A lead captured on a no-approval campaign arrives already `approved` and
/// never passes through [`approve_lead`], so its `total_approved` bump
/// happens here, in the same transaction as the insert.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a statement fails for any reason other than
/// the uniqueness conflict.
pub async fn insert_lead_if_absent(pool: &PgPool, lead: &NewLead) -> Result<Option<i64>, DbError> {
    let mut tx = pool.begin().await?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO leads \
             (campaign_id, profile_urn, profile_name, profile_headline, \
              comment_urn, comment_text, commented_at, keyword_matched, \
              intent_score, is_connection, status, generated_reply, generated_dm, \
              approved_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
         ON CONFLICT (campaign_id, profile_urn) DO NOTHING \
         RETURNING id",
    )
    .bind(lead.campaign_id)
    .bind(&lead.profile_urn)
    .bind(&lead.profile_name)
    .bind(&lead.profile_headline)
    .bind(&lead.comment_urn)
    .bind(&lead.comment_text)
    .bind(lead.commented_at)
    .bind(&lead.keyword_matched)
    .bind(lead.intent_score)
    .bind(lead.is_connection)
    .bind(lead.status.as_str())
    .bind(&lead.generated_reply)
    .bind(&lead.generated_dm)
    .bind(lead.approved_at)
    .fetch_optional(&mut *tx)
    .await?;

    if id.is_some() && lead.status == LeadStatus::Approved {
        sqlx::query("UPDATE campaigns SET total_approved = total_approved + 1 WHERE id = $1")
            .bind(lead.campaign_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(id)
}

/// Fetches a single lead by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn get_lead(pool: &PgPool, id: i64) -> Result<LeadRow, DbError> {
    let row = sqlx::query_as::<_, LeadRow>(&format!(
        "SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Moves a pending lead to `approved` and stamps `approved_at`.
///
/// # Errors
///
/// Returns [`DbError::InvalidTransition`] if the lead is not `pending`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn approve_lead(
    pool: &PgPool,
    id: i64,
    now: DateTime<Utc>,
) -> Result<LeadRow, DbError> {
    let row = sqlx::query_as::<_, LeadRow>(&format!(
        "UPDATE leads SET status = 'approved', approved_at = $1 \
         WHERE id = $2 AND status = 'pending' \
         RETURNING {LEAD_COLUMNS}"
    ))
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::InvalidTransition {
        entity: "lead",
        id,
        expected_status: "pending",
    })?;

    Ok(row)
}

/// Moves a pending or approved lead to `skipped` with a reason.
///
/// # Errors
///
/// Returns [`DbError::InvalidTransition`] if the lead is in neither state,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn skip_lead(pool: &PgPool, id: i64, reason: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE leads SET status = 'skipped', skipped_reason = $1 \
         WHERE id = $2 AND status IN ('pending', 'approved')",
    )
    .bind(reason)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTransition {
            entity: "lead",
            id,
            expected_status: "pending or approved",
        });
    }

    Ok(())
}

/// Moves an approved lead to `executing` when its first action starts.
/// A lead already executing is left untouched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn mark_lead_executing(pool: &PgPool, id: i64) -> Result<(), DbError> {
    sqlx::query("UPDATE leads SET status = 'executing' WHERE id = $1 AND status = 'approved'")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Marks the lead `completed`, stamps `completed_at`, and bumps the owning
/// campaign's `total_completed` counter.
///
/// # Errors
///
/// Returns [`DbError::InvalidTransition`] if the lead is not `executing`,
/// or [`DbError::Sqlx`] if a statement fails.
pub async fn complete_lead(pool: &PgPool, id: i64, now: DateTime<Utc>) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    let campaign_id = sqlx::query_scalar::<_, i64>(
        "UPDATE leads SET status = 'completed', completed_at = $1 \
         WHERE id = $2 AND status = 'executing' \
         RETURNING campaign_id",
    )
    .bind(now)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::InvalidTransition {
        entity: "lead",
        id,
        expected_status: "executing",
    })?;

    sqlx::query("UPDATE campaigns SET total_completed = total_completed + 1 WHERE id = $1")
        .bind(campaign_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}

/// Records an unrecoverable action failure on the lead.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn record_lead_error(pool: &PgPool, id: i64, message: &str) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE leads SET status = 'error', error_message = $1 \
         WHERE id = $2 AND status NOT IN ('completed', 'skipped')",
    )
    .bind(message)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
