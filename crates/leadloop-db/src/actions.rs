//! Database operations for the `actions` table.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use leadloop_core::{Action, ActionStatus, ActionType, NewAction};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `actions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActionRow {
    pub id: i64,
    pub lead_id: i64,
    pub action_type: String,
    pub status: String,
    pub content: Option<String>,
    pub scheduled_for: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub external_id: Option<String>,
    pub error_message: Option<String>,
    pub retry_count: i32,
}

impl ActionRow {
    /// Converts the row into the domain type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidColumn`] if a stored enum string does not
    /// match any known variant.
    pub fn into_domain(self) -> Result<Action, DbError> {
        let action_type =
            ActionType::from_str(&self.action_type).map_err(|e| DbError::InvalidColumn {
                table: "actions",
                column: "action_type",
                id: self.id,
                source: e,
            })?;
        let status = ActionStatus::from_str(&self.status).map_err(|e| DbError::InvalidColumn {
            table: "actions",
            column: "status",
            id: self.id,
            source: e,
        })?;

        Ok(Action {
            id: self.id,
            lead_id: self.lead_id,
            action_type,
            status,
            content: self.content,
            scheduled_for: self.scheduled_for,
            executed_at: self.executed_at,
            external_id: self.external_id,
            error_message: self.error_message,
            retry_count: self.retry_count,
        })
    }
}

const ACTION_COLUMNS: &str = "id, lead_id, action_type, status, content, scheduled_for, \
     executed_at, external_id, error_message, retry_count";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts all actions of a lead's plan in one transaction, each starting
/// in `queued`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; no partial plan is left
/// behind.
pub async fn insert_actions(
    pool: &PgPool,
    lead_id: i64,
    actions: &[NewAction],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    for action in actions {
        sqlx::query(
            "INSERT INTO actions (lead_id, action_type, status, content, scheduled_for) \
             VALUES ($1, $2, 'queued', $3, $4)",
        )
        .bind(lead_id)
        .bind(action.action_type.as_str())
        .bind(&action.content)
        .bind(action.scheduled_for)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(())
}

/// Returns up to `limit` queued actions whose scheduled time has passed,
/// oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_due_actions(
    pool: &PgPool,
    limit: i64,
    now: DateTime<Utc>,
) -> Result<Vec<ActionRow>, DbError> {
    let rows = sqlx::query_as::<_, ActionRow>(&format!(
        "SELECT {ACTION_COLUMNS} FROM actions \
         WHERE status = 'queued' AND scheduled_for <= $1 \
         ORDER BY scheduled_for, id \
         LIMIT $2"
    ))
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Claims a queued action by conditionally marking it `executing`.
///
/// Returns `false` when the row was not in `queued` anymore, which means a
/// concurrent executor pass already claimed it. This single-claim semantics
/// is the only guard against double-firing an action.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn claim_action(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("UPDATE actions SET status = 'executing' WHERE id = $1 AND status = 'queued'")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Marks an executing action `done` with its external id and execution time.
///
/// # Errors
///
/// Returns [`DbError::InvalidTransition`] if the action is not `executing`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn mark_action_done(
    pool: &PgPool,
    id: i64,
    external_id: &str,
    now: DateTime<Utc>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE actions \
         SET status = 'done', external_id = $1, executed_at = $2, error_message = NULL \
         WHERE id = $3 AND status = 'executing'",
    )
    .bind(external_id)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTransition {
            entity: "action",
            id,
            expected_status: "executing",
        });
    }

    Ok(())
}

/// Returns an executing action to `queued` with an incremented retry count
/// and a new scheduled time.
///
/// # Errors
///
/// Returns [`DbError::InvalidTransition`] if the action is not `executing`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn requeue_action(
    pool: &PgPool,
    id: i64,
    scheduled_for: DateTime<Utc>,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE actions \
         SET status = 'queued', scheduled_for = $1, error_message = $2, \
             retry_count = retry_count + 1 \
         WHERE id = $3 AND status = 'executing'",
    )
    .bind(scheduled_for)
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTransition {
            entity: "action",
            id,
            expected_status: "executing",
        });
    }

    Ok(())
}

/// Marks an executing action permanently `failed`. Failed actions are never
/// re-queued automatically.
///
/// # Errors
///
/// Returns [`DbError::InvalidTransition`] if the action is not `executing`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn fail_action(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE actions \
         SET status = 'failed', error_message = $1, retry_count = retry_count + 1 \
         WHERE id = $2 AND status = 'executing'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTransition {
            entity: "action",
            id,
            expected_status: "executing",
        });
    }

    Ok(())
}

/// Number of actions still queued for a lead.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_queued_actions(pool: &PgPool, lead_id: i64) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM actions WHERE lead_id = $1 AND status = 'queued'",
    )
    .bind(lead_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
