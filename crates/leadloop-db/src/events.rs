//! Database operations for the append-only `campaign_events` table.

use sqlx::PgPool;

use leadloop_core::EventKind;

use crate::DbError;

/// Appends one audit event. Events are never read back or mutated by the
/// engine.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn append_event(
    pool: &PgPool,
    campaign_id: i64,
    lead_id: Option<i64>,
    kind: EventKind,
    payload: serde_json::Value,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO campaign_events (campaign_id, lead_id, kind, payload) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(campaign_id)
    .bind(lead_id)
    .bind(kind.as_str())
    .bind(payload)
    .execute(pool)
    .await?;

    Ok(())
}
