//! Database operations for the `linkedin_accounts` table.

use sqlx::PgPool;

use leadloop_core::Account;

use crate::DbError;

/// A row from the `linkedin_accounts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub user_id: i64,
    pub label: String,
    pub access_token: String,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            user_id: row.user_id,
            label: row.label,
            access_token: row.access_token,
        }
    }
}

/// Returns the user's active outbound account, or `None` if no account is
/// configured. When several are active the most recently created wins.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn active_account(pool: &PgPool, user_id: i64) -> Result<Option<AccountRow>, DbError> {
    let row = sqlx::query_as::<_, AccountRow>(
        "SELECT id, user_id, label, access_token \
         FROM linkedin_accounts \
         WHERE user_id = $1 AND is_active \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
