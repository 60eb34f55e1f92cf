//! Chat session persistence.

use sqlx::SqliteExecutor;

use crate::error::{DatabaseError, Result};
use crate::models::ChatSession;

/// Create an active session between two users.
pub async fn create_session<'e, E>(
    executor: E,
    id: &str,
    user1_id: &str,
    user2_id: &str,
) -> Result<ChatSession>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, ChatSession>(
        r#"
        INSERT INTO chat_sessions (id, user1_id, user2_id, status)
        VALUES (?, ?, ?, 'active')
        RETURNING id, user1_id, user2_id, status, created_at, ended_at
        "#,
    )
    .bind(id)
    .bind(user1_id)
    .bind(user2_id)
    .fetch_one(executor)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "ChatSession",
                    id: id.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })
}

/// Get a session by ID.
pub async fn get_session<'e, E>(executor: E, id: &str) -> Result<ChatSession>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, ChatSession>(
        r#"
        SELECT id, user1_id, user2_id, status, created_at, ended_at
        FROM chat_sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "ChatSession",
        id: id.to_string(),
    })
}

/// Mark a session ended.
///
/// Repeating the call is harmless: the first `ended_at` is kept.
/// Returns false if no session has this ID.
pub async fn end_session<'e, E>(executor: E, id: &str) -> Result<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE chat_sessions
        SET status = 'ended',
            ended_at = COALESCE(ended_at, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// The most recent active session a user takes part in, if any.
pub async fn latest_active_session<'e, E>(executor: E, user_id: &str) -> Result<Option<ChatSession>>
where
    E: SqliteExecutor<'e>,
{
    let session = sqlx::query_as::<_, ChatSession>(
        r#"
        SELECT id, user1_id, user2_id, status, created_at, ended_at
        FROM chat_sessions
        WHERE status = 'active' AND (user1_id = ? OR user2_id = ?)
        ORDER BY created_at DESC, rowid DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(session)
}
