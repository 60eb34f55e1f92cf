//! Message persistence.
//!
//! Messages are append-only. Ids come from an `AUTOINCREMENT` key, so within
//! a session they strictly increase in the order rows were committed.

use sqlx::SqliteExecutor;

use crate::models::Message;
use crate::Result;

/// Append a message and return the stored row.
pub async fn append_message<'e, E>(
    executor: E,
    session_id: &str,
    sender_id: &str,
    text: &str,
) -> Result<Message>
where
    E: SqliteExecutor<'e>,
{
    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (session_id, sender_id, text)
        VALUES (?, ?, ?)
        RETURNING id, session_id, sender_id, text, created_at
        "#,
    )
    .bind(session_id)
    .bind(sender_id)
    .bind(text)
    .fetch_one(executor)
    .await?;

    Ok(message)
}

/// List a session's messages with `id > since_id`, oldest first.
pub async fn list_messages<'e, E>(
    executor: E,
    session_id: &str,
    since_id: i64,
) -> Result<Vec<Message>>
where
    E: SqliteExecutor<'e>,
{
    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, session_id, sender_id, text, created_at
        FROM messages
        WHERE session_id = ? AND id > ?
        ORDER BY id ASC
        "#,
    )
    .bind(session_id)
    .bind(since_id)
    .fetch_all(executor)
    .await?;

    Ok(messages)
}
