//! User persistence.

use sqlx::SqliteExecutor;

use crate::error::{DatabaseError, Result};
use crate::models::{RatingAggregate, User};

/// Register a user, leaving an existing record untouched.
///
/// A new record starts from the ratings already left for `id`, so a user
/// rated before registering still satisfies the aggregate invariant.
/// Returns the stored record either way.
pub async fn upsert_user<'e, E>(executor: E, id: &str) -> Result<User>
where
    E: SqliteExecutor<'e>,
{
    // 4.5 mirrors the column default for users nobody has rated.
    // The no-op DO UPDATE makes RETURNING yield the existing row on conflict.
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, rating, total_chats)
        SELECT ?1, COALESCE(AVG(rating), 4.5), COUNT(*)
        FROM ratings
        WHERE rated_id = ?1
        ON CONFLICT(id) DO UPDATE SET id = users.id
        RETURNING id, rating, total_chats, blocked_until, created_at
        "#,
    )
    .bind(id)
    .fetch_one(executor)
    .await?;

    Ok(user)
}

/// Get a user by ID.
pub async fn get_user<'e, E>(executor: E, id: &str) -> Result<User>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, rating, total_chats, blocked_until, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Overwrite a user's rating aggregate.
///
/// Returns false if the user does not exist.
pub async fn update_rating<'e, E>(executor: E, id: &str, aggregate: RatingAggregate) -> Result<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE users
        SET rating = ?, total_chats = ?
        WHERE id = ?
        "#,
    )
    .bind(aggregate.mean)
    .bind(aggregate.count)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rating, session, Database};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_upsert_creates_with_defaults() {
        let db = test_db().await;

        let user = upsert_user(db.pool(), "anon-1").await.unwrap();
        assert_eq!(user.id, "anon-1");
        assert_eq!(user.rating, 4.5);
        assert_eq!(user.total_chats, 0);
        assert!(user.blocked_until.is_none());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let db = test_db().await;

        upsert_user(db.pool(), "anon-1").await.unwrap();
        update_rating(
            db.pool(),
            "anon-1",
            RatingAggregate {
                mean: 3.0,
                count: 2,
            },
        )
        .await
        .unwrap();

        // Re-registration keeps the existing aggregate.
        let again = upsert_user(db.pool(), "anon-1").await.unwrap();
        assert_eq!(again.rating, 3.0);
        assert_eq!(again.total_chats, 2);
        assert_eq!(get_user(db.pool(), "anon-1").await.unwrap(), again);
    }

    #[tokio::test]
    async fn test_upsert_seeds_from_existing_ratings() {
        let db = test_db().await;

        // Rated in two sessions before ever registering.
        for (session_id, rater, value) in [("s1", "x", 2), ("s2", "y", 5)] {
            session::create_session(db.pool(), session_id, rater, "late")
                .await
                .unwrap();
            rating::upsert_rating(db.pool(), session_id, rater, "late", value)
                .await
                .unwrap();
        }

        let user = upsert_user(db.pool(), "late").await.unwrap();
        assert_eq!(user.rating, 3.5);
        assert_eq!(user.total_chats, 2);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let db = test_db().await;
        let result = get_user(db.pool(), "nobody").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_rating_missing_user() {
        let db = test_db().await;
        let updated = update_rating(
            db.pool(),
            "nobody",
            RatingAggregate {
                mean: 5.0,
                count: 1,
            },
        )
        .await
        .unwrap();
        assert!(!updated);
    }
}
