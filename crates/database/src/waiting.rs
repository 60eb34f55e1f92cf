//! Waiting pool persistence.
//!
//! A user holds at most one entry (`user_id` is the primary key). The pool is
//! the only table with cross-user contention, so consuming an entry is done by
//! [`take_compatible_entry`] in a single conditional delete.

use sqlx::SqliteExecutor;

use crate::models::{Gender, WaitingEntry};
use crate::Result;

/// Remove a user's entry. Returns true if one existed.
pub async fn delete_entry<'e, E>(executor: E, user_id: &str) -> Result<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM waiting_queue
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Find, without consuming, the oldest entry compatible with a request.
pub async fn find_compatible_entry<'e, E>(
    executor: E,
    exclude_user_id: &str,
    user_gender: Gender,
    gender_preference: Gender,
) -> Result<Option<WaitingEntry>>
where
    E: SqliteExecutor<'e>,
{
    let entry = sqlx::query_as::<_, WaitingEntry>(
        r#"
        SELECT user_id, gender_preference, user_gender, joined_at
        FROM waiting_queue
        WHERE user_id != ?
          AND (gender_preference = ? OR gender_preference = 'any')
          AND (? = 'any' OR user_gender = ?)
        ORDER BY joined_at, rowid
        LIMIT 1
        "#,
    )
    .bind(exclude_user_id)
    .bind(user_gender.as_str())
    .bind(gender_preference.as_str())
    .bind(gender_preference.as_str())
    .fetch_optional(executor)
    .await?;

    Ok(entry)
}

/// Atomically find and delete the oldest entry compatible with a request.
///
/// Selection and deletion are one statement, so an entry can be returned to
/// at most one caller no matter how many requests race for it.
pub async fn take_compatible_entry<'e, E>(
    executor: E,
    exclude_user_id: &str,
    user_gender: Gender,
    gender_preference: Gender,
) -> Result<Option<WaitingEntry>>
where
    E: SqliteExecutor<'e>,
{
    let entry = sqlx::query_as::<_, WaitingEntry>(
        r#"
        DELETE FROM waiting_queue
        WHERE user_id = (
            SELECT user_id
            FROM waiting_queue
            WHERE user_id != ?
              AND (gender_preference = ? OR gender_preference = 'any')
              AND (? = 'any' OR user_gender = ?)
            ORDER BY joined_at, rowid
            LIMIT 1
        )
        RETURNING user_id, gender_preference, user_gender, joined_at
        "#,
    )
    .bind(exclude_user_id)
    .bind(user_gender.as_str())
    .bind(gender_preference.as_str())
    .bind(gender_preference.as_str())
    .fetch_optional(executor)
    .await?;

    Ok(entry)
}

/// Create or refresh a user's entry.
///
/// An existing entry gets the new filters and a fresh `joined_at`.
pub async fn upsert_entry<'e, E>(
    executor: E,
    user_id: &str,
    user_gender: Gender,
    gender_preference: Gender,
) -> Result<WaitingEntry>
where
    E: SqliteExecutor<'e>,
{
    let entry = sqlx::query_as::<_, WaitingEntry>(
        r#"
        INSERT INTO waiting_queue (user_id, gender_preference, user_gender)
        VALUES (?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            gender_preference = excluded.gender_preference,
            user_gender = excluded.user_gender,
            joined_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        RETURNING user_id, gender_preference, user_gender, joined_at
        "#,
    )
    .bind(user_id)
    .bind(gender_preference.as_str())
    .bind(user_gender.as_str())
    .fetch_one(executor)
    .await?;

    Ok(entry)
}

/// Get a user's entry, if any.
pub async fn get_entry<'e, E>(executor: E, user_id: &str) -> Result<Option<WaitingEntry>>
where
    E: SqliteExecutor<'e>,
{
    let entry = sqlx::query_as::<_, WaitingEntry>(
        r#"
        SELECT user_id, gender_preference, user_gender, joined_at
        FROM waiting_queue
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(entry)
}

/// Count entries in the pool.
pub async fn count_entries<'e, E>(executor: E) -> Result<i64>
where
    E: SqliteExecutor<'e>,
{
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM waiting_queue
        "#,
    )
    .fetch_one(executor)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_upsert_replaces_filters() {
        let db = test_db().await;

        upsert_entry(db.pool(), "a", Gender::Male, Gender::Female)
            .await
            .unwrap();
        let entry = upsert_entry(db.pool(), "a", Gender::Male, Gender::Any)
            .await
            .unwrap();

        assert_eq!(entry.gender_preference, Gender::Any);
        assert_eq!(count_entries(db.pool()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let db = test_db().await;

        upsert_entry(db.pool(), "a", Gender::Any, Gender::Any)
            .await
            .unwrap();
        assert!(delete_entry(db.pool(), "a").await.unwrap());
        assert!(!delete_entry(db.pool(), "a").await.unwrap());
        assert!(get_entry(db.pool(), "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_take_excludes_self() {
        let db = test_db().await;

        upsert_entry(db.pool(), "a", Gender::Any, Gender::Any)
            .await
            .unwrap();
        let taken = take_compatible_entry(db.pool(), "a", Gender::Any, Gender::Any)
            .await
            .unwrap();
        assert!(taken.is_none());
        assert_eq!(count_entries(db.pool()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_take_consumes_once() {
        let db = test_db().await;

        upsert_entry(db.pool(), "a", Gender::Female, Gender::Any)
            .await
            .unwrap();

        let first = take_compatible_entry(db.pool(), "b", Gender::Male, Gender::Female)
            .await
            .unwrap();
        assert_eq!(first.map(|e| e.user_id), Some("a".to_string()));

        let second = take_compatible_entry(db.pool(), "c", Gender::Male, Gender::Female)
            .await
            .unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_requester_preference_filters_gender() {
        let db = test_db().await;

        upsert_entry(db.pool(), "m", Gender::Male, Gender::Any)
            .await
            .unwrap();

        let found = find_compatible_entry(db.pool(), "x", Gender::Male, Gender::Female)
            .await
            .unwrap();
        assert!(found.is_none());

        let found = find_compatible_entry(db.pool(), "x", Gender::Male, Gender::Any)
            .await
            .unwrap();
        assert_eq!(found.map(|e| e.user_id), Some("m".to_string()));
    }

    #[tokio::test]
    async fn test_waiting_preference_filters_requester() {
        let db = test_db().await;

        // Waiting user only accepts women.
        upsert_entry(db.pool(), "w", Gender::Female, Gender::Female)
            .await
            .unwrap();

        let found = find_compatible_entry(db.pool(), "x", Gender::Male, Gender::Any)
            .await
            .unwrap();
        assert!(found.is_none());

        let found = find_compatible_entry(db.pool(), "x", Gender::Female, Gender::Any)
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_query_agrees_with_predicate() {
        let db = test_db().await;
        let genders = [Gender::Male, Gender::Female, Gender::Any];

        for waiting_gender in genders {
            for waiting_pref in genders {
                upsert_entry(db.pool(), "w", waiting_gender, waiting_pref)
                    .await
                    .unwrap();
                let entry = get_entry(db.pool(), "w").await.unwrap().unwrap();

                for gender in genders {
                    for pref in genders {
                        let found = find_compatible_entry(db.pool(), "r", gender, pref)
                            .await
                            .unwrap();
                        assert_eq!(
                            found.is_some(),
                            entry.is_compatible_with("r", gender, pref),
                            "waiting ({waiting_gender}, wants {waiting_pref}) vs requester ({gender}, wants {pref})"
                        );
                    }
                }
            }
        }
    }
}
