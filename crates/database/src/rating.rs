//! Rating persistence and aggregation.

use sqlx::SqliteExecutor;

use crate::models::{Rating, RatingAggregate};
use crate::Result;

/// Create or replace the rating a rater left for a session.
pub async fn upsert_rating<'e, E>(
    executor: E,
    session_id: &str,
    rater_id: &str,
    rated_id: &str,
    rating: i64,
) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO ratings (session_id, rater_id, rated_id, rating)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(session_id, rater_id) DO UPDATE SET
            rated_id = excluded.rated_id,
            rating = excluded.rating,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#,
    )
    .bind(session_id)
    .bind(rater_id)
    .bind(rated_id)
    .bind(rating)
    .execute(executor)
    .await?;

    Ok(())
}

/// Get the rating a rater left for a session.
pub async fn get_rating<'e, E>(
    executor: E,
    session_id: &str,
    rater_id: &str,
) -> Result<Option<Rating>>
where
    E: SqliteExecutor<'e>,
{
    let record = sqlx::query_as::<_, Rating>(
        r#"
        SELECT session_id, rater_id, rated_id, rating, created_at, updated_at
        FROM ratings
        WHERE session_id = ? AND rater_id = ?
        "#,
    )
    .bind(session_id)
    .bind(rater_id)
    .fetch_optional(executor)
    .await?;

    Ok(record)
}

/// Mean and count of all ratings a user received.
///
/// Returns `None` if the user has never been rated.
pub async fn aggregate_rating<'e, E>(executor: E, rated_id: &str) -> Result<Option<RatingAggregate>>
where
    E: SqliteExecutor<'e>,
{
    let (mean, count) = sqlx::query_as::<_, (Option<f64>, i64)>(
        r#"
        SELECT AVG(rating), COUNT(*)
        FROM ratings
        WHERE rated_id = ?
        "#,
    )
    .bind(rated_id)
    .fetch_one(executor)
    .await?;

    Ok(mean.map(|mean| RatingAggregate { mean, count }))
}
