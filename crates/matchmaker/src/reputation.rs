//! Reputation aggregation.
//!
//! A user's `rating` and `total_chats` are the mean and count of every rating
//! row naming them as `rated_id`. Each submission rewrites the aggregate from
//! the rating table inside the same transaction that stored the rating, so
//! concurrent submissions for one user cannot lose an update.

use database::{rating, session, user, Database, DatabaseError, RatingAggregate};
use tracing::{debug, info};

use crate::error::Result;
use crate::validation::{validate_id, validate_rating};

/// What a rating submission changed.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingOutcome {
    /// The participant who received the rating.
    pub rated_id: String,
    /// Their recomputed aggregate.
    pub aggregate: RatingAggregate,
}

/// Folds ratings into users' running averages.
#[derive(Debug, Clone)]
pub struct ReputationAggregator {
    db: Database,
}

impl ReputationAggregator {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record `rater_id`'s rating of the other participant in `session_id`.
    ///
    /// Resubmitting replaces the earlier value. A rater that is not in the
    /// session rates `user2_id`.
    pub async fn rate(&self, session_id: &str, rater_id: &str, value: i64) -> Result<RatingOutcome> {
        validate_id("session_id", session_id)?;
        validate_id("rater_id", rater_id)?;
        validate_rating(value)?;

        // Participants never change after creation, so this read can sit
        // outside the write transaction.
        let chat = session::get_session(self.db.pool(), session_id).await?;
        let rated_id = chat.other_participant(rater_id).to_string();

        let mut tx = self.db.begin().await?;
        rating::upsert_rating(&mut *tx, session_id, rater_id, &rated_id, value)
            .await
            .map_err(|e| e.contended("Rating", session_id))?;

        // The row just written guarantees at least one rating exists.
        let aggregate = rating::aggregate_rating(&mut *tx, &rated_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "Rating",
                id: format!("{}/{}", session_id, rater_id),
            })?;

        let updated = user::update_rating(&mut *tx, &rated_id, aggregate).await?;
        tx.commit()
            .await
            .map_err(|e| DatabaseError::from(e).contended("Rating", session_id))?;

        if updated {
            info!(
                session_id = %session_id,
                rated_id = %rated_id,
                mean = aggregate.mean,
                count = aggregate.count,
                "Rating recorded"
            );
        } else {
            debug!(rated_id = %rated_id, "Rated user is not registered, aggregate not stored");
        }

        Ok(RatingOutcome {
            rated_id,
            aggregate,
        })
    }
}
