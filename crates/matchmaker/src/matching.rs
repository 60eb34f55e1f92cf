//! Matching engine.
//!
//! A match request first drops the requester's own waiting entry, then tries
//! to consume one compatible entry from the pool. Own-entry removal, the
//! conditional delete of the partner entry and the session insert (or the
//! requester's enrolment) commit together, so a waiting user is paired at most
//! once and a failure never leaves an entry consumed without a session.

use chrono::Utc;
use database::{session, waiting, Database, DatabaseError, Gender};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::validation::validate_id;

/// Result of a match request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// A partner was found and a session created.
    Matched {
        session_id: String,
        partner_id: String,
    },
    /// No compatible partner; the requester is now in the pool.
    Waiting,
}

/// Where a user currently stands, as seen by a polling client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MatchStatus {
    /// The user has an outstanding waiting entry.
    Waiting,
    /// The user takes part in an active session.
    Matched {
        session_id: String,
        partner_id: String,
    },
    /// Neither waiting nor in an active session.
    Idle,
}

/// Pairs users from the waiting pool.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    db: Database,
}

impl MatchEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Pair `user_id` with a compatible waiting user, or park them in the pool.
    ///
    /// A waiting entry is compatible when it belongs to someone else, its
    /// preference accepts `user_gender`, and its gender satisfies
    /// `gender_preference` (unless that is [`Gender::Any`]).
    ///
    /// If the pairing transaction loses a race it is rolled back and the
    /// requester is enrolled instead of failing.
    pub async fn request_match(
        &self,
        user_id: &str,
        user_gender: Gender,
        gender_preference: Gender,
    ) -> Result<MatchOutcome> {
        validate_id("user_id", user_id)?;

        match self.try_pair(user_id, user_gender, gender_preference).await {
            Ok(outcome) => Ok(outcome),
            Err(err) if err.is_conflict() => {
                warn!(
                    user_id = %user_id,
                    error = %err,
                    "Pairing lost a race, enrolling requester instead"
                );
                self.enroll(user_id, user_gender, gender_preference).await?;
                Ok(MatchOutcome::Waiting)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Report whether a user is waiting, matched or idle.
    pub async fn match_status(&self, user_id: &str) -> Result<MatchStatus> {
        validate_id("user_id", user_id)?;

        if waiting::get_entry(self.db.pool(), user_id).await?.is_some() {
            return Ok(MatchStatus::Waiting);
        }

        let status = match session::latest_active_session(self.db.pool(), user_id).await? {
            Some(active) => MatchStatus::Matched {
                partner_id: active.other_participant(user_id).to_string(),
                session_id: active.id,
            },
            None => MatchStatus::Idle,
        };

        Ok(status)
    }

    /// Number of users currently waiting for a partner.
    pub async fn waiting_count(&self) -> Result<i64> {
        Ok(waiting::count_entries(self.db.pool()).await?)
    }

    /// Leave the waiting pool. Returns true if the user was waiting.
    pub async fn cancel(&self, user_id: &str) -> Result<bool> {
        validate_id("user_id", user_id)?;

        let removed = waiting::delete_entry(self.db.pool(), user_id).await?;
        if removed {
            debug!(user_id = %user_id, "Left waiting pool");
        }
        Ok(removed)
    }

    async fn try_pair(
        &self,
        user_id: &str,
        user_gender: Gender,
        gender_preference: Gender,
    ) -> std::result::Result<MatchOutcome, DatabaseError> {
        // The first statement writes, so the transaction takes SQLite's
        // writer lock up front and competing requests queue behind it.
        let mut tx = self.db.begin().await?;

        waiting::delete_entry(&mut *tx, user_id)
            .await
            .map_err(|e| e.contended("WaitingEntry", user_id))?;

        let candidate =
            waiting::take_compatible_entry(&mut *tx, user_id, user_gender, gender_preference)
                .await
                .map_err(|e| e.contended("WaitingEntry", user_id))?;

        let outcome = match candidate {
            Some(entry) => {
                let session_id = new_session_id();
                session::create_session(&mut *tx, &session_id, user_id, &entry.user_id)
                    .await
                    .map_err(|e| e.contended("ChatSession", &session_id))?;

                MatchOutcome::Matched {
                    session_id,
                    partner_id: entry.user_id,
                }
            }
            None => {
                waiting::upsert_entry(&mut *tx, user_id, user_gender, gender_preference)
                    .await
                    .map_err(|e| e.contended("WaitingEntry", user_id))?;
                MatchOutcome::Waiting
            }
        };

        tx.commit()
            .await
            .map_err(|e| DatabaseError::from(e).contended("WaitingEntry", user_id))?;

        match &outcome {
            MatchOutcome::Matched {
                session_id,
                partner_id,
            } => info!(
                user_id = %user_id,
                partner_id = %partner_id,
                session_id = %session_id,
                "Users matched"
            ),
            MatchOutcome::Waiting => debug!(
                user_id = %user_id,
                user_gender = %user_gender,
                gender_preference = %gender_preference,
                "No compatible partner, waiting"
            ),
        }

        Ok(outcome)
    }

    async fn enroll(
        &self,
        user_id: &str,
        user_gender: Gender,
        gender_preference: Gender,
    ) -> std::result::Result<(), DatabaseError> {
        waiting::upsert_entry(self.db.pool(), user_id, user_gender, gender_preference).await?;
        debug!(user_id = %user_id, "Enrolled in waiting pool");
        Ok(())
    }
}

/// Generate a time-derived session token.
///
/// The random suffix keeps ids unique when two sessions start in the same
/// microsecond.
fn new_session_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("session_{}_{}", Utc::now().timestamp_micros(), &suffix[..8])
}
