//! The [`Matchmaker`] facade tying the engine components together.

use database::{user, Database, User};
use tracing::debug;

use crate::error::Result;
use crate::lifecycle::SessionManager;
use crate::matching::MatchEngine;
use crate::reputation::ReputationAggregator;
use crate::request::{Ack, MatchResult, MessageList, MessageSent, Request, Response};
use crate::validation::validate_id;

/// Entry point for every caller-facing operation.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Matchmaker {
    db: Database,
    matching: MatchEngine,
    sessions: SessionManager,
    reputation: ReputationAggregator,
}

impl Matchmaker {
    pub fn new(db: Database) -> Self {
        Self {
            matching: MatchEngine::new(db.clone()),
            sessions: SessionManager::new(db.clone()),
            reputation: ReputationAggregator::new(db.clone()),
            db,
        }
    }

    pub fn matching(&self) -> &MatchEngine {
        &self.matching
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn reputation(&self) -> &ReputationAggregator {
        &self.reputation
    }

    /// Register a user. Re-registering returns the existing record unchanged.
    pub async fn register(&self, user_id: &str) -> Result<User> {
        validate_id("user_id", user_id)?;
        Ok(user::upsert_user(self.db.pool(), user_id).await?)
    }

    /// Look up a registered user.
    pub async fn profile(&self, user_id: &str) -> Result<User> {
        validate_id("user_id", user_id)?;
        Ok(user::get_user(self.db.pool(), user_id).await?)
    }

    /// Dispatch a tagged request to the operation it names.
    pub async fn handle(&self, request: Request) -> Result<Response> {
        debug!(action = request.action(), "Handling request");

        let response = match request {
            Request::Register(req) => Response::Profile(self.register(&req.user_id).await?.into()),
            Request::GetProfile(req) => Response::Profile(self.profile(&req.user_id).await?.into()),
            Request::FindMatch(req) => {
                let (user_gender, gender_preference) = req.genders()?;
                let outcome = self
                    .matching
                    .request_match(&req.user_id, user_gender, gender_preference)
                    .await?;
                Response::Match(MatchResult::from(outcome))
            }
            Request::MatchStatus(req) => {
                let status = self.matching.match_status(&req.user_id).await?;
                Response::Match(MatchResult::from(status))
            }
            Request::CancelMatch(req) => {
                self.matching.cancel(&req.user_id).await?;
                Response::Ack(Ack::ok())
            }
            Request::SendMessage(req) => {
                let stored = self
                    .sessions
                    .append_message(&req.session_id, &req.sender_id, &req.text)
                    .await?;
                Response::MessageSent(MessageSent::from(stored))
            }
            Request::GetMessages(req) => {
                let messages = self
                    .sessions
                    .list_messages(&req.session_id, req.since_id)
                    .await?;
                Response::Messages(MessageList::from(messages))
            }
            Request::Rate(req) => {
                self.reputation
                    .rate(&req.session_id, &req.rater_id, req.rating)
                    .await?;
                Response::Ack(Ack::ok())
            }
            Request::EndSession(req) => {
                self.sessions
                    .end_session(&req.session_id, req.user_id.as_deref())
                    .await?;
                Response::Ack(Ack::ok())
            }
        };

        Ok(response)
    }
}
