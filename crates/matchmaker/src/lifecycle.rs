//! Session lifecycle: message exchange and termination.
//!
//! A session is created `active` by the matching engine and can only move to
//! `ended`. Messages are appended without checking that the session exists
//! or is still active.

use database::{message, session, waiting, ChatSession, Database, Message};
use tracing::{debug, info};

use crate::error::Result;
use crate::validation::{validate_id, validate_message_text, validate_since_id};

/// Mediates message exchange and termination for chat sessions.
#[derive(Debug, Clone)]
pub struct SessionManager {
    db: Database,
}

impl SessionManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append a message to a session.
    ///
    /// Returns the stored message with its assigned id and timestamp.
    pub async fn append_message(
        &self,
        session_id: &str,
        sender_id: &str,
        text: &str,
    ) -> Result<Message> {
        validate_id("session_id", session_id)?;
        validate_id("sender_id", sender_id)?;
        validate_message_text(text)?;

        let stored = message::append_message(self.db.pool(), session_id, sender_id, text).await?;
        debug!(
            session_id = %session_id,
            sender_id = %sender_id,
            message_id = stored.id,
            "Message appended"
        );
        Ok(stored)
    }

    /// Messages with `id > since_id`, in ascending id order.
    pub async fn list_messages(&self, session_id: &str, since_id: i64) -> Result<Vec<Message>> {
        validate_id("session_id", session_id)?;
        validate_since_id(since_id)?;

        let messages = message::list_messages(self.db.pool(), session_id, since_id).await?;
        Ok(messages)
    }

    /// Start an incremental poller over a session's messages.
    pub fn cursor(&self, session_id: impl Into<String>, since_id: i64) -> MessageCursor {
        MessageCursor {
            sessions: self.clone(),
            session_id: session_id.into(),
            last_seen: since_id,
        }
    }

    /// Look up a session.
    pub async fn get_session(&self, session_id: &str) -> Result<ChatSession> {
        validate_id("session_id", session_id)?;
        Ok(session::get_session(self.db.pool(), session_id).await?)
    }

    /// End a session and drop `user_id`'s waiting entry, if any.
    ///
    /// Ending an ended or unknown session succeeds; the return value tells
    /// whether a session with this id exists.
    pub async fn end_session(&self, session_id: &str, user_id: Option<&str>) -> Result<bool> {
        validate_id("session_id", session_id)?;
        let user_id = user_id.filter(|id| !id.trim().is_empty());

        let mut tx = self.db.begin().await?;
        let existed = session::end_session(&mut *tx, session_id).await?;
        if let Some(user_id) = user_id {
            waiting::delete_entry(&mut *tx, user_id).await?;
        }
        tx.commit().await.map_err(database::DatabaseError::from)?;

        if existed {
            info!(session_id = %session_id, user_id = ?user_id, "Session ended");
        } else {
            debug!(session_id = %session_id, "End requested for unknown session");
        }
        Ok(existed)
    }
}

/// Restartable incremental reader over a session's messages.
///
/// Each [`poll`](MessageCursor::poll) returns only messages newer than the
/// last one it handed out. Dropping a cursor loses nothing: a new one built
/// from [`last_seen`](MessageCursor::last_seen) continues where it stopped.
#[derive(Debug, Clone)]
pub struct MessageCursor {
    sessions: SessionManager,
    session_id: String,
    last_seen: i64,
}

impl MessageCursor {
    /// Fetch messages that arrived since the previous poll.
    pub async fn poll(&mut self) -> Result<Vec<Message>> {
        let batch = self
            .sessions
            .list_messages(&self.session_id, self.last_seen)
            .await?;
        if let Some(last) = batch.last() {
            self.last_seen = last.id;
        }
        Ok(batch)
    }

    /// Id of the newest message returned so far.
    pub fn last_seen(&self) -> i64 {
        self.last_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchmakerError;
    use database::{Gender, SessionStatus};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn open_session(db: &Database) -> String {
        session::create_session(db.pool(), "s1", "a", "b")
            .await
            .unwrap();
        "s1".to_string()
    }

    #[tokio::test]
    async fn test_send_and_poll() {
        let db = test_db().await;
        let sessions = SessionManager::new(db.clone());
        let session_id = open_session(&db).await;

        let sent = sessions
            .append_message(&session_id, "a", "hi")
            .await
            .unwrap();
        assert_eq!(sent.id, 1);

        let received = sessions.list_messages(&session_id, 0).await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].text, "hi");
        assert_eq!(received[0].sender_id, "a");
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let db = test_db().await;
        let sessions = SessionManager::new(db);

        for (session_id, sender_id, text) in [("", "a", "hi"), ("s1", "", "hi"), ("s1", "a", "")] {
            let result = sessions.append_message(session_id, sender_id, text).await;
            assert!(matches!(result, Err(MatchmakerError::Validation(_))));
        }

        let result = sessions.end_session("", Some("a")).await;
        assert!(matches!(result, Err(MatchmakerError::Validation(_))));

        let result = sessions.list_messages("s1", -1).await;
        assert!(matches!(result, Err(MatchmakerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_append_to_unknown_session_is_accepted() {
        let db = test_db().await;
        let sessions = SessionManager::new(db);

        let sent = sessions
            .append_message("never-created", "a", "hello?")
            .await
            .unwrap();
        assert!(sent.id > 0);
    }

    #[tokio::test]
    async fn test_cursor_partitions_messages() {
        let db = test_db().await;
        let sessions = SessionManager::new(db.clone());
        let session_id = open_session(&db).await;

        let mut cursor = sessions.cursor(session_id.clone(), 0);
        let mut seen = Vec::new();

        for round in 0..3 {
            for n in 0..=round {
                sessions
                    .append_message(&session_id, "a", &format!("{round}-{n}"))
                    .await
                    .unwrap();
            }
            // Noise in another session must not leak in.
            sessions
                .append_message("other", "z", "noise")
                .await
                .unwrap();

            let batch = cursor.poll().await.unwrap();
            assert_eq!(batch.len(), round + 1);
            assert!(batch.iter().all(|m| m.session_id == session_id));
            seen.extend(batch);
        }

        assert!(cursor.poll().await.unwrap().is_empty());

        let all = sessions.list_messages(&session_id, 0).await.unwrap();
        assert_eq!(seen, all);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(cursor.last_seen(), all.last().unwrap().id);

        // A fresh cursor resumes from a remembered id.
        let mut resumed = sessions.cursor(session_id, all[2].id);
        let rest = resumed.poll().await.unwrap();
        assert_eq!(rest, all[3..].to_vec());
    }

    #[tokio::test]
    async fn test_end_session_is_idempotent() {
        let db = test_db().await;
        let sessions = SessionManager::new(db.clone());
        let session_id = open_session(&db).await;

        assert!(sessions.end_session(&session_id, Some("a")).await.unwrap());
        let ended = sessions.get_session(&session_id).await.unwrap();
        assert_eq!(ended.status, SessionStatus::Ended);

        assert!(sessions.end_session(&session_id, Some("a")).await.unwrap());
        let again = sessions.get_session(&session_id).await.unwrap();
        assert_eq!(again.status, SessionStatus::Ended);
        assert_eq!(again.ended_at, ended.ended_at);
    }

    #[tokio::test]
    async fn test_end_session_clears_waiting_entry() {
        let db = test_db().await;
        let sessions = SessionManager::new(db.clone());
        let session_id = open_session(&db).await;

        waiting::upsert_entry(db.pool(), "a", Gender::Any, Gender::Any)
            .await
            .unwrap();
        waiting::upsert_entry(db.pool(), "b", Gender::Any, Gender::Any)
            .await
            .unwrap();

        sessions.end_session(&session_id, Some("a")).await.unwrap();

        assert!(waiting::get_entry(db.pool(), "a").await.unwrap().is_none());
        assert!(waiting::get_entry(db.pool(), "b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_end_unknown_session() {
        let db = test_db().await;
        let sessions = SessionManager::new(db);

        assert!(!sessions.end_session("missing", None).await.unwrap());
        let result = sessions.get_session("missing").await;
        assert!(matches!(result, Err(MatchmakerError::NotFound { .. })));
    }
}
