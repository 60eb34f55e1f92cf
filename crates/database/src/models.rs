//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Gender as stated by a user, or a preference over it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Any,
}

impl Gender {
    /// Get the stored text value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Any => "any",
        }
    }

    /// Parse a gender from user input (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "any" => Some(Gender::Any),
            _ => None,
        }
    }

    /// Whether this value, used as a preference, accepts `gender`.
    pub fn accepts(&self, gender: Gender) -> bool {
        *self == Gender::Any || *self == gender
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An anonymous user, identified by a client-generated token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Opaque user token.
    pub id: String,
    /// Mean of all ratings received (4.5 until the first rating).
    pub rating: f64,
    /// Number of ratings received.
    pub total_chats: i64,
    /// Moderation block; never written by the matchmaker.
    pub blocked_until: Option<String>,
    /// Registration timestamp.
    pub created_at: String,
}

/// A parked match request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WaitingEntry {
    pub user_id: String,
    /// Which partner gender this user accepts.
    pub gender_preference: Gender,
    /// The gender this user stated for themselves.
    pub user_gender: Gender,
    pub joined_at: String,
}

impl WaitingEntry {
    /// Mutual compatibility of this entry with an incoming request.
    ///
    /// Mirrors the predicate used by [`crate::waiting::take_compatible_entry`].
    pub fn is_compatible_with(
        &self,
        requester_id: &str,
        requester_gender: Gender,
        requester_preference: Gender,
    ) -> bool {
        self.user_id != requester_id
            && self.gender_preference.accepts(requester_gender)
            && requester_preference.accepts(self.user_gender)
    }
}

/// Lifecycle state of a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Ended,
}

/// A paired conversation between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
    /// Time-derived session token.
    pub id: String,
    /// The requester whose match request created the session.
    pub user1_id: String,
    /// The waiting user that was consumed.
    pub user2_id: String,
    pub status: SessionStatus,
    pub created_at: String,
    pub ended_at: Option<String>,
}

impl ChatSession {
    /// The participant that is not `user_id`.
    ///
    /// An id matching neither slot resolves to `user2_id`.
    pub fn other_participant(&self, user_id: &str) -> &str {
        if self.user2_id == user_id {
            &self.user1_id
        } else {
            &self.user2_id
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

/// A chat message. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Auto-incrementing ID.
    pub id: i64,
    pub session_id: String,
    pub sender_id: String,
    pub text: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A rating left by one participant for the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Rating {
    pub session_id: String,
    pub rater_id: String,
    pub rated_id: String,
    pub rating: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Mean and count of all ratings received by a user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingAggregate {
    pub mean: f64,
    pub count: i64,
}
