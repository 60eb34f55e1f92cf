//! Tagged request and response types.
//!
//! Each caller-facing operation is one [`Request`] variant carrying its own
//! payload, tagged by an `action` field on the wire:
//!
//! ```json
//! {"action": "find_match", "user_id": "anon-1", "user_gender": "male", "gender_preference": "any"}
//! ```
//!
//! String fields default to empty so that a missing field reaches validation
//! and is reported like any other invalid value.

use database::{Gender, Message, User};
use serde::{Deserialize, Serialize};

use crate::matching::{MatchOutcome, MatchStatus};
use crate::validation::{parse_gender, ValidationError};

/// A single caller-facing operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    Register(RegisterRequest),
    FindMatch(FindMatchRequest),
    MatchStatus(MatchStatusRequest),
    CancelMatch(CancelMatchRequest),
    SendMessage(SendMessageRequest),
    GetMessages(GetMessagesRequest),
    Rate(RateRequest),
    EndSession(EndSessionRequest),
    GetProfile(GetProfileRequest),
}

impl Request {
    /// The wire name of this request's action.
    pub fn action(&self) -> &'static str {
        match self {
            Request::Register(_) => "register",
            Request::FindMatch(_) => "find_match",
            Request::MatchStatus(_) => "match_status",
            Request::CancelMatch(_) => "cancel_match",
            Request::SendMessage(_) => "send_message",
            Request::GetMessages(_) => "get_messages",
            Request::Rate(_) => "rate",
            Request::EndSession(_) => "end_session",
            Request::GetProfile(_) => "get_profile",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindMatchRequest {
    #[serde(default)]
    pub user_id: String,
    /// `male`, `female` or `any`; empty means `any`.
    #[serde(default)]
    pub user_gender: String,
    /// `male`, `female` or `any`; empty means `any`.
    #[serde(default)]
    pub gender_preference: String,
}

impl FindMatchRequest {
    /// Parse the gender filters as `(user_gender, gender_preference)`.
    pub fn genders(&self) -> Result<(Gender, Gender), ValidationError> {
        Ok((
            parse_gender("user_gender", &self.user_gender)?,
            parse_gender("gender_preference", &self.gender_preference)?,
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStatusRequest {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelMatchRequest {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub sender_id: String,
    #[serde(default, alias = "message")]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetMessagesRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub since_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub rater_id: String,
    /// 1 to 5; a missing value reads as 0 and is rejected.
    #[serde(default)]
    pub rating: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndSessionRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetProfileRequest {
    #[serde(default)]
    pub user_id: String,
}

/// Reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Profile(Profile),
    Match(MatchResult),
    MessageSent(MessageSent),
    Messages(MessageList),
    Ack(Ack),
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub rating: f64,
    pub total_chats: i64,
    pub blocked_until: Option<String>,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            rating: user.rating,
            total_chats: user.total_chats,
            blocked_until: user.blocked_until,
        }
    }
}

/// Match result as clients expect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting: Option<bool>,
}

impl MatchResult {
    fn matched(session_id: String, partner_id: String) -> Self {
        Self {
            matched: true,
            session_id: Some(session_id),
            partner_id: Some(partner_id),
            waiting: None,
        }
    }

    fn unmatched(waiting: bool) -> Self {
        Self {
            matched: false,
            session_id: None,
            partner_id: None,
            waiting: Some(waiting),
        }
    }
}

impl From<MatchOutcome> for MatchResult {
    fn from(outcome: MatchOutcome) -> Self {
        match outcome {
            MatchOutcome::Matched {
                session_id,
                partner_id,
            } => Self::matched(session_id, partner_id),
            MatchOutcome::Waiting => Self::unmatched(true),
        }
    }
}

impl From<MatchStatus> for MatchResult {
    fn from(status: MatchStatus) -> Self {
        match status {
            MatchStatus::Matched {
                session_id,
                partner_id,
            } => Self::matched(session_id, partner_id),
            MatchStatus::Waiting => Self::unmatched(true),
            MatchStatus::Idle => Self::unmatched(false),
        }
    }
}

/// Acknowledgement of a stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSent {
    pub message_id: i64,
    pub timestamp: String,
}

impl From<Message> for MessageSent {
    fn from(message: Message) -> Self {
        Self {
            message_id: message.id,
            timestamp: message.created_at,
        }
    }
}

/// A message as returned to polling clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub id: i64,
    pub sender_id: String,
    pub text: String,
    pub timestamp: String,
}

impl From<Message> for MessageView {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            text: message.text,
            timestamp: message.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageList {
    pub messages: Vec<MessageView>,
}

impl From<Vec<Message>> for MessageList {
    fn from(messages: Vec<Message>) -> Self {
        Self {
            messages: messages.into_iter().map(MessageView::from).collect(),
        }
    }
}

/// Plain success reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
