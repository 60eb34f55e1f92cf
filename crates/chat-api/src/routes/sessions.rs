//! Chat session routes: messages, ratings, termination.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use matchmaker::{Ack, MessageList, MessageSent};
use serde::Deserialize;

use crate::error::Result;
use crate::extract::{AppJson, AppQuery};
use crate::state::AppState;

/// Body of a message post.
#[derive(Debug, Default, Deserialize)]
pub struct SendMessageBody {
    #[serde(default)]
    pub sender_id: String,
    #[serde(default, alias = "message")]
    pub text: String,
}

/// Polling cursor for message reads.
#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    #[serde(default)]
    pub since_id: i64,
}

/// Body of a rating submission.
#[derive(Debug, Default, Deserialize)]
pub struct RateBody {
    #[serde(default)]
    pub rater_id: String,
    #[serde(default)]
    pub rating: i64,
}

/// Body of an end-session request.
#[derive(Debug, Default, Deserialize)]
pub struct EndSessionBody {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Append a message to a session.
pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    AppJson(body): AppJson<SendMessageBody>,
) -> Result<Json<MessageSent>> {
    let stored = state
        .matchmaker
        .sessions()
        .append_message(&session_id, &body.sender_id, &body.text)
        .await?;
    Ok(Json(stored.into()))
}

/// List messages newer than `since_id`.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    AppQuery(query): AppQuery<MessagesQuery>,
) -> Result<Json<MessageList>> {
    let messages = state
        .matchmaker
        .sessions()
        .list_messages(&session_id, query.since_id)
        .await?;
    Ok(Json(messages.into()))
}

/// Rate the other participant of a session.
pub async fn rate(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    AppJson(body): AppJson<RateBody>,
) -> Result<Json<Ack>> {
    state
        .matchmaker
        .reputation()
        .rate(&session_id, &body.rater_id, body.rating)
        .await?;
    Ok(Json(Ack::ok()))
}

/// End a session.
///
/// The body is optional; without one no waiting entry is cleared.
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Result<Json<Ack>> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        EndSessionBody::default()
    } else {
        Json::<EndSessionBody>::from_bytes(&body)?.0
    };

    state
        .matchmaker
        .sessions()
        .end_session(&session_id, body.user_id.as_deref())
        .await?;
    Ok(Json(Ack::ok()))
}
