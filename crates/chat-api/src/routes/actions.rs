//! Tagged request envelope.
//!
//! Accepts any [`Request`] as `{"action": "...", ...fields}` so that clients
//! speaking the single-endpoint protocol keep working.

use axum::extract::State;
use axum::Json;
use matchmaker::{Request, Response};

use crate::error::Result;
use crate::extract::AppJson;
use crate::state::AppState;

/// Dispatch one tagged request.
pub async fn dispatch(
    State(state): State<AppState>,
    AppJson(request): AppJson<Request>,
) -> Result<Json<Response>> {
    let response = state.matchmaker.handle(request).await?;
    Ok(Json(response))
}
