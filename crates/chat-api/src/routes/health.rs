//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    /// Size of the waiting pool; absent when storage is unreachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waiting: Option<i64>,
}

/// Report liveness and the waiting pool size.
///
/// Answers 503 when the database cannot be queried.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    match state.matchmaker.matching().waiting_count().await {
        Ok(waiting) => (
            StatusCode::OK,
            Json(Health {
                status: "ok",
                waiting: Some(waiting),
            }),
        ),
        Err(err) => {
            tracing::error!(error = %err, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Health {
                    status: "unavailable",
                    waiting: None,
                }),
            )
        }
    }
}
