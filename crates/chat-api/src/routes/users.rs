//! User registration and profile routes.

use axum::extract::{Path, State};
use axum::Json;
use matchmaker::{Profile, RegisterRequest};

use crate::error::Result;
use crate::extract::AppJson;
use crate::state::AppState;

/// Register a user (idempotent) and return their profile.
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<Json<Profile>> {
    let user = state.matchmaker.register(&req.user_id).await?;
    Ok(Json(user.into()))
}

/// Get a user's profile.
pub async fn profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Profile>> {
    let user = state.matchmaker.profile(&user_id).await?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::test_state;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_register_then_profile() {
        let state = test_state().await;

        let Json(registered) = register(
            State(state.clone()),
            AppJson(RegisterRequest {
                user_id: "anon-1".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(registered.rating, 4.5);
        assert_eq!(registered.total_chats, 0);

        let Json(fetched) = profile(State(state), Path("anon-1".to_string()))
            .await
            .unwrap();
        assert_eq!(fetched, registered);
    }

    #[tokio::test]
    async fn test_missing_user_id() {
        let state = test_state().await;

        let err = register(State(state), AppJson(RegisterRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_profile() {
        let state = test_state().await;

        let err = profile(State(state), Path("nobody".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
