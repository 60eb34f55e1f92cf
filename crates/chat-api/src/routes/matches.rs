//! Matchmaking routes.

use axum::extract::{Path, State};
use axum::Json;
use matchmaker::{Ack, FindMatchRequest, MatchResult};

use crate::error::Result;
use crate::extract::AppJson;
use crate::state::AppState;

/// Pair the caller with a compatible waiting user, or enqueue them.
pub async fn find_match(
    State(state): State<AppState>,
    AppJson(req): AppJson<FindMatchRequest>,
) -> Result<Json<MatchResult>> {
    let (user_gender, gender_preference) = req
        .genders()
        .map_err(matchmaker::MatchmakerError::from)?;

    let outcome = state
        .matchmaker
        .matching()
        .request_match(&req.user_id, user_gender, gender_preference)
        .await?;

    Ok(Json(outcome.into()))
}

/// Report whether a user is waiting, matched, or idle.
///
/// A waiting client polls this to learn the session it was paired into.
pub async fn match_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MatchResult>> {
    let status = state.matchmaker.matching().match_status(&user_id).await?;
    Ok(Json(status.into()))
}

/// Leave the waiting pool.
pub async fn cancel(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Ack>> {
    state.matchmaker.matching().cancel(&user_id).await?;
    Ok(Json(Ack::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::test_state;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn request(user_id: &str, gender: &str, preference: &str) -> AppJson<FindMatchRequest> {
        AppJson(FindMatchRequest {
            user_id: user_id.to_string(),
            user_gender: gender.to_string(),
            gender_preference: preference.to_string(),
        })
    }

    #[tokio::test]
    async fn test_wait_then_match() {
        let state = test_state().await;

        let Json(first) = find_match(State(state.clone()), request("a", "female", "male"))
            .await
            .unwrap();
        assert!(!first.matched);
        assert_eq!(first.waiting, Some(true));

        let Json(status) = match_status(State(state.clone()), Path("a".to_string()))
            .await
            .unwrap();
        assert_eq!(status.waiting, Some(true));

        let Json(second) = find_match(State(state.clone()), request("b", "male", "female"))
            .await
            .unwrap();
        assert!(second.matched);
        assert_eq!(second.partner_id.as_deref(), Some("a"));

        // The waiting side discovers its session by polling.
        let Json(status) = match_status(State(state), Path("a".to_string()))
            .await
            .unwrap();
        assert!(status.matched);
        assert_eq!(status.session_id, second.session_id);
        assert_eq!(status.partner_id.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_cancel() {
        let state = test_state().await;

        find_match(State(state.clone()), request("a", "", ""))
            .await
            .unwrap();
        cancel(State(state.clone()), Path("a".to_string()))
            .await
            .unwrap();

        let Json(status) = match_status(State(state), Path("a".to_string()))
            .await
            .unwrap();
        assert!(!status.matched);
        assert_eq!(status.waiting, Some(false));
    }

    #[tokio::test]
    async fn test_invalid_gender() {
        let state = test_state().await;

        let err = find_match(State(state), request("a", "robot", "any"))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
