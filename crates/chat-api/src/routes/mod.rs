//! Route handlers for the chat API.

pub mod actions;
pub mod health;
pub mod matches;
pub mod sessions;
pub mod users;

use std::time::Duration;

use axum::http::{header, HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Users
        .route("/api/users", post(users::register))
        .route("/api/users/:user_id", get(users::profile))
        // Matching
        .route("/api/match", post(matches::find_match))
        .route(
            "/api/match/:user_id",
            get(matches::match_status).delete(matches::cancel),
        )
        // Sessions
        .route(
            "/api/sessions/:session_id/messages",
            get(sessions::get_messages).post(sessions::send_message),
        )
        .route("/api/sessions/:session_id/rating", post(sessions::rate))
        .route("/api/sessions/:session_id/end", post(sessions::end_session))
        // Tagged request envelope
        .route("/api/actions", post(actions::dispatch))
        .layer(TraceLayer::new_for_http())
        .layer(cors())
}

/// Browser clients call from any origin.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-user-id")])
        .max_age(Duration::from_secs(86400))
}
