//! Application state shared across handlers.

use matchmaker::Matchmaker;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Matching, session and reputation operations.
    pub matchmaker: Matchmaker,
}

impl AppState {
    /// Create new application state.
    pub fn new(matchmaker: Matchmaker) -> Self {
        Self { matchmaker }
    }
}
