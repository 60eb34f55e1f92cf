//! Matchmaking queue and chat session lifecycle engine.
//!
//! This crate pairs anonymous users into one-to-one chat sessions and tracks
//! what happens to those sessions afterwards. All coordination between
//! concurrent requests goes through the [`database`] crate's transactions;
//! nothing here holds shared in-process state.
//!
//! # Components
//!
//! - [`MatchEngine`] consumes a match request and either pairs the requester
//!   with one compatible waiting user or parks them in the waiting pool.
//! - [`SessionManager`] appends and lists messages and ends sessions.
//! - [`ReputationAggregator`] stores a rating and recomputes the rated user's
//!   mean and count.
//! - [`Matchmaker`] owns all three and dispatches a tagged [`Request`].
//!
//! # Flow
//!
//! ```text
//! caller
//!   │ find_match
//!   ↓
//! ┌──────────────┐  waiting  ┌───────────────┐
//! │ MatchEngine  │ ────────→ │ waiting pool  │
//! └──────────────┘           └───────────────┘
//!   │ matched (session created in the same transaction)
//!   ↓
//! ┌────────────────┐  rate   ┌──────────────────────┐
//! │ SessionManager │ ──────→ │ ReputationAggregator │
//! └────────────────┘         └──────────────────────┘
//!   │ end_session
//!   ↓
//! ended
//! ```
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, Gender};
//! use matchmaker::{MatchOutcome, Matchmaker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:chat.db?mode=rwc").await?;
//!     db.migrate().await?;
//!     let matchmaker = Matchmaker::new(db);
//!
//!     matchmaker.register("anon-1").await?;
//!     match matchmaker
//!         .matching()
//!         .request_match("anon-1", Gender::Male, Gender::Any)
//!         .await?
//!     {
//!         MatchOutcome::Matched { session_id, partner_id } => {
//!             matchmaker.sessions().append_message(&session_id, "anon-1", "hi").await?;
//!             println!("talking to {partner_id}");
//!         }
//!         MatchOutcome::Waiting => println!("waiting for a partner"),
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod lifecycle;
mod matching;
mod reputation;
mod request;
mod service;
pub mod validation;

pub use error::{MatchmakerError, Result};
pub use lifecycle::{MessageCursor, SessionManager};
pub use matching::{MatchEngine, MatchOutcome, MatchStatus};
pub use reputation::{RatingOutcome, ReputationAggregator};
pub use request::{
    Ack, CancelMatchRequest, EndSessionRequest, FindMatchRequest, GetMessagesRequest,
    GetProfileRequest, MatchResult, MatchStatusRequest, MessageList, MessageSent, MessageView,
    Profile, RateRequest, RegisterRequest, Request, Response, SendMessageRequest,
};
pub use service::Matchmaker;
pub use validation::ValidationError;

pub use database::{Gender, Message};
