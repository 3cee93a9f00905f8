//! HTTP command API for the Kickoff attendance coordinator.
//!
//! This crate exposes [`CoordinatorService`] over Axum so a chat adapter
//! (or anything else that speaks JSON) can drive it:
//!
//! - **Participant endpoints** for voting and read-only views (report,
//!   member directory, event, ban status)
//! - **Admin endpoints** for bans, no-shows, closing voting, and
//!   publishing the event
//!
//! Every handler reads `now` from the [`AppState`] clock, so tests can
//! drive the voting window deterministically.
//!
//! [`CoordinatorService`]: kickoff_core::CoordinatorService

pub mod admin;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
