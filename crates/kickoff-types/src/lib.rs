//! Shared type definitions for the Kickoff attendance coordinator.
//!
//! Every crate in the workspace speaks in these types. They are
//! serde-serializable and exported to `TypeScript` via `ts-rs` so the chat
//! adapter and admin dashboard share one vocabulary with the core.
//!
//! # Modules
//!
//! - [`ids`] -- Participant and event identifiers
//! - [`enums`] -- Vote states, vote intents, ban reasons
//! - [`structs`] -- Participants, bans, reports, event details, member pages

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{BanReason, VoteIntent, VoteState};
pub use ids::{EventId, ParticipantId};
pub use structs::{
    ActiveBan, Ban, BanDuration, EventDetails, EventDraft, MemberEntry, MemberPage, Participant,
    Report,
};
