//! Enumeration types for the Kickoff attendance coordinator.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// VoteState
// ---------------------------------------------------------------------------

/// The attendance state a participant currently holds.
///
/// Every observed participant has exactly one state. `Unset` participants
/// appear in none of the roster, waitlist, or declined lists.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum VoteState {
    /// Holds one of the capacity-limited seats.
    Confirmed,
    /// Wants a seat but the roster was full; queued in arrival order.
    Waitlisted,
    /// Said they cannot make it.
    Declined,
    /// No recorded vote.
    #[default]
    Unset,
}

impl VoteState {
    /// Short label used in text snapshots and logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Waitlisted => "waitlisted",
            Self::Declined => "declined",
            Self::Unset => "unset",
        }
    }
}

// ---------------------------------------------------------------------------
// VoteIntent
// ---------------------------------------------------------------------------

/// What a participant asked for when pressing a vote button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum VoteIntent {
    /// "Yes, I'll be there."
    Confirm,
    /// "No, I can't make it."
    Decline,
}

// ---------------------------------------------------------------------------
// BanReason
// ---------------------------------------------------------------------------

/// Why a ban was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BanReason {
    /// An admin banned the participant directly.
    AdminBan,
    /// The participant was confirmed but did not show up.
    NoShow,
}
