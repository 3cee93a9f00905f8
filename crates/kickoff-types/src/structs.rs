//! Core record types shared between the roster store, the engines, and
//! the transport adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BanReason, VoteState};
use crate::ids::{EventId, ParticipantId};

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// A chat participant as last observed.
///
/// The ID never changes; the display name is refreshed on every
/// interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Participant {
    /// Opaque platform identifier.
    pub id: ParticipantId,
    /// Name shown in rosters and reports.
    pub display_name: String,
}

impl Participant {
    /// Build a participant record.
    pub fn new(id: ParticipantId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    /// Placeholder record for an ID that has never interacted with us.
    pub fn unknown(id: ParticipantId) -> Self {
        Self {
            id,
            display_name: id.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Ban
// ---------------------------------------------------------------------------

/// A time-bounded voting ban.
///
/// A ban whose `expires_at` is in the past is inert. It stays in the
/// table until an admin clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Ban {
    /// The banned participant.
    pub participant_id: ParticipantId,
    /// Why the ban was issued.
    pub reason: BanReason,
    /// When the ban was written.
    pub issued_at: DateTime<Utc>,
    /// The ban is active while `now < expires_at`.
    pub expires_at: DateTime<Utc>,
}

impl Ban {
    /// Whether the ban still restricts voting at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// How long an admin ban lasts.
///
/// Mirrors the admin menu: a preset number of days, or a custom date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BanDuration {
    /// Ban for this many whole days from now.
    Days(u32),
    /// Ban until this instant.
    Until(DateTime<Utc>),
}

/// A ban entry as shown in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveBan {
    /// The banned participant (placeholder name if never observed).
    pub participant: Participant,
    /// Why the ban was issued.
    pub reason: BanReason,
    /// When the ban lapses.
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Read-only snapshot of attendance and moderation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Report {
    /// When the snapshot was taken.
    pub generated_at: DateTime<Utc>,
    /// Seats available on the roster.
    pub capacity: u32,
    /// Confirmed participants, in confirmation order.
    pub confirmed: Vec<Participant>,
    /// Waitlisted participants, head first.
    pub waitlisted: Vec<Participant>,
    /// Participants who declined.
    pub declined: Vec<Participant>,
    /// Bans with `expires_at > generated_at`.
    pub active_bans: Vec<ActiveBan>,
    /// Whether votes are still accepted at `generated_at`.
    pub voting_open: bool,
}

// ---------------------------------------------------------------------------
// Event details
// ---------------------------------------------------------------------------

/// The published event participants vote on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventDetails {
    /// Identifier assigned on first publication.
    pub id: EventId,
    /// Short headline, e.g. "Saturday Social Soccer".
    pub title: String,
    /// Free-form details (venue, time, notes).
    pub description: String,
    /// Kick-off time. Voting closes a fixed interval before it.
    pub starts_at: DateTime<Utc>,
}

/// What an admin submits when publishing or editing the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventDraft {
    /// Short headline.
    pub title: String,
    /// Free-form details.
    #[serde(default)]
    pub description: String,
    /// Kick-off time.
    pub starts_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Member directory
// ---------------------------------------------------------------------------

/// One row of the member directory used by admin pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MemberEntry {
    /// The participant.
    pub participant: Participant,
    /// Their current vote state.
    pub state: VoteState,
    /// Expiry of their active ban, if any.
    pub banned_until: Option<DateTime<Utc>>,
}

/// A page of the member directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MemberPage {
    /// Zero-based page index.
    pub page: u32,
    /// Total number of known members.
    pub total: u32,
    /// Whether another page follows.
    pub has_next: bool,
    /// Rows on this page, ordered by participant ID.
    pub members: Vec<MemberEntry>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn ban_is_inert_at_expiry() {
        let now = Utc::now();
        let ban = Ban {
            participant_id: ParticipantId(1),
            reason: BanReason::AdminBan,
            issued_at: now,
            expires_at: now,
        };
        assert!(!ban.is_active(now));
        assert!(ban.is_active(now - TimeDelta::seconds(1)));
    }

    #[test]
    fn ban_duration_wire_format() {
        let json = serde_json::to_string(&BanDuration::Days(14)).ok();
        assert_eq!(json.as_deref(), Some(r#"{"days":14}"#));
    }

    #[test]
    fn unknown_participant_uses_id_as_name() {
        let p = Participant::unknown(ParticipantId(42));
        assert_eq!(p.display_name, "42");
    }
}
