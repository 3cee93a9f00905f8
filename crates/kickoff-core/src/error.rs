//! Command errors.
//!
//! Every failure is local to one command invocation and is detected before
//! any state is touched, so an error always means "nothing changed".

use chrono::{DateTime, Utc};

use kickoff_types::ParticipantId;

use crate::capability::CapabilityError;

/// Why a command was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The voting window has closed; only an admin can help now.
    #[error("voting is closed")]
    VotingClosed,

    /// The participant holds an active ban.
    #[error("participant {participant} is banned until {until}")]
    ParticipantBanned {
        /// The banned participant.
        participant: ParticipantId,
        /// When the ban lapses.
        until: DateTime<Utc>,
    },

    /// The actor is not an admin.
    #[error("actor {actor} is not authorized to run admin commands")]
    NotAuthorized {
        /// The rejected actor.
        actor: ParticipantId,
    },

    /// A no-show was requested for someone who is not confirmed.
    #[error("participant {participant} is not on the roster")]
    NotOnRoster {
        /// The participant in question.
        participant: ParticipantId,
    },

    /// A ban would already be expired when written, or its expiry is out
    /// of range.
    #[error("invalid ban duration: {reason}")]
    InvalidBanDuration {
        /// What is wrong with the duration.
        reason: String,
    },

    /// The admin lookup failed; the actor may or may not be an admin.
    #[error(transparent)]
    CapabilityLookup(#[from] CapabilityError),
}
