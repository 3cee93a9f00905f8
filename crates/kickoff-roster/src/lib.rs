//! Roster store for the Kickoff attendance coordinator.
//!
//! The store owns every piece of mutable attendance state for one event:
//! the vote state of each observed participant, the three ordered lists
//! derived from it, and the ban table.
//!
//! # Invariants
//!
//! After every public mutator returns:
//!
//! ```text
//! len(roster) <= capacity
//! every participant appears in at most one of {roster, waitlist, declined}
//! a participant's list matches their recorded VoteState
//! ```
//!
//! [`RosterStore::check_invariants`] verifies all three and is run by the
//! tests after every step.
//!
//! # Promotion
//!
//! Shrinking the roster never promotes on its own. Callers run
//! [`RosterStore::promote_next`] after a decline, a no-show, or an
//! eviction so that each mutator stays testable in isolation.
//!
//! # Usage
//!
//! ```
//! use kickoff_roster::RosterStore;
//! use kickoff_types::{Participant, ParticipantId, VoteState};
//!
//! let Ok(mut store) = RosterStore::new(1) else { return };
//! let ana = Participant::new(ParticipantId(1), "Ana");
//! let ben = Participant::new(ParticipantId(2), "Ben");
//!
//! assert_eq!(store.set_vote(&ana, VoteState::Confirmed), VoteState::Confirmed);
//! assert_eq!(store.set_vote(&ben, VoteState::Confirmed), VoteState::Waitlisted);
//!
//! store.set_vote(&ana, VoteState::Declined);
//! let promoted = store.promote_next();
//! assert_eq!(promoted.map(|p| p.id), Some(ParticipantId(2)));
//! ```

pub mod store;

pub use store::{DEFAULT_CAPACITY, RosterStore};

use kickoff_types::ParticipantId;

/// Violations reported by [`RosterStore::check_invariants`] and
/// construction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    /// A roster must have at least one seat.
    #[error("roster capacity must be at least 1")]
    ZeroCapacity,

    /// More confirmed participants than seats.
    #[error("roster holds {len} participants but capacity is {capacity}")]
    OverCapacity {
        /// Current roster length.
        len: usize,
        /// Configured capacity.
        capacity: usize,
    },

    /// A participant appears in more than one list, or twice in one.
    #[error("participant {0} appears in more than one list")]
    DuplicateMembership(ParticipantId),

    /// A participant's recorded state disagrees with the list holding them.
    #[error("participant {participant} is recorded as {recorded} but listed as {listed}")]
    StateMismatch {
        /// The participant.
        participant: ParticipantId,
        /// State recorded in the member table.
        recorded: &'static str,
        /// State implied by list membership.
        listed: &'static str,
    },
}
