//! The attendance engine.
//!
//! Turns a participant's button press into a roster store mutation. A vote
//! is rejected, with nothing changed, when the voting window has closed or
//! the participant holds an active ban. Otherwise the store applies the
//! vote and one promotion attempt runs: leaving the roster frees at most
//! one seat, so at most one waitlisted participant can move up.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use kickoff_roster::RosterStore;
use kickoff_types::{Participant, VoteIntent, VoteState};

use crate::error::CommandError;
use crate::window::VotingWindow;

/// Result of an accepted vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    /// State held before the vote.
    pub previous_state: VoteState,
    /// State the participant actually ended up in. A confirmation can
    /// resolve to [`VoteState::Waitlisted`].
    pub effective_state: VoteState,
    /// Waitlisted participant who took the seat this vote freed.
    pub promoted: Option<Participant>,
}

impl VoteOutcome {
    /// Whether the vote changed anything.
    pub fn changed(&self) -> bool {
        self.previous_state != self.effective_state || self.promoted.is_some()
    }
}

/// Map a button press onto the state it requests.
pub const fn requested_state(intent: VoteIntent) -> VoteState {
    match intent {
        VoteIntent::Confirm => VoteState::Confirmed,
        VoteIntent::Decline => VoteState::Declined,
    }
}

/// Apply `participant`'s vote at `now`.
///
/// # Errors
///
/// - [`CommandError::VotingClosed`] if `window` no longer accepts votes.
/// - [`CommandError::ParticipantBanned`] if the participant has an active
///   ban at `now`.
pub fn vote(
    store: &mut RosterStore,
    window: &VotingWindow,
    participant: &Participant,
    intent: VoteIntent,
    now: DateTime<Utc>,
) -> Result<VoteOutcome, CommandError> {
    if !window.is_open(now) {
        debug!(participant = %participant.id, "vote rejected: voting closed");
        return Err(CommandError::VotingClosed);
    }
    if let Some(ban) = store.ban(participant.id).filter(|ban| ban.is_active(now)) {
        debug!(participant = %participant.id, until = %ban.expires_at, "vote rejected: banned");
        return Err(CommandError::ParticipantBanned {
            participant: participant.id,
            until: ban.expires_at,
        });
    }

    let previous_state = store.state_of(participant.id);
    let effective_state = store.set_vote(participant, requested_state(intent));
    let promoted = store.promote_next();

    info!(
        participant = %participant.id,
        previous = previous_state.label(),
        state = effective_state.label(),
        promoted = ?promoted.as_ref().map(|p| p.id),
        "vote applied"
    );

    Ok(VoteOutcome {
        previous_state,
        effective_state,
        promoted,
    })
}
