//! The in-memory roster store.
//!
//! [`RosterStore`] keeps one record per observed participant plus three
//! ordered lists (roster, waitlist, declined) and the ban table. The lists
//! are the source of truth for ordering; the member table is the source of
//! truth for each participant's [`VoteState`]. Every mutator updates both
//! before returning.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use tracing::debug;

use kickoff_types::{Ban, BanReason, Participant, ParticipantId, VoteState};

use crate::RosterError;

/// Seats on the roster unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 20;

/// A participant and the state they currently hold.
#[derive(Debug, Clone)]
struct MemberRecord {
    participant: Participant,
    state: VoteState,
}

// ---------------------------------------------------------------------------
// RosterStore
// ---------------------------------------------------------------------------

/// Vote sets and ban table for a single event.
///
/// Records are created on first interaction and never removed. Leaving
/// every list is expressed as [`VoteState::Unset`]. Ban records are the
/// one exception: [`unban`](Self::unban) deletes them.
#[derive(Debug, Clone)]
pub struct RosterStore {
    /// Number of seats on the roster.
    capacity: usize,
    /// Everyone we have seen, keyed by ID.
    members: BTreeMap<ParticipantId, MemberRecord>,
    /// Confirmed participants in confirmation order.
    roster: Vec<ParticipantId>,
    /// Waitlisted participants, head is next to be promoted.
    waitlist: VecDeque<ParticipantId>,
    /// Participants who declined, in the order they did so.
    declined: Vec<ParticipantId>,
    /// At most one ban per participant; expired bans linger until cleared.
    bans: BTreeMap<ParticipantId, Ban>,
}

impl Default for RosterStore {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            members: BTreeMap::new(),
            roster: Vec::new(),
            waitlist: VecDeque::new(),
            declined: Vec::new(),
            bans: BTreeMap::new(),
        }
    }
}

impl RosterStore {
    /// Create an empty store with the given number of seats.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::ZeroCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, RosterError> {
        if capacity == 0 {
            return Err(RosterError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            ..Self::default()
        })
    }

    // -----------------------------------------------------------------------
    // Participants
    // -----------------------------------------------------------------------

    /// Record a participant, refreshing their display name if already known.
    pub fn observe(&mut self, participant: &Participant) {
        self.members
            .entry(participant.id)
            .and_modify(|record| {
                if record.participant.display_name != participant.display_name {
                    record
                        .participant
                        .display_name
                        .clone_from(&participant.display_name);
                }
            })
            .or_insert_with(|| MemberRecord {
                participant: participant.clone(),
                state: VoteState::Unset,
            });
    }

    /// Look up a known participant.
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.members.get(&id).map(|record| &record.participant)
    }

    /// Known participant, or a placeholder carrying the raw ID as its name.
    pub fn participant_or_unknown(&self, id: ParticipantId) -> Participant {
        self.participant(id)
            .cloned()
            .unwrap_or_else(|| Participant::unknown(id))
    }

    /// The current vote state of `id`. Unknown IDs are [`VoteState::Unset`].
    pub fn state_of(&self, id: ParticipantId) -> VoteState {
        self.members
            .get(&id)
            .map_or(VoteState::Unset, |record| record.state)
    }

    /// Every observed participant with their state, ordered by ID.
    pub fn members(&self) -> impl Iterator<Item = (&Participant, VoteState)> {
        self.members
            .values()
            .map(|record| (&record.participant, record.state))
    }

    /// Number of observed participants.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    // -----------------------------------------------------------------------
    // Vote sets
    // -----------------------------------------------------------------------

    /// Move `participant` into the list for `state` and return the state
    /// they actually ended up in.
    ///
    /// A `Confirmed` request resolves to `Waitlisted` when no seat is free.
    /// Requesting the state a participant already holds changes nothing,
    /// including their position; a waitlisted participant re-confirming
    /// while the roster is still full keeps their place in the queue.
    pub fn set_vote(&mut self, participant: &Participant, state: VoteState) -> VoteState {
        self.observe(participant);
        let id = participant.id;
        let current = self.state_of(id);

        let unchanged = match (current, state) {
            (VoteState::Waitlisted, VoteState::Confirmed) => !self.has_free_seat(),
            (held, requested) => held == requested,
        };
        if unchanged {
            debug!(participant = %id, state = current.label(), "vote unchanged");
            return current;
        }

        self.detach(id);
        let effective = match state {
            VoteState::Confirmed if self.has_free_seat() => {
                self.roster.push(id);
                VoteState::Confirmed
            }
            VoteState::Confirmed | VoteState::Waitlisted => {
                self.waitlist.push_back(id);
                VoteState::Waitlisted
            }
            VoteState::Declined => {
                self.declined.push(id);
                VoteState::Declined
            }
            VoteState::Unset => VoteState::Unset,
        };
        self.record_state(id, effective);
        effective
    }

    /// Remove `id` from the roster, leaving them [`VoteState::Unset`].
    ///
    /// Returns `true` if a seat was freed.
    pub fn remove_from_roster(&mut self, id: ParticipantId) -> bool {
        let Some(pos) = self.roster.iter().position(|&p| p == id) else {
            return false;
        };
        self.roster.remove(pos);
        self.record_state(id, VoteState::Unset);
        true
    }

    /// Remove `id` from the waitlist, leaving them [`VoteState::Unset`].
    ///
    /// Returns `true` if they were queued.
    pub fn remove_from_waitlist(&mut self, id: ParticipantId) -> bool {
        let Some(pos) = self.waitlist.iter().position(|&p| p == id) else {
            return false;
        };
        self.waitlist.remove(pos);
        self.record_state(id, VoteState::Unset);
        true
    }

    /// Promote the head of the waitlist if a seat is free.
    ///
    /// Returns the promoted participant, or `None` if the roster is full or
    /// nobody is waiting.
    pub fn promote_next(&mut self) -> Option<Participant> {
        if !self.has_free_seat() {
            return None;
        }
        let id = self.waitlist.pop_front()?;
        self.roster.push(id);
        self.record_state(id, VoteState::Confirmed);
        debug!(participant = %id, roster_len = self.roster.len(), "promoted from waitlist");
        Some(self.participant_or_unknown(id))
    }

    /// Seats on the roster.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the roster has room for one more participant.
    pub fn has_free_seat(&self) -> bool {
        self.roster.len() < self.capacity
    }

    /// Confirmed IDs in confirmation order.
    pub fn confirmed_ids(&self) -> &[ParticipantId] {
        &self.roster
    }

    /// Confirmed participants in confirmation order.
    pub fn confirmed(&self) -> Vec<Participant> {
        self.roster
            .iter()
            .map(|&id| self.participant_or_unknown(id))
            .collect()
    }

    /// Waitlisted participants, head first.
    pub fn waitlisted(&self) -> Vec<Participant> {
        self.waitlist
            .iter()
            .map(|&id| self.participant_or_unknown(id))
            .collect()
    }

    /// Participants who declined, in the order they did so.
    pub fn declined(&self) -> Vec<Participant> {
        self.declined
            .iter()
            .map(|&id| self.participant_or_unknown(id))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Bans
    // -----------------------------------------------------------------------

    /// Write a ban for `id`, replacing any existing one.
    ///
    /// Durations are not reconciled: the last write wins even if it is
    /// shorter. Returns the replaced ban, if any.
    pub fn ban_until(
        &mut self,
        id: ParticipantId,
        reason: BanReason,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Option<Ban> {
        self.bans.insert(
            id,
            Ban {
                participant_id: id,
                reason,
                issued_at,
                expires_at,
            },
        )
    }

    /// Delete the ban record for `id`. Returns the removed ban, if any.
    pub fn unban(&mut self, id: ParticipantId) -> Option<Ban> {
        self.bans.remove(&id)
    }

    /// Whether `id` holds a ban that has not yet expired at `now`.
    pub fn is_banned(&self, id: ParticipantId, now: DateTime<Utc>) -> bool {
        self.bans.get(&id).is_some_and(|ban| ban.is_active(now))
    }

    /// The ban record for `id`, active or not.
    pub fn ban(&self, id: ParticipantId) -> Option<&Ban> {
        self.bans.get(&id)
    }

    /// Every ban record, including expired ones, ordered by participant.
    pub fn bans(&self) -> impl Iterator<Item = &Ban> {
        self.bans.values()
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    /// Verify the capacity bound, list exclusivity, and state consistency.
    ///
    /// # Errors
    ///
    /// Returns the first [`RosterError`] violation found.
    pub fn check_invariants(&self) -> Result<(), RosterError> {
        if self.roster.len() > self.capacity {
            return Err(RosterError::OverCapacity {
                len: self.roster.len(),
                capacity: self.capacity,
            });
        }

        let mut listed: BTreeMap<ParticipantId, VoteState> = BTreeMap::new();
        let lists = self
            .roster
            .iter()
            .map(|&id| (id, VoteState::Confirmed))
            .chain(self.waitlist.iter().map(|&id| (id, VoteState::Waitlisted)))
            .chain(self.declined.iter().map(|&id| (id, VoteState::Declined)));
        for (id, state) in lists {
            if listed.insert(id, state).is_some() {
                return Err(RosterError::DuplicateMembership(id));
            }
        }

        for (&id, record) in &self.members {
            let implied = listed.get(&id).copied().unwrap_or(VoteState::Unset);
            if implied != record.state {
                return Err(RosterError::StateMismatch {
                    participant: id,
                    recorded: record.state.label(),
                    listed: implied.label(),
                });
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Drop `id` from whichever list holds it. No-op if absent.
    fn detach(&mut self, id: ParticipantId) {
        match self.state_of(id) {
            VoteState::Confirmed => self.roster.retain(|&p| p != id),
            VoteState::Waitlisted => self.waitlist.retain(|&p| p != id),
            VoteState::Declined => self.declined.retain(|&p| p != id),
            VoteState::Unset => {}
        }
    }

    fn record_state(&mut self, id: ParticipantId, state: VoteState) {
        if let Some(record) = self.members.get_mut(&id) {
            record.state = state;
        }
    }
}
