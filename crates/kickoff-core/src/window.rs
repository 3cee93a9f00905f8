//! The voting window.
//!
//! Votes are accepted until a fixed interval before kick-off, or until an
//! admin closes voting by hand, whichever comes first. Closing is
//! permanent. Moderation commands ignore the window entirely.

use chrono::{DateTime, TimeDelta, Utc};

/// When votes stop being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingWindow {
    /// Kick-off time, once an event has been published.
    event_start: Option<DateTime<Utc>>,
    /// How long before kick-off voting closes.
    close_before: TimeDelta,
    /// Set by an admin; never cleared.
    closed_manually: bool,
}

impl VotingWindow {
    /// A window with no event yet. Votes are accepted until one is
    /// scheduled and its cutoff passes, or an admin closes voting.
    pub const fn new(close_before: TimeDelta) -> Self {
        Self {
            event_start: None,
            close_before,
            closed_manually: false,
        }
    }

    /// Set or move the kick-off time.
    pub const fn schedule(&mut self, event_start: DateTime<Utc>) {
        self.event_start = Some(event_start);
    }

    /// Close voting for good. Returns `false` if it was already closed by
    /// hand.
    pub const fn close(&mut self) -> bool {
        let was_open = !self.closed_manually;
        self.closed_manually = true;
        was_open
    }

    /// The instant at which votes stop being accepted, if scheduled.
    ///
    /// Saturates at the earliest representable instant.
    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        self.event_start.map(|start| {
            start
                .checked_sub_signed(self.close_before)
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        })
    }

    /// Whether a vote at `now` is accepted.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        !self.closed_manually && self.cutoff().is_none_or(|cutoff| now < cutoff)
    }

    /// Whether an admin has closed voting.
    pub const fn is_closed_manually(&self) -> bool {
        self.closed_manually
    }

    /// Kick-off time, if scheduled.
    pub const fn event_start(&self) -> Option<DateTime<Utc>> {
        self.event_start
    }
}
