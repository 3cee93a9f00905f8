//! The moderation engine.
//!
//! Admin-only operations: bans, unbans, no-show marking, closing the vote,
//! and publishing the event. Every entry point takes an [`Admin`] proof,
//! which can only be obtained from [`authorize`]. The capability lookup
//! therefore always happens before any state is touched, and outside
//! whatever lock the caller holds on the store.
//!
//! # Ban lifecycle
//!
//! ```text
//! Unbanned --ban_member--> Banned(expires_at)
//! Banned --time passes, expires_at <= now--> effectively Unbanned (record kept)
//! Banned | expired --unban_member--> Unbanned (record removed)
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{info, warn};

use kickoff_roster::RosterStore;
use kickoff_types::{
    Ban, BanDuration, BanReason, EventDetails, EventDraft, EventId, Participant, ParticipantId,
    VoteState,
};

use crate::capability::AdminCheck;
use crate::config::ModerationConfig;
use crate::error::CommandError;
use crate::window::VotingWindow;

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Proof that an actor passed the admin check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admin {
    actor: ParticipantId,
}

impl Admin {
    /// The authorized actor.
    pub const fn actor(self) -> ParticipantId {
        self.actor
    }
}

/// Run the capability check for `actor`.
///
/// # Errors
///
/// - [`CommandError::NotAuthorized`] if the check answers "no".
/// - [`CommandError::CapabilityLookup`] if the check itself failed.
pub fn authorize(check: &dyn AdminCheck, actor: ParticipantId) -> Result<Admin, CommandError> {
    match check.is_admin(actor) {
        Ok(true) => Ok(Admin { actor }),
        Ok(false) => {
            warn!(actor = %actor, "admin command rejected: not authorized");
            Err(CommandError::NotAuthorized { actor })
        }
        Err(e) => {
            warn!(actor = %actor, error = %e, "admin command rejected: lookup failed");
            Err(CommandError::CapabilityLookup(e))
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of [`ban_member`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanOutcome {
    /// The ban as written.
    pub ban: Ban,
    /// The ban it replaced, if any.
    pub replaced: Option<Ban>,
    /// State the participant was evicted from, when eviction is enabled.
    pub evicted_from: Option<VoteState>,
    /// Waitlisted participant who took the evicted seat.
    pub promoted: Option<Participant>,
}

/// Result of [`mark_no_show`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoShowOutcome {
    /// The no-show ban as written.
    pub ban: Ban,
    /// Waitlisted participant who took the freed seat.
    pub promoted: Option<Participant>,
}

/// Result of [`close_voting`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseOutcome {
    /// `false` if voting had already been closed by hand.
    pub newly_closed: bool,
    /// Roster at the moment of closing.
    pub confirmed: Vec<Participant>,
}

/// Result of [`publish_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// The event as now published.
    pub event: EventDetails,
    /// `true` if an already published event was edited.
    pub updated: bool,
    /// Confirmed participants to tell about the edit. Empty on first
    /// publication.
    pub notify: Vec<Participant>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Resolve a requested ban length into an expiry instant.
///
/// # Errors
///
/// Returns [`CommandError::InvalidBanDuration`] if the expiry is out of
/// range or would not lie after `now`.
pub fn ban_expiry(duration: BanDuration, now: DateTime<Utc>) -> Result<DateTime<Utc>, CommandError> {
    let expires_at = match duration {
        BanDuration::Days(days) => TimeDelta::try_days(i64::from(days))
            .and_then(|delta| now.checked_add_signed(delta))
            .ok_or_else(|| CommandError::InvalidBanDuration {
                reason: format!("{days} days is out of range"),
            })?,
        BanDuration::Until(until) => until,
    };
    if expires_at <= now {
        return Err(CommandError::InvalidBanDuration {
            reason: format!("expiry {expires_at} is not in the future"),
        });
    }
    Ok(expires_at)
}

/// Ban `target` for `duration`.
///
/// The ban restricts future votes only. Current roster or waitlist
/// membership is left alone unless `policy.evict_on_ban` is set, in which
/// case the participant is removed and one promotion attempt runs.
///
/// # Errors
///
/// Returns [`CommandError::InvalidBanDuration`] if the expiry would not
/// lie after `now`.
pub fn ban_member(
    store: &mut RosterStore,
    admin: Admin,
    target: ParticipantId,
    duration: BanDuration,
    now: DateTime<Utc>,
    policy: &ModerationConfig,
) -> Result<BanOutcome, CommandError> {
    let expires_at = ban_expiry(duration, now)?;
    let replaced = store.ban_until(target, BanReason::AdminBan, now, expires_at);

    let mut evicted_from = None;
    let mut promoted = None;
    if policy.evict_on_ban {
        match store.state_of(target) {
            VoteState::Confirmed => {
                store.remove_from_roster(target);
                evicted_from = Some(VoteState::Confirmed);
                promoted = store.promote_next();
            }
            VoteState::Waitlisted => {
                store.remove_from_waitlist(target);
                evicted_from = Some(VoteState::Waitlisted);
            }
            VoteState::Declined | VoteState::Unset => {}
        }
    }

    info!(
        actor = %admin.actor(),
        participant = %target,
        until = %expires_at,
        evicted = ?evicted_from,
        "participant banned"
    );

    let ban = Ban {
        participant_id: target,
        reason: BanReason::AdminBan,
        issued_at: now,
        expires_at,
    };
    Ok(BanOutcome {
        ban,
        replaced,
        evicted_from,
        promoted,
    })
}

/// Clear any ban on `target`. Unbanning someone who is not banned is a
/// no-op. Returns the removed ban, if there was one.
pub fn unban_member(store: &mut RosterStore, admin: Admin, target: ParticipantId) -> Option<Ban> {
    let removed = store.unban(target);
    info!(
        actor = %admin.actor(),
        participant = %target,
        had_ban = removed.is_some(),
        "participant unbanned"
    );
    removed
}

/// Mark a confirmed participant as a no-show: remove them from the
/// roster, ban them for `policy.no_show_ban_days`, and promote the head of
/// the waitlist into the freed seat.
///
/// # Errors
///
/// - [`CommandError::NotOnRoster`] if `target` is not confirmed.
/// - [`CommandError::InvalidBanDuration`] if the ban expiry is out of range.
pub fn mark_no_show(
    store: &mut RosterStore,
    admin: Admin,
    target: ParticipantId,
    now: DateTime<Utc>,
    policy: &ModerationConfig,
) -> Result<NoShowOutcome, CommandError> {
    if store.state_of(target) != VoteState::Confirmed {
        return Err(CommandError::NotOnRoster {
            participant: target,
        });
    }
    let expires_at = ban_expiry(BanDuration::Days(policy.no_show_ban_days), now)?;

    store.remove_from_roster(target);
    store.ban_until(target, BanReason::NoShow, now, expires_at);
    let promoted = store.promote_next();

    info!(
        actor = %admin.actor(),
        participant = %target,
        until = %expires_at,
        promoted = ?promoted.as_ref().map(|p| p.id),
        "participant marked as no-show"
    );

    Ok(NoShowOutcome {
        ban: Ban {
            participant_id: target,
            reason: BanReason::NoShow,
            issued_at: now,
            expires_at,
        },
        promoted,
    })
}

/// Close voting for good and snapshot the roster.
pub fn close_voting(
    store: &RosterStore,
    window: &mut VotingWindow,
    admin: Admin,
    now: DateTime<Utc>,
) -> CloseOutcome {
    let newly_closed = window.close();
    let confirmed = store.confirmed();
    info!(
        actor = %admin.actor(),
        at = %now,
        newly_closed,
        confirmed = confirmed.len(),
        "voting closed"
    );
    CloseOutcome {
        newly_closed,
        confirmed,
    }
}

/// Publish the event, or edit it if one is already published.
///
/// Moves the voting cutoff along with the kick-off time. Edits keep the
/// event's ID and report the confirmed participants who should hear
/// about the change.
pub fn publish_event(
    store: &RosterStore,
    window: &mut VotingWindow,
    current: &mut Option<EventDetails>,
    admin: Admin,
    draft: EventDraft,
) -> PublishOutcome {
    let updated = current.is_some();
    let id = current.as_ref().map_or_else(EventId::new, |event| event.id);
    let event = EventDetails {
        id,
        title: draft.title,
        description: draft.description,
        starts_at: draft.starts_at,
    };
    window.schedule(event.starts_at);
    *current = Some(event.clone());

    let notify = if updated {
        store.confirmed()
    } else {
        Vec::new()
    };
    info!(
        actor = %admin.actor(),
        event = %event.id,
        starts_at = %event.starts_at,
        updated,
        "event published"
    );

    PublishOutcome {
        event,
        updated,
        notify,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use crate::capability::{CapabilityError, StaticAdmins};

    use super::*;

    struct BrokenLookup;

    impl AdminCheck for BrokenLookup {
        fn is_admin(&self, actor: ParticipantId) -> Result<bool, CapabilityError> {
            Err(CapabilityError {
                actor,
                message: "chat API unavailable".to_owned(),
            })
        }
    }

    const ADMIN: ParticipantId = ParticipantId(900);

    fn admin() -> Admin {
        authorize(&StaticAdmins::new(None, [ADMIN]), ADMIN).unwrap()
    }

    fn person(id: i64) -> Participant {
        Participant::new(ParticipantId(id), format!("Player {id}"))
    }

    fn store_with(capacity: usize, confirmations: i64) -> RosterStore {
        let mut store = RosterStore::new(capacity).unwrap();
        for id in 1..=confirmations {
            store.set_vote(&person(id), VoteState::Confirmed);
        }
        store
    }

    // -----------------------------------------------------------------------
    // authorize
    // -----------------------------------------------------------------------

    #[test]
    fn non_admin_is_not_authorized() {
        let check = StaticAdmins::new(None, [ADMIN]);
        let err = authorize(&check, ParticipantId(1)).unwrap_err();
        assert_eq!(
            err,
            CommandError::NotAuthorized {
                actor: ParticipantId(1)
            }
        );
    }

    #[test]
    fn lookup_failure_is_distinct_from_denial() {
        let err = authorize(&BrokenLookup, ADMIN).unwrap_err();
        assert!(matches!(err, CommandError::CapabilityLookup(_)));
    }

    // -----------------------------------------------------------------------
    // ban_member / unban_member
    // -----------------------------------------------------------------------

    #[test]
    fn ban_for_preset_days() {
        let now = Utc::now();
        let mut store = RosterStore::default();
        let outcome = ban_member(
            &mut store,
            admin(),
            ParticipantId(5),
            BanDuration::Days(14),
            now,
            &ModerationConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome.ban.expires_at, now + TimeDelta::days(14));
        assert_eq!(outcome.ban.reason, BanReason::AdminBan);
        assert!(store.is_banned(ParticipantId(5), now));
    }

    #[test]
    fn ban_until_custom_date() {
        let now = Utc::now();
        let until = now + TimeDelta::days(3);
        let mut store = RosterStore::default();
        let outcome = ban_member(
            &mut store,
            admin(),
            ParticipantId(5),
            BanDuration::Until(until),
            now,
            &ModerationConfig::default(),
        )
        .unwrap();
        assert_eq!(outcome.ban.expires_at, until);
    }

    #[test]
    fn past_expiry_is_rejected_without_writing() {
        let now = Utc::now();
        let mut store = RosterStore::default();
        for duration in [BanDuration::Days(0), BanDuration::Until(now - TimeDelta::hours(1))] {
            let err = ban_member(
                &mut store,
                admin(),
                ParticipantId(5),
                duration,
                now,
                &ModerationConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, CommandError::InvalidBanDuration { .. }));
        }
        assert_eq!(store.bans().count(), 0);
    }

    #[test]
    fn ban_keeps_membership_by_default() {
        let now = Utc::now();
        let mut store = store_with(2, 3);
        let outcome = ban_member(
            &mut store,
            admin(),
            ParticipantId(1),
            BanDuration::Days(7),
            now,
            &ModerationConfig::default(),
        )
        .unwrap();

        assert!(outcome.evicted_from.is_none());
        assert_eq!(store.state_of(ParticipantId(1)), VoteState::Confirmed);
        assert_eq!(store.state_of(ParticipantId(3)), VoteState::Waitlisted);
    }

    #[test]
    fn ban_with_eviction_promotes_next() {
        let now = Utc::now();
        let mut store = store_with(2, 3);
        let policy = ModerationConfig {
            evict_on_ban: true,
            ..ModerationConfig::default()
        };
        let outcome = ban_member(
            &mut store,
            admin(),
            ParticipantId(1),
            BanDuration::Days(7),
            now,
            &policy,
        )
        .unwrap();

        assert_eq!(outcome.evicted_from, Some(VoteState::Confirmed));
        assert_eq!(outcome.promoted.map(|p| p.id), Some(ParticipantId(3)));
        assert_eq!(store.state_of(ParticipantId(1)), VoteState::Unset);
        store.check_invariants().unwrap();
    }

    #[test]
    fn unban_is_unconditional() {
        let now = Utc::now();
        let mut store = RosterStore::default();
        assert!(unban_member(&mut store, admin(), ParticipantId(5)).is_none());

        store.ban_until(ParticipantId(5), BanReason::AdminBan, now, now + TimeDelta::days(1));
        assert!(unban_member(&mut store, admin(), ParticipantId(5)).is_some());
        assert!(!store.is_banned(ParticipantId(5), now));
    }

    // -----------------------------------------------------------------------
    // mark_no_show
    // -----------------------------------------------------------------------

    #[test]
    fn no_show_removes_bans_and_promotes() {
        let now = Utc::now();
        let mut store = store_with(2, 3);
        let outcome = mark_no_show(
            &mut store,
            admin(),
            ParticipantId(2),
            now,
            &ModerationConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome.ban.reason, BanReason::NoShow);
        assert_eq!(outcome.ban.expires_at, now + TimeDelta::weeks(1));
        assert_eq!(outcome.promoted.map(|p| p.id), Some(ParticipantId(3)));
        assert_eq!(store.state_of(ParticipantId(2)), VoteState::Unset);
        assert!(store.is_banned(ParticipantId(2), now));
        store.check_invariants().unwrap();
    }

    #[test]
    fn no_show_requires_confirmed() {
        let now = Utc::now();
        let mut store = store_with(1, 2);
        let err = mark_no_show(
            &mut store,
            admin(),
            ParticipantId(2),
            now,
            &ModerationConfig::default(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            CommandError::NotOnRoster {
                participant: ParticipantId(2)
            }
        );
        assert!(!store.is_banned(ParticipantId(2), now));
        assert_eq!(store.state_of(ParticipantId(2)), VoteState::Waitlisted);
    }

    // -----------------------------------------------------------------------
    // close_voting / publish_event
    // -----------------------------------------------------------------------

    #[test]
    fn close_is_idempotent_and_snapshots_roster() {
        let store = store_with(5, 2);
        let mut window = VotingWindow::new(TimeDelta::hours(1));

        let first = close_voting(&store, &mut window, admin(), Utc::now());
        assert!(first.newly_closed);
        assert_eq!(first.confirmed.len(), 2);

        let second = close_voting(&store, &mut window, admin(), Utc::now());
        assert!(!second.newly_closed);
        assert!(!window.is_open(Utc::now()));
    }

    #[test]
    fn republishing_keeps_id_and_notifies_confirmed() {
        let store = store_with(5, 2);
        let mut window = VotingWindow::new(TimeDelta::hours(1));
        let mut current = None;
        let starts_at = Utc::now() + TimeDelta::days(3);
        let draft = EventDraft {
            title: "Saturday Social Soccer".to_owned(),
            description: "Pitch 3".to_owned(),
            starts_at,
        };

        let first = publish_event(&store, &mut window, &mut current, admin(), draft.clone());
        assert!(!first.updated);
        assert!(first.notify.is_empty());
        assert_eq!(window.event_start(), Some(starts_at));

        let edited = EventDraft {
            description: "Pitch 5".to_owned(),
            ..draft
        };
        let second = publish_event(&store, &mut window, &mut current, admin(), edited);
        assert!(second.updated);
        assert_eq!(second.event.id, first.event.id);
        assert_eq!(second.notify.len(), 2);
        assert_eq!(current.map(|e| e.description).as_deref(), Some("Pitch 5"));
    }
}
