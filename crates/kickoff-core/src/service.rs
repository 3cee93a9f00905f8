//! The coordinator service: the command API consumed by transports.
//!
//! [`CoordinatorService`] owns the roster store, the voting window, and the
//! published event behind one [`RwLock`]. Every mutating command holds the
//! write lock for its full check-apply-promote sequence, so two concurrent
//! confirmations can never both take the last seat. Reports take the read
//! lock and always see a fully applied state.
//!
//! Work that may block on the outside world stays out of the lock: the
//! admin capability check runs before it is taken, and notifications are
//! queued only after it is released.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use kickoff_roster::{RosterError, RosterStore};
use kickoff_types::{
    Ban, BanDuration, EventDetails, EventDraft, MemberPage, Participant, ParticipantId, Report,
    VoteIntent,
};

use crate::attendance::{self, VoteOutcome};
use crate::capability::AdminCheck;
use crate::config::{KickoffConfig, ModerationConfig};
use crate::error::CommandError;
use crate::moderation::{
    self, BanOutcome, CloseOutcome, NoShowOutcome, PublishOutcome, authorize,
};
use crate::notify::{Notification, NotificationKind, NotificationOutbox};
use crate::report;
use crate::window::VotingWindow;

/// Everything that changes while an event is being organised.
#[derive(Debug)]
struct EventState {
    store: RosterStore,
    window: VotingWindow,
    event: Option<EventDetails>,
}

/// Serialized command API over a single event's attendance state.
pub struct CoordinatorService {
    state: RwLock<EventState>,
    admins: Arc<dyn AdminCheck>,
    outbox: NotificationOutbox,
    moderation: ModerationConfig,
}

impl core::fmt::Debug for CoordinatorService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CoordinatorService")
            .field("moderation", &self.moderation)
            .finish_non_exhaustive()
    }
}

impl CoordinatorService {
    /// Build a service from configuration.
    ///
    /// If `config.event.starts_at` is set, that event is published right
    /// away and the voting cutoff is scheduled from it.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::ZeroCapacity`] if the roster has no seats.
    pub fn new(
        config: &KickoffConfig,
        admins: Arc<dyn AdminCheck>,
        outbox: NotificationOutbox,
    ) -> Result<Self, RosterError> {
        let store = RosterStore::new(config.roster.capacity)?;
        let mut window = VotingWindow::new(config.voting.close_before());
        let event = config.event.starts_at.map(|starts_at| {
            window.schedule(starts_at);
            EventDetails {
                id: kickoff_types::EventId::new(),
                title: config.event.title.clone(),
                description: config.event.description.clone(),
                starts_at,
            }
        });

        Ok(Self {
            state: RwLock::new(EventState {
                store,
                window,
                event,
            }),
            admins,
            outbox,
            moderation: config.moderation.clone(),
        })
    }

    // -----------------------------------------------------------------------
    // Participant commands
    // -----------------------------------------------------------------------

    /// Record a participant's confirm/decline.
    ///
    /// # Errors
    ///
    /// [`CommandError::VotingClosed`] or [`CommandError::ParticipantBanned`].
    pub async fn vote(
        &self,
        participant: Participant,
        intent: VoteIntent,
        now: DateTime<Utc>,
    ) -> Result<VoteOutcome, CommandError> {
        let outcome = {
            let mut state = self.state.write().await;
            let EventState { store, window, .. } = &mut *state;
            attendance::vote(store, window, &participant, intent, now)?
        };

        if let Some(promoted) = &outcome.promoted {
            self.outbox.enqueue([Notification::promoted(
                promoted.clone(),
                NotificationKind::PromotedAfterDecline,
            )]);
        }
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Admin commands
    // -----------------------------------------------------------------------

    /// Ban `target` for `duration`.
    ///
    /// # Errors
    ///
    /// [`CommandError::NotAuthorized`], [`CommandError::CapabilityLookup`],
    /// or [`CommandError::InvalidBanDuration`].
    pub async fn ban_member(
        &self,
        actor: ParticipantId,
        target: ParticipantId,
        duration: BanDuration,
        now: DateTime<Utc>,
    ) -> Result<BanOutcome, CommandError> {
        let admin = authorize(self.admins.as_ref(), actor)?;
        let outcome = {
            let mut state = self.state.write().await;
            moderation::ban_member(
                &mut state.store,
                admin,
                target,
                duration,
                now,
                &self.moderation,
            )?
        };

        if let Some(promoted) = &outcome.promoted {
            self.outbox.enqueue([Notification::promoted(
                promoted.clone(),
                NotificationKind::PromotedAfterEviction,
            )]);
        }
        Ok(outcome)
    }

    /// Remove any ban on `target`.
    ///
    /// # Errors
    ///
    /// [`CommandError::NotAuthorized`] or [`CommandError::CapabilityLookup`].
    pub async fn unban_member(
        &self,
        actor: ParticipantId,
        target: ParticipantId,
    ) -> Result<Option<Ban>, CommandError> {
        let admin = authorize(self.admins.as_ref(), actor)?;
        let mut state = self.state.write().await;
        Ok(moderation::unban_member(&mut state.store, admin, target))
    }

    /// Mark a confirmed participant as a no-show.
    ///
    /// # Errors
    ///
    /// [`CommandError::NotAuthorized`], [`CommandError::CapabilityLookup`],
    /// or [`CommandError::NotOnRoster`].
    pub async fn mark_no_show(
        &self,
        actor: ParticipantId,
        target: ParticipantId,
        now: DateTime<Utc>,
    ) -> Result<NoShowOutcome, CommandError> {
        let admin = authorize(self.admins.as_ref(), actor)?;
        let outcome = {
            let mut state = self.state.write().await;
            moderation::mark_no_show(&mut state.store, admin, target, now, &self.moderation)?
        };

        if let Some(promoted) = &outcome.promoted {
            self.outbox.enqueue([Notification::promoted(
                promoted.clone(),
                NotificationKind::PromotedAfterNoShow,
            )]);
        }
        Ok(outcome)
    }

    /// Close voting for good and tell every confirmed participant.
    ///
    /// Closing twice is allowed; only the first close notifies.
    ///
    /// # Errors
    ///
    /// [`CommandError::NotAuthorized`] or [`CommandError::CapabilityLookup`].
    pub async fn close_voting(
        &self,
        actor: ParticipantId,
        now: DateTime<Utc>,
    ) -> Result<CloseOutcome, CommandError> {
        let admin = authorize(self.admins.as_ref(), actor)?;
        let outcome = {
            let mut state = self.state.write().await;
            let EventState { store, window, .. } = &mut *state;
            moderation::close_voting(store, window, admin, now)
        };

        if outcome.newly_closed {
            self.outbox.enqueue(
                outcome
                    .confirmed
                    .iter()
                    .cloned()
                    .map(Notification::voting_closed),
            );
        }
        Ok(outcome)
    }

    /// Publish the event, or edit the published one and tell every
    /// confirmed participant what changed.
    ///
    /// # Errors
    ///
    /// [`CommandError::NotAuthorized`] or [`CommandError::CapabilityLookup`].
    pub async fn publish_event(
        &self,
        actor: ParticipantId,
        draft: EventDraft,
    ) -> Result<PublishOutcome, CommandError> {
        let admin = authorize(self.admins.as_ref(), actor)?;
        let outcome = {
            let mut state = self.state.write().await;
            let EventState {
                store,
                window,
                event,
            } = &mut *state;
            moderation::publish_event(store, window, event, admin, draft)
        };

        self.outbox.enqueue(
            outcome
                .notify
                .iter()
                .cloned()
                .map(|p| Notification::event_updated(p, &outcome.event)),
        );
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Snapshot of roster, waitlist, declined list, and active bans.
    pub async fn report(&self, now: DateTime<Utc>) -> Report {
        let state = self.state.read().await;
        report::build_report(&state.store, &state.window, now)
    }

    /// One page of the member directory.
    pub async fn members(&self, page: u32, page_size: usize, now: DateTime<Utc>) -> MemberPage {
        let state = self.state.read().await;
        report::member_page(&state.store, page, page_size, now)
    }

    /// Whether `id` holds an active ban at `now`.
    pub async fn is_banned(&self, id: ParticipantId, now: DateTime<Utc>) -> bool {
        self.state.read().await.store.is_banned(id, now)
    }

    /// The published event, if any.
    pub async fn event(&self) -> Option<EventDetails> {
        self.state.read().await.event.clone()
    }

    /// Whether votes are accepted at `now`.
    pub async fn voting_open(&self, now: DateTime<Utc>) -> bool {
        self.state.read().await.window.is_open(now)
    }

    /// Ban lengths offered in the admin menu, in days.
    pub fn ban_presets(&self) -> &[u32] {
        &self.moderation.ban_presets_days
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::TimeDelta;
    use kickoff_types::VoteState;

    use crate::capability::StaticAdmins;
    use crate::notify::{NotificationInbox, outbox};

    use super::*;

    const ADMIN: ParticipantId = ParticipantId(900);

    fn service(capacity: usize) -> (CoordinatorService, NotificationInbox) {
        let mut config = KickoffConfig::default();
        config.roster.capacity = capacity;
        let (tx, rx) = outbox();
        let admins = Arc::new(StaticAdmins::new(None, [ADMIN]));
        (CoordinatorService::new(&config, admins, tx).unwrap(), rx)
    }

    fn person(id: i64) -> Participant {
        Participant::new(ParticipantId(id), format!("Player {id}"))
    }

    fn drain(inbox: &mut NotificationInbox) -> Vec<Notification> {
        std::iter::from_fn(|| inbox.try_recv()).collect()
    }

    #[tokio::test]
    async fn decline_queues_promotion_notice() {
        let (svc, mut inbox) = service(1);
        let now = Utc::now();
        svc.vote(person(1), VoteIntent::Confirm, now).await.unwrap();
        svc.vote(person(2), VoteIntent::Confirm, now).await.unwrap();
        assert!(drain(&mut inbox).is_empty());

        let outcome = svc.vote(person(1), VoteIntent::Decline, now).await.unwrap();
        assert_eq!(outcome.promoted.map(|p| p.id), Some(ParticipantId(2)));

        let sent = drain(&mut inbox);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient.id, ParticipantId(2));
        assert_eq!(sent[0].kind, NotificationKind::PromotedAfterDecline);
    }

    #[tokio::test]
    async fn close_voting_notifies_confirmed_once() {
        let (svc, mut inbox) = service(5);
        let now = Utc::now();
        for id in 1..=3 {
            svc.vote(person(id), VoteIntent::Confirm, now).await.unwrap();
        }

        let outcome = svc.close_voting(ADMIN, now).await.unwrap();
        assert_eq!(outcome.confirmed.len(), 3);
        assert_eq!(drain(&mut inbox).len(), 3);

        svc.close_voting(ADMIN, now).await.unwrap();
        assert!(drain(&mut inbox).is_empty());

        let err = svc.vote(person(4), VoteIntent::Confirm, now).await.unwrap_err();
        assert_eq!(err, CommandError::VotingClosed);
    }

    #[tokio::test]
    async fn admin_commands_require_capability() {
        let (svc, _inbox) = service(5);
        let now = Utc::now();
        let outsider = ParticipantId(1);

        let err = svc
            .ban_member(outsider, ParticipantId(2), BanDuration::Days(7), now)
            .await
            .unwrap_err();
        assert_eq!(err, CommandError::NotAuthorized { actor: outsider });
        assert!(svc.unban_member(outsider, ParticipantId(2)).await.is_err());
        assert!(svc.mark_no_show(outsider, ParticipantId(2), now).await.is_err());
        assert!(svc.close_voting(outsider, now).await.is_err());
        assert!(svc.voting_open(now).await);
        assert!(svc.report(now).await.active_bans.is_empty());
    }

    #[tokio::test]
    async fn no_show_promotes_and_notifies() {
        let (svc, mut inbox) = service(1);
        let now = Utc::now();
        svc.vote(person(1), VoteIntent::Confirm, now).await.unwrap();
        svc.vote(person(2), VoteIntent::Confirm, now).await.unwrap();

        let outcome = svc.mark_no_show(ADMIN, ParticipantId(1), now).await.unwrap();
        assert_eq!(outcome.promoted.map(|p| p.id), Some(ParticipantId(2)));
        assert!(svc.is_banned(ParticipantId(1), now).await);

        let sent = drain(&mut inbox);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::PromotedAfterNoShow);
    }

    #[tokio::test]
    async fn publishing_schedules_cutoff_and_edits_notify() {
        let (svc, mut inbox) = service(5);
        let now = Utc::now();
        svc.vote(person(1), VoteIntent::Confirm, now).await.unwrap();

        let draft = EventDraft {
            title: "Saturday Social Soccer".to_owned(),
            description: "Pitch 3".to_owned(),
            starts_at: now + TimeDelta::minutes(30),
        };
        let first = svc.publish_event(ADMIN, draft.clone()).await.unwrap();
        assert!(!first.updated);
        assert!(drain(&mut inbox).is_empty());
        assert!(!svc.voting_open(now).await);

        let later = EventDraft {
            starts_at: now + TimeDelta::days(1),
            ..draft
        };
        let second = svc.publish_event(ADMIN, later).await.unwrap();
        assert!(second.updated);
        assert!(svc.voting_open(now).await);
        let sent = drain(&mut inbox);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::EventUpdated);
        assert_eq!(svc.event().await.map(|e| e.id), Some(first.event.id));
    }

    #[tokio::test]
    async fn configured_event_is_published_at_startup() {
        let mut config = KickoffConfig::default();
        let now = Utc::now();
        config.event.starts_at = Some(now + TimeDelta::minutes(30));
        let (tx, _rx) = outbox();
        let svc =
            CoordinatorService::new(&config, Arc::new(StaticAdmins::default()), tx).unwrap();

        assert!(svc.event().await.is_some());
        let err = svc.vote(person(1), VoteIntent::Confirm, now).await.unwrap_err();
        assert_eq!(err, CommandError::VotingClosed);
        assert_eq!(svc.report(now).await.confirmed.len(), 0);
    }

    #[tokio::test]
    async fn members_and_presets_are_exposed() {
        let (svc, _inbox) = service(5);
        let now = Utc::now();
        svc.vote(person(1), VoteIntent::Decline, now).await.unwrap();

        let page = svc.members(0, 10, now).await;
        assert_eq!(page.total, 1);
        assert_eq!(page.members[0].state, VoteState::Declined);
        assert_eq!(svc.ban_presets(), &[7, 14, 30]);
    }
}
