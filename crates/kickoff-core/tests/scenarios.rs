//! End-to-end attendance scenarios driven through the command API.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use kickoff_core::CommandError;
use kickoff_core::capability::StaticAdmins;
use kickoff_core::clock::{Clock, ManualClock};
use kickoff_core::config::KickoffConfig;
use kickoff_core::notify::{NotificationInbox, NotificationKind, outbox};
use kickoff_core::service::CoordinatorService;
use kickoff_types::{
    BanDuration, BanReason, EventDraft, Participant, ParticipantId, Report, VoteIntent, VoteState,
};

const ADMIN: ParticipantId = ParticipantId(1_000);

fn person(id: i64) -> Participant {
    Participant::new(ParticipantId(id), format!("Player {id}"))
}

fn service() -> (Arc<CoordinatorService>, NotificationInbox) {
    let (tx, rx) = outbox();
    let admins = Arc::new(StaticAdmins::new(None, [ADMIN]));
    let svc = CoordinatorService::new(&KickoffConfig::default(), admins, tx).unwrap();
    (Arc::new(svc), rx)
}

fn ids(list: &[Participant]) -> Vec<i64> {
    list.iter().map(|p| p.id.into_inner()).collect()
}

fn assert_invariants(report: &Report) {
    assert!(report.confirmed.len() <= 20);
    let mut seen = BTreeSet::new();
    for p in report
        .confirmed
        .iter()
        .chain(&report.waitlisted)
        .chain(&report.declined)
    {
        assert!(seen.insert(p.id), "{} listed twice", p.id);
    }
}

/// Scenario A: 21 confirmations against 20 seats.
async fn fill_twenty_one(svc: &CoordinatorService, now: DateTime<Utc>) {
    for id in 1..=21 {
        let outcome = svc.vote(person(id), VoteIntent::Confirm, now).await.unwrap();
        let expected = if id <= 20 {
            VoteState::Confirmed
        } else {
            VoteState::Waitlisted
        };
        assert_eq!(outcome.effective_state, expected, "participant {id}");
    }
}

#[tokio::test]
async fn scenario_a_twenty_first_confirmation_is_waitlisted() {
    let (svc, _inbox) = service();
    let now = Utc::now();
    fill_twenty_one(&svc, now).await;

    let report = svc.report(now).await;
    assert_eq!(ids(&report.confirmed), (1..=20).collect::<Vec<_>>());
    assert_eq!(ids(&report.waitlisted), vec![21]);
    assert_invariants(&report);
}

#[tokio::test]
async fn scenario_b_decline_promotes_waitlist_head() {
    let (svc, mut inbox) = service();
    let now = Utc::now();
    fill_twenty_one(&svc, now).await;

    let outcome = svc.vote(person(5), VoteIntent::Decline, now).await.unwrap();
    assert_eq!(outcome.effective_state, VoteState::Declined);
    assert_eq!(outcome.promoted.map(|p| p.id), Some(ParticipantId(21)));

    let report = svc.report(now).await;
    assert_eq!(report.confirmed.len(), 20);
    assert!(report.waitlisted.is_empty());
    assert_eq!(ids(&report.declined), vec![5]);
    assert!(ids(&report.confirmed).contains(&21));
    assert_invariants(&report);

    let notice = inbox.try_recv().unwrap();
    assert_eq!(notice.recipient.id, ParticipantId(21));
}

#[tokio::test]
async fn scenario_c_no_show_bans_for_a_week_and_promotes() {
    let (svc, mut inbox) = service();
    let now = Utc::now();
    fill_twenty_one(&svc, now).await;
    svc.vote(person(22), VoteIntent::Confirm, now).await.unwrap();

    let outcome = svc.mark_no_show(ADMIN, ParticipantId(3), now).await.unwrap();
    assert_eq!(outcome.ban.reason, BanReason::NoShow);
    assert_eq!(outcome.ban.expires_at, now + TimeDelta::days(7));
    assert_eq!(outcome.promoted.map(|p| p.id), Some(ParticipantId(21)));

    let report = svc.report(now).await;
    assert!(!ids(&report.confirmed).contains(&3));
    assert_eq!(ids(&report.waitlisted), vec![22]);
    assert_eq!(report.active_bans.len(), 1);
    assert_eq!(report.active_bans[0].participant.id, ParticipantId(3));
    assert_invariants(&report);

    assert_eq!(
        inbox.try_recv().map(|n| n.kind),
        Some(NotificationKind::PromotedAfterNoShow)
    );

    let err = svc.vote(person(3), VoteIntent::Confirm, now).await.unwrap_err();
    assert!(matches!(err, CommandError::ParticipantBanned { .. }));
}

#[tokio::test]
async fn scenario_d_votes_rejected_after_cutoff() {
    let (svc, _inbox) = service();
    let start = Utc::now();
    let clock = ManualClock::new(start);
    let kickoff = start + TimeDelta::hours(5);

    svc.publish_event(
        ADMIN,
        EventDraft {
            title: "Saturday Social Soccer".to_owned(),
            description: String::new(),
            starts_at: kickoff,
        },
    )
    .await
    .unwrap();

    svc.vote(person(1), VoteIntent::Confirm, clock.now()).await.unwrap();
    svc.vote(person(2), VoteIntent::Decline, clock.now()).await.unwrap();

    clock.set(kickoff - TimeDelta::hours(1));
    for (id, intent) in [
        (1, VoteIntent::Decline),
        (2, VoteIntent::Confirm),
        (3, VoteIntent::Confirm),
    ] {
        let err = svc.vote(person(id), intent, clock.now()).await.unwrap_err();
        assert_eq!(err, CommandError::VotingClosed);
    }

    let report = svc.report(clock.now()).await;
    assert_eq!(ids(&report.confirmed), vec![1]);
    assert_eq!(ids(&report.declined), vec![2]);
    assert!(!report.voting_open);

    // Moderation keeps working after the cutoff.
    svc.mark_no_show(ADMIN, ParticipantId(1), clock.now())
        .await
        .unwrap();
}

#[tokio::test]
async fn scenario_e_non_admin_ban_leaves_table_unchanged() {
    let (svc, _inbox) = service();
    let now = Utc::now();
    let outsider = ParticipantId(7);

    let err = svc
        .ban_member(outsider, ParticipantId(8), BanDuration::Days(7), now)
        .await
        .unwrap_err();
    assert_eq!(err, CommandError::NotAuthorized { actor: outsider });
    assert!(svc.report(now).await.active_bans.is_empty());
    assert!(!svc.is_banned(ParticipantId(8), now).await);
}

#[tokio::test]
async fn ban_expires_lazily_and_unban_clears_it() {
    let (svc, _inbox) = service();
    let clock = ManualClock::new(Utc::now());

    svc.ban_member(ADMIN, ParticipantId(8), BanDuration::Days(7), clock.now())
        .await
        .unwrap();
    assert!(svc.vote(person(8), VoteIntent::Confirm, clock.now()).await.is_err());

    clock.advance(TimeDelta::days(7));
    let outcome = svc.vote(person(8), VoteIntent::Confirm, clock.now()).await.unwrap();
    assert_eq!(outcome.effective_state, VoteState::Confirmed);

    let removed = svc.unban_member(ADMIN, ParticipantId(8)).await.unwrap();
    assert!(removed.is_some());
    assert!(svc.unban_member(ADMIN, ParticipantId(8)).await.unwrap().is_none());
}

#[tokio::test]
async fn confirming_twice_is_idempotent() {
    let (svc, _inbox) = service();
    let now = Utc::now();
    for id in 1..=3 {
        svc.vote(person(id), VoteIntent::Confirm, now).await.unwrap();
    }
    let before = svc.report(now).await;

    let again = svc.vote(person(2), VoteIntent::Confirm, now).await.unwrap();
    assert_eq!(again.effective_state, VoteState::Confirmed);
    assert_eq!(svc.report(now).await.confirmed, before.confirmed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_confirmations_never_exceed_capacity() {
    let (svc, _inbox) = service();
    let now = Utc::now();

    let handles: Vec<_> = (1..=60)
        .map(|id| {
            let svc = Arc::clone(&svc);
            tokio::spawn(async move { svc.vote(person(id), VoteIntent::Confirm, now).await })
        })
        .collect();

    let mut confirmed = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().effective_state == VoteState::Confirmed {
            confirmed += 1;
        }
    }

    let report = svc.report(now).await;
    assert_eq!(confirmed, 20);
    assert_eq!(report.confirmed.len(), 20);
    assert_eq!(report.waitlisted.len(), 40);
    assert_invariants(&report);
}
