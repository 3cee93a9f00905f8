//! The report builder: read-only projections of the roster store.
//!
//! Nothing here mutates. Reports can be built at any time, including
//! after voting has closed.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use kickoff_roster::RosterStore;
use kickoff_types::{ActiveBan, MemberEntry, MemberPage, Participant, Report};

use crate::window::VotingWindow;

/// Rows per page in the member directory.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Snapshot roster, waitlist, declined list, and active bans at `now`.
///
/// Bans whose expiry is not after `now` are left out even though their
/// records remain in the store.
pub fn build_report(store: &RosterStore, window: &VotingWindow, now: DateTime<Utc>) -> Report {
    let active_bans = store
        .bans()
        .filter(|ban| ban.is_active(now))
        .map(|ban| ActiveBan {
            participant: store.participant_or_unknown(ban.participant_id),
            reason: ban.reason,
            expires_at: ban.expires_at,
        })
        .collect();

    Report {
        generated_at: now,
        capacity: u32::try_from(store.capacity()).unwrap_or(u32::MAX),
        confirmed: store.confirmed(),
        waitlisted: store.waitlisted(),
        declined: store.declined(),
        active_bans,
        voting_open: window.is_open(now),
    }
}

/// One page of the member directory, ordered by participant ID.
///
/// `page_size` of 0 is treated as [`DEFAULT_PAGE_SIZE`]. Pages past the
/// end are empty.
pub fn member_page(
    store: &RosterStore,
    page: u32,
    page_size: usize,
    now: DateTime<Utc>,
) -> MemberPage {
    let page_size = if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    };
    let start = usize::try_from(page)
        .ok()
        .and_then(|p| p.checked_mul(page_size))
        .unwrap_or(usize::MAX);

    let members: Vec<MemberEntry> = store
        .members()
        .skip(start)
        .take(page_size)
        .map(|(participant, state)| MemberEntry {
            participant: participant.clone(),
            state,
            banned_until: store
                .ban(participant.id)
                .filter(|ban| ban.is_active(now))
                .map(|ban| ban.expires_at),
        })
        .collect();

    let total = store.member_count();
    let shown_through = start.saturating_add(members.len());
    MemberPage {
        page,
        total: u32::try_from(total).unwrap_or(u32::MAX),
        has_next: shown_through < total,
        members,
    }
}

/// Render a report as the plain-text admin snapshot.
pub fn render_report(report: &Report) -> String {
    let mut out = String::from("Participation Report\n\n");

    let _ = writeln!(
        out,
        "Confirmed ({}/{}):",
        report.confirmed.len(),
        report.capacity
    );
    push_list(&mut out, &report.confirmed, "No confirmed participants.");

    let _ = writeln!(out, "\nWaitlist ({}):", report.waitlisted.len());
    push_list(&mut out, &report.waitlisted, "No waitlisted participants.");

    let _ = writeln!(out, "\nDeclined ({}):", report.declined.len());
    push_list(&mut out, &report.declined, "No declined participants.");

    let _ = writeln!(out, "\nActive bans ({}):", report.active_bans.len());
    if report.active_bans.is_empty() {
        out.push_str("No active bans.\n");
    }
    for ban in &report.active_bans {
        let reason = match ban.reason {
            kickoff_types::BanReason::AdminBan => "ban",
            kickoff_types::BanReason::NoShow => "no-show",
        };
        let _ = writeln!(
            out,
            "{} - {} ({reason} until {})",
            ban.participant.id,
            ban.participant.display_name,
            ban.expires_at.format("%Y-%m-%d")
        );
    }

    out.push_str(if report.voting_open {
        "\nVoting is open."
    } else {
        "\nVoting is closed."
    });
    out
}

fn push_list(out: &mut String, participants: &[Participant], empty: &str) {
    if participants.is_empty() {
        out.push_str(empty);
        out.push('\n');
        return;
    }
    for p in participants {
        let _ = writeln!(out, "{} - {}", p.id, p.display_name);
    }
}
