//! Participant-facing and read-only endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/vote` | Confirm or decline attendance |
//! | `GET` | `/api/report` | Roster, waitlist, declined, active bans (JSON) |
//! | `GET` | `/api/report/text` | Same snapshot as plain text |
//! | `GET` | `/api/members` | Paginated member directory |
//! | `GET` | `/api/event` | The published event |
//! | `GET` | `/api/participants/{id}/ban` | Ban status of one participant |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use kickoff_core::report::{self, DEFAULT_PAGE_SIZE};
use kickoff_types::{Participant, ParticipantId, VoteIntent, VoteState};

use crate::error::ApiError;
use crate::state::AppState;

/// Largest page the member directory will serve.
const MAX_PAGE_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/vote`.
#[derive(Debug, serde::Deserialize)]
pub struct VoteRequest {
    /// Who pressed the button.
    pub participant_id: ParticipantId,
    /// Their current display name.
    pub display_name: String,
    /// Which button.
    pub intent: VoteIntent,
}

/// Response body for `POST /api/vote`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct VoteResponse {
    /// State before the vote.
    pub previous_state: VoteState,
    /// State after the vote.
    pub effective_state: VoteState,
    /// Participant promoted into a freed seat, if any.
    pub promoted: Option<Participant>,
}

/// Query parameters for `GET /api/members`.
#[derive(Debug, serde::Deserialize)]
pub struct MembersQuery {
    /// Zero-based page (default 0).
    pub page: Option<u32>,
    /// Rows per page (default 10, max 100).
    pub page_size: Option<usize>,
}

/// Response body for `GET /api/participants/{id}/ban`.
#[derive(Debug, serde::Serialize)]
struct BanStatus {
    participant_id: ParticipantId,
    banned: bool,
    checked_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Apply a confirm/decline vote.
pub async fn vote(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.display_name.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "display_name must not be empty".to_owned(),
        ));
    }
    let participant = Participant::new(body.participant_id, body.display_name.trim());
    let outcome = state
        .service
        .vote(participant, body.intent, state.clock.now())
        .await?;

    Ok(Json(VoteResponse {
        previous_state: outcome.previous_state,
        effective_state: outcome.effective_state,
        promoted: outcome.promoted,
    }))
}

/// Current report as JSON.
pub async fn get_report(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.report(state.clock.now()).await)
}

/// Current report rendered as text.
pub async fn get_report_text(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.service.report(state.clock.now()).await;
    report::render_report(&snapshot)
}

/// A page of the member directory.
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MembersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ApiError::InvalidRequest(format!(
            "page_size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    let page = state
        .service
        .members(query.page.unwrap_or(0), page_size, state.clock.now())
        .await;
    Ok(Json(page))
}

/// The published event.
pub async fn get_event(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .event()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no event has been published".to_owned()))
}

/// Whether one participant is currently banned.
pub async fn get_ban_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let participant_id = ParticipantId(id);
    let now = state.clock.now();
    Json(BanStatus {
        participant_id,
        banned: state.service.is_banned(participant_id, now).await,
        checked_at: now,
    })
}
