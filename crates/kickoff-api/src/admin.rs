//! Admin endpoint handlers.
//!
//! Each request names the acting participant in `actor_id`; the core runs
//! the capability check. The chat adapter in front of this API is trusted
//! to fill `actor_id` from the authenticated sender.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/admin/ban` | Ban a participant |
//! | `POST` | `/api/admin/unban` | Clear a participant's ban |
//! | `POST` | `/api/admin/no-show` | Mark a confirmed participant as a no-show |
//! | `POST` | `/api/admin/close-voting` | Close voting for good |
//! | `POST` | `/api/admin/event` | Publish or edit the event |
//! | `GET` | `/api/admin/ban-presets` | Ban lengths offered in the menu |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use kickoff_types::{
    Ban, BanDuration, EventDetails, EventDraft, Participant, ParticipantId, VoteState,
};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/admin/ban`.
#[derive(Debug, serde::Deserialize)]
pub struct BanRequest {
    /// The admin issuing the ban.
    pub actor_id: ParticipantId,
    /// Who to ban.
    pub participant_id: ParticipantId,
    /// `{"days": n}` or `{"until": "<RFC 3339>"}`.
    pub duration: BanDuration,
}

/// Request body for `POST /api/admin/unban` and `POST /api/admin/no-show`.
#[derive(Debug, serde::Deserialize)]
pub struct TargetRequest {
    /// The admin issuing the command.
    pub actor_id: ParticipantId,
    /// The participant acted on.
    pub participant_id: ParticipantId,
}

/// Request body for `POST /api/admin/close-voting`.
#[derive(Debug, serde::Deserialize)]
pub struct ActorRequest {
    /// The admin issuing the command.
    pub actor_id: ParticipantId,
}

/// Request body for `POST /api/admin/event`.
#[derive(Debug, serde::Deserialize)]
pub struct PublishEventRequest {
    /// The admin issuing the command.
    pub actor_id: ParticipantId,
    /// The event as it should read.
    #[serde(flatten)]
    pub event: EventDraft,
}

/// Response body for `POST /api/admin/ban`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct BanResponse {
    /// The ban as written.
    pub ban: Ban,
    /// Whether an earlier ban was overwritten.
    pub replaced_existing: bool,
    /// List the participant was evicted from, if eviction is enabled.
    pub evicted_from: Option<VoteState>,
    /// Participant promoted into an evicted seat.
    pub promoted: Option<Participant>,
}

/// Response body for `POST /api/admin/unban`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct UnbanResponse {
    /// The removed ban, if there was one.
    pub removed: Option<Ban>,
}

/// Response body for `POST /api/admin/no-show`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct NoShowResponse {
    /// The no-show ban as written.
    pub ban: Ban,
    /// Participant promoted into the freed seat.
    pub promoted: Option<Participant>,
}

/// Response body for `POST /api/admin/close-voting`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CloseVotingResponse {
    /// `false` if voting was already closed.
    pub newly_closed: bool,
    /// Roster at the moment of closing.
    pub confirmed: Vec<Participant>,
    /// When the command ran.
    pub closed_at: DateTime<Utc>,
}

/// Response body for `POST /api/admin/event`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct PublishEventResponse {
    /// The event as published.
    pub event: EventDetails,
    /// Whether an existing event was edited.
    pub updated: bool,
    /// Number of confirmed participants told about the edit.
    pub notified: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Ban a participant.
pub async fn ban(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .service
        .ban_member(
            body.actor_id,
            body.participant_id,
            body.duration,
            state.clock.now(),
        )
        .await?;

    Ok(Json(BanResponse {
        ban: outcome.ban,
        replaced_existing: outcome.replaced.is_some(),
        evicted_from: outcome.evicted_from,
        promoted: outcome.promoted,
    }))
}

/// Clear a participant's ban.
pub async fn unban(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TargetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state
        .service
        .unban_member(body.actor_id, body.participant_id)
        .await?;
    Ok(Json(UnbanResponse { removed }))
}

/// Mark a confirmed participant as a no-show.
pub async fn no_show(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TargetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .service
        .mark_no_show(body.actor_id, body.participant_id, state.clock.now())
        .await?;
    Ok(Json(NoShowResponse {
        ban: outcome.ban,
        promoted: outcome.promoted,
    }))
}

/// Close voting for good.
pub async fn close_voting(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ActorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let now = state.clock.now();
    let outcome = state.service.close_voting(body.actor_id, now).await?;
    Ok(Json(CloseVotingResponse {
        newly_closed: outcome.newly_closed,
        confirmed: outcome.confirmed,
        closed_at: now,
    }))
}

/// Publish or edit the event.
pub async fn publish_event(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PublishEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.event.title.trim().is_empty() {
        return Err(ApiError::InvalidRequest("title must not be empty".to_owned()));
    }
    let outcome = state
        .service
        .publish_event(body.actor_id, body.event)
        .await?;
    Ok(Json(PublishEventResponse {
        notified: outcome.notify.len(),
        event: outcome.event,
        updated: outcome.updated,
    }))
}

/// Ban lengths offered in the admin menu.
pub async fn ban_presets(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({ "days": state.service.ban_presets() }))
}
