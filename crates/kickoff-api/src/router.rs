//! Axum router construction for the command API.
//!
//! Assembles participant, report, and admin routes into a single
//! [`Router`] with CORS and request tracing enabled.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::admin;
use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `POST /api/vote` -- confirm or decline
/// - `GET /api/report` -- report as JSON
/// - `GET /api/report/text` -- report as plain text
/// - `GET /api/members` -- paginated member directory
/// - `GET /api/event` -- the published event
/// - `GET /api/participants/{id}/ban` -- ban status
/// - `POST /api/admin/ban` -- ban a participant
/// - `POST /api/admin/unban` -- clear a ban
/// - `POST /api/admin/no-show` -- mark a no-show
/// - `POST /api/admin/close-voting` -- close voting
/// - `POST /api/admin/event` -- publish or edit the event
/// - `GET /api/admin/ban-presets` -- ban menu presets
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Participants
        .route("/api/vote", post(handlers::vote))
        .route("/api/report", get(handlers::get_report))
        .route("/api/report/text", get(handlers::get_report_text))
        .route("/api/members", get(handlers::list_members))
        .route("/api/event", get(handlers::get_event))
        .route("/api/participants/{id}/ban", get(handlers::get_ban_status))
        // Admin
        .route("/api/admin/ban", post(admin::ban))
        .route("/api/admin/unban", post(admin::unban))
        .route("/api/admin/no-show", post(admin::no_show))
        .route("/api/admin/close-voting", post(admin::close_voting))
        .route("/api/admin/event", post(admin::publish_event))
        .route("/api/admin/ban-presets", get(admin::ban_presets))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
