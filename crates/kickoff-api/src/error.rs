//! Error types for the HTTP command API.
//!
//! [`ApiError`] wraps command failures and request problems and converts
//! into a JSON response via its [`IntoResponse`] implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kickoff_core::CommandError;

/// Errors returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The core rejected the command.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// A query parameter or body field is unusable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Command(CommandError::VotingClosed) => StatusCode::CONFLICT,
            Self::Command(
                CommandError::ParticipantBanned { .. } | CommandError::NotAuthorized { .. },
            ) => StatusCode::FORBIDDEN,
            Self::Command(CommandError::NotOnRoster { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Command(CommandError::InvalidBanDuration { .. }) | Self::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Command(CommandError::CapabilityLookup(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Stable machine-readable code for this error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Command(CommandError::VotingClosed) => "voting_closed",
            Self::Command(CommandError::ParticipantBanned { .. }) => "participant_banned",
            Self::Command(CommandError::NotAuthorized { .. }) => "not_authorized",
            Self::Command(CommandError::NotOnRoster { .. }) => "not_on_roster",
            Self::Command(CommandError::InvalidBanDuration { .. }) => "invalid_ban_duration",
            Self::Command(CommandError::CapabilityLookup(_)) => "capability_lookup_failed",
            Self::InvalidRequest(_) => "invalid_request",
            Self::NotFound(_) => "not_found",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
            "status": status.as_u16(),
        });
        (status, axum::Json(body)).into_response()
    }
}
