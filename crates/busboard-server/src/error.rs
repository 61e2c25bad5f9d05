//! Error types for the busboard HTTP API.
//!
//! [`ApiError`] maps board failures onto HTTP statuses through its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the same shape:
//!
//! ```json
//! { "error": "human readable message", "code": "schedule_unavailable", "status": 503 }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use busboard_core::{BoardError, DepartureError, ScheduleError};
use tracing::{error, warn};

/// Errors that can occur while answering an API request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The schedule could not be loaded or contains an invalid record.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// A departure could not be computed.
    #[error(transparent)]
    Departure(#[from] DepartureError),
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::Schedule(e) => Self::Schedule(e),
            BoardError::Departure(e) => Self::Departure(e),
        }
    }
}

impl ApiError {
    /// HTTP status for this error.
    ///
    /// An unreadable or malformed source is a temporary outage (503). An
    /// invalid record or an unrepresentable departure is a server-side
    /// data fault (500).
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Schedule(e) if e.is_load_failure() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Schedule(_) | Self::Departure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Schedule(e) if e.is_load_failure() => "schedule_unavailable",
            Self::Schedule(_) => "schedule_invalid",
            Self::Departure(_) => "departure_out_of_range",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!(code = self.code(), "{message}");
        } else {
            warn!(code = self.code(), "{message}");
        }

        let body = serde_json::json!({
            "error": message,
            "code": self.code(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
