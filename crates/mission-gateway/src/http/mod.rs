pub mod activities;
pub mod calendar;
pub mod cron;
pub mod gmail;
pub mod health;
pub mod overview;
pub mod search;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mission_core::MissionError;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

/// Error returned by every handler. Caller mistakes map to 4xx, the rest to 500.
#[derive(Debug)]
pub struct ApiError(pub MissionError);

impl ApiError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self(MissionError::InvalidInput(msg.into()))
    }

    fn status(&self) -> StatusCode {
        match &self.0 {
            MissionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            MissionError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            warn!(code = self.0.code(), error = %self.0, "request rejected");
        } else {
            error!(code = self.0.code(), error = %self.0, "request failed");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
            code: self.0.code(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<MissionError> for ApiError {
    fn from(e: MissionError) -> Self {
        Self(e)
    }
}

impl From<mission_scheduler::SchedulerError> for ApiError {
    fn from(e: mission_scheduler::SchedulerError) -> Self {
        Self(e.into())
    }
}

impl From<mission_activity::ActivityError> for ApiError {
    fn from(e: mission_activity::ActivityError) -> Self {
        Self(e.into())
    }
}

impl From<mission_sources::SourceError> for ApiError {
    fn from(e: mission_sources::SourceError) -> Self {
        Self(e.into())
    }
}

/// Parse an optional query-string number, rejecting garbage with a 400.
pub(crate) fn parse_param<T: std::str::FromStr>(
    raw: Option<&str>,
    name: &str,
) -> Result<Option<T>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| ApiError::invalid(format!("`{name}` must be a non-negative integer"))),
    }
}
