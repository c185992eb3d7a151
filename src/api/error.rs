use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::relay::RelayError;

/// JSON error response: `{"error": message}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

/// HTTP status for each relay failure
pub fn status_for(error: &RelayError) -> StatusCode {
    match error {
        RelayError::MissingInput
        | RelayError::UnsupportedContentType(_)
        | RelayError::UnsupportedMediaKind(_)
        | RelayError::InvalidFormat(_)
        | RelayError::ToolNotFound(_)
        | RelayError::Upstream(_) => StatusCode::BAD_REQUEST,
        RelayError::NotFound(_) => StatusCode::NOT_FOUND,
        RelayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        RelayError::Forbidden(_) => StatusCode::FORBIDDEN,
        RelayError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        RelayError::FileNotProduced(_) | RelayError::Staging(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(error: RelayError) -> Self {
        Self {
            status: status_for(&error),
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{} {}", self.status, self.message);
        } else {
            tracing::warn!("{} {}", self.status, self.message);
        }
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}
