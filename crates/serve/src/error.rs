//! Mapping of core errors onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use hotsearch_core::HotsearchError;
use serde::Serialize;

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error wrapping a core error
#[derive(Debug)]
pub struct ApiError(pub HotsearchError);

impl ApiError {
    /// HTTP status for the wrapped error
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            HotsearchError::Validation { .. } => StatusCode::BAD_REQUEST,
            HotsearchError::NotFound { .. } => StatusCode::NOT_FOUND,
            HotsearchError::Store { .. } | HotsearchError::Database(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            HotsearchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<HotsearchError> for ApiError {
    fn from(err: HotsearchError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(category = %self.0.category(), "Request failed: {}", self.0);
        } else {
            tracing::warn!(category = %self.0.category(), "Request rejected: {}", self.0);
        }

        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (HotsearchError::validation("bad"), StatusCode::BAD_REQUEST),
            (HotsearchError::not_found("x"), StatusCode::NOT_FOUND),
            (HotsearchError::store("down"), StatusCode::SERVICE_UNAVAILABLE),
            (HotsearchError::timeout("fetch"), StatusCode::GATEWAY_TIMEOUT),
            (
                HotsearchError::invalid_state("odd"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status_code(), expected);
        }
    }

    #[test]
    fn test_response_status() {
        let response = ApiError::from(HotsearchError::validation("bad")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
