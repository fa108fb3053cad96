//! Mapping from library errors to HTTP responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::Error;

/// JSON error body: `{"error": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned from handlers
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status code and client-facing message
    ///
    /// Server-side failures get a fixed message; details stay in the logs.
    #[must_use]
    pub fn parts(&self) -> (StatusCode, String) {
        match &self.0 {
            Error::MissingUrl => (StatusCode::BAD_REQUEST, "URL required".to_string()),
            Error::UnsupportedPlatform(_) => {
                (StatusCode::BAD_REQUEST, "Unsupported URL type".to_string())
            }
            Error::InvalidPostUrl(platform) => {
                (StatusCode::BAD_REQUEST, format!("Invalid {platform} URL"))
            }
            Error::Validation(msg) | Error::Conflict(msg) | Error::InvalidCredentials(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Error::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Error::Fetch(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching comments".to_string(),
            ),
            Error::Scoring(_) | Error::ScoreMismatch { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to parse toxicity data".to_string(),
            ),
            Error::Config(_)
            | Error::Io(_)
            | Error::Serialization(_)
            | Error::Toml(_)
            | Error::Database(_)
            | Error::Sqlite(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = %self.0, %status, "request failed");
        } else {
            tracing::debug!(error = %self.0, %status, "request rejected");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    #[test]
    fn test_client_errors() {
        let cases = [
            (Error::MissingUrl, "URL required"),
            (
                Error::UnsupportedPlatform("https://x.com".into()),
                "Unsupported URL type",
            ),
            (Error::InvalidPostUrl(Platform::YouTube), "Invalid YouTube URL"),
            (
                Error::Conflict("User already exists".into()),
                "User already exists",
            ),
        ];
        for (err, message) in cases {
            let (status, body) = ApiError(err).parts();
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, message);
        }
    }

    #[test]
    fn test_server_errors_hide_details() {
        let (status, body) = ApiError(Error::Fetch("401 from upstream: bad key".into())).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Error fetching comments");

        let (status, body) = ApiError(Error::ScoreMismatch {
            expected: 3,
            got: 2,
        })
        .parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Failed to parse toxicity data");

        let (_, body) = ApiError(Error::Database("pool exhausted".into())).parts();
        assert_eq!(body, "Internal server error");
    }

    #[test]
    fn test_auth_is_unauthorized() {
        let (status, _) = ApiError(Error::Auth("Invalid token".into())).parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
