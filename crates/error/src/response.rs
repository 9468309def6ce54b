//! # Error Responses
//!
//! Rendering of [`AppError`] into the JSON error envelope returned by the API:
//!
//! ```json
//! { "success": false, "code": "VALIDATION_ERROR", "message": "...", "details": { "email": ["..."] } }
//! ```

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{AppError, FieldErrors};

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub code:    &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

/// Error handler that converts errors to HTTP responses.
///
/// Client errors are returned verbatim. Server errors are logged and replaced by a
/// generic message unless `include_details` is set.
#[derive(Clone, Debug, Default)]
pub struct ErrorHandler {
    /// Whether to include server error details in the response.
    pub include_details: bool,
}

impl ErrorHandler {
    /// Create a new error handler.
    #[inline]
    pub fn new(include_details: bool) -> Self {
        Self {
            include_details,
        }
    }

    /// Build the response body for an error.
    pub fn body(&self, err: &AppError) -> ErrorBody {
        let status = err.status();
        let message = if status.is_server_error() && !self.include_details {
            "Internal server error".to_string()
        }
        else {
            err.message()
        };

        ErrorBody {
            success: false,
            code: err.code(),
            message,
            details: err.field_errors().cloned(),
        }
    }

    /// Convert an error to a response.
    pub fn to_response(&self, err: &AppError) -> Response {
        let status = err.status();
        if status.is_server_error() {
            tracing::error!(code = err.code(), error = %err, "Request failed");
        }
        else {
            tracing::debug!(code = err.code(), error = %err, "Request rejected");
        }

        let body = Json(self.body(err));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        }
        else {
            (status, body).into_response()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response { ErrorHandler::default().to_response(&self) }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let response = AppError::not_found("Customer not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Customer not found");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_validation_response_has_details() {
        let response = AppError::field("password", "Passwords don't match.").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["details"]["password"][0], "Passwords don't match.");
    }

    #[tokio::test]
    async fn test_server_error_hides_message() {
        let response = AppError::database("connection refused on 10.0.0.3").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["message"], "Internal server error");
        assert_eq!(json["code"], "DATABASE_ERROR");
    }

    #[test]
    fn test_handler_can_include_details() {
        let handler = ErrorHandler::new(true);
        let body = handler.body(&AppError::internal("stack overflow"));
        assert_eq!(body.message, "stack overflow");
    }

    #[test]
    fn test_unauthorized_sets_challenge_header() {
        let response = AppError::JwtExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
