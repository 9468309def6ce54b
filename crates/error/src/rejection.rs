//! # Rejection Handlers
//!
//! Conversion of Axum extractor rejections into [`AppError`] so malformed bodies
//! produce the same error envelope as every other failure.

use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::AppError;

/// Map a JSON body rejection to an application error.
///
/// Errors like "missing field `email`" become a field-level validation error on
/// that field; anything else is a plain bad request.
pub fn handle_json_rejection(rejection: JsonRejection) -> AppError {
    let error_message = rejection.body_text();

    if let Some(start) = error_message.find("missing field `") {
        let rest = &error_message[start + 15 ..];
        if let Some(end) = rest.find('`') {
            let field_name = &rest[.. end];
            return AppError::field(field_name, "This field is required.");
        }
    }

    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::bad_request("Expected request with `Content-Type: application/json`")
        },
        JsonRejection::JsonSyntaxError(_) => AppError::bad_request("Malformed JSON body"),
        _ => AppError::bad_request(error_message),
    }
}

/// JSON extractor and response type that reports rejections as [`AppError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(handle_json_rejection(rejection)),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response { Json(self.0).into_response() }
}

/// JSON extractor for endpoints whose body is optional.
///
/// An absent or blank body yields `T::default()`; anything else must parse,
/// and a malformed body is rejected exactly like [`ApiJson`] rejects it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJsonOrDefault<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJsonOrDefault<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        match Json::<T>::from_bytes(&bytes) {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(handle_json_rejection(rejection)),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::header};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Login {
        #[allow(dead_code)]
        email: String,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_field_becomes_field_error() {
        let err = ApiJson::<Login>::from_request(json_request("{}"), &())
            .await
            .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields["email"], vec!["This field is required.".to_string()]);
    }

    #[tokio::test]
    async fn test_syntax_error_is_bad_request() {
        let err = ApiJson::<Login>::from_request(json_request("{not json"), &())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[derive(Debug, Default, Deserialize)]
    struct Convert {
        customer_id: Option<String>,
    }

    #[tokio::test]
    async fn test_optional_body_defaults_when_empty() {
        let ApiJsonOrDefault(convert) = ApiJsonOrDefault::<Convert>::from_request(json_request(""), &())
            .await
            .unwrap();
        assert!(convert.customer_id.is_none());

        let ApiJsonOrDefault(convert) = ApiJsonOrDefault::<Convert>::from_request(json_request(r#"{"customer_id":"c1"}"#), &())
            .await
            .unwrap();
        assert_eq!(convert.customer_id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_optional_body_rejects_malformed_json() {
        let err = ApiJsonOrDefault::<Convert>::from_request(json_request("{not json"), &())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let ApiJson(login) = ApiJson::<Login>::from_request(json_request(r#"{"email":"a@b.co"}"#), &())
            .await
            .unwrap();
        assert_eq!(login.email, "a@b.co");
    }
}
