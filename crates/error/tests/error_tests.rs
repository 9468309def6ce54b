//! # Error Crate Tests
//!
//! Behaviour of the public error API as seen by downstream crates.

use axum::{http::StatusCode, response::IntoResponse};
use error::{AppError, ErrorHandler, FieldErrors, OptionExt, ResultExt, NON_FIELD_ERRORS};

#[test]
fn test_login_failure_shape() {
    let err = AppError::field(NON_FIELD_ERRORS, "Invalid email or password.");
    let body = ErrorHandler::default().body(&err);

    assert_eq!(body.code, "VALIDATION_ERROR");
    let details = body.details.unwrap();
    assert_eq!(
        details[NON_FIELD_ERRORS],
        vec!["Invalid email or password.".to_string()]
    );
}

#[test]
fn test_not_found_is_distinct_from_unauthorized() {
    let not_found = AppError::not_found("User not found").into_response();
    let unauthorized = AppError::unauthorized("Missing authorization header").into_response();
    assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
    assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn test_multiple_fields_are_preserved() {
    let mut fields = FieldErrors::new();
    fields.insert("password".into(), vec![
        "This password is too short. It must contain at least 8 characters.".into(),
        "This password is entirely numeric.".into(),
    ]);
    let err = AppError::fields(fields);
    assert_eq!(err.field_errors().unwrap()["password"].len(), 2);
}

#[test]
fn test_context_chain() {
    let missing: Option<()> = None;
    let err = missing
        .or_not_found("Pipeline not found")
        .context("Setting default pipeline")
        .unwrap_err();
    assert_eq!(err.message(), "Setting default pipeline: Pipeline not found");
}
