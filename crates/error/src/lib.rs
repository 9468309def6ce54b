//! # CRM Error Infrastructure
//!
//! Error taxonomy shared by every crate in the workspace, plus the mapping of
//! those errors onto HTTP responses.

use std::collections::BTreeMap;

pub mod rejection;
pub mod response;
pub mod traits;

pub use rejection::{handle_json_rejection, ApiJson, ApiJsonOrDefault};
pub use response::{ErrorBody, ErrorHandler};
pub use traits::{OptionExt, ResultExt};

/// Convenience type alias for Result with AppError.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Field name used for validation failures that are not tied to one input field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Field-level validation messages keyed by input field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Main application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("NotFound: {message}")]
    NotFound {
        message: String,
    },

    #[error("BadRequest: {message}")]
    BadRequest {
        message: String,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
    },

    #[error("JwtExpired: Token has expired")]
    JwtExpired,

    #[error("JwtInvalidSignature: Invalid token signature")]
    JwtInvalidSignature,

    #[error("JwtInvalidToken: Invalid token")]
    JwtInvalidToken,

    #[error("Forbidden: {message}")]
    Forbidden {
        message: String,
    },

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    #[error("Validation: {message}")]
    Validation {
        message: String,
        fields:  FieldErrors,
    },

    #[error("Internal: {message}")]
    Internal {
        message: String,
    },

    #[error("Database: {message}")]
    Database {
        message: String,
    },

    #[error("IO: {message}")]
    Io {
        message: String,
    },

    #[error("Config: {message}")]
    Config {
        message: String,
    },

    #[error("Migration: {message}")]
    Migration {
        message: String,
    },
}

/// Seed operation result
#[derive(Debug, Clone)]
pub struct SeedResult {
    /// Number of records inserted
    pub inserted_count: usize,
    /// Number of records that already existed and were left alone
    pub skipped_count:  usize,
    /// Seed name for logging
    pub seed_name:      String,
    /// Duration of the seed operation in milliseconds
    pub duration_ms:    u64,
}

impl SeedResult {
    /// Creates a new successful seed result
    #[must_use]
    pub fn success(seed_name: &str, inserted: usize, skipped: usize, duration_ms: u64) -> Self {
        Self {
            inserted_count: inserted,
            skipped_count: skipped,
            seed_name: seed_name.to_string(),
            duration_ms,
        }
    }

    /// Records touched by the seed, inserted or skipped
    #[must_use]
    pub fn total(&self) -> usize { self.inserted_count + self.skipped_count }
}

impl AppError {
    /// Create a not found error.
    #[inline]
    pub fn not_found(resource: impl ToString) -> Self {
        Self::NotFound {
            message: resource.to_string(),
        }
    }

    /// Create a bad request error.
    #[inline]
    pub fn bad_request(message: impl ToString) -> Self {
        Self::BadRequest {
            message: message.to_string(),
        }
    }

    /// Create an unauthorized error.
    #[inline]
    pub fn unauthorized(message: impl ToString) -> Self {
        Self::Unauthorized {
            message: message.to_string(),
        }
    }

    /// Create a forbidden error.
    #[inline]
    pub fn forbidden(message: impl ToString) -> Self {
        Self::Forbidden {
            message: message.to_string(),
        }
    }

    /// Create a conflict error.
    #[inline]
    pub fn conflict(message: impl ToString) -> Self {
        Self::Conflict {
            message: message.to_string(),
        }
    }

    /// Create a validation error that is not attached to a single field.
    #[inline]
    pub fn validation(message: impl ToString) -> Self {
        Self::Validation {
            message: message.to_string(),
            fields:  FieldErrors::new(),
        }
    }

    /// Create a validation error for one input field.
    ///
    /// # Arguments
    ///
    /// * `field` - Name of the offending input field
    /// * `message` - Human readable description of the problem
    pub fn field(field: impl ToString, message: impl ToString) -> Self {
        let message = message.to_string();
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.clone()]);
        Self::Validation {
            message,
            fields,
        }
    }

    /// Create a validation error from a full field map.
    pub fn fields(fields: FieldErrors) -> Self {
        let message = fields
            .values()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        Self::Validation {
            message: if message.is_empty() {
                "Validation failed".to_string()
            }
            else {
                message
            },
            fields,
        }
    }

    /// Create an internal error.
    #[inline]
    pub fn internal(message: impl ToString) -> Self {
        Self::Internal {
            message: message.to_string(),
        }
    }

    /// Create a database error.
    #[inline]
    pub fn database(message: impl ToString) -> Self {
        Self::Database {
            message: message.to_string(),
        }
    }

    /// Create a config error.
    #[inline]
    pub fn config(message: impl ToString) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }

    /// Create a migration error.
    #[inline]
    pub fn migration(message: impl ToString) -> Self {
        Self::Migration {
            message: message.to_string(),
        }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            AppError::NotFound {
                ..
            } => StatusCode::NOT_FOUND,
            AppError::BadRequest {
                ..
            } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized {
                ..
            }
            | AppError::JwtExpired
            | AppError::JwtInvalidSignature
            | AppError::JwtInvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden {
                ..
            } => StatusCode::FORBIDDEN,
            AppError::Conflict {
                ..
            } => StatusCode::CONFLICT,
            AppError::Validation {
                ..
            } => StatusCode::BAD_REQUEST,
            AppError::Internal {
                ..
            }
            | AppError::Database {
                ..
            }
            | AppError::Io {
                ..
            }
            | AppError::Config {
                ..
            }
            | AppError::Migration {
                ..
            } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound {
                ..
            } => "NOT_FOUND",
            AppError::BadRequest {
                ..
            } => "BAD_REQUEST",
            AppError::Unauthorized {
                ..
            } => "AUTHENTICATION_ERROR",
            AppError::JwtExpired => "JWT_EXPIRED",
            AppError::JwtInvalidSignature => "JWT_INVALID_SIGNATURE",
            AppError::JwtInvalidToken => "JWT_INVALID_TOKEN",
            AppError::Forbidden {
                ..
            } => "FORBIDDEN",
            AppError::Conflict {
                ..
            } => "CONFLICT",
            AppError::Validation {
                ..
            } => "VALIDATION_ERROR",
            AppError::Internal {
                ..
            } => "INTERNAL_ERROR",
            AppError::Database {
                ..
            } => "DATABASE_ERROR",
            AppError::Io {
                ..
            } => "IO_ERROR",
            AppError::Config {
                ..
            } => "CONFIG_ERROR",
            AppError::Migration {
                ..
            } => "MIGRATION_ERROR",
        }
    }

    /// The message carried by the variant, `None` for token errors.
    fn message_slot(&mut self) -> Option<&mut String> {
        match self {
            AppError::JwtExpired | AppError::JwtInvalidSignature | AppError::JwtInvalidToken => None,
            AppError::NotFound {
                message,
            }
            | AppError::BadRequest {
                message,
            }
            | AppError::Unauthorized {
                message,
            }
            | AppError::Forbidden {
                message,
            }
            | AppError::Conflict {
                message,
            }
            | AppError::Validation {
                message,
                ..
            }
            | AppError::Internal {
                message,
            }
            | AppError::Database {
                message,
            }
            | AppError::Io {
                message,
            }
            | AppError::Config {
                message,
            }
            | AppError::Migration {
                message,
            } => Some(message),
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::JwtExpired => "Token has expired".to_string(),
            AppError::JwtInvalidSignature => "Invalid token signature".to_string(),
            AppError::JwtInvalidToken => "Invalid token".to_string(),
            AppError::NotFound {
                message,
            }
            | AppError::BadRequest {
                message,
            }
            | AppError::Unauthorized {
                message,
            }
            | AppError::Forbidden {
                message,
            }
            | AppError::Conflict {
                message,
            }
            | AppError::Validation {
                message,
                ..
            }
            | AppError::Internal {
                message,
            }
            | AppError::Database {
                message,
            }
            | AppError::Io {
                message,
            }
            | AppError::Config {
                message,
            }
            | AppError::Migration {
                message,
            } => message.clone(),
        }
    }

    /// Field-level messages carried by a validation error.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Validation {
                fields,
                ..
            } if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }

    /// Add context to the error.
    ///
    /// Token errors have fixed messages and are returned unchanged.
    #[inline]
    pub fn context(mut self, context: impl ToString) -> Self {
        if let Some(message) = self.message_slot() {
            *message = format!("{}: {}", context.to_string(), message);
        }
        self
    }
}

/// Convert anyhow errors to AppError.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}

/// Convert std::io errors to AppError.
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

/// Convert Sea-ORM database errors to AppError.
///
/// Constraint violations are client errors: a duplicate unique value becomes
/// `Conflict` and a dangling reference becomes `BadRequest`.
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                return Self::Conflict {
                    message: "A record with the same unique value already exists".to_string(),
                };
            },
            Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(_)) => {
                return Self::BadRequest {
                    message: "Referenced record does not exist".to_string(),
                };
            },
            _ => {},
        }

        match err {
            sea_orm::DbErr::RecordNotFound(message) => {
                Self::NotFound {
                    message,
                }
            },
            other => {
                Self::Database {
                    message: other.to_string(),
                }
            },
        }
    }
}

/// Convert validator validation errors to AppError, keeping per-field detail.
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errors) in err.field_errors() {
            let messages = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", e.code))
                })
                .collect::<Vec<_>>();
            let key = if field == "__all__" {
                NON_FIELD_ERRORS.to_string()
            }
            else {
                field.to_string()
            };
            fields.entry(key).or_default().extend(messages);
        }

        Self::fields(fields)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_error_not_found() {
        let err = AppError::not_found("Customer");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.to_string().contains("NotFound"));
    }

    #[test]
    fn test_error_unauthorized_uses_authentication_code() {
        let err = AppError::unauthorized("Invalid token");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "AUTHENTICATION_ERROR");
    }

    #[test]
    fn test_validation_is_client_error() {
        let err = AppError::validation("Invalid format");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn test_field_error_carries_field_detail() {
        let err = AppError::field("password", "Passwords don't match.");
        let fields = err.field_errors().unwrap();
        assert_eq!(fields["password"], vec!["Passwords don't match.".to_string()]);
        assert_eq!(err.message(), "Passwords don't match.");
    }

    #[test]
    fn test_fields_joins_messages() {
        let mut fields = FieldErrors::new();
        fields.insert("email".into(), vec!["Enter a valid email address.".into()]);
        fields.insert("phone".into(), vec!["Invalid phone number.".into()]);
        let err = AppError::fields(fields);
        assert_eq!(
            err.message(),
            "Enter a valid email address., Invalid phone number."
        );
    }

    #[test]
    fn test_server_errors() {
        assert_eq!(
            AppError::internal("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::database("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::config("x").code(), "CONFIG_ERROR");
        assert_eq!(AppError::migration("x").code(), "MIGRATION_ERROR");
    }

    #[test]
    fn test_context_prefixes_message() {
        let err = AppError::not_found("Lead").context("Converting lead");
        assert_eq!(err.message(), "Converting lead: Lead");
    }

    #[test]
    fn test_context_keeps_token_errors() {
        let err = AppError::JwtExpired.context("ignored");
        assert!(matches!(err, AppError::JwtExpired));
        assert_eq!(err.message(), "Token has expired");
    }

    #[test]
    fn test_context_keeps_fields() {
        let err = AppError::field("email", "taken").context("Registering");
        assert!(err.field_errors().unwrap().contains_key("email"));
    }

    #[test]
    fn test_from_record_not_found() {
        let err: AppError = sea_orm::DbErr::RecordNotFound("Deal".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_from_other_db_error() {
        let err: AppError = sea_orm::DbErr::Custom("boom".into()).into();
        assert_eq!(err.code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_from_anyhow() {
        let err: AppError = anyhow::anyhow!("Test error").into();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: AppError = io_err.into();
        assert_eq!(err.code(), "IO_ERROR");
    }

    #[test]
    fn test_seed_result() {
        let result = SeedResult::success("permissions", 16, 2, 12);
        assert_eq!(result.inserted_count, 16);
        assert_eq!(result.total(), 18);
    }

    #[test]
    fn test_from_validation_errors_keeps_fields() {
        use validator::Validate;

        #[derive(Validate)]
        struct DealInput {
            #[validate(range(min = 0, max = 100, message = "Probability must be between 0 and 100"))]
            probability: i32,
            #[validate(email(message = "Enter a valid email address."))]
            email:       String,
        }

        let input = DealInput {
            probability: 150,
            email:       "nope".into(),
        };
        let err: AppError = input.validate().unwrap_err().into();
        let fields = err.field_errors().unwrap();
        assert_eq!(
            fields["probability"],
            vec!["Probability must be between 0 and 100".to_string()]
        );
        assert_eq!(
            fields["email"],
            vec!["Enter a valid email address.".to_string()]
        );
    }
}
