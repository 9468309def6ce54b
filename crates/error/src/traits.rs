//! # Error Traits
//!
//! Extension methods for attaching context to fallible operations.

use crate::{AppError, Result};

/// Extension methods for Result types.
pub trait ResultExt<T> {
    /// Convert the error into an [`AppError`] prefixed with `context`.
    fn context<C: ToString>(self, context: C) -> Result<T>;

    /// Like [`ResultExt::context`], with the context built lazily.
    fn with_context<C: ToString, F: FnOnce() -> C>(self, f: F) -> Result<T>;

    /// Log the error at error level and pass it through.
    fn log_error(self) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn context<C: ToString>(self, context: C) -> Result<T> {
        self.map_err(|e| {
            let err: AppError = e.into();
            err.context(context)
        })
    }

    fn with_context<C: ToString, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let err: AppError = e.into();
            err.context(f())
        })
    }

    fn log_error(self) -> Result<T> {
        self.map_err(|e| {
            let err: AppError = e.into();
            tracing::error!(error = %err, "Error occurred");
            err
        })
    }
}

/// Extension for turning a missing row into a not-found error.
pub trait OptionExt<T> {
    /// Return `AppError::NotFound` with `message` when the option is empty.
    fn or_not_found(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, message: &str) -> Result<T> { self.ok_or_else(|| AppError::not_found(message)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context() {
        let result: Result<i32> = Err(AppError::not_found("Deal"));
        let err = result.context("Loading deal").unwrap_err();
        assert_eq!(err.message(), "Loading deal: Deal");
    }

    #[test]
    fn test_with_context_is_lazy() {
        let ok: Result<i32> = Ok(1);
        let value = ok
            .with_context(|| -> String { panic!("context built for Ok value") })
            .unwrap();
        assert_eq!(value, 1);
    }

    #[test]
    fn test_log_error() {
        let result: Result<i32> = Err(AppError::not_found("User"));
        assert!(result.log_error().is_err());
    }

    #[test]
    fn test_or_not_found() {
        let missing: Option<i32> = None;
        let err = missing.or_not_found("Team not found").unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(Some(3).or_not_found("x").unwrap(), 3);
    }
}
