//! # Logging Macros
//!
//! Convenience macros for structured log lines with consistent field names.

/// Log a completed API request with method, path, status and duration.
///
/// # Example
///
/// ```rust
/// logging::log_api_request!("GET", "/api/customers", 200, 12, "k192v2g4w3zq8h6j5k1");
/// ```
#[macro_export]
macro_rules! log_api_request {
    ($method:expr, $path:expr, $status:expr, $duration:expr, $request_id:expr) => {
        tracing::info!(
            target: "api",
            method = %$method,
            path = %$path,
            status = %$status,
            duration_ms = %$duration,
            request_id = %$request_id,
            "API request"
        )
    };
}

/// Log a database operation with the table it touched and its duration.
#[macro_export]
macro_rules! log_db_query {
    ($operation:expr, $table:expr, $duration:expr) => {
        tracing::debug!(
            target: "database",
            operation = %$operation,
            table = %$table,
            duration_ms = %$duration,
            "Database query"
        )
    };
}

/// Log an authentication event.
#[macro_export]
macro_rules! log_auth_event {
    ($event:expr, $subject:expr, $success:expr) => {
        tracing::info!(
            target: "auth",
            event = %$event,
            subject = %$subject,
            success = $success,
            "Authentication event"
        )
    };
}
