//! # CRM API Server
//!
//! Axum-based HTTP API for the CRM backend.
//!
//! ## Modules
//!
//! - [`auth`]: Authentication endpoints, users, profiles, teams and permissions
//! - [`customers`], [`leads`], [`deals`]: Sales records and their child records
//! - [`automation`], [`notifications`], [`integrations`], [`analytics`]: Supporting records
//! - [`scope`]: Role-based row filters applied to every query
//! - [`dto`]: Request/response data transfer objects
//! - [`middleware`]: Authentication and request id middleware
//! - [`router`]: API route configuration

use std::time::Instant;

use ::auth::JwtConfig;
use sea_orm::DatabaseConnection;

/// Applies the `Some` fields of a partial update request to an active model.
///
/// Fields in the first list are required columns. Fields in the second list are
/// nullable columns carried as `Option<Option<T>>`, where `Some(None)` clears
/// the column.
macro_rules! patch {
    ($active:ident, $req:ident, [$($field:ident),* $(,)?], [$($nullable:ident),* $(,)?]) => {
        $(
            if let Some(value) = $req.$field {
                $active.$field = ::sea_orm::Set(value);
            }
        )*
        $(
            if let Some(value) = $req.$nullable {
                $active.$nullable = ::sea_orm::Set(value);
            }
        )*
    };
}

pub mod analytics;
pub mod auth;
pub mod automation;
pub mod customers;
pub mod deals;
pub mod dto;
pub mod integrations;
pub mod leads;
pub mod middleware;
pub mod notifications;
pub mod refresh_tokens;
pub mod router;
pub mod scope;
pub mod utils;

pub use router::create_app_router;

/// Default lifetime of refresh tokens in days
pub const DEFAULT_REFRESH_TOKEN_DAYS: i64 = 7;

/// Application state shared across request handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection pool
    pub db:                 DatabaseConnection,
    /// JWT configuration
    pub jwt_config:         JwtConfig,
    /// Refresh token lifetime in days
    pub refresh_token_days: i64,
    /// Origins allowed by the CORS layer
    pub cors_origins:       Vec<String>,
    /// Server start time for uptime calculation
    pub start_time:         Instant,
}

impl AppState {
    /// Creates state with the default refresh token lifetime and no CORS origins.
    #[must_use]
    pub fn new(db: DatabaseConnection, jwt_config: JwtConfig) -> Self {
        Self {
            db,
            jwt_config,
            refresh_token_days: DEFAULT_REFRESH_TOKEN_DAYS,
            cors_origins: Vec::new(),
            start_time: Instant::now(),
        }
    }

    #[must_use]
    pub fn with_refresh_token_days(mut self, days: i64) -> Self {
        self.refresh_token_days = days;
        self
    }

    #[must_use]
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }
}
