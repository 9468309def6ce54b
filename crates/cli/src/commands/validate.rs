//! # CLI Validate Command
//!
//! Checks that the configuration parses and the database answers.

use error::{AppError, Result};
use tracing::info;

use crate::config::{cors_origins_from_env, DatabaseConfig, TokenConfig};

/// Validates configuration and database connectivity
///
/// # Errors
///
/// `Config` for unparsable settings, `Database` when the database cannot be
/// reached.
pub async fn validate() -> Result<()> {
    info!(target: "validate", "Validating configuration...");

    let database = DatabaseConfig::from_env().map_err(AppError::config)?;
    let tokens = TokenConfig::from_env().map_err(AppError::config)?;
    let origins = cors_origins_from_env();

    info!(
        target: "validate",
        database = %database.redacted_url(),
        issuer = %tokens.jwt.issuer,
        access_ttl = tokens.jwt.expiration_seconds,
        refresh_days = tokens.refresh_token_days,
        cors_origins = origins.len(),
        "Configuration parsed"
    );

    let db = crate::commands::migrate::connect(&database).await?;
    db.ping()
        .await
        .map_err(|e| AppError::database(format!("Database did not answer: {}", e)))?;

    info!(target: "validate", "Configuration is valid");
    Ok(())
}
