//! # Seed Data Management
//!
//! Idempotent seeds for the permission catalog and the default role grants,
//! plus the helper behind `crm create-admin`.

mod admin;
mod permissions;

use ::error::{AppError, SeedResult};
pub use admin::create_admin;
pub use permissions::{PermissionSeed, RolePermissionSeed};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

/// Trait for seed data providers
#[async_trait::async_trait]
pub trait SeedProvider: Send + Sync {
    /// The name of this seed
    fn name(&self) -> &str;

    /// Runs the seed operation. Must be safe to run repeatedly.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed operation fails.
    async fn run(&self, db: &DatabaseConnection) -> Result<SeedResult, AppError>;
}

/// Seed providers in dependency order.
#[must_use]
pub fn providers() -> Vec<Box<dyn SeedProvider>> { vec![Box::new(PermissionSeed), Box::new(RolePermissionSeed)] }

/// Runs all registered seed providers
///
/// # Arguments
///
/// * `db` - The database connection
/// * `verbose` - Log a line per seed
///
/// # Errors
///
/// Stops at the first failing seed and returns its error.
pub async fn run_all_seeds(db: &DatabaseConnection, verbose: bool) -> Result<Vec<SeedResult>, AppError> {
    let mut results = Vec::new();

    for provider in providers() {
        let result = provider.run(db).await.map_err(|e| {
            warn!(seed = %provider.name(), error = %e, "Seed failed");
            e.context(format!("seed '{}'", provider.name()))
        })?;

        if verbose {
            info!(
                seed = %result.seed_name,
                inserted = result.inserted_count,
                skipped = result.skipped_count,
                duration_ms = result.duration_ms,
                "Seed completed"
            );
        }
        results.push(result);
    }

    Ok(results)
}
