//! # CLI Migration Command
//!
//! Applies, previews or rolls back schema migrations.

use error::{AppError, Result, ResultExt as _};
use migration::{Migrator, MigratorTrait as _};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::{commands::MigrateArgs, config::DatabaseConfig};

/// Connects using the configured URL and pool size.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    info!(target: "db", url = %config.redacted_url(), pool_size = config.pool_size, "Connecting to database...");
    migration::connect_with_pool(&config.database_url(), config.pool_size)
        .await
        .context("Failed to connect to database")
}

/// Runs database migrations
///
/// # Arguments
///
/// * `config` - Database configuration
/// * `args` - Migrate command arguments
pub async fn migrate(config: &DatabaseConfig, args: &MigrateArgs) -> Result<()> {
    info!(
        target: "migrate",
        dry_run = %args.dry_run,
        rollback = ?args.rollback,
        "Running database migrations..."
    );

    let db = connect(config).await?;

    if args.dry_run {
        let pending = Migrator::get_pending_migrations(&db)
            .await
            .map_err(|e| AppError::migration(format!("Failed to list pending migrations: {}", e)))?;

        info!(target: "migrate", pending_count = pending.len(), "Dry run, nothing applied");
        for m in &pending {
            info!(target: "migrate", migration = %m.name(), "Would apply");
        }
        return Ok(());
    }

    if let Some(steps) = args.rollback {
        info!(target: "migrate", steps, "Rolling back migrations...");
        Migrator::down(&db, Some(steps))
            .await
            .map_err(|e| AppError::migration(format!("Failed to roll back migrations: {}", e)))?;
        info!(target: "migrate", steps, "Rollback completed successfully");
        return Ok(());
    }

    apply(&db).await
}

/// Applies every pending migration.
pub async fn apply(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| AppError::migration(format!("Failed to run migrations: {}", e)))?;
    info!(target: "migrate", "Migrations completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_apply_then_rollback() {
        let db = migration::connect_with_pool("sqlite::memory:", 1).await.unwrap();

        let pending = Migrator::get_pending_migrations(&db).await.unwrap();
        assert_eq!(pending.len(), Migrator::migrations().len());

        apply(&db).await.unwrap();
        assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());

        Migrator::down(&db, Some(2)).await.unwrap();
        assert_eq!(Migrator::get_pending_migrations(&db).await.unwrap().len(), 2);
    }
}
