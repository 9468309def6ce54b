//! # CLI Seed Command

use error::{Result, SeedResult};
use sea_orm::DatabaseConnection;
use tracing::info;

/// Runs every seed provider. Safe to repeat.
pub async fn seed(db: &DatabaseConnection) -> Result<()> {
    let results = migration::seeds::run_all_seeds(db, true).await?;

    let inserted: usize = results.iter().map(|r| r.inserted_count).sum();
    let records: usize = results.iter().map(SeedResult::total).sum();
    info!(target: "seed", seeds = results.len(), inserted, records, "Seeding completed");
    Ok(())
}
