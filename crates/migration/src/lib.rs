//! # Migrations and Seeds
//!
//! Schema migrations for every CRM table, the database connection helper and
//! the seed providers for the permission catalog and default role grants.
//!
//! Enumerations are stored as short strings and foreign keys are declared
//! inline, so the same migrations run on PostgreSQL and SQLite.

pub use sea_orm_migration::prelude::*;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

mod m20250101_000001_create_identity_tables;
mod m20250101_000002_create_customer_tables;
mod m20250101_000003_create_lead_tables;
mod m20250101_000004_create_deal_tables;
mod m20250101_000005_create_automation_tables;
mod m20250101_000006_create_notification_tables;
mod m20250101_000007_create_integration_tables;
mod m20250101_000008_create_analytics_tables;
mod m20250101_000009_create_history_tables;
mod m20250101_000010_create_notification_delivery_tables;
mod m20250101_000011_create_integration_detail_tables;
mod m20250101_000012_create_insight_tables;
pub mod seeds;

/// Default connection pool size.
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// The main migrator. Migrations run in the order listed.
#[derive(Debug)]
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_identity_tables::Migration),
            Box::new(m20250101_000002_create_customer_tables::Migration),
            Box::new(m20250101_000003_create_lead_tables::Migration),
            Box::new(m20250101_000004_create_deal_tables::Migration),
            Box::new(m20250101_000005_create_automation_tables::Migration),
            Box::new(m20250101_000006_create_notification_tables::Migration),
            Box::new(m20250101_000007_create_integration_tables::Migration),
            Box::new(m20250101_000008_create_analytics_tables::Migration),
            Box::new(m20250101_000009_create_history_tables::Migration),
            Box::new(m20250101_000010_create_notification_delivery_tables::Migration),
            Box::new(m20250101_000011_create_integration_detail_tables::Migration),
            Box::new(m20250101_000012_create_insight_tables::Migration),
        ]
    }
}

/// Connect with an explicit pool size.
///
/// In-memory SQLite databases are per connection, so callers using
/// `sqlite::memory:` must pass a pool size of 1.
pub async fn connect_with_pool(database_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(max_connections)
        .min_connections(1)
        .sqlx_logging(false);

    Database::connect(options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_names_are_ordered() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names.len(), 12);

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
