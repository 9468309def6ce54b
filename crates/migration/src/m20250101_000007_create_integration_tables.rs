//! Third-party integrations and their logs.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Integrations::Table)
                    .if_not_exists()
                    .col(string(Integrations::Id).primary_key())
                    .col(string_uniq(Integrations::Name))
                    .col(string_len(Integrations::IntegrationType, 30))
                    .col(string_len(Integrations::Status, 20).default("pending"))
                    .col(json(Integrations::Configuration))
                    .col(json(Integrations::Credentials))
                    .col(integer(Integrations::SyncFrequency).default(3600))
                    .col(timestamp_with_time_zone_null(Integrations::LastSyncAt))
                    .col(text_null(Integrations::ErrorMessage))
                    .col(string_null(Integrations::CreatedBy))
                    .col(timestamp_with_time_zone(Integrations::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Integrations::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_integrations_created_by")
                            .from(Integrations::Table, Integrations::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IntegrationLogs::Table)
                    .if_not_exists()
                    .col(string(IntegrationLogs::Id).primary_key())
                    .col(string(IntegrationLogs::IntegrationId))
                    .col(string_len(IntegrationLogs::Level, 10).default("info"))
                    .col(text(IntegrationLogs::Message))
                    .col(json(IntegrationLogs::Details))
                    .col(timestamp_with_time_zone(IntegrationLogs::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_integration_logs_integration_id")
                            .from(IntegrationLogs::Table, IntegrationLogs::IntegrationId)
                            .to(Integrations::Table, Integrations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_integration_logs_integration_id")
                    .table(IntegrationLogs::Table)
                    .col(IntegrationLogs::IntegrationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IntegrationLogs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Integrations::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Integrations {
    Table,
    Id,
    Name,
    IntegrationType,
    Status,
    Configuration,
    Credentials,
    SyncFrequency,
    LastSyncAt,
    ErrorMessage,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum IntegrationLogs {
    Table,
    Id,
    IntegrationId,
    Level,
    Message,
    Details,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
