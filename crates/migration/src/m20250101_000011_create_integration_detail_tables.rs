//! Channel settings for email, calendar, webhook and API integrations, plus
//! data sync jobs between integrations and their run logs.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailIntegrations::Table)
                    .if_not_exists()
                    .col(string(EmailIntegrations::Id).primary_key())
                    .col(string_uniq(EmailIntegrations::IntegrationId))
                    .col(string_len(EmailIntegrations::Service, 20))
                    .col(string(EmailIntegrations::EmailAddress))
                    .col(string_null(EmailIntegrations::SmtpServer))
                    .col(integer_null(EmailIntegrations::SmtpPort))
                    .col(boolean(EmailIntegrations::UseTls).default(true))
                    .col(boolean(EmailIntegrations::UseSsl).default(false))
                    .col(string_null(EmailIntegrations::ImapServer))
                    .col(integer_null(EmailIntegrations::ImapPort))
                    .col(boolean(EmailIntegrations::SyncSentEmails).default(true))
                    .col(boolean(EmailIntegrations::SyncReceivedEmails).default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_email_integrations_integration_id")
                            .from(EmailIntegrations::Table, EmailIntegrations::IntegrationId)
                            .to(Integrations::Table, Integrations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CalendarIntegrations::Table)
                    .if_not_exists()
                    .col(string(CalendarIntegrations::Id).primary_key())
                    .col(string_uniq(CalendarIntegrations::IntegrationId))
                    .col(string_len(CalendarIntegrations::Service, 20))
                    .col(string(CalendarIntegrations::CalendarId))
                    .col(boolean(CalendarIntegrations::SyncEvents).default(true))
                    .col(boolean(CalendarIntegrations::CreateEvents).default(true))
                    .col(boolean(CalendarIntegrations::UpdateEvents).default(true))
                    .col(boolean(CalendarIntegrations::DeleteEvents).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_calendar_integrations_integration_id")
                            .from(CalendarIntegrations::Table, CalendarIntegrations::IntegrationId)
                            .to(Integrations::Table, Integrations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WebhookIntegrations::Table)
                    .if_not_exists()
                    .col(string(WebhookIntegrations::Id).primary_key())
                    .col(string_uniq(WebhookIntegrations::IntegrationId))
                    .col(text(WebhookIntegrations::WebhookUrl))
                    .col(string_null(WebhookIntegrations::SecretKey))
                    .col(json(WebhookIntegrations::Events))
                    .col(boolean(WebhookIntegrations::IsActive).default(true))
                    .col(integer(WebhookIntegrations::RetryCount).default(3))
                    .col(integer(WebhookIntegrations::TimeoutSeconds).default(30))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_webhook_integrations_integration_id")
                            .from(WebhookIntegrations::Table, WebhookIntegrations::IntegrationId)
                            .to(Integrations::Table, Integrations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ApiIntegrations::Table)
                    .if_not_exists()
                    .col(string(ApiIntegrations::Id).primary_key())
                    .col(string_uniq(ApiIntegrations::IntegrationId))
                    .col(text(ApiIntegrations::BaseUrl))
                    .col(string_len(ApiIntegrations::AuthType, 20).default("none"))
                    .col(string_null(ApiIntegrations::ApiKey))
                    .col(string_null(ApiIntegrations::Username))
                    .col(string_null(ApiIntegrations::Password))
                    .col(text_null(ApiIntegrations::BearerToken))
                    .col(json(ApiIntegrations::Headers))
                    .col(integer_null(ApiIntegrations::RateLimit))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_api_integrations_integration_id")
                            .from(ApiIntegrations::Table, ApiIntegrations::IntegrationId)
                            .to(Integrations::Table, Integrations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DataSyncs::Table)
                    .if_not_exists()
                    .col(string(DataSyncs::Id).primary_key())
                    .col(string_len(DataSyncs::Name, 100))
                    .col(string(DataSyncs::SourceIntegrationId))
                    .col(string(DataSyncs::TargetIntegrationId))
                    .col(string_len(DataSyncs::SyncType, 20))
                    .col(string_len(DataSyncs::Status, 20).default("active"))
                    .col(json(DataSyncs::FieldMapping))
                    .col(integer(DataSyncs::SyncFrequency).default(3600))
                    .col(timestamp_with_time_zone_null(DataSyncs::LastSync))
                    .col(timestamp_with_time_zone_null(DataSyncs::NextSync))
                    .col(integer(DataSyncs::SyncCount).default(0))
                    .col(integer(DataSyncs::ErrorCount).default(0))
                    .col(timestamp_with_time_zone(DataSyncs::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(DataSyncs::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_data_syncs_source_integration_id")
                            .from(DataSyncs::Table, DataSyncs::SourceIntegrationId)
                            .to(Integrations::Table, Integrations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_data_syncs_target_integration_id")
                            .from(DataSyncs::Table, DataSyncs::TargetIntegrationId)
                            .to(Integrations::Table, Integrations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SyncLogs::Table)
                    .if_not_exists()
                    .col(string(SyncLogs::Id).primary_key())
                    .col(string(SyncLogs::DataSyncId))
                    .col(string_len(SyncLogs::Status, 20))
                    .col(integer(SyncLogs::RecordsProcessed).default(0))
                    .col(integer(SyncLogs::RecordsSuccessful).default(0))
                    .col(integer(SyncLogs::RecordsFailed).default(0))
                    .col(text_null(SyncLogs::ErrorMessage))
                    .col(integer_null(SyncLogs::ExecutionTime))
                    .col(timestamp_with_time_zone(SyncLogs::StartedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone_null(SyncLogs::CompletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sync_logs_data_sync_id")
                            .from(SyncLogs::Table, SyncLogs::DataSyncId)
                            .to(DataSyncs::Table, DataSyncs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sync_logs_data_sync_id")
                    .table(SyncLogs::Table)
                    .col(SyncLogs::DataSyncId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncLogs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DataSyncs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ApiIntegrations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WebhookIntegrations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CalendarIntegrations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EmailIntegrations::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum EmailIntegrations {
    Table,
    Id,
    IntegrationId,
    Service,
    EmailAddress,
    SmtpServer,
    SmtpPort,
    UseTls,
    UseSsl,
    ImapServer,
    ImapPort,
    SyncSentEmails,
    SyncReceivedEmails,
}

#[derive(DeriveIden)]
enum CalendarIntegrations {
    Table,
    Id,
    IntegrationId,
    Service,
    CalendarId,
    SyncEvents,
    CreateEvents,
    UpdateEvents,
    DeleteEvents,
}

#[derive(DeriveIden)]
enum WebhookIntegrations {
    Table,
    Id,
    IntegrationId,
    WebhookUrl,
    SecretKey,
    Events,
    IsActive,
    RetryCount,
    TimeoutSeconds,
}

#[derive(DeriveIden)]
enum ApiIntegrations {
    Table,
    Id,
    IntegrationId,
    BaseUrl,
    AuthType,
    ApiKey,
    Username,
    Password,
    BearerToken,
    Headers,
    RateLimit,
}

#[derive(DeriveIden)]
enum DataSyncs {
    Table,
    Id,
    Name,
    SourceIntegrationId,
    TargetIntegrationId,
    SyncType,
    Status,
    FieldMapping,
    SyncFrequency,
    LastSync,
    NextSync,
    SyncCount,
    ErrorCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SyncLogs {
    Table,
    Id,
    DataSyncId,
    Status,
    RecordsProcessed,
    RecordsSuccessful,
    RecordsFailed,
    ErrorMessage,
    ExecutionTime,
    StartedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum Integrations {
    Table,
    Id,
}
