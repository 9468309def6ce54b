//! Notifications, templates, per-user preferences and campaigns.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(string(Notifications::Id).primary_key())
                    .col(string(Notifications::RecipientId))
                    .col(string_null(Notifications::SenderId))
                    .col(string_len(Notifications::NotificationType, 30).default("system"))
                    .col(string_len(Notifications::Priority, 10).default("medium"))
                    .col(string(Notifications::Title))
                    .col(text(Notifications::Message))
                    .col(json(Notifications::Data))
                    .col(string_len_null(Notifications::RelatedObjectType, 50))
                    .col(string_null(Notifications::RelatedObjectId))
                    .col(timestamp_with_time_zone_null(Notifications::ReadAt))
                    .col(timestamp_with_time_zone(Notifications::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_recipient_id")
                            .from(Notifications::Table, Notifications::RecipientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_sender_id")
                            .from(Notifications::Table, Notifications::SenderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notifications_recipient_read")
                    .table(Notifications::Table)
                    .col(Notifications::RecipientId)
                    .col(Notifications::ReadAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NotificationTemplates::Table)
                    .if_not_exists()
                    .col(string(NotificationTemplates::Id).primary_key())
                    .col(string_uniq(NotificationTemplates::Name))
                    .col(string_len(NotificationTemplates::NotificationType, 30).default("system"))
                    .col(string(NotificationTemplates::SubjectTemplate))
                    .col(text(NotificationTemplates::BodyTemplate))
                    .col(json(NotificationTemplates::Channels))
                    .col(boolean(NotificationTemplates::IsActive).default(true))
                    .col(timestamp_with_time_zone(NotificationTemplates::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(NotificationTemplates::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NotificationPreferences::Table)
                    .if_not_exists()
                    .col(string(NotificationPreferences::Id).primary_key())
                    .col(string_uniq(NotificationPreferences::UserId))
                    .col(boolean(NotificationPreferences::EmailEnabled).default(true))
                    .col(boolean(NotificationPreferences::SmsEnabled).default(false))
                    .col(boolean(NotificationPreferences::PushEnabled).default(true))
                    .col(boolean(NotificationPreferences::InAppEnabled).default(true))
                    .col(json(NotificationPreferences::TypeSettings))
                    .col(time_null(NotificationPreferences::QuietHoursStart))
                    .col(time_null(NotificationPreferences::QuietHoursEnd))
                    .col(timestamp_with_time_zone(NotificationPreferences::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(NotificationPreferences::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_preferences_user_id")
                            .from(NotificationPreferences::Table, NotificationPreferences::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NotificationCampaigns::Table)
                    .if_not_exists()
                    .col(string(NotificationCampaigns::Id).primary_key())
                    .col(string(NotificationCampaigns::Name))
                    .col(text_null(NotificationCampaigns::Description))
                    .col(string_null(NotificationCampaigns::TemplateId))
                    .col(string_len(NotificationCampaigns::Status, 20).default("draft"))
                    .col(json(NotificationCampaigns::TargetCriteria))
                    .col(timestamp_with_time_zone_null(NotificationCampaigns::ScheduledAt))
                    .col(integer(NotificationCampaigns::SentCount).default(0))
                    .col(integer(NotificationCampaigns::DeliveredCount).default(0))
                    .col(integer(NotificationCampaigns::OpenedCount).default(0))
                    .col(integer(NotificationCampaigns::ClickedCount).default(0))
                    .col(string_null(NotificationCampaigns::CreatedBy))
                    .col(timestamp_with_time_zone(NotificationCampaigns::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(NotificationCampaigns::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_campaigns_template_id")
                            .from(NotificationCampaigns::Table, NotificationCampaigns::TemplateId)
                            .to(NotificationTemplates::Table, NotificationTemplates::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_campaigns_created_by")
                            .from(NotificationCampaigns::Table, NotificationCampaigns::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            NotificationCampaigns::Table.into_iden(),
            NotificationPreferences::Table.into_iden(),
            NotificationTemplates::Table.into_iden(),
            Notifications::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    RecipientId,
    SenderId,
    NotificationType,
    Priority,
    Title,
    Message,
    Data,
    RelatedObjectType,
    RelatedObjectId,
    ReadAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum NotificationTemplates {
    Table,
    Id,
    Name,
    NotificationType,
    SubjectTemplate,
    BodyTemplate,
    Channels,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum NotificationPreferences {
    Table,
    Id,
    UserId,
    EmailEnabled,
    SmsEnabled,
    PushEnabled,
    InAppEnabled,
    TypeSettings,
    QuietHoursStart,
    QuietHoursEnd,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum NotificationCampaigns {
    Table,
    Id,
    Name,
    Description,
    TemplateId,
    Status,
    TargetCriteria,
    ScheduledAt,
    SentCount,
    DeliveredCount,
    OpenedCount,
    ClickedCount,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
