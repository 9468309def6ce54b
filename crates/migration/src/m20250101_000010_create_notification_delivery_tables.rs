//! Outbound notification queue, per-channel delivery records and category
//! subscriptions.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NotificationQueue::Table)
                    .if_not_exists()
                    .col(string(NotificationQueue::Id).primary_key())
                    .col(string(NotificationQueue::TemplateId))
                    .col(string(NotificationQueue::RecipientId))
                    .col(string_len(NotificationQueue::Priority, 10).default("medium"))
                    .col(string_len(NotificationQueue::Status, 20).default("pending"))
                    .col(string_len(NotificationQueue::Subject, 200))
                    .col(text(NotificationQueue::Message))
                    .col(text(NotificationQueue::HtmlContent))
                    .col(timestamp_with_time_zone_null(NotificationQueue::ScheduledAt))
                    .col(integer(NotificationQueue::MaxRetries).default(3))
                    .col(integer(NotificationQueue::RetryCount).default(0))
                    .col(string_null(NotificationQueue::CustomerId))
                    .col(string_null(NotificationQueue::LeadId))
                    .col(string_null(NotificationQueue::DealId))
                    .col(json(NotificationQueue::ContextData))
                    .col(json(NotificationQueue::DeliveryAttempts))
                    .col(timestamp_with_time_zone(NotificationQueue::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(NotificationQueue::UpdatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone_null(NotificationQueue::SentAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_queue_template_id")
                            .from(NotificationQueue::Table, NotificationQueue::TemplateId)
                            .to(NotificationTemplates::Table, NotificationTemplates::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_queue_recipient_id")
                            .from(NotificationQueue::Table, NotificationQueue::RecipientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_queue_customer_id")
                            .from(NotificationQueue::Table, NotificationQueue::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_queue_lead_id")
                            .from(NotificationQueue::Table, NotificationQueue::LeadId)
                            .to(Leads::Table, Leads::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_queue_deal_id")
                            .from(NotificationQueue::Table, NotificationQueue::DealId)
                            .to(Deals::Table, Deals::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notification_queue_status_scheduled_at")
                    .table(NotificationQueue::Table)
                    .col(NotificationQueue::Status)
                    .col(NotificationQueue::ScheduledAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NotificationDeliveries::Table)
                    .if_not_exists()
                    .col(string(NotificationDeliveries::Id).primary_key())
                    .col(string(NotificationDeliveries::QueuedNotificationId))
                    .col(string_len(NotificationDeliveries::Channel, 20))
                    .col(string_len(NotificationDeliveries::Status, 20))
                    .col(string_null(NotificationDeliveries::ExternalId))
                    .col(timestamp_with_time_zone_null(NotificationDeliveries::DeliveredAt))
                    .col(timestamp_with_time_zone_null(NotificationDeliveries::OpenedAt))
                    .col(timestamp_with_time_zone_null(NotificationDeliveries::ClickedAt))
                    .col(text_null(NotificationDeliveries::ErrorMessage))
                    .col(string_null(NotificationDeliveries::ErrorCode))
                    .col(integer_null(NotificationDeliveries::DeliveryTime))
                    .col(json(NotificationDeliveries::ResponseData))
                    .col(timestamp_with_time_zone(NotificationDeliveries::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_deliveries_queued_notification_id")
                            .from(NotificationDeliveries::Table, NotificationDeliveries::QueuedNotificationId)
                            .to(NotificationQueue::Table, NotificationQueue::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notification_deliveries_queued_notification_id")
                    .table(NotificationDeliveries::Table)
                    .col(NotificationDeliveries::QueuedNotificationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NotificationSubscriptions::Table)
                    .if_not_exists()
                    .col(string(NotificationSubscriptions::Id).primary_key())
                    .col(string(NotificationSubscriptions::UserId))
                    .col(string_len(NotificationSubscriptions::Category, 30))
                    .col(boolean(NotificationSubscriptions::IsSubscribed).default(true))
                    .col(timestamp_with_time_zone(NotificationSubscriptions::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(NotificationSubscriptions::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_subscriptions_user_id")
                            .from(NotificationSubscriptions::Table, NotificationSubscriptions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notification_subscriptions_user_category")
                    .table(NotificationSubscriptions::Table)
                    .col(NotificationSubscriptions::UserId)
                    .col(NotificationSubscriptions::Category)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NotificationSubscriptions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NotificationDeliveries::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NotificationQueue::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum NotificationQueue {
    Table,
    Id,
    TemplateId,
    RecipientId,
    Priority,
    Status,
    Subject,
    Message,
    HtmlContent,
    ScheduledAt,
    MaxRetries,
    RetryCount,
    CustomerId,
    LeadId,
    DealId,
    ContextData,
    DeliveryAttempts,
    CreatedAt,
    UpdatedAt,
    SentAt,
}

#[derive(DeriveIden)]
enum NotificationDeliveries {
    Table,
    Id,
    QueuedNotificationId,
    Channel,
    Status,
    ExternalId,
    DeliveredAt,
    OpenedAt,
    ClickedAt,
    ErrorMessage,
    ErrorCode,
    DeliveryTime,
    ResponseData,
    CreatedAt,
}

#[derive(DeriveIden)]
enum NotificationSubscriptions {
    Table,
    Id,
    UserId,
    Category,
    IsSubscribed,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum NotificationTemplates {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Leads {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Deals {
    Table,
    Id,
}
