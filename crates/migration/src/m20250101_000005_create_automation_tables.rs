//! Workflows, executions, email templates and campaigns, tasks and rules.
//!
//! These tables store configuration only; nothing evaluates them.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Workflows::Table)
                    .if_not_exists()
                    .col(string(Workflows::Id).primary_key())
                    .col(string(Workflows::Name))
                    .col(text_null(Workflows::Description))
                    .col(string_len(Workflows::TriggerType, 30))
                    .col(json(Workflows::TriggerConditions))
                    .col(json(Workflows::Actions))
                    .col(string_len(Workflows::Status, 20).default("draft"))
                    .col(string_null(Workflows::CreatedBy))
                    .col(timestamp_with_time_zone(Workflows::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Workflows::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workflows_created_by")
                            .from(Workflows::Table, Workflows::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkflowExecutions::Table)
                    .if_not_exists()
                    .col(string(WorkflowExecutions::Id).primary_key())
                    .col(string(WorkflowExecutions::WorkflowId))
                    .col(string_len(WorkflowExecutions::Status, 20).default("pending"))
                    .col(json(WorkflowExecutions::TriggerData))
                    .col(json(WorkflowExecutions::ExecutionLog))
                    .col(text_null(WorkflowExecutions::ErrorMessage))
                    .col(timestamp_with_time_zone(WorkflowExecutions::StartedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone_null(WorkflowExecutions::CompletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workflow_executions_workflow_id")
                            .from(WorkflowExecutions::Table, WorkflowExecutions::WorkflowId)
                            .to(Workflows::Table, Workflows::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmailTemplates::Table)
                    .if_not_exists()
                    .col(string(EmailTemplates::Id).primary_key())
                    .col(string(EmailTemplates::Name))
                    .col(string(EmailTemplates::Subject))
                    .col(text(EmailTemplates::Body))
                    .col(string_len(EmailTemplates::TemplateType, 20).default("custom"))
                    .col(json(EmailTemplates::Variables))
                    .col(boolean(EmailTemplates::IsActive).default(true))
                    .col(string_null(EmailTemplates::CreatedBy))
                    .col(timestamp_with_time_zone(EmailTemplates::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(EmailTemplates::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_email_templates_created_by")
                            .from(EmailTemplates::Table, EmailTemplates::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmailCampaigns::Table)
                    .if_not_exists()
                    .col(string(EmailCampaigns::Id).primary_key())
                    .col(string(EmailCampaigns::Name))
                    .col(string_null(EmailCampaigns::TemplateId))
                    .col(string_len(EmailCampaigns::Status, 20).default("draft"))
                    .col(timestamp_with_time_zone_null(EmailCampaigns::ScheduledAt))
                    .col(timestamp_with_time_zone_null(EmailCampaigns::SentAt))
                    .col(json(EmailCampaigns::Recipients))
                    .col(integer(EmailCampaigns::SentCount).default(0))
                    .col(integer(EmailCampaigns::OpenedCount).default(0))
                    .col(integer(EmailCampaigns::ClickedCount).default(0))
                    .col(integer(EmailCampaigns::BouncedCount).default(0))
                    .col(integer(EmailCampaigns::UnsubscribedCount).default(0))
                    .col(string_null(EmailCampaigns::CreatedBy))
                    .col(timestamp_with_time_zone(EmailCampaigns::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(EmailCampaigns::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_email_campaigns_template_id")
                            .from(EmailCampaigns::Table, EmailCampaigns::TemplateId)
                            .to(EmailTemplates::Table, EmailTemplates::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_email_campaigns_created_by")
                            .from(EmailCampaigns::Table, EmailCampaigns::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(string(Tasks::Id).primary_key())
                    .col(string(Tasks::Title))
                    .col(text_null(Tasks::Description))
                    .col(string_len(Tasks::TaskType, 20).default("other"))
                    .col(string_len(Tasks::Priority, 10).default("medium"))
                    .col(string_len(Tasks::Status, 20).default("pending"))
                    .col(timestamp_with_time_zone_null(Tasks::DueDate))
                    .col(timestamp_with_time_zone_null(Tasks::CompletedAt))
                    .col(string_null(Tasks::AssignedTo))
                    .col(string_null(Tasks::CreatedBy))
                    .col(string_null(Tasks::CustomerId))
                    .col(string_null(Tasks::LeadId))
                    .col(string_null(Tasks::DealId))
                    .col(timestamp_with_time_zone(Tasks::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Tasks::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_assigned_to")
                            .from(Tasks::Table, Tasks::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_created_by")
                            .from(Tasks::Table, Tasks::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_customer_id")
                            .from(Tasks::Table, Tasks::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_lead_id")
                            .from(Tasks::Table, Tasks::LeadId)
                            .to(Leads::Table, Leads::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_deal_id")
                            .from(Tasks::Table, Tasks::DealId)
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
                    .name("idx_tasks_assigned_to")
                    .table(Tasks::Table)
                    .col(Tasks::AssignedTo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AutomationRules::Table)
                    .if_not_exists()
                    .col(string(AutomationRules::Id).primary_key())
                    .col(string(AutomationRules::Name))
                    .col(text_null(AutomationRules::Description))
                    .col(string_len(AutomationRules::RuleType, 30))
                    .col(json(AutomationRules::Conditions))
                    .col(json(AutomationRules::Actions))
                    .col(boolean(AutomationRules::IsActive).default(true))
                    .col(integer(AutomationRules::Priority).default(0))
                    .col(string_null(AutomationRules::CreatedBy))
                    .col(timestamp_with_time_zone(AutomationRules::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(AutomationRules::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_automation_rules_created_by")
                            .from(AutomationRules::Table, AutomationRules::CreatedBy)
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
            AutomationRules::Table.into_iden(),
            Tasks::Table.into_iden(),
            EmailCampaigns::Table.into_iden(),
            EmailTemplates::Table.into_iden(),
            WorkflowExecutions::Table.into_iden(),
            Workflows::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Workflows {
    Table,
    Id,
    Name,
    Description,
    TriggerType,
    TriggerConditions,
    Actions,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WorkflowExecutions {
    Table,
    Id,
    WorkflowId,
    Status,
    TriggerData,
    ExecutionLog,
    ErrorMessage,
    StartedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum EmailTemplates {
    Table,
    Id,
    Name,
    Subject,
    Body,
    TemplateType,
    Variables,
    IsActive,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EmailCampaigns {
    Table,
    Id,
    Name,
    TemplateId,
    Status,
    ScheduledAt,
    SentAt,
    Recipients,
    SentCount,
    OpenedCount,
    ClickedCount,
    BouncedCount,
    UnsubscribedCount,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Title,
    Description,
    TaskType,
    Priority,
    Status,
    DueDate,
    CompletedAt,
    AssignedTo,
    CreatedBy,
    CustomerId,
    LeadId,
    DealId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AutomationRules {
    Table,
    Id,
    Name,
    Description,
    RuleType,
    Conditions,
    Actions,
    IsActive,
    Priority,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
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

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
