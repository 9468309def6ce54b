//! Lead score history and automation rule execution logs.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LeadScores::Table)
                    .if_not_exists()
                    .col(string(LeadScores::Id).primary_key())
                    .col(string(LeadScores::LeadId))
                    .col(integer(LeadScores::Score))
                    .col(json(LeadScores::Factors))
                    .col(string_len(LeadScores::CalculatedBy, 20).default("ai"))
                    .col(timestamp_with_time_zone(LeadScores::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_scores_lead_id")
                            .from(LeadScores::Table, LeadScores::LeadId)
                            .to(Leads::Table, Leads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lead_scores_lead_id")
                    .table(LeadScores::Table)
                    .col(LeadScores::LeadId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AutomationLogs::Table)
                    .if_not_exists()
                    .col(string(AutomationLogs::Id).primary_key())
                    .col(string(AutomationLogs::RuleId))
                    .col(string_len(AutomationLogs::Status, 20))
                    .col(json(AutomationLogs::InputData))
                    .col(json(AutomationLogs::OutputData))
                    .col(text_null(AutomationLogs::ErrorMessage))
                    .col(integer_null(AutomationLogs::ExecutionTime))
                    .col(timestamp_with_time_zone(AutomationLogs::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_automation_logs_rule_id")
                            .from(AutomationLogs::Table, AutomationLogs::RuleId)
                            .to(AutomationRules::Table, AutomationRules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_automation_logs_rule_id")
                    .table(AutomationLogs::Table)
                    .col(AutomationLogs::RuleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AutomationLogs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeadScores::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum LeadScores {
    Table,
    Id,
    LeadId,
    Score,
    Factors,
    CalculatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AutomationLogs {
    Table,
    Id,
    RuleId,
    Status,
    InputData,
    OutputData,
    ErrorMessage,
    ExecutionTime,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Leads {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum AutomationRules {
    Table,
    Id,
}
