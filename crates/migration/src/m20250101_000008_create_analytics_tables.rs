//! Dashboards, KPIs with measurements, reports and report executions.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AnalyticsDashboards::Table)
                    .if_not_exists()
                    .col(string(AnalyticsDashboards::Id).primary_key())
                    .col(string_uniq(AnalyticsDashboards::UserId))
                    .col(string(AnalyticsDashboards::Name))
                    .col(json(AnalyticsDashboards::Layout))
                    .col(json(AnalyticsDashboards::Widgets))
                    .col(integer(AnalyticsDashboards::RefreshInterval).default(300))
                    .col(timestamp_with_time_zone(AnalyticsDashboards::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(AnalyticsDashboards::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_analytics_dashboards_user_id")
                            .from(AnalyticsDashboards::Table, AnalyticsDashboards::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Kpis::Table)
                    .if_not_exists()
                    .col(string(Kpis::Id).primary_key())
                    .col(string_uniq(Kpis::Name))
                    .col(text_null(Kpis::Description))
                    .col(string_len(Kpis::MetricType, 20))
                    .col(double_null(Kpis::TargetValue))
                    .col(string_len(Kpis::Unit, 20).default("count"))
                    .col(boolean(Kpis::IsActive).default(true))
                    .col(string_null(Kpis::CreatedBy))
                    .col(timestamp_with_time_zone(Kpis::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Kpis::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_kpis_created_by")
                            .from(Kpis::Table, Kpis::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(KpiMeasurements::Table)
                    .if_not_exists()
                    .col(string(KpiMeasurements::Id).primary_key())
                    .col(string(KpiMeasurements::KpiId))
                    .col(double(KpiMeasurements::Value))
                    .col(timestamp_with_time_zone(KpiMeasurements::PeriodStart))
                    .col(timestamp_with_time_zone(KpiMeasurements::PeriodEnd))
                    .col(json(KpiMeasurements::Metadata))
                    .col(timestamp_with_time_zone(KpiMeasurements::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_kpi_measurements_kpi_id")
                            .from(KpiMeasurements::Table, KpiMeasurements::KpiId)
                            .to(Kpis::Table, Kpis::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_kpi_measurements_period_unique")
                    .table(KpiMeasurements::Table)
                    .col(KpiMeasurements::KpiId)
                    .col(KpiMeasurements::PeriodStart)
                    .col(KpiMeasurements::PeriodEnd)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(string(Reports::Id).primary_key())
                    .col(string(Reports::Name))
                    .col(text_null(Reports::Description))
                    .col(string_len(Reports::ReportType, 20))
                    .col(json(Reports::Parameters))
                    .col(boolean(Reports::IsPublic).default(false))
                    .col(string_null(Reports::CreatedBy))
                    .col(timestamp_with_time_zone(Reports::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Reports::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reports_created_by")
                            .from(Reports::Table, Reports::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReportExecutions::Table)
                    .if_not_exists()
                    .col(string(ReportExecutions::Id).primary_key())
                    .col(string(ReportExecutions::ReportId))
                    .col(string_null(ReportExecutions::ExecutedBy))
                    .col(string_len(ReportExecutions::Status, 20).default("pending"))
                    .col(json(ReportExecutions::Parameters))
                    .col(json(ReportExecutions::Result))
                    .col(text_null(ReportExecutions::ErrorMessage))
                    .col(timestamp_with_time_zone(ReportExecutions::StartedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone_null(ReportExecutions::CompletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_executions_report_id")
                            .from(ReportExecutions::Table, ReportExecutions::ReportId)
                            .to(Reports::Table, Reports::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_executions_executed_by")
                            .from(ReportExecutions::Table, ReportExecutions::ExecutedBy)
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
            ReportExecutions::Table.into_iden(),
            Reports::Table.into_iden(),
            KpiMeasurements::Table.into_iden(),
            Kpis::Table.into_iden(),
            AnalyticsDashboards::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum AnalyticsDashboards {
    Table,
    Id,
    UserId,
    Name,
    Layout,
    Widgets,
    RefreshInterval,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Kpis {
    Table,
    Id,
    Name,
    Description,
    MetricType,
    TargetValue,
    Unit,
    IsActive,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum KpiMeasurements {
    Table,
    Id,
    KpiId,
    Value,
    PeriodStart,
    PeriodEnd,
    Metadata,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Reports {
    Table,
    Id,
    Name,
    Description,
    ReportType,
    Parameters,
    IsPublic,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ReportExecutions {
    Table,
    Id,
    ReportId,
    ExecutedBy,
    Status,
    Parameters,
    Result,
    ErrorMessage,
    StartedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
