//! Deals, pipelines and stages, deal activities, products and forecasts.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SalesPipelines::Table)
                    .if_not_exists()
                    .col(string(SalesPipelines::Id).primary_key())
                    .col(string_uniq(SalesPipelines::Name))
                    .col(text_null(SalesPipelines::Description))
                    .col(boolean(SalesPipelines::IsDefault).default(false))
                    .col(boolean(SalesPipelines::IsActive).default(true))
                    .col(timestamp_with_time_zone(SalesPipelines::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(SalesPipelines::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DealStages::Table)
                    .if_not_exists()
                    .col(string(DealStages::Id).primary_key())
                    .col(string(DealStages::Name))
                    .col(text_null(DealStages::Description))
                    .col(integer(DealStages::Order))
                    .col(integer(DealStages::Probability).default(0))
                    .col(string_len(DealStages::Color, 7).default("#3B82F6"))
                    .col(boolean(DealStages::IsActive).default(true))
                    .col(timestamp_with_time_zone(DealStages::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(DealStages::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_deal_stages_name_order_unique")
                    .table(DealStages::Table)
                    .col(DealStages::Name)
                    .col(DealStages::Order)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PipelineStages::Table)
                    .if_not_exists()
                    .col(string(PipelineStages::Id).primary_key())
                    .col(string(PipelineStages::PipelineId))
                    .col(string(PipelineStages::StageId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pipeline_stages_pipeline_id")
                            .from(PipelineStages::Table, PipelineStages::PipelineId)
                            .to(SalesPipelines::Table, SalesPipelines::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pipeline_stages_stage_id")
                            .from(PipelineStages::Table, PipelineStages::StageId)
                            .to(DealStages::Table, DealStages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pipeline_stages_unique")
                    .table(PipelineStages::Table)
                    .col(PipelineStages::PipelineId)
                    .col(PipelineStages::StageId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Deals::Table)
                    .if_not_exists()
                    .col(string(Deals::Id).primary_key())
                    .col(string(Deals::Name))
                    .col(text_null(Deals::Description))
                    .col(string_null(Deals::CustomerId))
                    .col(string_null(Deals::LeadId))
                    .col(string_null(Deals::PipelineId))
                    .col(double(Deals::Value).default(0.0))
                    .col(string_len(Deals::Currency, 3).default("USD"))
                    .col(integer(Deals::Probability).default(0))
                    .col(string_len(Deals::Stage, 20).default("prospecting"))
                    .col(string_len(Deals::Priority, 10).default("medium"))
                    .col(timestamp_with_time_zone_null(Deals::ExpectedCloseDate))
                    .col(timestamp_with_time_zone_null(Deals::ActualCloseDate))
                    .col(string_null(Deals::AssignedTo))
                    .col(string_null(Deals::CreatedBy))
                    .col(json(Deals::Tags))
                    .col(json(Deals::CustomFields))
                    .col(timestamp_with_time_zone(Deals::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Deals::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deals_customer_id")
                            .from(Deals::Table, Deals::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deals_lead_id")
                            .from(Deals::Table, Deals::LeadId)
                            .to(Leads::Table, Leads::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deals_pipeline_id")
                            .from(Deals::Table, Deals::PipelineId)
                            .to(SalesPipelines::Table, SalesPipelines::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deals_assigned_to")
                            .from(Deals::Table, Deals::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deals_created_by")
                            .from(Deals::Table, Deals::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_deals_assigned_to", Deals::AssignedTo),
            ("idx_deals_stage", Deals::Stage),
            ("idx_deals_customer_id", Deals::CustomerId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Deals::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(DealActivities::Table)
                    .if_not_exists()
                    .col(string(DealActivities::Id).primary_key())
                    .col(string(DealActivities::DealId))
                    .col(string_null(DealActivities::UserId))
                    .col(string_len(DealActivities::ActivityType, 20))
                    .col(string(DealActivities::Subject))
                    .col(text_null(DealActivities::Description))
                    .col(timestamp_with_time_zone(DealActivities::ActivityDate))
                    .col(integer_null(DealActivities::DurationMinutes))
                    .col(text_null(DealActivities::Outcome))
                    .col(string_null(DealActivities::NextAction))
                    .col(timestamp_with_time_zone_null(DealActivities::NextActionDate))
                    .col(timestamp_with_time_zone(DealActivities::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(DealActivities::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deal_activities_deal_id")
                            .from(DealActivities::Table, DealActivities::DealId)
                            .to(Deals::Table, Deals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deal_activities_user_id")
                            .from(DealActivities::Table, DealActivities::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DealProducts::Table)
                    .if_not_exists()
                    .col(string(DealProducts::Id).primary_key())
                    .col(string(DealProducts::DealId))
                    .col(string(DealProducts::ProductName))
                    .col(text_null(DealProducts::Description))
                    .col(integer(DealProducts::Quantity).default(1))
                    .col(double(DealProducts::UnitPrice))
                    .col(double(DealProducts::Discount).default(0.0))
                    .col(timestamp_with_time_zone(DealProducts::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(DealProducts::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deal_products_deal_id")
                            .from(DealProducts::Table, DealProducts::DealId)
                            .to(Deals::Table, Deals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DealForecasts::Table)
                    .if_not_exists()
                    .col(string(DealForecasts::Id).primary_key())
                    .col(string_len(DealForecasts::PeriodType, 20))
                    .col(timestamp_with_time_zone(DealForecasts::PeriodStart))
                    .col(timestamp_with_time_zone(DealForecasts::PeriodEnd))
                    .col(double(DealForecasts::ForecastedValue))
                    .col(double_null(DealForecasts::ActualValue))
                    .col(text_null(DealForecasts::Notes))
                    .col(string_null(DealForecasts::CreatedBy))
                    .col(timestamp_with_time_zone(DealForecasts::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(DealForecasts::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deal_forecasts_created_by")
                            .from(DealForecasts::Table, DealForecasts::CreatedBy)
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
                    .name("idx_deal_forecasts_period_unique")
                    .table(DealForecasts::Table)
                    .col(DealForecasts::PeriodType)
                    .col(DealForecasts::PeriodStart)
                    .col(DealForecasts::PeriodEnd)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            DealForecasts::Table.into_iden(),
            DealProducts::Table.into_iden(),
            DealActivities::Table.into_iden(),
            Deals::Table.into_iden(),
            PipelineStages::Table.into_iden(),
            DealStages::Table.into_iden(),
            SalesPipelines::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum SalesPipelines {
    Table,
    Id,
    Name,
    Description,
    IsDefault,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DealStages {
    Table,
    Id,
    Name,
    Description,
    Order,
    Probability,
    Color,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PipelineStages {
    Table,
    Id,
    PipelineId,
    StageId,
}

#[derive(DeriveIden)]
enum Deals {
    Table,
    Id,
    Name,
    Description,
    CustomerId,
    LeadId,
    PipelineId,
    Value,
    Currency,
    Probability,
    Stage,
    Priority,
    ExpectedCloseDate,
    ActualCloseDate,
    AssignedTo,
    CreatedBy,
    Tags,
    CustomFields,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DealActivities {
    Table,
    Id,
    DealId,
    UserId,
    ActivityType,
    Subject,
    Description,
    ActivityDate,
    DurationMinutes,
    Outcome,
    NextAction,
    NextActionDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DealProducts {
    Table,
    Id,
    DealId,
    ProductName,
    Description,
    Quantity,
    UnitPrice,
    Discount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DealForecasts {
    Table,
    Id,
    PeriodType,
    PeriodStart,
    PeriodEnd,
    ForecastedValue,
    ActualValue,
    Notes,
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
enum Users {
    Table,
    Id,
}
