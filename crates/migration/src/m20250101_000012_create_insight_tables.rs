//! Customer, lead and deal insights, sentiment analyses and the predictive
//! model catalog.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CustomerInsights::Table)
                    .if_not_exists()
                    .col(string(CustomerInsights::Id).primary_key())
                    .col(string(CustomerInsights::CustomerId))
                    .col(string_len(CustomerInsights::InsightType, 30))
                    .col(string_len(CustomerInsights::Title, 200))
                    .col(text(CustomerInsights::Description))
                    .col(integer(CustomerInsights::ConfidenceScore))
                    .col(json(CustomerInsights::DataPoints))
                    .col(json(CustomerInsights::Recommendations))
                    .col(boolean(CustomerInsights::IsActionable).default(true))
                    .col(timestamp_with_time_zone(CustomerInsights::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone_null(CustomerInsights::ExpiresAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_insights_customer_id")
                            .from(CustomerInsights::Table, CustomerInsights::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_customer_insights_customer_id")
                    .table(CustomerInsights::Table)
                    .col(CustomerInsights::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeadInsights::Table)
                    .if_not_exists()
                    .col(string(LeadInsights::Id).primary_key())
                    .col(string(LeadInsights::LeadId))
                    .col(string_len(LeadInsights::InsightType, 30))
                    .col(string_len(LeadInsights::Title, 200))
                    .col(text(LeadInsights::Description))
                    .col(integer(LeadInsights::ConfidenceScore))
                    .col(json(LeadInsights::ScoreBreakdown))
                    .col(json(LeadInsights::Recommendations))
                    .col(timestamp_with_time_zone(LeadInsights::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_insights_lead_id")
                            .from(LeadInsights::Table, LeadInsights::LeadId)
                            .to(Leads::Table, Leads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DealInsights::Table)
                    .if_not_exists()
                    .col(string(DealInsights::Id).primary_key())
                    .col(string(DealInsights::DealId))
                    .col(string_len(DealInsights::InsightType, 30))
                    .col(string_len(DealInsights::Title, 200))
                    .col(text(DealInsights::Description))
                    .col(integer(DealInsights::ConfidenceScore))
                    .col(double_null(DealInsights::PredictedValue))
                    .col(timestamp_with_time_zone_null(DealInsights::PredictedCloseDate))
                    .col(json(DealInsights::RiskFactors))
                    .col(json(DealInsights::Recommendations))
                    .col(timestamp_with_time_zone(DealInsights::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deal_insights_deal_id")
                            .from(DealInsights::Table, DealInsights::DealId)
                            .to(Deals::Table, Deals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SentimentAnalyses::Table)
                    .if_not_exists()
                    .col(string(SentimentAnalyses::Id).primary_key())
                    .col(string(SentimentAnalyses::CustomerId))
                    .col(string_len(SentimentAnalyses::Source, 20))
                    .col(text(SentimentAnalyses::Content))
                    .col(double(SentimentAnalyses::SentimentScore))
                    .col(string_len(SentimentAnalyses::SentimentLabel, 10))
                    .col(integer(SentimentAnalyses::Confidence))
                    .col(json(SentimentAnalyses::Keywords))
                    .col(json(SentimentAnalyses::Emotions))
                    .col(timestamp_with_time_zone(SentimentAnalyses::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sentiment_analyses_customer_id")
                            .from(SentimentAnalyses::Table, SentimentAnalyses::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PredictiveModels::Table)
                    .if_not_exists()
                    .col(string(PredictiveModels::Id).primary_key())
                    .col(string_uniq(PredictiveModels::Name))
                    .col(string_len(PredictiveModels::ModelType, 30))
                    .col(text_null(PredictiveModels::Description))
                    .col(string_len(PredictiveModels::Version, 20).default("1.0"))
                    .col(double_null(PredictiveModels::Accuracy))
                    .col(boolean(PredictiveModels::IsActive).default(true))
                    .col(integer_null(PredictiveModels::TrainingDataSize))
                    .col(timestamp_with_time_zone_null(PredictiveModels::LastTrained))
                    .col(json(PredictiveModels::Parameters))
                    .col(timestamp_with_time_zone(PredictiveModels::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(PredictiveModels::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PredictiveModels::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SentimentAnalyses::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DealInsights::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeadInsights::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomerInsights::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum CustomerInsights {
    Table,
    Id,
    CustomerId,
    InsightType,
    Title,
    Description,
    ConfidenceScore,
    DataPoints,
    Recommendations,
    IsActionable,
    CreatedAt,
    ExpiresAt,
}

#[derive(DeriveIden)]
enum LeadInsights {
    Table,
    Id,
    LeadId,
    InsightType,
    Title,
    Description,
    ConfidenceScore,
    ScoreBreakdown,
    Recommendations,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DealInsights {
    Table,
    Id,
    DealId,
    InsightType,
    Title,
    Description,
    ConfidenceScore,
    PredictedValue,
    PredictedCloseDate,
    RiskFactors,
    Recommendations,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SentimentAnalyses {
    Table,
    Id,
    CustomerId,
    Source,
    Content,
    SentimentScore,
    SentimentLabel,
    Confidence,
    Keywords,
    Emotions,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PredictiveModels {
    Table,
    Id,
    Name,
    ModelType,
    Description,
    Version,
    Accuracy,
    IsActive,
    TrainingDataSize,
    LastTrained,
    Parameters,
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
