//! Leads, their activities, sources and campaigns.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LeadSources::Table)
                    .if_not_exists()
                    .col(string(LeadSources::Id).primary_key())
                    .col(string_uniq(LeadSources::Name))
                    .col(text_null(LeadSources::Description))
                    .col(boolean(LeadSources::IsActive).default(true))
                    .col(timestamp_with_time_zone(LeadSources::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(LeadSources::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeadCampaigns::Table)
                    .if_not_exists()
                    .col(string(LeadCampaigns::Id).primary_key())
                    .col(string(LeadCampaigns::Name))
                    .col(text_null(LeadCampaigns::Description))
                    .col(timestamp_with_time_zone_null(LeadCampaigns::StartDate))
                    .col(timestamp_with_time_zone_null(LeadCampaigns::EndDate))
                    .col(double_null(LeadCampaigns::Budget))
                    .col(boolean(LeadCampaigns::IsActive).default(true))
                    .col(string_null(LeadCampaigns::CreatedBy))
                    .col(timestamp_with_time_zone(LeadCampaigns::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(LeadCampaigns::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_campaigns_created_by")
                            .from(LeadCampaigns::Table, LeadCampaigns::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Leads::Table)
                    .if_not_exists()
                    .col(string(Leads::Id).primary_key())
                    .col(string(Leads::FirstName))
                    .col(string(Leads::LastName))
                    .col(string(Leads::Email))
                    .col(string_len_null(Leads::Phone, 20))
                    .col(string_null(Leads::Company))
                    .col(string_null(Leads::JobTitle))
                    .col(string_len(Leads::Source, 20).default("website"))
                    .col(string_len(Leads::Status, 20).default("new"))
                    .col(string_len(Leads::Priority, 10).default("medium"))
                    .col(integer(Leads::Score).default(0))
                    .col(double_null(Leads::EstimatedValue))
                    .col(timestamp_with_time_zone_null(Leads::ExpectedCloseDate))
                    .col(text_null(Leads::Notes))
                    .col(string_null(Leads::AssignedTo))
                    .col(string_null(Leads::CreatedBy))
                    .col(string_null(Leads::ConvertedToCustomerId))
                    .col(timestamp_with_time_zone_null(Leads::ConversionDate))
                    .col(string_null(Leads::CampaignId))
                    .col(json(Leads::Tags))
                    .col(json(Leads::CustomFields))
                    .col(timestamp_with_time_zone(Leads::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Leads::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leads_assigned_to")
                            .from(Leads::Table, Leads::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leads_created_by")
                            .from(Leads::Table, Leads::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leads_converted_to_customer_id")
                            .from(Leads::Table, Leads::ConvertedToCustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leads_campaign_id")
                            .from(Leads::Table, Leads::CampaignId)
                            .to(LeadCampaigns::Table, LeadCampaigns::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_leads_assigned_to", Leads::AssignedTo),
            ("idx_leads_status", Leads::Status),
            ("idx_leads_campaign_id", Leads::CampaignId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Leads::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(LeadActivities::Table)
                    .if_not_exists()
                    .col(string(LeadActivities::Id).primary_key())
                    .col(string(LeadActivities::LeadId))
                    .col(string_null(LeadActivities::UserId))
                    .col(string_len(LeadActivities::ActivityType, 20))
                    .col(string(LeadActivities::Subject))
                    .col(text_null(LeadActivities::Description))
                    .col(timestamp_with_time_zone(LeadActivities::ActivityDate))
                    .col(integer_null(LeadActivities::DurationMinutes))
                    .col(text_null(LeadActivities::Outcome))
                    .col(string_null(LeadActivities::NextAction))
                    .col(timestamp_with_time_zone_null(LeadActivities::NextActionDate))
                    .col(timestamp_with_time_zone(LeadActivities::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(LeadActivities::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_activities_lead_id")
                            .from(LeadActivities::Table, LeadActivities::LeadId)
                            .to(Leads::Table, Leads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_activities_user_id")
                            .from(LeadActivities::Table, LeadActivities::UserId)
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
            LeadActivities::Table.into_iden(),
            Leads::Table.into_iden(),
            LeadCampaigns::Table.into_iden(),
            LeadSources::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum LeadSources {
    Table,
    Id,
    Name,
    Description,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LeadCampaigns {
    Table,
    Id,
    Name,
    Description,
    StartDate,
    EndDate,
    Budget,
    IsActive,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Leads {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    Company,
    JobTitle,
    Source,
    Status,
    Priority,
    Score,
    EstimatedValue,
    ExpectedCloseDate,
    Notes,
    AssignedTo,
    CreatedBy,
    ConvertedToCustomerId,
    ConversionDate,
    CampaignId,
    Tags,
    CustomFields,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LeadActivities {
    Table,
    Id,
    LeadId,
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
enum Customers {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
