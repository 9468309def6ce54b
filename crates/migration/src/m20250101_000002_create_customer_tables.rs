//! Customers and their contacts, interactions, notes and segments.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(string(Customers::Id).primary_key())
                    .col(string(Customers::FirstName))
                    .col(string(Customers::LastName))
                    .col(string_uniq(Customers::Email))
                    .col(string_len_null(Customers::Phone, 20))
                    .col(string_null(Customers::Company))
                    .col(string_null(Customers::JobTitle))
                    .col(string_len(Customers::CustomerType, 20).default("individual"))
                    .col(string_len(Customers::Status, 20).default("prospect"))
                    .col(text_null(Customers::Address))
                    .col(string_null(Customers::City))
                    .col(string_null(Customers::State))
                    .col(string_len_null(Customers::PostalCode, 20))
                    .col(string_null(Customers::Country))
                    .col(string_null(Customers::Website))
                    .col(string_null(Customers::Industry))
                    .col(double_null(Customers::AnnualRevenue))
                    .col(integer_null(Customers::EmployeeCount))
                    .col(string_len(Customers::PreferredContactMethod, 10).default("email"))
                    .col(string_null(Customers::AssignedTo))
                    .col(string_null(Customers::CreatedBy))
                    .col(json(Customers::Tags))
                    .col(json(Customers::CustomFields))
                    .col(timestamp_with_time_zone(Customers::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Customers::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customers_assigned_to")
                            .from(Customers::Table, Customers::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customers_created_by")
                            .from(Customers::Table, Customers::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_customers_assigned_to", Customers::AssignedTo),
            ("idx_customers_status", Customers::Status),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Customers::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(CustomerContacts::Table)
                    .if_not_exists()
                    .col(string(CustomerContacts::Id).primary_key())
                    .col(string(CustomerContacts::CustomerId))
                    .col(string(CustomerContacts::FirstName))
                    .col(string(CustomerContacts::LastName))
                    .col(string(CustomerContacts::Email))
                    .col(string_len_null(CustomerContacts::Phone, 20))
                    .col(string_null(CustomerContacts::JobTitle))
                    .col(boolean(CustomerContacts::IsPrimary).default(false))
                    .col(text_null(CustomerContacts::Notes))
                    .col(timestamp_with_time_zone(CustomerContacts::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(CustomerContacts::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_contacts_customer_id")
                            .from(CustomerContacts::Table, CustomerContacts::CustomerId)
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
                    .name("idx_customer_contacts_customer_email_unique")
                    .table(CustomerContacts::Table)
                    .col(CustomerContacts::CustomerId)
                    .col(CustomerContacts::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomerInteractions::Table)
                    .if_not_exists()
                    .col(string(CustomerInteractions::Id).primary_key())
                    .col(string(CustomerInteractions::CustomerId))
                    .col(string_null(CustomerInteractions::UserId))
                    .col(string_len(CustomerInteractions::InteractionType, 20))
                    .col(string(CustomerInteractions::Subject))
                    .col(text_null(CustomerInteractions::Description))
                    .col(timestamp_with_time_zone(CustomerInteractions::InteractionDate))
                    .col(integer_null(CustomerInteractions::DurationMinutes))
                    .col(text_null(CustomerInteractions::Outcome))
                    .col(boolean(CustomerInteractions::FollowUpRequired).default(false))
                    .col(timestamp_with_time_zone_null(CustomerInteractions::FollowUpDate))
                    .col(timestamp_with_time_zone(CustomerInteractions::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(CustomerInteractions::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_interactions_customer_id")
                            .from(CustomerInteractions::Table, CustomerInteractions::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_interactions_user_id")
                            .from(CustomerInteractions::Table, CustomerInteractions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomerNotes::Table)
                    .if_not_exists()
                    .col(string(CustomerNotes::Id).primary_key())
                    .col(string(CustomerNotes::CustomerId))
                    .col(string_null(CustomerNotes::AuthorId))
                    .col(string(CustomerNotes::Title))
                    .col(text(CustomerNotes::Content))
                    .col(boolean(CustomerNotes::IsPrivate).default(false))
                    .col(timestamp_with_time_zone(CustomerNotes::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(CustomerNotes::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_notes_customer_id")
                            .from(CustomerNotes::Table, CustomerNotes::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_notes_author_id")
                            .from(CustomerNotes::Table, CustomerNotes::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomerSegments::Table)
                    .if_not_exists()
                    .col(string(CustomerSegments::Id).primary_key())
                    .col(string_uniq(CustomerSegments::Name))
                    .col(text_null(CustomerSegments::Description))
                    .col(json(CustomerSegments::Criteria))
                    .col(boolean(CustomerSegments::IsActive).default(true))
                    .col(timestamp_with_time_zone(CustomerSegments::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(CustomerSegments::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomerSegmentMembers::Table)
                    .if_not_exists()
                    .col(string(CustomerSegmentMembers::Id).primary_key())
                    .col(string(CustomerSegmentMembers::SegmentId))
                    .col(string(CustomerSegmentMembers::CustomerId))
                    .col(timestamp_with_time_zone(CustomerSegmentMembers::AddedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_segment_members_segment_id")
                            .from(CustomerSegmentMembers::Table, CustomerSegmentMembers::SegmentId)
                            .to(CustomerSegments::Table, CustomerSegments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_segment_members_customer_id")
                            .from(CustomerSegmentMembers::Table, CustomerSegmentMembers::CustomerId)
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
                    .name("idx_customer_segment_members_unique")
                    .table(CustomerSegmentMembers::Table)
                    .col(CustomerSegmentMembers::SegmentId)
                    .col(CustomerSegmentMembers::CustomerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            CustomerSegmentMembers::Table.into_iden(),
            CustomerSegments::Table.into_iden(),
            CustomerNotes::Table.into_iden(),
            CustomerInteractions::Table.into_iden(),
            CustomerContacts::Table.into_iden(),
            Customers::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    Company,
    JobTitle,
    CustomerType,
    Status,
    Address,
    City,
    State,
    PostalCode,
    Country,
    Website,
    Industry,
    AnnualRevenue,
    EmployeeCount,
    PreferredContactMethod,
    AssignedTo,
    CreatedBy,
    Tags,
    CustomFields,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CustomerContacts {
    Table,
    Id,
    CustomerId,
    FirstName,
    LastName,
    Email,
    Phone,
    JobTitle,
    IsPrimary,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CustomerInteractions {
    Table,
    Id,
    CustomerId,
    UserId,
    InteractionType,
    Subject,
    Description,
    InteractionDate,
    DurationMinutes,
    Outcome,
    FollowUpRequired,
    FollowUpDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CustomerNotes {
    Table,
    Id,
    CustomerId,
    AuthorId,
    Title,
    Content,
    IsPrivate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CustomerSegments {
    Table,
    Id,
    Name,
    Description,
    Criteria,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CustomerSegmentMembers {
    Table,
    Id,
    SegmentId,
    CustomerId,
    AddedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
