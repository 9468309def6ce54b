//! Customer Interactions Entity
//!
//! Log of calls, emails and meetings with a customer.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_interactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                 String,
    pub customer_id:        String,
    pub user_id:            Option<String>,
    pub interaction_type:   InteractionType,
    pub subject:            String,
    pub description:        Option<String>,
    pub interaction_date:   DateTimeUtc,
    pub duration_minutes:   Option<i32>,
    pub outcome:            Option<String>,
    pub follow_up_required: bool,
    pub follow_up_date:     Option<DateTimeUtc>,
    pub created_at:         DateTimeUtc,
    pub updated_at:         DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Customer,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef { Relation::Customer.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    #[sea_orm(string_value = "call")]
    Call,
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "meeting")]
    Meeting,
    #[sea_orm(string_value = "note")]
    Note,
    #[sea_orm(string_value = "task")]
    Task,
    #[sea_orm(string_value = "other")]
    Other,
}

display_as_value!(InteractionType);
