//! Sentiment Analyses Entity
//!
//! Sentiment of one customer communication. The score runs from -1.0 (most
//! negative) to 1.0 (most positive).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sentiment_analyses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:              String,
    pub customer_id:     String,
    pub source:          SentimentSource,
    pub content:         String,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    /// 0 to 100
    pub confidence:      i32,
    pub keywords:        Json,
    pub emotions:        Json,
    pub created_at:      DateTimeUtc,
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
pub enum SentimentSource {
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "call")]
    Call,
    #[sea_orm(string_value = "chat")]
    Chat,
    #[sea_orm(string_value = "survey")]
    Survey,
    #[sea_orm(string_value = "social")]
    Social,
    #[sea_orm(string_value = "review")]
    Review,
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    #[sea_orm(string_value = "positive")]
    Positive,
    #[sea_orm(string_value = "negative")]
    Negative,
    #[sea_orm(string_value = "neutral")]
    Neutral,
}

display_as_value!(SentimentSource, SentimentLabel);
