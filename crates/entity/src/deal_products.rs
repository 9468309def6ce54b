//! Deal Products Entity
//!
//! Line items of a deal. `discount` is a percentage off the unit price.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deal_products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:           String,
    pub deal_id:      String,
    pub product_name: String,
    pub description:  Option<String>,
    pub quantity:     i32,
    pub unit_price:   f64,
    pub discount:     f64,
    pub created_at:   DateTimeUtc,
    pub updated_at:   DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::deals::Entity",
        from = "Column::DealId",
        to = "super::deals::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Deal,
}

impl Related<super::deals::Entity> for Entity {
    fn to() -> RelationDef { Relation::Deal.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Discounted unit price times quantity.
pub fn total_price(unit_price: f64, discount: f64, quantity: i32) -> f64 {
    (unit_price - unit_price * discount / 100.0) * f64::from(quantity)
}

impl Model {
    pub fn total_price(&self) -> f64 { total_price(self.unit_price, self.discount, self.quantity) }
}
