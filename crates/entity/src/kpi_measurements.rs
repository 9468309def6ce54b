//! KPI Measurements Entity
//!
//! Recorded KPI values, unique per (kpi, period start, period end).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kpi_measurements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:           String,
    pub kpi_id:       String,
    pub value:        f64,
    pub period_start: DateTimeUtc,
    pub period_end:   DateTimeUtc,
    pub metadata:     Json,
    pub created_at:   DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::kpis::Entity",
        from = "Column::KpiId",
        to = "super::kpis::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Kpi,
}

impl Related<super::kpis::Entity> for Entity {
    fn to() -> RelationDef { Relation::Kpi.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Measured value as a percentage of the target; `None` without a usable target.
pub fn achievement(value: f64, target: Option<f64>) -> Option<f64> {
    target
        .filter(|target| *target != 0.0)
        .map(|target| value / target * 100.0)
}
