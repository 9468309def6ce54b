//! Notification Templates Entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::notifications::NotificationType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                String,
    #[sea_orm(unique)]
    pub name:              String,
    pub notification_type: NotificationType,
    pub subject_template:  String,
    pub body_template:     String,
    pub channels:          Json,
    pub is_active:         bool,
    pub created_at:        DateTimeUtc,
    pub updated_at:        DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
