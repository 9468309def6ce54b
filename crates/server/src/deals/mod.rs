//! # Deals Module
//!
//! Deals and their activities and products, plus the shared stage,
//! pipeline and forecast catalogs.

use entity::deals;
use error::{AppError, Result};
use sea_orm::{EntityTrait, QueryFilter};

use crate::{scope::Viewer, AppState};

pub mod activities;
pub mod forecasts;
pub mod handlers;
pub mod pipelines;
pub mod products;
pub mod stages;

/// The deal `deal_id` refers to, as a field error when missing or out of scope.
pub(crate) async fn parent_deal(state: &AppState, viewer: &Viewer, deal_id: &str) -> Result<deals::Model> {
    deals::Entity::find_by_id(deal_id)
        .filter(viewer.deals())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::field("deal_id", "Deal not found"))
}
