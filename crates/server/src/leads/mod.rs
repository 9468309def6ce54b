//! # Leads Module
//!
//! Leads, their activity log, score history, lead sources and campaigns.

use entity::leads;
use error::{AppError, Result};
use sea_orm::{EntityTrait, QueryFilter};

use crate::{scope::Viewer, AppState};

pub mod activities;
pub mod campaigns;
pub mod handlers;
pub mod scores;
pub mod sources;

/// The lead `lead_id` refers to, as a field error when missing or out of scope.
pub(crate) async fn parent_lead(state: &AppState, viewer: &Viewer, lead_id: &str) -> Result<leads::Model> {
    leads::Entity::find_by_id(lead_id)
        .filter(viewer.leads())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::field("lead_id", "Lead not found"))
}
