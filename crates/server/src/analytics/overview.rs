//! # Sales Overview
//!
//! Headline totals computed over exactly the records the requester can see,
//! so a sales representative's overview covers their own book while a
//! manager's includes their direct reports.

use auth::permissions::Permission;
use axum::{extract::State, Extension, Json};
use chrono::Utc;
use entity::{
    customers,
    deals::{self, DealStageKind},
    leads,
    tasks::{self, TaskStatus},
};
use error::Result;
use permissions_macro::with_permission;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};
use tracing::debug;

use crate::{dto::analytics::OverviewResponse, middleware::auth::AuthenticatedUser, scope::Viewer, AppState};

/// Pipeline totals over `(value, probability, stage)` rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PipelineTotals {
    open_deals:     u64,
    pipeline_value: f64,
    weighted_value: f64,
    won_value:      f64,
}

impl PipelineTotals {
    fn add(mut self, (value, probability, stage): (f64, i32, DealStageKind)) -> Self {
        match stage {
            DealStageKind::ClosedWon => self.won_value += value,
            DealStageKind::ClosedLost => {},
            _ => {
                self.open_deals += 1;
                self.pipeline_value += value;
                self.weighted_value += deals::weighted_value(value, probability);
            },
        }
        self
    }
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn overview(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<OverviewResponse>> {
    let viewer = Viewer::from(&user);

    let total_customers = customers::Entity::find()
        .filter(viewer.customers())
        .count(&state.db)
        .await?;
    let total_leads = leads::Entity::find()
        .filter(viewer.leads())
        .count(&state.db)
        .await?;
    let converted_leads = leads::Entity::find()
        .filter(viewer.leads())
        .filter(leads::Column::ConvertedToCustomerId.is_not_null())
        .count(&state.db)
        .await?;
    let open_tasks = tasks::Entity::find()
        .filter(viewer.tasks())
        .filter(tasks::Column::Status.is_in([TaskStatus::Pending, TaskStatus::InProgress]))
        .count(&state.db)
        .await?;

    let totals = deals::Entity::find()
        .select_only()
        .column(deals::Column::Value)
        .column(deals::Column::Probability)
        .column(deals::Column::Stage)
        .filter(viewer.deals())
        .into_tuple::<(f64, i32, DealStageKind)>()
        .all(&state.db)
        .await?
        .into_iter()
        .fold(PipelineTotals::default(), PipelineTotals::add);

    debug!(user_id = %user.id, open_deals = totals.open_deals, "Overview computed");

    Ok(Json(OverviewResponse {
        total_customers,
        total_leads,
        converted_leads,
        open_deals: totals.open_deals,
        pipeline_value: totals.pipeline_value,
        weighted_pipeline_value: totals.weighted_value,
        won_value: totals.won_value,
        open_tasks,
        generated_at: Utc::now(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_totals() {
        let totals = [
            (10_000.0, 50, DealStageKind::Proposal),
            (4_000.0, 25, DealStageKind::Prospecting),
            (7_500.0, 100, DealStageKind::ClosedWon),
            (9_999.0, 0, DealStageKind::ClosedLost),
        ]
        .into_iter()
        .fold(PipelineTotals::default(), PipelineTotals::add);

        assert_eq!(totals.open_deals, 2);
        assert_eq!(totals.pipeline_value, 14_000.0);
        assert_eq!(totals.weighted_value, 6_000.0);
        assert_eq!(totals.won_value, 7_500.0);
    }

    #[test]
    fn test_empty_pipeline() {
        assert_eq!(
            std::iter::empty().fold(PipelineTotals::default(), PipelineTotals::add),
            PipelineTotals::default()
        );
    }
}
