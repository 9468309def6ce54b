//! # Deal Handlers
//!
//! CRUD for deals. A deal moved into a closed stage gets its actual close
//! date stamped unless one was supplied.

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{deals, sales_pipelines};
use error::{ApiJson, AppError, OptionExt as _, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    auth::users::ensure_user_exists,
    customers::parent_customer,
    dto::deals::{CreateDealRequest, DealFilter, DealResponse, UpdateDealRequest},
    leads::parent_lead,
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_deal(state: &AppState, viewer: &Viewer, deal_id: &str) -> Result<deals::Model> {
    deals::Entity::find_by_id(deal_id)
        .filter(viewer.deals())
        .one(&state.db)
        .await?
        .or_not_found("Deal not found")
}

/// Field errors for references the viewer cannot use.
async fn check_references(
    state: &AppState,
    viewer: &Viewer,
    customer_id: Option<&str>,
    lead_id: Option<&str>,
    pipeline_id: Option<&str>,
    assigned_to: Option<&str>,
) -> Result<()> {
    if let Some(customer_id) = customer_id {
        parent_customer(state, viewer, customer_id).await?;
    }
    if let Some(lead_id) = lead_id {
        parent_lead(state, viewer, lead_id).await?;
    }
    if let Some(pipeline_id) = pipeline_id {
        sales_pipelines::Entity::find_by_id(pipeline_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::field("pipeline_id", "Pipeline not found"))?;
    }
    if let Some(assignee) = assigned_to {
        ensure_user_exists(&state.db, "assigned_to", assignee).await?;
    }
    Ok(())
}

/// Stamp the close date when a deal enters a closed stage without one.
fn stamp_close_date(active: &mut deals::ActiveModel) {
    let closed = matches!(&active.stage, ActiveValue::Set(stage) | ActiveValue::Unchanged(stage) if stage.is_closed());
    let has_date = matches!(&active.actual_close_date, ActiveValue::Set(Some(_)) | ActiveValue::Unchanged(Some(_)));
    if closed && !has_date {
        active.actual_close_date = Set(Some(Utc::now()));
    }
}

/// List deals in scope
#[with_permission(Permission::Deals(RecordAction::View))]
pub async fn list_deals(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<DealFilter>,
) -> Result<Json<Page<DealResponse>>> {
    let mut query = deals::Entity::find().filter(Viewer::from(&user).deals());

    if let Some(stage) = filter.stage {
        query = query.filter(deals::Column::Stage.eq(stage));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(deals::Column::Priority.eq(priority));
    }
    if let Some(assigned_to) = filter.assigned_to {
        query = query.filter(deals::Column::AssignedTo.eq(assigned_to));
    }
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(deals::Column::CustomerId.eq(customer_id));
    }
    if let Some(pipeline_id) = filter.pipeline_id {
        query = query.filter(deals::Column::PipelineId.eq(pipeline_id));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(deals::Column::Name.like(pattern.clone()))
                .add(deals::Column::Description.like(pattern)),
        );
    }

    let query = query.order_by_desc(deals::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?.map(DealResponse::from)))
}

#[with_permission(Permission::Deals(RecordAction::View))]
pub async fn get_deal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(deal_id): Path<String>,
) -> Result<Json<DealResponse>> {
    let deal = find_scoped_deal(&state, &Viewer::from(&user), &deal_id).await?;
    Ok(Json(deal.into()))
}

#[with_permission(Permission::Deals(RecordAction::Add))]
pub async fn create_deal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateDealRequest>,
) -> Result<(StatusCode, Json<DealResponse>)> {
    req.validate()?;
    check_references(
        &state,
        &Viewer::from(&user),
        req.customer_id.as_deref(),
        req.lead_id.as_deref(),
        req.pipeline_id.as_deref(),
        req.assigned_to.as_deref(),
    )
    .await?;

    let now = Utc::now();
    let mut active = deals::ActiveModel {
        id:                  Set(entity::new_id()),
        name:                Set(req.name.trim().to_string()),
        description:         Set(req.description),
        customer_id:         Set(req.customer_id),
        lead_id:             Set(req.lead_id),
        pipeline_id:         Set(req.pipeline_id),
        value:               Set(req.value),
        currency:            Set(req.currency),
        probability:         Set(req.probability),
        stage:               Set(req.stage),
        priority:            Set(req.priority),
        expected_close_date: Set(req.expected_close_date),
        actual_close_date:   Set(req.actual_close_date),
        assigned_to:         Set(Some(req.assigned_to.unwrap_or_else(|| user.id.clone()))),
        created_by:          Set(Some(user.id.clone())),
        tags:                Set(req.tags.unwrap_or_else(|| json!([]))),
        custom_fields:       Set(req.custom_fields.unwrap_or_else(|| json!({}))),
        created_at:          Set(now),
        updated_at:          Set(now),
    };
    stamp_close_date(&mut active);
    let deal = active.insert(&state.db).await?;

    info!(deal_id = %deal.id, value = deal.value, stage = %deal.stage, created_by = %user.id, "Deal created");

    Ok(created(deal.into()))
}

#[with_permission(Permission::Deals(RecordAction::Change))]
pub async fn update_deal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(deal_id): Path<String>,
    ApiJson(req): ApiJson<UpdateDealRequest>,
) -> Result<Json<DealResponse>> {
    req.validate()?;
    let viewer = Viewer::from(&user);
    let deal = find_scoped_deal(&state, &viewer, &deal_id).await?;
    check_references(
        &state,
        &viewer,
        crate::dto::given(&req.customer_id).map(String::as_str),
        crate::dto::given(&req.lead_id).map(String::as_str),
        crate::dto::given(&req.pipeline_id).map(String::as_str),
        crate::dto::given(&req.assigned_to).map(String::as_str),
    )
    .await?;

    let mut active: deals::ActiveModel = deal.into();
    patch!(
        active,
        req,
        [name, value, currency, probability, stage, priority, tags, custom_fields],
        [
            description,
            customer_id,
            lead_id,
            pipeline_id,
            expected_close_date,
            actual_close_date,
            assigned_to
        ]
    );
    stamp_close_date(&mut active);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(deal_id = %updated.id, stage = %updated.stage, updated_by = %user.id, "Deal updated");

    Ok(Json(updated.into()))
}

#[with_permission(Permission::Deals(RecordAction::Delete))]
pub async fn delete_deal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(deal_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let deal = find_scoped_deal(&state, &Viewer::from(&user), &deal_id).await?;
    deal.delete(&state.db).await?;

    info!(deal_id = %deal_id, deleted_by = %user.id, "Deal deleted");

    Ok(MessageResponse::new("Deal deleted successfully"))
}

#[cfg(test)]
mod tests {
    use entity::deals::DealStageKind;
    use sea_orm::ActiveValue::NotSet;

    use super::*;

    fn active(stage: DealStageKind) -> deals::ActiveModel {
        deals::ActiveModel {
            stage: Set(stage),
            actual_close_date: Set(None),
            ..Default::default()
        }
    }

    #[test]
    fn test_closed_stage_stamps_date() {
        let mut deal = active(DealStageKind::ClosedWon);
        stamp_close_date(&mut deal);
        assert!(matches!(deal.actual_close_date, ActiveValue::Set(Some(_))));
    }

    #[test]
    fn test_open_stage_leaves_date() {
        let mut deal = active(DealStageKind::Negotiation);
        stamp_close_date(&mut deal);
        assert!(matches!(deal.actual_close_date, ActiveValue::Set(None)));
    }

    #[test]
    fn test_existing_close_date_kept() {
        let date = Utc::now() - chrono::Duration::days(3);
        let mut deal = deals::ActiveModel {
            stage: Set(DealStageKind::ClosedLost),
            actual_close_date: ActiveValue::Unchanged(Some(date)),
            ..Default::default()
        };
        stamp_close_date(&mut deal);
        assert!(matches!(deal.actual_close_date, ActiveValue::Unchanged(Some(d)) if d == date));
    }

    #[test]
    fn test_unset_stage_ignored() {
        let mut deal = deals::ActiveModel {
            stage: NotSet,
            ..Default::default()
        };
        stamp_close_date(&mut deal);
        assert!(matches!(deal.actual_close_date, ActiveValue::NotSet));
    }
}
