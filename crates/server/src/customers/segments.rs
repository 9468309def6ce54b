//! # Customer Segment Handlers
//!
//! Segments are shared across users. Membership is explicit: customers are
//! added and removed in bulk, and only customers the requester can see are
//! touched.

use std::collections::HashSet;

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{customer_segment_members, customer_segments, customers};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    ModelTrait,
    PaginatorTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
    TransactionTrait,
};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::customers::{
        CreateSegmentRequest,
        SegmentFilter,
        SegmentMembersRequest,
        SegmentMembersResponse,
        SegmentResponse,
        UpdateSegmentRequest,
    },
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_segment(state: &AppState, segment_id: &str) -> Result<customer_segments::Model> {
    customer_segments::Entity::find_by_id(segment_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Segment not found"))
}

async fn customer_count<C: ConnectionTrait>(db: &C, segment_id: &str) -> Result<u64> {
    Ok(customer_segment_members::Entity::find()
        .filter(customer_segment_members::Column::SegmentId.eq(segment_id))
        .count(db)
        .await?)
}

async fn segment_response(state: &AppState, segment: customer_segments::Model) -> Result<SegmentResponse> {
    let customer_count = customer_count(&state.db, &segment.id).await?;
    Ok(SegmentResponse {
        segment,
        customer_count,
    })
}

/// Ids among `requested` that belong to customers the viewer can see.
async fn visible_customer_ids<C: ConnectionTrait>(db: &C, viewer: &Viewer, requested: Vec<String>) -> Result<Vec<String>> {
    Ok(customers::Entity::find()
        .select_only()
        .column(customers::Column::Id)
        .filter(customers::Column::Id.is_in(requested))
        .filter(viewer.customers())
        .into_tuple::<String>()
        .all(db)
        .await?)
}

#[with_permission(Permission::Customers(RecordAction::View))]
pub async fn list_segments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<SegmentFilter>,
) -> Result<Json<Page<SegmentResponse>>> {
    let mut query = customer_segments::Entity::find();
    if let Some(is_active) = filter.is_active {
        query = query.filter(customer_segments::Column::IsActive.eq(is_active));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        query = query.filter(customer_segments::Column::Name.like(search_pattern(term)));
    }

    let page = paginate(&state.db, query.order_by_asc(customer_segments::Column::Name), &page).await?;

    let mut items = Vec::with_capacity(page.items.len());
    for segment in page.items {
        items.push(segment_response(&state, segment).await?);
    }
    Ok(Json(Page {
        items,
        pagination: page.pagination,
    }))
}

#[with_permission(Permission::Customers(RecordAction::View))]
pub async fn get_segment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(segment_id): Path<String>,
) -> Result<Json<SegmentResponse>> {
    let segment = find_segment(&state, &segment_id).await?;
    Ok(Json(segment_response(&state, segment).await?))
}

#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn create_segment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateSegmentRequest>,
) -> Result<(StatusCode, Json<SegmentResponse>)> {
    req.validate()?;

    let now = Utc::now();
    let segment = customer_segments::ActiveModel {
        id:          Set(entity::new_id()),
        name:        Set(req.name.trim().to_string()),
        description: Set(req.description),
        criteria:    Set(req.criteria.unwrap_or_else(|| json!({}))),
        is_active:   Set(req.is_active),
        created_at:  Set(now),
        updated_at:  Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(segment_id = %segment.id, created_by = %user.id, "Segment created");

    Ok(created(SegmentResponse {
        segment,
        customer_count: 0,
    }))
}

#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn update_segment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(segment_id): Path<String>,
    ApiJson(req): ApiJson<UpdateSegmentRequest>,
) -> Result<Json<SegmentResponse>> {
    req.validate()?;
    let segment = find_segment(&state, &segment_id).await?;

    let mut active: customer_segments::ActiveModel = segment.into();
    patch!(active, req, [name, criteria, is_active], [description]);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(segment_id = %updated.id, updated_by = %user.id, "Segment updated");

    Ok(Json(segment_response(&state, updated).await?))
}

#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn delete_segment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(segment_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let segment = find_segment(&state, &segment_id).await?;
    segment.delete(&state.db).await?;
    info!(segment_id = %segment_id, deleted_by = %user.id, "Segment deleted");
    Ok(MessageResponse::new("Segment deleted successfully"))
}

/// Add visible customers to a segment; existing members are skipped
#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn add_customers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(segment_id): Path<String>,
    ApiJson(req): ApiJson<SegmentMembersRequest>,
) -> Result<Json<SegmentMembersResponse>> {
    req.validate()?;
    let segment = find_segment(&state, &segment_id).await?;

    let txn = state.db.begin().await?;
    let visible = visible_customer_ids(&txn, &Viewer::from(&user), req.customer_ids).await?;

    let existing: HashSet<String> = customer_segment_members::Entity::find()
        .select_only()
        .column(customer_segment_members::Column::CustomerId)
        .filter(customer_segment_members::Column::SegmentId.eq(segment.id.as_str()))
        .into_tuple::<String>()
        .all(&txn)
        .await?
        .into_iter()
        .collect();

    let now = Utc::now();
    let mut added = 0;
    for customer_id in visible.into_iter().filter(|id| !existing.contains(id)) {
        customer_segment_members::ActiveModel {
            id:          Set(entity::new_id()),
            segment_id:  Set(segment.id.clone()),
            customer_id: Set(customer_id),
            added_at:    Set(now),
        }
        .insert(&txn)
        .await?;
        added += 1;
    }
    let customer_count = customer_count(&txn, &segment.id).await?;
    txn.commit().await?;

    info!(segment_id = %segment.id, added, updated_by = %user.id, "Customers added to segment");

    Ok(Json(SegmentMembersResponse {
        success: true,
        message: format!("{} customers added to segment", added),
        affected: added,
        customer_count,
    }))
}

/// Remove visible customers from a segment
#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn remove_customers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(segment_id): Path<String>,
    ApiJson(req): ApiJson<SegmentMembersRequest>,
) -> Result<Json<SegmentMembersResponse>> {
    req.validate()?;
    let segment = find_segment(&state, &segment_id).await?;

    let txn = state.db.begin().await?;
    let visible = visible_customer_ids(&txn, &Viewer::from(&user), req.customer_ids).await?;
    let removed = customer_segment_members::Entity::delete_many()
        .filter(customer_segment_members::Column::SegmentId.eq(segment.id.as_str()))
        .filter(customer_segment_members::Column::CustomerId.is_in(visible))
        .exec(&txn)
        .await?
        .rows_affected;
    let customer_count = customer_count(&txn, &segment.id).await?;
    txn.commit().await?;

    info!(segment_id = %segment.id, removed, updated_by = %user.id, "Customers removed from segment");

    Ok(Json(SegmentMembersResponse {
        success: true,
        message: format!("{} customers removed from segment", removed),
        affected: removed,
        customer_count,
    }))
}
