//! # Deal Product Handlers
//!
//! Line items on a deal. Totals are computed on read from unit price,
//! discount percentage and quantity.

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::deal_products;
use error::{ApiJson, OptionExt as _, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use super::parent_deal;
use crate::{
    dto::deals::{CreateDealProductRequest, DealProductFilter, DealProductResponse, UpdateDealProductRequest},
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_product(state: &AppState, viewer: &Viewer, product_id: &str) -> Result<deal_products::Model> {
    deal_products::Entity::find_by_id(product_id)
        .filter(viewer.deal_products())
        .one(&state.db)
        .await?
        .or_not_found("Product not found")
}

#[with_permission(Permission::Deals(RecordAction::View))]
pub async fn list_products(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<DealProductFilter>,
) -> Result<Json<Page<DealProductResponse>>> {
    let mut query = deal_products::Entity::find().filter(Viewer::from(&user).deal_products());

    if let Some(deal_id) = filter.deal_id {
        query = query.filter(deal_products::Column::DealId.eq(deal_id));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        query = query.filter(deal_products::Column::ProductName.like(search_pattern(term)));
    }

    let query = query.order_by_asc(deal_products::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?.map(DealProductResponse::from)))
}

#[with_permission(Permission::Deals(RecordAction::View))]
pub async fn get_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(product_id): Path<String>,
) -> Result<Json<DealProductResponse>> {
    let product = find_scoped_product(&state, &Viewer::from(&user), &product_id).await?;
    Ok(Json(product.into()))
}

#[with_permission(Permission::Deals(RecordAction::Change))]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateDealProductRequest>,
) -> Result<(StatusCode, Json<DealProductResponse>)> {
    req.validate()?;
    let deal = parent_deal(&state, &Viewer::from(&user), &req.deal_id).await?;

    let now = Utc::now();
    let product = deal_products::ActiveModel {
        id:           Set(entity::new_id()),
        deal_id:      Set(deal.id),
        product_name: Set(req.product_name.trim().to_string()),
        description:  Set(req.description),
        quantity:     Set(req.quantity),
        unit_price:   Set(req.unit_price),
        discount:     Set(req.discount),
        created_at:   Set(now),
        updated_at:   Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(product_id = %product.id, deal_id = %product.deal_id, "Deal product added");

    Ok(created(product.into()))
}

#[with_permission(Permission::Deals(RecordAction::Change))]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(product_id): Path<String>,
    ApiJson(req): ApiJson<UpdateDealProductRequest>,
) -> Result<Json<DealProductResponse>> {
    req.validate()?;
    let product = find_scoped_product(&state, &Viewer::from(&user), &product_id).await?;

    let mut active: deal_products::ActiveModel = product.into();
    patch!(active, req, [product_name, quantity, unit_price, discount], [description]);
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?.into()))
}

#[with_permission(Permission::Deals(RecordAction::Change))]
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(product_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let product = find_scoped_product(&state, &Viewer::from(&user), &product_id).await?;
    product.delete(&state.db).await?;
    info!(product_id = %product_id, deleted_by = %user.id, "Deal product removed");
    Ok(MessageResponse::new("Product deleted successfully"))
}
