//! # Customer Contact Handlers

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::customer_contacts;
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use super::parent_customer;
use crate::{
    dto::customers::{ContactFilter, CreateContactRequest, UpdateContactRequest},
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_contact(state: &AppState, viewer: &Viewer, contact_id: &str) -> Result<customer_contacts::Model> {
    customer_contacts::Entity::find_by_id(contact_id)
        .filter(viewer.customer_contacts())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Contact not found"))
}

#[with_permission(Permission::Customers(RecordAction::View))]
pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ContactFilter>,
) -> Result<Json<Page<customer_contacts::Model>>> {
    let mut query = customer_contacts::Entity::find().filter(Viewer::from(&user).customer_contacts());

    if let Some(customer_id) = filter.customer_id {
        query = query.filter(customer_contacts::Column::CustomerId.eq(customer_id));
    }
    if let Some(is_primary) = filter.is_primary {
        query = query.filter(customer_contacts::Column::IsPrimary.eq(is_primary));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(customer_contacts::Column::FirstName.like(pattern.clone()))
                .add(customer_contacts::Column::LastName.like(pattern.clone()))
                .add(customer_contacts::Column::Email.like(pattern)),
        );
    }

    let query = query
        .order_by_desc(customer_contacts::Column::IsPrimary)
        .order_by_asc(customer_contacts::Column::LastName);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::Customers(RecordAction::View))]
pub async fn get_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(contact_id): Path<String>,
) -> Result<Json<customer_contacts::Model>> {
    Ok(Json(
        find_scoped_contact(&state, &Viewer::from(&user), &contact_id).await?,
    ))
}

#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn create_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateContactRequest>,
) -> Result<(StatusCode, Json<customer_contacts::Model>)> {
    req.validate()?;
    let customer = parent_customer(&state, &Viewer::from(&user), &req.customer_id).await?;

    let now = Utc::now();
    let contact = customer_contacts::ActiveModel {
        id:          Set(entity::new_id()),
        customer_id: Set(customer.id),
        first_name:  Set(req.first_name.trim().to_string()),
        last_name:   Set(req.last_name.trim().to_string()),
        email:       Set(req.email.trim().to_lowercase()),
        phone:       Set(req.phone),
        job_title:   Set(req.job_title),
        is_primary:  Set(req.is_primary),
        notes:       Set(req.notes),
        created_at:  Set(now),
        updated_at:  Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(contact_id = %contact.id, customer_id = %contact.customer_id, "Contact created");

    Ok(created(contact))
}

#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn update_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(contact_id): Path<String>,
    ApiJson(req): ApiJson<UpdateContactRequest>,
) -> Result<Json<customer_contacts::Model>> {
    req.validate()?;
    let contact = find_scoped_contact(&state, &Viewer::from(&user), &contact_id).await?;

    let mut req = req;
    req.email = req.email.map(|e| e.trim().to_lowercase());

    let mut active: customer_contacts::ActiveModel = contact.into();
    patch!(active, req, [first_name, last_name, email, is_primary], [phone, job_title, notes]);
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(contact_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let contact = find_scoped_contact(&state, &Viewer::from(&user), &contact_id).await?;
    contact.delete(&state.db).await?;
    info!(contact_id = %contact_id, deleted_by = %user.id, "Contact deleted");
    Ok(MessageResponse::new("Contact deleted successfully"))
}
