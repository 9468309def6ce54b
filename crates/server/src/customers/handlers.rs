//! # Customer Handlers
//!
//! CRUD for customers. Reads are narrowed to the viewer's customer scope and
//! every endpoint also requires the matching `*_customer` permission.

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::customers;
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    auth::users::ensure_user_exists,
    dto::customers::{CreateCustomerRequest, CustomerFilter, CustomerResponse, UpdateCustomerRequest},
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

pub(crate) async fn find_scoped_customer(state: &AppState, viewer: &Viewer, customer_id: &str) -> Result<customers::Model> {
    customers::Entity::find_by_id(customer_id)
        .filter(viewer.customers())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Customer not found"))
}

/// List customers in scope
#[with_permission(Permission::Customers(RecordAction::View))]
pub async fn list_customers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<CustomerFilter>,
) -> Result<Json<Page<CustomerResponse>>> {
    let mut query = customers::Entity::find().filter(Viewer::from(&user).customers());

    if let Some(status) = filter.status {
        query = query.filter(customers::Column::Status.eq(status));
    }
    if let Some(customer_type) = filter.customer_type {
        query = query.filter(customers::Column::CustomerType.eq(customer_type));
    }
    if let Some(assigned_to) = filter.assigned_to {
        query = query.filter(customers::Column::AssignedTo.eq(assigned_to));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(customers::Column::FirstName.like(pattern.clone()))
                .add(customers::Column::LastName.like(pattern.clone()))
                .add(customers::Column::Email.like(pattern.clone()))
                .add(customers::Column::Company.like(pattern)),
        );
    }

    let query = query.order_by_desc(customers::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?.map(CustomerResponse::from)))
}

#[with_permission(Permission::Customers(RecordAction::View))]
pub async fn get_customer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(customer_id): Path<String>,
) -> Result<Json<CustomerResponse>> {
    let customer = find_scoped_customer(&state, &Viewer::from(&user), &customer_id).await?;
    Ok(Json(customer.into()))
}

/// Create a customer, assigned to the creator unless `assigned_to` is given
#[with_permission(Permission::Customers(RecordAction::Add))]
pub async fn create_customer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>)> {
    req.validate()?;
    if let Some(assignee) = req.assigned_to.as_deref() {
        ensure_user_exists(&state.db, "assigned_to", assignee).await?;
    }

    let now = Utc::now();
    let customer = customers::ActiveModel {
        id:                       Set(entity::new_id()),
        first_name:               Set(req.first_name.trim().to_string()),
        last_name:                Set(req.last_name.trim().to_string()),
        email:                    Set(req.email.trim().to_lowercase()),
        phone:                    Set(req.phone),
        company:                  Set(req.company),
        job_title:                Set(req.job_title),
        customer_type:            Set(req.customer_type),
        status:                   Set(req.status),
        address:                  Set(req.address),
        city:                     Set(req.city),
        state:                    Set(req.state),
        postal_code:              Set(req.postal_code),
        country:                  Set(req.country),
        website:                  Set(req.website),
        industry:                 Set(req.industry),
        annual_revenue:           Set(req.annual_revenue),
        employee_count:           Set(req.employee_count),
        preferred_contact_method: Set(req.preferred_contact_method),
        assigned_to:              Set(Some(req.assigned_to.unwrap_or_else(|| user.id.clone()))),
        created_by:               Set(Some(user.id.clone())),
        tags:                     Set(req.tags.unwrap_or_else(|| json!([]))),
        custom_fields:            Set(req.custom_fields.unwrap_or_else(|| json!({}))),
        created_at:               Set(now),
        updated_at:               Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(customer_id = %customer.id, created_by = %user.id, "Customer created");

    Ok(created(customer.into()))
}

/// Partial update of a customer
#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn update_customer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(customer_id): Path<String>,
    ApiJson(req): ApiJson<UpdateCustomerRequest>,
) -> Result<Json<CustomerResponse>> {
    req.validate()?;
    let customer = find_scoped_customer(&state, &Viewer::from(&user), &customer_id).await?;
    if let Some(assignee) = crate::dto::given(&req.assigned_to) {
        ensure_user_exists(&state.db, "assigned_to", assignee).await?;
    }

    let mut req = req;
    req.email = req.email.map(|e| e.trim().to_lowercase());

    let mut active: customers::ActiveModel = customer.into();
    patch!(
        active,
        req,
        [first_name, last_name, email, customer_type, status, preferred_contact_method, tags, custom_fields],
        [
            phone,
            company,
            job_title,
            address,
            city,
            state,
            postal_code,
            country,
            website,
            industry,
            annual_revenue,
            employee_count,
            assigned_to
        ]
    );
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(customer_id = %updated.id, updated_by = %user.id, "Customer updated");

    Ok(Json(updated.into()))
}

#[with_permission(Permission::Customers(RecordAction::Delete))]
pub async fn delete_customer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(customer_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let customer = find_scoped_customer(&state, &Viewer::from(&user), &customer_id).await?;
    customer.delete(&state.db).await?;

    info!(customer_id = %customer_id, deleted_by = %user.id, "Customer deleted");

    Ok(MessageResponse::new("Customer deleted successfully"))
}
