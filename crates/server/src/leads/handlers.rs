//! # Lead Handlers
//!
//! CRUD for leads plus the convert action, which turns a lead into a customer
//! in a single transaction.

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{
    customers::{self, CustomerStatus, CustomerType},
    lead_campaigns,
    leads::{self, LeadStatus},
};
use error::{ApiJson, ApiJsonOrDefault, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    Condition,
    ConnectionTrait,
    DatabaseTransaction,
    EntityTrait,
    ModelTrait,
    QueryFilter,
    QueryOrder,
    Set,
    TransactionTrait,
};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    auth::users::ensure_user_exists,
    dto::leads::{
        ConvertLeadRequest,
        ConvertLeadResponse,
        CreateLeadRequest,
        LeadFilter,
        LeadResponse,
        UpdateLeadRequest,
    },
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_lead<C: ConnectionTrait>(db: &C, viewer: &Viewer, lead_id: &str) -> Result<leads::Model> {
    leads::Entity::find_by_id(lead_id)
        .filter(viewer.leads())
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Lead not found"))
}

async fn ensure_campaign_exists(state: &AppState, campaign_id: &str) -> Result<()> {
    lead_campaigns::Entity::find_by_id(campaign_id)
        .one(&state.db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::field("campaign_id", "Campaign not found"))
}

/// List leads in scope
#[with_permission(Permission::Leads(RecordAction::View))]
pub async fn list_leads(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<LeadFilter>,
) -> Result<Json<Page<LeadResponse>>> {
    let mut query = leads::Entity::find().filter(Viewer::from(&user).leads());

    if let Some(status) = filter.status {
        query = query.filter(leads::Column::Status.eq(status));
    }
    if let Some(source) = filter.source {
        query = query.filter(leads::Column::Source.eq(source));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(leads::Column::Priority.eq(priority));
    }
    if let Some(assigned_to) = filter.assigned_to {
        query = query.filter(leads::Column::AssignedTo.eq(assigned_to));
    }
    if let Some(campaign_id) = filter.campaign_id {
        query = query.filter(leads::Column::CampaignId.eq(campaign_id));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(leads::Column::FirstName.like(pattern.clone()))
                .add(leads::Column::LastName.like(pattern.clone()))
                .add(leads::Column::Email.like(pattern.clone()))
                .add(leads::Column::Company.like(pattern)),
        );
    }

    let query = query
        .order_by_desc(leads::Column::Score)
        .order_by_desc(leads::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?.map(LeadResponse::from)))
}

#[with_permission(Permission::Leads(RecordAction::View))]
pub async fn get_lead(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lead_id): Path<String>,
) -> Result<Json<LeadResponse>> {
    let lead = find_scoped_lead(&state.db, &Viewer::from(&user), &lead_id).await?;
    Ok(Json(lead.into()))
}

#[with_permission(Permission::Leads(RecordAction::Add))]
pub async fn create_lead(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateLeadRequest>,
) -> Result<(StatusCode, Json<LeadResponse>)> {
    req.validate()?;
    if let Some(assignee) = req.assigned_to.as_deref() {
        ensure_user_exists(&state.db, "assigned_to", assignee).await?;
    }
    if let Some(campaign_id) = req.campaign_id.as_deref() {
        ensure_campaign_exists(&state, campaign_id).await?;
    }

    let now = Utc::now();
    let lead = leads::ActiveModel {
        id:                       Set(entity::new_id()),
        first_name:               Set(req.first_name.trim().to_string()),
        last_name:                Set(req.last_name.trim().to_string()),
        email:                    Set(req.email.trim().to_lowercase()),
        phone:                    Set(req.phone),
        company:                  Set(req.company),
        job_title:                Set(req.job_title),
        source:                   Set(req.source),
        status:                   Set(req.status),
        priority:                 Set(req.priority),
        score:                    Set(req.score),
        estimated_value:          Set(req.estimated_value),
        expected_close_date:      Set(req.expected_close_date),
        notes:                    Set(req.notes),
        assigned_to:              Set(Some(req.assigned_to.unwrap_or_else(|| user.id.clone()))),
        created_by:               Set(Some(user.id.clone())),
        converted_to_customer_id: Set(None),
        conversion_date:          Set(None),
        campaign_id:              Set(req.campaign_id),
        tags:                     Set(req.tags.unwrap_or_else(|| json!([]))),
        custom_fields:            Set(req.custom_fields.unwrap_or_else(|| json!({}))),
        created_at:               Set(now),
        updated_at:               Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(lead_id = %lead.id, created_by = %user.id, score = lead.score, "Lead created");

    Ok(created(lead.into()))
}

#[with_permission(Permission::Leads(RecordAction::Change))]
pub async fn update_lead(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lead_id): Path<String>,
    ApiJson(req): ApiJson<UpdateLeadRequest>,
) -> Result<Json<LeadResponse>> {
    req.validate()?;
    let lead = find_scoped_lead(&state.db, &Viewer::from(&user), &lead_id).await?;
    if let Some(assignee) = crate::dto::given(&req.assigned_to) {
        ensure_user_exists(&state.db, "assigned_to", assignee).await?;
    }
    if let Some(campaign_id) = crate::dto::given(&req.campaign_id) {
        ensure_campaign_exists(&state, campaign_id).await?;
    }

    let mut req = req;
    req.email = req.email.map(|e| e.trim().to_lowercase());

    let mut active: leads::ActiveModel = lead.into();
    patch!(
        active,
        req,
        [first_name, last_name, email, source, status, priority, score, tags, custom_fields],
        [
            phone,
            company,
            job_title,
            estimated_value,
            expected_close_date,
            notes,
            assigned_to,
            campaign_id
        ]
    );
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(lead_id = %updated.id, updated_by = %user.id, "Lead updated");

    Ok(Json(updated.into()))
}

#[with_permission(Permission::Leads(RecordAction::Delete))]
pub async fn delete_lead(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lead_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let lead = find_scoped_lead(&state.db, &Viewer::from(&user), &lead_id).await?;
    lead.delete(&state.db).await?;

    info!(lead_id = %lead_id, deleted_by = %user.id, "Lead deleted");

    Ok(MessageResponse::new("Lead deleted successfully"))
}

/// The customer a conversion links to: the one named in the request, an
/// existing visible customer with the lead's email, or a new one copied from
/// the lead.
async fn conversion_target(
    txn: &DatabaseTransaction,
    viewer: &Viewer,
    lead: &leads::Model,
    customer_id: Option<String>,
) -> Result<customers::Model> {
    if let Some(customer_id) = customer_id {
        return customers::Entity::find_by_id(customer_id)
            .filter(viewer.customers())
            .one(txn)
            .await?
            .ok_or_else(|| AppError::field("customer_id", "Customer not found"));
    }

    let same_email = customers::Entity::find()
        .filter(customers::Column::Email.eq(lead.email.as_str()))
        .one(txn)
        .await?;
    if let Some(existing) = same_email {
        let visible = customers::Entity::find_by_id(existing.id.as_str())
            .filter(viewer.customers())
            .one(txn)
            .await?;
        return visible.ok_or_else(|| AppError::conflict("A customer with this email already exists"));
    }

    let now = Utc::now();
    let customer_type = if lead.company.is_some() {
        CustomerType::Business
    }
    else {
        CustomerType::Individual
    };
    Ok(customers::ActiveModel {
        id:                       Set(entity::new_id()),
        first_name:               Set(lead.first_name.clone()),
        last_name:                Set(lead.last_name.clone()),
        email:                    Set(lead.email.clone()),
        phone:                    Set(lead.phone.clone()),
        company:                  Set(lead.company.clone()),
        job_title:                Set(lead.job_title.clone()),
        customer_type:            Set(customer_type),
        status:                   Set(CustomerStatus::Active),
        address:                  Set(None),
        city:                     Set(None),
        state:                    Set(None),
        postal_code:              Set(None),
        country:                  Set(None),
        website:                  Set(None),
        industry:                 Set(None),
        annual_revenue:           Set(None),
        employee_count:           Set(None),
        preferred_contact_method: Set(Default::default()),
        assigned_to:              Set(lead.assigned_to.clone()),
        created_by:               Set(Some(viewer.id.clone())),
        tags:                     Set(lead.tags.clone()),
        custom_fields:            Set(lead.custom_fields.clone()),
        created_at:               Set(now),
        updated_at:               Set(now),
    }
    .insert(txn)
    .await?)
}

/// Convert a lead into a customer
///
/// Either every write happens or none does. A lead converts once; a second
/// attempt is a conflict.
#[with_permission(Permission::Customers(RecordAction::Add))]
pub async fn convert_lead(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lead_id): Path<String>,
    ApiJsonOrDefault(req): ApiJsonOrDefault<ConvertLeadRequest>,
) -> Result<Json<ConvertLeadResponse>> {
    let viewer = Viewer::from(&user);

    let txn = state.db.begin().await?;
    let lead = find_scoped_lead(&txn, &viewer, &lead_id).await?;
    if lead.is_converted() {
        return Err(AppError::conflict("Lead has already been converted"));
    }

    let customer = conversion_target(&txn, &viewer, &lead, req.customer_id).await?;

    let now = Utc::now();
    let mut active: leads::ActiveModel = lead.into();
    active.converted_to_customer_id = Set(Some(customer.id.clone()));
    active.conversion_date = Set(Some(now));
    active.status = Set(LeadStatus::ClosedWon);
    active.updated_at = Set(now);
    let converted = active.update(&txn).await?;
    txn.commit().await?;

    info!(lead_id = %converted.id, customer_id = %customer.id, converted_by = %user.id, "Lead converted");

    Ok(Json(ConvertLeadResponse {
        success:     true,
        message:     "Lead converted successfully".to_string(),
        lead:        converted.into(),
        customer_id: customer.id,
    }))
}
