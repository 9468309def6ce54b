//! # Insight Handlers
//!
//! Insights and sentiment recorded against customers, leads and deals. They
//! are produced elsewhere and stored here; reads follow the scope of the
//! record they describe.

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{customer_insights, deal_insights, lead_insights, sentiment_analyses};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    customers::parent_customer,
    deals::parent_deal,
    dto::analytics::{
        CreateCustomerInsightRequest,
        CreateDealInsightRequest,
        CreateLeadInsightRequest,
        CreateSentimentRequest,
        CustomerInsightFilter,
        CustomerInsightResponse,
        DealInsightFilter,
        LeadInsightFilter,
        SentimentFilter,
    },
    leads::parent_lead,
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_customer_insight(
    state: &AppState,
    viewer: &Viewer,
    insight_id: &str,
) -> Result<customer_insights::Model> {
    customer_insights::Entity::find_by_id(insight_id)
        .filter(viewer.customer_insights())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Customer insight not found"))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn list_customer_insights(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<CustomerInsightFilter>,
) -> Result<Json<Page<CustomerInsightResponse>>> {
    let mut query = customer_insights::Entity::find().filter(Viewer::from(&user).customer_insights());

    if let Some(customer_id) = filter.customer_id {
        query = query.filter(customer_insights::Column::CustomerId.eq(customer_id));
    }
    if let Some(kind) = filter.insight_type {
        query = query.filter(customer_insights::Column::InsightType.eq(kind));
    }
    if let Some(is_actionable) = filter.is_actionable {
        query = query.filter(customer_insights::Column::IsActionable.eq(is_actionable));
    }

    let query = query.order_by_desc(customer_insights::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?.map(CustomerInsightResponse::from)))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn get_customer_insight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(insight_id): Path<String>,
) -> Result<Json<CustomerInsightResponse>> {
    Ok(Json(
        find_customer_insight(&state, &Viewer::from(&user), &insight_id)
            .await?
            .into(),
    ))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_customer_insight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateCustomerInsightRequest>,
) -> Result<(StatusCode, Json<CustomerInsightResponse>)> {
    req.validate()?;
    let customer = parent_customer(&state, &Viewer::from(&user), &req.customer_id).await?;

    let insight = customer_insights::ActiveModel {
        id:               Set(entity::new_id()),
        customer_id:      Set(customer.id),
        insight_type:     Set(req.insight_type),
        title:            Set(req.title.trim().to_string()),
        description:      Set(req.description),
        confidence_score: Set(req.confidence_score),
        data_points:      Set(req.data_points.unwrap_or_else(|| json!({}))),
        recommendations:  Set(req.recommendations.unwrap_or_else(|| json!([]))),
        is_actionable:    Set(req.is_actionable),
        created_at:       Set(Utc::now()),
        expires_at:       Set(req.expires_at),
    }
    .insert(&state.db)
    .await?;

    info!(insight_id = %insight.id, customer_id = %insight.customer_id, insight_type = %insight.insight_type, "Customer insight recorded");

    Ok(created(insight.into()))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_customer_insight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(insight_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let insight = find_customer_insight(&state, &Viewer::from(&user), &insight_id).await?;
    insight.delete(&state.db).await?;
    info!(insight_id = %insight_id, deleted_by = %user.id, "Customer insight deleted");
    Ok(MessageResponse::new("Customer insight deleted successfully"))
}

async fn find_lead_insight(state: &AppState, viewer: &Viewer, insight_id: &str) -> Result<lead_insights::Model> {
    lead_insights::Entity::find_by_id(insight_id)
        .filter(viewer.lead_insights())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Lead insight not found"))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn list_lead_insights(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<LeadInsightFilter>,
) -> Result<Json<Page<lead_insights::Model>>> {
    let mut query = lead_insights::Entity::find().filter(Viewer::from(&user).lead_insights());

    if let Some(lead_id) = filter.lead_id {
        query = query.filter(lead_insights::Column::LeadId.eq(lead_id));
    }
    if let Some(kind) = filter.insight_type {
        query = query.filter(lead_insights::Column::InsightType.eq(kind));
    }

    let query = query.order_by_desc(lead_insights::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn get_lead_insight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(insight_id): Path<String>,
) -> Result<Json<lead_insights::Model>> {
    Ok(Json(find_lead_insight(&state, &Viewer::from(&user), &insight_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_lead_insight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateLeadInsightRequest>,
) -> Result<(StatusCode, Json<lead_insights::Model>)> {
    req.validate()?;
    let lead = parent_lead(&state, &Viewer::from(&user), &req.lead_id).await?;

    let insight = lead_insights::ActiveModel {
        id:               Set(entity::new_id()),
        lead_id:          Set(lead.id),
        insight_type:     Set(req.insight_type),
        title:            Set(req.title.trim().to_string()),
        description:      Set(req.description),
        confidence_score: Set(req.confidence_score),
        score_breakdown:  Set(req.score_breakdown.unwrap_or_else(|| json!({}))),
        recommendations:  Set(req.recommendations.unwrap_or_else(|| json!([]))),
        created_at:       Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    info!(insight_id = %insight.id, lead_id = %insight.lead_id, insight_type = %insight.insight_type, "Lead insight recorded");

    Ok(created(insight))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_lead_insight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(insight_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let insight = find_lead_insight(&state, &Viewer::from(&user), &insight_id).await?;
    insight.delete(&state.db).await?;
    info!(insight_id = %insight_id, deleted_by = %user.id, "Lead insight deleted");
    Ok(MessageResponse::new("Lead insight deleted successfully"))
}

async fn find_deal_insight(state: &AppState, viewer: &Viewer, insight_id: &str) -> Result<deal_insights::Model> {
    deal_insights::Entity::find_by_id(insight_id)
        .filter(viewer.deal_insights())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Deal insight not found"))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn list_deal_insights(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<DealInsightFilter>,
) -> Result<Json<Page<deal_insights::Model>>> {
    let mut query = deal_insights::Entity::find().filter(Viewer::from(&user).deal_insights());

    if let Some(deal_id) = filter.deal_id {
        query = query.filter(deal_insights::Column::DealId.eq(deal_id));
    }
    if let Some(kind) = filter.insight_type {
        query = query.filter(deal_insights::Column::InsightType.eq(kind));
    }

    let query = query.order_by_desc(deal_insights::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn get_deal_insight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(insight_id): Path<String>,
) -> Result<Json<deal_insights::Model>> {
    Ok(Json(find_deal_insight(&state, &Viewer::from(&user), &insight_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_deal_insight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateDealInsightRequest>,
) -> Result<(StatusCode, Json<deal_insights::Model>)> {
    req.validate()?;
    let deal = parent_deal(&state, &Viewer::from(&user), &req.deal_id).await?;

    let insight = deal_insights::ActiveModel {
        id:                   Set(entity::new_id()),
        deal_id:              Set(deal.id),
        insight_type:         Set(req.insight_type),
        title:                Set(req.title.trim().to_string()),
        description:          Set(req.description),
        confidence_score:     Set(req.confidence_score),
        predicted_value:      Set(req.predicted_value),
        predicted_close_date: Set(req.predicted_close_date),
        risk_factors:         Set(req.risk_factors.unwrap_or_else(|| json!([]))),
        recommendations:      Set(req.recommendations.unwrap_or_else(|| json!([]))),
        created_at:           Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    info!(insight_id = %insight.id, deal_id = %insight.deal_id, insight_type = %insight.insight_type, "Deal insight recorded");

    Ok(created(insight))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_deal_insight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(insight_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let insight = find_deal_insight(&state, &Viewer::from(&user), &insight_id).await?;
    insight.delete(&state.db).await?;
    info!(insight_id = %insight_id, deleted_by = %user.id, "Deal insight deleted");
    Ok(MessageResponse::new("Deal insight deleted successfully"))
}

async fn find_sentiment(state: &AppState, viewer: &Viewer, analysis_id: &str) -> Result<sentiment_analyses::Model> {
    sentiment_analyses::Entity::find_by_id(analysis_id)
        .filter(viewer.sentiment_analyses())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Sentiment analysis not found"))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn list_sentiment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<SentimentFilter>,
) -> Result<Json<Page<sentiment_analyses::Model>>> {
    let mut query = sentiment_analyses::Entity::find().filter(Viewer::from(&user).sentiment_analyses());

    if let Some(customer_id) = filter.customer_id {
        query = query.filter(sentiment_analyses::Column::CustomerId.eq(customer_id));
    }
    if let Some(source) = filter.source {
        query = query.filter(sentiment_analyses::Column::Source.eq(source));
    }
    if let Some(label) = filter.sentiment_label {
        query = query.filter(sentiment_analyses::Column::SentimentLabel.eq(label));
    }

    let query = query.order_by_desc(sentiment_analyses::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn get_sentiment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(analysis_id): Path<String>,
) -> Result<Json<sentiment_analyses::Model>> {
    Ok(Json(find_sentiment(&state, &Viewer::from(&user), &analysis_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_sentiment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateSentimentRequest>,
) -> Result<(StatusCode, Json<sentiment_analyses::Model>)> {
    req.validate()?;
    let customer = parent_customer(&state, &Viewer::from(&user), &req.customer_id).await?;

    let analysis = sentiment_analyses::ActiveModel {
        id:              Set(entity::new_id()),
        customer_id:     Set(customer.id),
        source:          Set(req.source),
        content:         Set(req.content),
        sentiment_score: Set(req.sentiment_score),
        sentiment_label: Set(req.sentiment_label),
        confidence:      Set(req.confidence),
        keywords:        Set(req.keywords.unwrap_or_else(|| json!([]))),
        emotions:        Set(req.emotions.unwrap_or_else(|| json!({}))),
        created_at:      Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    info!(
        analysis_id = %analysis.id,
        customer_id = %analysis.customer_id,
        label = %analysis.sentiment_label,
        "Sentiment analysis recorded"
    );

    Ok(created(analysis))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_sentiment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(analysis_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let analysis = find_sentiment(&state, &Viewer::from(&user), &analysis_id).await?;
    analysis.delete(&state.db).await?;
    info!(analysis_id = %analysis_id, deleted_by = %user.id, "Sentiment analysis deleted");
    Ok(MessageResponse::new("Sentiment analysis deleted successfully"))
}
