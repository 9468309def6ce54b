//! # Automation Rule Handlers

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::automation_rules;
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::automation::{AutomationRuleFilter, CreateAutomationRuleRequest, UpdateAutomationRuleRequest},
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_rule(state: &AppState, rule_id: &str) -> Result<automation_rules::Model> {
    automation_rules::Entity::find_by_id(rule_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Automation rule not found"))
}

/// List rules in evaluation order
pub async fn list_rules(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<AutomationRuleFilter>,
) -> Result<Json<Page<automation_rules::Model>>> {
    let mut query = automation_rules::Entity::find();
    if let Some(rule_type) = filter.rule_type {
        query = query.filter(automation_rules::Column::RuleType.eq(rule_type));
    }
    if let Some(is_active) = filter.is_active {
        query = query.filter(automation_rules::Column::IsActive.eq(is_active));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        query = query.filter(automation_rules::Column::Name.like(search_pattern(term)));
    }

    let query = query
        .order_by_asc(automation_rules::Column::Priority)
        .order_by_asc(automation_rules::Column::Name);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

pub async fn get_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
) -> Result<Json<automation_rules::Model>> {
    Ok(Json(find_rule(&state, &rule_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_rule(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateAutomationRuleRequest>,
) -> Result<(StatusCode, Json<automation_rules::Model>)> {
    req.validate()?;

    let now = Utc::now();
    let rule = automation_rules::ActiveModel {
        id:          Set(entity::new_id()),
        name:        Set(req.name.trim().to_string()),
        description: Set(req.description),
        rule_type:   Set(req.rule_type),
        conditions:  Set(req.conditions.unwrap_or_else(|| json!({}))),
        actions:     Set(req.actions.unwrap_or_else(|| json!([]))),
        is_active:   Set(req.is_active),
        priority:    Set(req.priority),
        created_by:  Set(Some(user.id.clone())),
        created_at:  Set(now),
        updated_at:  Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(rule_id = %rule.id, rule_type = %rule.rule_type, priority = rule.priority, "Automation rule created");

    Ok(created(rule))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_rule(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(rule_id): Path<String>,
    ApiJson(req): ApiJson<UpdateAutomationRuleRequest>,
) -> Result<Json<automation_rules::Model>> {
    req.validate()?;
    let rule = find_rule(&state, &rule_id).await?;

    let mut active: automation_rules::ActiveModel = rule.into();
    patch!(active, req, [name, rule_type, conditions, actions, is_active, priority], [description]);
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_rule(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(rule_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let rule = find_rule(&state, &rule_id).await?;
    rule.delete(&state.db).await?;
    info!(rule_id = %rule_id, deleted_by = %user.id, "Automation rule deleted");
    Ok(MessageResponse::new("Automation rule deleted successfully"))
}
