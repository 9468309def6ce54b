//! # Permission Catalog Handlers
//!
//! Read-only views of the permission catalog and the role grants seeded at
//! startup.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use entity::{permissions, role_permissions};
use error::{AppError, Result};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    dto::users::{PermissionFilter, RolePermissionFilter, RolePermissionResponse},
    utils::{paginate, search_pattern, search_term, Page, PageParams},
    AppState,
};

/// List permissions ordered by module then name
pub async fn list_permissions(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<PermissionFilter>,
) -> Result<Json<Page<permissions::Model>>> {
    let mut query = permissions::Entity::find();
    if let Some(module) = filter.module {
        query = query.filter(permissions::Column::Module.eq(module));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(permissions::Column::Name.like(pattern.clone()))
                .add(permissions::Column::Codename.like(pattern)),
        );
    }

    let query = query
        .order_by_asc(permissions::Column::Module)
        .order_by_asc(permissions::Column::Name);

    Ok(Json(paginate(&state.db, query, &page).await?))
}

pub async fn get_permission(
    State(state): State<AppState>,
    Path(permission_id): Path<String>,
) -> Result<Json<permissions::Model>> {
    let permission = permissions::Entity::find_by_id(permission_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Permission not found"))?;
    Ok(Json(permission))
}

/// List role grants, optionally for one role
pub async fn list_role_permissions(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<RolePermissionFilter>,
) -> Result<Json<Page<RolePermissionResponse>>> {
    let mut query = role_permissions::Entity::find();
    if let Some(role) = filter.role {
        query = query.filter(role_permissions::Column::Role.eq(role));
    }
    let query = query
        .order_by_asc(role_permissions::Column::Role)
        .order_by_asc(role_permissions::Column::CreatedAt);

    let page = paginate(&state.db, query, &page).await?;

    let ids: Vec<String> = page.items.iter().map(|g| g.permission_id.clone()).collect();
    let catalog: HashMap<String, permissions::Model> = permissions::Entity::find()
        .filter(permissions::Column::Id.is_in(ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    Ok(Json(page.map(|grant| {
        let permission = catalog.get(&grant.permission_id).cloned();
        RolePermissionResponse::new(grant, permission)
    })))
}

pub async fn get_role_permission(
    State(state): State<AppState>,
    Path(grant_id): Path<String>,
) -> Result<Json<RolePermissionResponse>> {
    let (grant, permission) = role_permissions::Entity::find_by_id(grant_id)
        .find_also_related(permissions::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Role permission not found"))?;
    Ok(Json(RolePermissionResponse::new(grant, permission)))
}
