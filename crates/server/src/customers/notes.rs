//! # Customer Note Handlers
//!
//! Private notes are visible to their author only (and administrators), and
//! only the author or an administrator may edit or delete a note.

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{customer_notes, users::UserRole};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use super::parent_customer;
use crate::{
    dto::customers::{CreateNoteRequest, NoteFilter, UpdateNoteRequest},
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_note(state: &AppState, viewer: &Viewer, note_id: &str) -> Result<customer_notes::Model> {
    customer_notes::Entity::find_by_id(note_id)
        .filter(viewer.customer_notes())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Note not found"))
}

fn ensure_author(user: &AuthenticatedUser, note: &customer_notes::Model) -> Result<()> {
    if user.role == UserRole::Admin || note.author_id.as_deref() == Some(user.id.as_str()) {
        Ok(())
    }
    else {
        Err(AppError::forbidden("Only the author can change this note"))
    }
}

#[with_permission(Permission::Customers(RecordAction::View))]
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<NoteFilter>,
) -> Result<Json<Page<customer_notes::Model>>> {
    let mut query = customer_notes::Entity::find().filter(Viewer::from(&user).customer_notes());

    if let Some(customer_id) = filter.customer_id {
        query = query.filter(customer_notes::Column::CustomerId.eq(customer_id));
    }
    if let Some(is_private) = filter.is_private {
        query = query.filter(customer_notes::Column::IsPrivate.eq(is_private));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(customer_notes::Column::Title.like(pattern.clone()))
                .add(customer_notes::Column::Content.like(pattern)),
        );
    }

    let query = query.order_by_desc(customer_notes::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::Customers(RecordAction::View))]
pub async fn get_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(note_id): Path<String>,
) -> Result<Json<customer_notes::Model>> {
    Ok(Json(
        find_scoped_note(&state, &Viewer::from(&user), &note_id).await?,
    ))
}

#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn create_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<customer_notes::Model>)> {
    req.validate()?;
    let customer = parent_customer(&state, &Viewer::from(&user), &req.customer_id).await?;

    let now = Utc::now();
    let note = customer_notes::ActiveModel {
        id:          Set(entity::new_id()),
        customer_id: Set(customer.id),
        author_id:   Set(Some(user.id.clone())),
        title:       Set(req.title.trim().to_string()),
        content:     Set(req.content),
        is_private:  Set(req.is_private),
        created_at:  Set(now),
        updated_at:  Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(note_id = %note.id, customer_id = %note.customer_id, private = note.is_private, "Note created");

    Ok(created(note))
}

#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn update_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(note_id): Path<String>,
    ApiJson(req): ApiJson<UpdateNoteRequest>,
) -> Result<Json<customer_notes::Model>> {
    req.validate()?;
    let note = find_scoped_note(&state, &Viewer::from(&user), &note_id).await?;
    ensure_author(&user, &note)?;

    let mut active: customer_notes::ActiveModel = note.into();
    patch!(active, req, [title, content, is_private], []);
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(note_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let note = find_scoped_note(&state, &Viewer::from(&user), &note_id).await?;
    ensure_author(&user, &note)?;
    note.delete(&state.db).await?;
    info!(note_id = %note_id, deleted_by = %user.id, "Note deleted");
    Ok(MessageResponse::new("Note deleted successfully"))
}
