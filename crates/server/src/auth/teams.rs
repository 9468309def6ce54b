//! # Team Handlers
//!
//! HTTP request handlers for team CRUD and member management endpoints.
//!
//! Admins and managers see every team; other roles see only teams they are a
//! member of. Mutations are limited to admins, managers and the team leader.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{team_members, teams, users};
use error::{ApiJson, AppError, Result};
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    ModelTrait,
    QueryFilter,
    QueryOrder,
    Set,
    TransactionTrait,
};
use tracing::info;
use validator::Validate;

use crate::{
    auth::users::ensure_user_exists,
    dto::teams::{CreateTeamRequest, TeamFilter, TeamMemberRequest, TeamResponse, UpdateTeamRequest},
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_team(state: &AppState, viewer: &Viewer, team_id: &str) -> Result<teams::Model> {
    teams::Entity::find_by_id(team_id)
        .filter(viewer.teams())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))
}

/// Admins, managers and the team's own leader may change a team.
fn ensure_can_manage(user: &AuthenticatedUser, team: &teams::Model) -> Result<()> {
    if user.role.is_privileged() || team.leader_id.as_deref() == Some(user.id.as_str()) {
        Ok(())
    }
    else {
        Err(AppError::forbidden("Only administrators, managers or the team leader can change this team"))
    }
}

/// Member ids of each team in `team_ids`.
async fn members_by_team(state: &AppState, team_ids: Vec<String>) -> Result<HashMap<String, Vec<String>>> {
    let memberships = team_members::Entity::find()
        .filter(team_members::Column::TeamId.is_in(team_ids))
        .order_by_asc(team_members::Column::JoinedAt)
        .all(&state.db)
        .await?;

    let mut members: HashMap<String, Vec<String>> = HashMap::new();
    for membership in memberships {
        members
            .entry(membership.team_id)
            .or_default()
            .push(membership.user_id);
    }
    Ok(members)
}

async fn team_response(state: &AppState, team: teams::Model) -> Result<TeamResponse> {
    let mut members = members_by_team(state, vec![team.id.clone()]).await?;
    let member_ids = members.remove(&team.id).unwrap_or_default();
    Ok(TeamResponse::new(team, member_ids))
}

/// Whether `user_id` belongs to `team_id`
async fn is_member<C: ConnectionTrait>(db: &C, team_id: &str, user_id: &str) -> Result<bool> {
    Ok(team_members::Entity::find()
        .filter(team_members::Column::TeamId.eq(team_id))
        .filter(team_members::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .is_some())
}

fn membership(team_id: &str, user_id: &str) -> team_members::ActiveModel {
    team_members::ActiveModel {
        id:        Set(entity::new_id()),
        team_id:   Set(team_id.to_string()),
        user_id:   Set(user_id.to_string()),
        joined_at: Set(Utc::now()),
    }
}

/// List teams visible to the requester
pub async fn list_teams(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<TeamFilter>,
) -> Result<Json<Page<TeamResponse>>> {
    let mut query = teams::Entity::find().filter(Viewer::from(&user).teams());
    if let Some(term) = search_term(filter.search.as_ref()) {
        query = query.filter(teams::Column::Name.like(search_pattern(term)));
    }

    let page = paginate(&state.db, query.order_by_asc(teams::Column::Name), &page).await?;
    let ids = page.items.iter().map(|t| t.id.clone()).collect();
    let mut members = members_by_team(&state, ids).await?;

    Ok(Json(page.map(|team| {
        let member_ids = members.remove(&team.id).unwrap_or_default();
        TeamResponse::new(team, member_ids)
    })))
}

/// Get a single team
pub async fn get_team(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(team_id): Path<String>,
) -> Result<Json<TeamResponse>> {
    let team = find_scoped_team(&state, &Viewer::from(&user), &team_id).await?;
    Ok(Json(team_response(&state, team).await?))
}

/// Create a team with optional initial members
pub async fn create_team(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>)> {
    req.validate()?;
    if !user.role.is_privileged() {
        return Err(AppError::forbidden("Only administrators and managers can create teams"));
    }

    let txn = state.db.begin().await?;
    if let Some(leader_id) = req.leader_id.as_deref() {
        ensure_user_exists(&txn, "leader_id", leader_id).await?;
    }

    let now = Utc::now();
    let team = teams::ActiveModel {
        id:          Set(entity::new_id()),
        name:        Set(req.name.trim().to_string()),
        description: Set(req.description),
        leader_id:   Set(req.leader_id),
        created_at:  Set(now),
        updated_at:  Set(now),
    }
    .insert(&txn)
    .await?;

    let mut member_ids = req.member_ids;
    member_ids.sort();
    member_ids.dedup();
    for member_id in &member_ids {
        ensure_user_exists(&txn, "member_ids", member_id).await?;
        membership(&team.id, member_id).insert(&txn).await?;
    }
    txn.commit().await?;

    info!(team_id = %team.id, created_by = %user.id, members = member_ids.len(), "Team created");

    Ok(created(team_response(&state, team).await?))
}

/// Partial update of a team
pub async fn update_team(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(team_id): Path<String>,
    ApiJson(req): ApiJson<UpdateTeamRequest>,
) -> Result<Json<TeamResponse>> {
    req.validate()?;
    let team = find_scoped_team(&state, &Viewer::from(&user), &team_id).await?;
    ensure_can_manage(&user, &team)?;

    if let Some(leader_id) = crate::dto::given(&req.leader_id) {
        ensure_user_exists(&state.db, "leader_id", leader_id).await?;
    }

    let mut active: teams::ActiveModel = team.into();
    patch!(active, req, [name], [description, leader_id]);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(team_id = %updated.id, updated_by = %user.id, "Team updated");

    Ok(Json(team_response(&state, updated).await?))
}

/// Delete a team and its memberships
pub async fn delete_team(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(team_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let team = find_scoped_team(&state, &Viewer::from(&user), &team_id).await?;
    ensure_can_manage(&user, &team)?;
    team.delete(&state.db).await?;

    info!(team_id = %team_id, deleted_by = %user.id, "Team deleted");

    Ok(MessageResponse::new("Team deleted successfully"))
}

fn required_user_id(req: TeamMemberRequest) -> Result<String> {
    req.user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request("user_id is required"))
}

/// Add a member to a team; adding an existing member is a no-op
pub async fn add_member(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(team_id): Path<String>,
    ApiJson(req): ApiJson<TeamMemberRequest>,
) -> Result<Json<MessageResponse>> {
    let team = find_scoped_team(&state, &Viewer::from(&user), &team_id).await?;
    ensure_can_manage(&user, &team)?;
    let member_id = required_user_id(req)?;

    users::Entity::find_by_id(member_id.as_str())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if !is_member(&state.db, &team.id, &member_id).await? {
        membership(&team.id, &member_id).insert(&state.db).await?;
        info!(team_id = %team.id, user_id = %member_id, added_by = %user.id, "Team member added");
    }

    Ok(MessageResponse::new("Member added successfully"))
}

/// Remove a member from a team; removing a non-member is a no-op
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(team_id): Path<String>,
    ApiJson(req): ApiJson<TeamMemberRequest>,
) -> Result<Json<MessageResponse>> {
    let team = find_scoped_team(&state, &Viewer::from(&user), &team_id).await?;
    ensure_can_manage(&user, &team)?;
    let member_id = required_user_id(req)?;

    users::Entity::find_by_id(member_id.as_str())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let removed = team_members::Entity::delete_many()
        .filter(team_members::Column::TeamId.eq(team.id.as_str()))
        .filter(team_members::Column::UserId.eq(member_id.as_str()))
        .exec(&state.db)
        .await?;
    if removed.rows_affected > 0 {
        info!(team_id = %team.id, user_id = %member_id, removed_by = %user.id, "Team member removed");
    }

    Ok(MessageResponse::new("Member removed successfully"))
}

#[cfg(test)]
mod tests {
    use entity::users::UserRole;

    use super::*;

    fn team(leader_id: Option<&str>) -> teams::Model {
        let now = Utc::now();
        teams::Model {
            id:          "t1".to_string(),
            name:        "Enterprise".to_string(),
            description: None,
            leader_id:   leader_id.map(str::to_string),
            created_at:  now,
            updated_at:  now,
        }
    }

    fn user(id: &str, role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            role,
            manager_id: None,
        }
    }

    #[test]
    fn test_leader_can_manage() {
        assert!(ensure_can_manage(&user("lead", UserRole::Sales), &team(Some("lead"))).is_ok());
    }

    #[test]
    fn test_member_cannot_manage() {
        assert!(ensure_can_manage(&user("rep", UserRole::Sales), &team(Some("lead"))).is_err());
        assert!(ensure_can_manage(&user("rep", UserRole::Support), &team(None)).is_err());
    }

    #[test]
    fn test_privileged_can_manage() {
        assert!(ensure_can_manage(&user("m", UserRole::Manager), &team(None)).is_ok());
        assert!(ensure_can_manage(&user("a", UserRole::Admin), &team(None)).is_ok());
    }

    #[test]
    fn test_required_user_id() {
        assert!(required_user_id(TeamMemberRequest::default()).is_err());
        assert!(required_user_id(TeamMemberRequest {
            user_id: Some("  ".to_string()),
        })
        .is_err());
        assert_eq!(
            required_user_id(TeamMemberRequest {
                user_id: Some("u1".to_string()),
            })
            .unwrap(),
            "u1"
        );
    }
}
