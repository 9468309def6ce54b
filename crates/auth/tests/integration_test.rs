//! Permission checks against seeded role grants in an in-memory database

use auth::{Permission, PermissionCheckResult, PermissionService, RecordAction};
use entity::{role_permissions, users::UserRole};
use migration::{connect_with_pool, seeds, Migrator, MigratorTrait};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

async fn seeded_db() -> DatabaseConnection {
    let db = connect_with_pool("sqlite::memory:", 1).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    seeds::run_all_seeds(&db, false).await.unwrap();
    db
}

#[tokio::test]
async fn test_default_grants_match_role_map() {
    let service = PermissionService::new(seeded_db().await);

    for role in [
        UserRole::Manager,
        UserRole::Sales,
        UserRole::Support,
        UserRole::Marketing,
    ] {
        let defaults = Permission::role_defaults(&role);
        for permission in Permission::all() {
            let expected = if defaults.contains(&permission) {
                PermissionCheckResult::Allowed
            }
            else {
                PermissionCheckResult::Denied
            };
            assert_eq!(
                service.check_permission(&role, &permission).await.unwrap(),
                expected,
                "{role} / {permission}"
            );
        }
    }
}

#[tokio::test]
async fn test_admin_is_always_allowed() {
    // No seeds at all
    let db = connect_with_pool("sqlite::memory:", 1).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let service = PermissionService::new(db);

    let result = service
        .check_permission(&UserRole::Admin, &Permission::ManageUsers)
        .await
        .unwrap();
    assert_eq!(result, PermissionCheckResult::Allowed);
}

#[tokio::test]
async fn test_revoked_grant_is_denied() {
    let db = seeded_db().await;
    let service = PermissionService::new(db.clone());
    let add_lead = Permission::Leads(RecordAction::Add);

    assert_eq!(
        service.check_permission(&UserRole::Marketing, &add_lead).await.unwrap(),
        PermissionCheckResult::Allowed
    );

    role_permissions::Entity::delete_many()
        .filter(role_permissions::Column::Role.eq(UserRole::Marketing))
        .exec(&db)
        .await
        .unwrap();

    assert_eq!(
        service.check_permission(&UserRole::Marketing, &add_lead).await.unwrap(),
        PermissionCheckResult::Denied
    );
}

#[tokio::test]
async fn test_check_any_permission() {
    let service = PermissionService::new(seeded_db().await);

    let result = service
        .check_any_permission(
            &UserRole::Support,
            &[
                Permission::Deals(RecordAction::Delete),
                Permission::Deals(RecordAction::View),
            ],
        )
        .await
        .unwrap();
    assert_eq!(result, PermissionCheckResult::Allowed);

    let result = service
        .check_any_permission(
            &UserRole::Support,
            &[Permission::ManageUsers, Permission::ViewReports],
        )
        .await
        .unwrap();
    assert_eq!(result, PermissionCheckResult::Denied);
}

#[tokio::test]
async fn test_role_codenames() {
    let service = PermissionService::new(seeded_db().await);

    let codenames = service.role_codenames(&UserRole::Marketing).await.unwrap();
    assert_eq!(
        codenames,
        vec![
            "add_lead",
            "change_lead",
            "view_analytics",
            "view_customer",
            "view_lead",
        ]
    );
}
