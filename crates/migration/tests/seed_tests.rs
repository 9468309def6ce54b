//! Migrations and seeds against an in-memory SQLite database

use auth::{secrecy::SecretString, verify_password, Permission};
use entity::{permissions, role_permissions, user_profiles, users::{self, UserRole}};
use error::AppError;
use migration::{connect_with_pool, seeds, Migrator, MigratorTrait};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

async fn setup() -> DatabaseConnection {
    let db = connect_with_pool("sqlite::memory:", 1).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

#[tokio::test]
async fn test_migrations_up_and_down() {
    let db = setup().await;
    assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());

    Migrator::down(&db, None).await.unwrap();
    assert_eq!(Migrator::get_pending_migrations(&db).await.unwrap().len(), 8);
}

#[tokio::test]
async fn test_seeds_are_idempotent() {
    let db = setup().await;

    let first = seeds::run_all_seeds(&db, false).await.unwrap();
    assert_eq!(first[0].inserted_count, 16);
    assert_eq!(first[1].inserted_count, 16 + 11 + 10 + 5 + 5);

    let second = seeds::run_all_seeds(&db, false).await.unwrap();
    assert!(second.iter().all(|r| r.inserted_count == 0));
    assert_eq!(second[0].skipped_count, 16);

    assert_eq!(permissions::Entity::find().count(&db).await.unwrap(), 16);
    assert_eq!(role_permissions::Entity::find().count(&db).await.unwrap(), 47);
}

#[tokio::test]
async fn test_seeded_modules() {
    let db = setup().await;
    seeds::run_all_seeds(&db, false).await.unwrap();

    let view_customer = permissions::Entity::find()
        .filter(permissions::Column::Codename.eq("view_customer"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(view_customer.module, "customers");
    assert_eq!(view_customer.name, "Can view customer");

    let support_grants = role_permissions::Entity::find()
        .filter(role_permissions::Column::Role.eq(UserRole::Support))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(support_grants, Permission::role_defaults(&UserRole::Support).len() as u64);
}

#[tokio::test]
async fn test_create_admin() {
    let db = setup().await;
    let password = SecretString::from("Granite-Falcon-88".to_string());

    let admin = seeds::create_admin(&db, " Root@Example.com ", "root", &password)
        .await
        .unwrap();
    assert_eq!(admin.email, "root@example.com");
    assert_eq!(admin.role, UserRole::Admin);
    assert!(admin.is_staff);
    assert!(verify_password(&password, &admin.password_hash).is_ok());

    let profile = user_profiles::Entity::find()
        .filter(user_profiles::Column::UserId.eq(admin.id.as_str()))
        .one(&db)
        .await
        .unwrap();
    assert!(profile.is_some());

    let duplicate = seeds::create_admin(&db, "root@example.com", "other", &password).await;
    assert!(matches!(duplicate, Err(AppError::Conflict { .. })));
    assert_eq!(users::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_admin_rejects_weak_password() {
    let db = setup().await;
    let result = seeds::create_admin(&db, "root@example.com", "root", &SecretString::from("12345".to_string())).await;

    let err = result.unwrap_err();
    assert_eq!(err.status(), 400);
    assert!(err.field_errors().unwrap().contains_key("password"));
}
