//! # Access Scoping Tests
//!
//! Role-based visibility of customers, users, teams and the permission gate
//! on role-restricted endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_sales_users_only_see_their_own_customers() {
    let app = TestApp::new().await;
    let alice = app.register("alice", "sales").await;
    let bob = app.register("bob", "sales").await;

    let alices = app.customer(&alice.access, "client.a@example.com").await;
    app.customer(&bob.access, "client.b@example.com").await;

    let (status, body) = app.get("/api/customers", &alice.access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["items"][0]["id"], alices.as_str());
    assert_eq!(body["items"][0]["assigned_to"], alice.id.as_str());
    assert_eq!(body["items"][0]["full_name"], "Ada Lovelace");

    // Out of scope behaves exactly like missing.
    let (status, _) = app.get(&format!("/api/customers/{alices}"), &bob.access).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manager_sees_direct_reports_records() {
    let app = TestApp::new().await;
    let manager = app.register("morgan", "manager").await;
    let report = app.register("riley", "sales").await;
    let outsider = app.register("quinn", "sales").await;
    app.set_manager(&report.id, &manager.id).await;

    app.customer(&manager.access, "own@example.com").await;
    let reports_customer = app.customer(&report.access, "report@example.com").await;
    app.customer(&outsider.access, "outside@example.com").await;

    let (status, body) = app.get("/api/customers", &manager.access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 2);

    let (status, _) = app
        .get(&format!("/api/customers/{reports_customer}"), &manager.access)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, users) = app.get("/api/auth/users", &manager.access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users["pagination"]["total"], 2);

    let admin = app.admin("root").await;
    let (_, all) = app.get("/api/customers", &admin.access).await;
    assert_eq!(all["pagination"]["total"], 3);
}

#[tokio::test]
async fn test_customer_email_is_unique() {
    let app = TestApp::new().await;
    let alice = app.register("alice", "sales").await;
    app.customer(&alice.access, "dup@example.com").await;

    let (status, _) = app
        .post(
            "/api/customers",
            &alice.access,
            json!({ "first_name": "Second", "last_name": "Copy", "email": "dup@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_permission_gate() {
    let app = TestApp::new().await;
    let marketer = app.register("mara", "marketing").await;
    let support = app.register("sam", "support").await;

    // Marketing holds no customer add permission.
    let (status, _) = app
        .post(
            "/api/customers",
            &marketer.access,
            json!({ "first_name": "No", "last_name": "Access", "email": "nope@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Support holds no analytics permission.
    let (status, _) = app.get("/api/analytics/overview", &support.access).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Only settings managers create stages.
    let (status, _) = app
        .post(
            "/api/deals/stages",
            &marketer.access,
            json!({ "name": "Discovery", "order": 1, "probability": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_team_membership_scoping() {
    let app = TestApp::new().await;
    let manager = app.register("morgan", "manager").await;
    let member = app.register("riley", "sales").await;
    let stranger = app.register("quinn", "sales").await;

    let (status, team) = app
        .post(
            "/api/auth/teams",
            &manager.access,
            json!({ "name": "Enterprise", "leader_id": manager.id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{team}");
    let team_id = team["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            &format!("/api/auth/teams/{team_id}/add_member"),
            &manager.access,
            json!({ "user_id": member.id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Member added successfully");

    let (_, visible) = app.get("/api/auth/teams", &member.access).await;
    assert_eq!(visible["pagination"]["total"], 1);
    let (_, hidden) = app.get("/api/auth/teams", &stranger.access).await;
    assert_eq!(hidden["pagination"]["total"], 0);

    let (status, body) = app
        .post(
            &format!("/api/auth/teams/{team_id}/add_member"),
            &manager.access,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, _) = app
        .post(
            &format!("/api/auth/teams/{team_id}/add_member"),
            &manager.access,
            json!({ "user_id": "no-such-user" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A plain member cannot change the team.
    let (status, _) = app
        .request(
            Method::PATCH,
            &format!("/api/auth/teams/{team_id}"),
            Some(&member.access),
            Some(json!({ "name": "Renamed" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_clearing_manager_detaches_report() {
    let app = TestApp::new().await;
    let admin = app.admin("root").await;
    let manager = app.register("morgan", "manager").await;
    let report = app.register("riley", "sales").await;
    app.set_manager(&report.id, &manager.id).await;

    let (_, users) = app.get("/api/auth/users", &manager.access).await;
    assert_eq!(users["pagination"]["total"], 2);

    let (status, body) = app
        .patch(
            &format!("/api/auth/users/{}", report.id),
            &admin.access,
            json!({ "manager_id": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["manager_id"].is_null());

    let (_, users) = app.get("/api/auth/users", &manager.access).await;
    assert_eq!(users["pagination"]["total"], 1);

    // Omitting a nullable field leaves it alone.
    app.set_manager(&report.id, &manager.id).await;
    let (status, body) = app
        .patch(
            &format!("/api/auth/users/{}", report.id),
            &admin.access,
            json!({ "department": "Field Sales" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["manager_id"], manager.id.as_str());
}

#[tokio::test]
async fn test_team_leader_outside_membership_can_manage() {
    let app = TestApp::new().await;
    let manager = app.register("morgan", "manager").await;
    let leader = app.register("lee", "sales").await;

    let (status, team) = app
        .post(
            "/api/auth/teams",
            &manager.access,
            json!({ "name": "Mid-Market", "leader_id": leader.id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{team}");
    let team_id = team["id"].as_str().unwrap().to_string();
    assert_eq!(team["member_count"], 0);

    let (status, body) = app.get(&format!("/api/auth/teams/{team_id}"), &leader.access).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = app
        .patch(
            &format!("/api/auth/teams/{team_id}"),
            &leader.access,
            json!({ "name": "Mid-Market West", "description": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["name"], "Mid-Market West");

    let (_, listed) = app.get("/api/auth/teams", &leader.access).await;
    assert_eq!(listed["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_remove_member() {
    let app = TestApp::new().await;
    let manager = app.register("morgan", "manager").await;
    let member = app.register("riley", "sales").await;

    let (_, team) = app
        .post(
            "/api/auth/teams",
            &manager.access,
            json!({ "name": "Renewals", "member_ids": [member.id] }),
        )
        .await;
    let team_id = team["id"].as_str().unwrap().to_string();
    let remove = format!("/api/auth/teams/{team_id}/remove_member");

    let (status, body) = app.post(&remove, &manager.access, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["message"], "user_id is required");

    let (status, _) = app
        .post(&remove, &manager.access, json!({ "user_id": "no-such-user" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post(&remove, &manager.access, json!({ "user_id": member.id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Member removed successfully");

    let (_, team) = app.get(&format!("/api/auth/teams/{team_id}"), &manager.access).await;
    assert_eq!(team["member_count"], 0);
    let (_, visible) = app.get("/api/auth/teams", &member.access).await;
    assert_eq!(visible["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_profile_scoping() {
    let app = TestApp::new().await;
    let admin = app.admin("root").await;
    let alice = app.register("alice", "sales").await;
    let bob = app.register("bob", "support").await;

    let (status, alices) = app.get("/api/auth/profiles/my_profile", &alice.access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alices["user_id"], alice.id.as_str());
    let (_, bobs) = app.get("/api/auth/profiles/my_profile", &bob.access).await;

    let (_, all) = app.get("/api/auth/profiles", &admin.access).await;
    assert_eq!(all["pagination"]["total"], 2);

    let (_, own) = app.get("/api/auth/profiles", &alice.access).await;
    assert_eq!(own["pagination"]["total"], 1);
    assert_eq!(own["items"][0]["user_id"], alice.id.as_str());

    let bobs_uri = format!("/api/auth/profiles/{}", bobs["id"].as_str().unwrap());
    let (status, _) = app.get(&bobs_uri, &alice.access).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&bobs_uri, &admin.access).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_my_profile_created_once_then_updated() {
    let app = TestApp::new().await;
    let alice = app.register("alice", "sales").await;

    let (_, first) = app.get("/api/auth/profiles/my_profile", &alice.access).await;
    let (_, second) = app.get("/api/auth/profiles/my_profile", &alice.access).await;
    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["timezone"], "UTC");

    let (status, updated) = app
        .patch(
            "/api/auth/profiles/update_my_profile",
            &alice.access,
            json!({ "bio": "Enterprise accounts", "timezone": "Europe/Rome" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["id"], first["id"]);
    assert_eq!(updated["bio"], "Enterprise accounts");
    assert_eq!(updated["timezone"], "Europe/Rome");

    let (status, cleared) = app
        .patch("/api/auth/profiles/update_my_profile", &alice.access, json!({ "bio": null }))
        .await;
    assert_eq!(status, StatusCode::OK, "{cleared}");
    assert!(cleared["bio"].is_null());
    assert_eq!(cleared["timezone"], "Europe/Rome");
}

#[tokio::test]
async fn test_huge_page_number_is_an_empty_page() {
    let app = TestApp::new().await;
    let alice = app.register("alice", "sales").await;
    app.customer(&alice.access, "client@example.com").await;

    let (status, body) = app
        .get(&format!("/api/customers?page={}", u64::MAX), &alice.access)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}
