//! # Workspace Tests
//!
//! Tasks, notifications, preferences, the analytics overview, the health
//! endpoint, the current user's profile, segments, workflows and reports.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_task_completion() {
    let app = TestApp::new().await;
    let rep = app.register("dana", "sales").await;
    let other = app.register("eli", "sales").await;

    let (status, task) = app
        .post(
            "/api/automation/tasks",
            &rep.access,
            json!({ "title": "Call back", "due_date": "2020-01-01T09:00:00Z" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{task}");
    assert_eq!(task["assigned_to"], rep.id.as_str());
    assert_eq!(task["is_overdue"], true);
    let task_id = task["id"].as_str().unwrap();

    // Tasks of other users are invisible.
    let (status, _) = app
        .post(&format!("/api/automation/tasks/{task_id}/complete"), &other.access, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, done) = app
        .post(&format!("/api/automation/tasks/{task_id}/complete"), &rep.access, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "completed");
    assert_eq!(done["is_overdue"], false);
    assert!(done["completed_at"].is_string());

    let (status, _) = app
        .post(&format!("/api/automation/tasks/{task_id}/complete"), &rep.access, json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Reopening clears the completion time.
    let (status, reopened) = app
        .patch(
            &format!("/api/automation/tasks/{task_id}"),
            &rep.access,
            json!({ "status": "in_progress" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(reopened["completed_at"].is_null());
}

#[tokio::test]
async fn test_notifications_read_state() {
    let app = TestApp::new().await;
    let manager = app.register("morgan", "manager").await;
    let report = app.register("riley", "sales").await;
    let stranger = app.register("quinn", "sales").await;
    app.set_manager(&report.id, &manager.id).await;

    for title in ["Quarter review", "New lead assigned"] {
        let (status, body) = app
            .post(
                "/api/notifications",
                &manager.access,
                json!({ "recipient_id": report.id, "title": title, "message": "Please take a look" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["sender_id"], manager.id.as_str());
        assert_eq!(body["is_read"], false);
    }

    // Recipients must be visible to the sender.
    let (status, body) = app
        .post(
            "/api/notifications",
            &manager.access,
            json!({ "recipient_id": stranger.id, "title": "Hello", "message": "Hi" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["recipient_id"][0], "User not found");

    let (_, count) = app.get("/api/notifications/unread_count", &report.access).await;
    assert_eq!(count["unread_count"], 2);

    let (_, list) = app.get("/api/notifications", &report.access).await;
    let first_id = list["items"][0]["id"].as_str().unwrap().to_string();

    let (status, read) = app
        .post(&format!("/api/notifications/{first_id}/mark_read"), &report.access, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["is_read"], true);

    let (_, again) = app
        .post(&format!("/api/notifications/{first_id}/mark_read"), &report.access, json!({}))
        .await;
    assert_eq!(again["read_at"], read["read_at"]);

    let (_, count) = app.get("/api/notifications/unread_count", &report.access).await;
    assert_eq!(count["unread_count"], 1);

    let (status, all) = app
        .post("/api/notifications/mark_all_read", &report.access, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["updated"], 1);

    let (_, count) = app.get("/api/notifications/unread_count", &report.access).await;
    assert_eq!(count["unread_count"], 0);

    let (_, others) = app.get("/api/notifications/unread_count", &stranger.access).await;
    assert_eq!(others["unread_count"], 0);
}

#[tokio::test]
async fn test_preferences_get_or_create() {
    let app = TestApp::new().await;
    let user = app.register("dana", "sales").await;

    let (status, prefs) = app.get("/api/notifications/preferences/me", &user.access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prefs["email_enabled"], true);
    assert_eq!(prefs["sms_enabled"], false);
    assert_eq!(prefs["in_app_enabled"], true);

    let (status, updated) = app
        .patch(
            "/api/notifications/preferences/me",
            &user.access,
            json!({ "sms_enabled": true, "quiet_hours_start": "22:00:00", "quiet_hours_end": "07:00:00" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["id"], prefs["id"]);
    assert_eq!(updated["sms_enabled"], true);

    let (status, _) = app
        .patch(
            "/api/notifications/preferences/me",
            &user.access,
            json!({ "quiet_hours_start": "22:00:00" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overview_totals_follow_scope() {
    let app = TestApp::new().await;
    let rep = app.register("dana", "sales").await;
    let other = app.register("eli", "sales").await;

    let customer = app.customer(&rep.access, "buyer@example.com").await;
    app.customer(&other.access, "elsewhere@example.com").await;

    for (name, value, probability, stage) in [
        ("Open A", 10000.0, 50, "proposal"),
        ("Open B", 4000.0, 25, "qualification"),
        ("Won", 7500.0, 100, "closed_won"),
        ("Lost", 9999.0, 0, "closed_lost"),
    ] {
        let (status, _) = app
            .post(
                "/api/deals",
                &rep.access,
                json!({
                    "name": name,
                    "customer_id": customer,
                    "value": value,
                    "probability": probability,
                    "stage": stage,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    app.post(
        "/api/deals",
        &other.access,
        json!({ "name": "Not mine", "value": 50000.0, "probability": 90 }),
    )
    .await;
    app.post("/api/automation/tasks", &rep.access, json!({ "title": "Prepare demo" }))
        .await;

    let (status, overview) = app.get("/api/analytics/overview", &rep.access).await;
    assert_eq!(status, StatusCode::OK, "{overview}");
    assert_eq!(overview["total_customers"], 1);
    assert_eq!(overview["open_deals"], 2);
    assert_eq!(overview["pipeline_value"], 14000.0);
    assert_eq!(overview["weighted_pipeline_value"], 6000.0);
    assert_eq!(overview["won_value"], 7500.0);
    assert_eq!(overview["open_tasks"], 1);
}

#[tokio::test]
async fn test_dashboard_is_created_once() {
    let app = TestApp::new().await;
    let rep = app.register("dana", "sales").await;

    let (status, first) = app.get("/api/analytics/dashboard", &rep.access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["refresh_interval"], 300);

    let (status, updated) = app
        .request(
            Method::PUT,
            "/api/analytics/dashboard",
            Some(&rep.access),
            Some(json!({ "refresh_interval": 60 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], first["id"]);
    assert_eq!(updated["refresh_interval"], 60);
}

#[tokio::test]
async fn test_update_profile_clears_nullable_fields() {
    let app = TestApp::new().await;
    let rep = app.register("dana", "sales").await;

    let (status, me) = app
        .patch(
            "/api/auth/users/update_profile",
            &rep.access,
            json!({ "phone": "+15550100123", "department": "Field sales", "first_name": "Dana" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{me}");
    assert_eq!(me["phone"], "+15550100123");
    assert_eq!(me["full_name"], "Dana User");

    // Null clears, absence keeps.
    let (status, me) = app
        .patch("/api/auth/users/update_profile", &rep.access, json!({ "phone": null }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(me["phone"].is_null());
    assert_eq!(me["department"], "Field sales");

    let (status, me) = app.get("/api/auth/users/me", &rep.access).await;
    assert_eq!(status, StatusCode::OK);
    assert!(me["phone"].is_null());
    assert_eq!(me["role"], "sales");
}

#[tokio::test]
async fn test_segment_membership_only_touches_visible_customers() {
    let app = TestApp::new().await;
    let rep = app.register("dana", "sales").await;
    let other = app.register("eli", "sales").await;
    let mine = app.customer(&rep.access, "ada@example.com").await;
    let theirs = app.customer(&other.access, "alan@example.com").await;

    let (status, segment) = app
        .post("/api/customers/segments", &rep.access, json!({ "name": "Enterprise" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{segment}");
    assert_eq!(segment["customer_count"], 0);
    let segment_id = segment["id"].as_str().unwrap();

    let (status, added) = app
        .post(
            &format!("/api/customers/segments/{segment_id}/add_customers"),
            &rep.access,
            json!({ "customer_ids": [mine, theirs] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{added}");
    assert_eq!(added["affected"], 1);
    assert_eq!(added["customer_count"], 1);

    let (_, again) = app
        .post(
            &format!("/api/customers/segments/{segment_id}/add_customers"),
            &rep.access,
            json!({ "customer_ids": [mine] }),
        )
        .await;
    assert_eq!(again["affected"], 0);

    let (status, _) = app
        .post(
            &format!("/api/customers/segments/{segment_id}/add_customers"),
            &rep.access,
            json!({ "customer_ids": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, removed) = app
        .post(
            &format!("/api/customers/segments/{segment_id}/remove_customers"),
            &rep.access,
            json!({ "customer_ids": [mine] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["affected"], 1);
    assert_eq!(removed["customer_count"], 0);
}

#[tokio::test]
async fn test_workflow_description_can_be_cleared() {
    let app = TestApp::new().await;
    let admin = app.admin("root").await;
    let rep = app.register("dana", "sales").await;

    let body = json!({ "name": "Welcome new leads", "description": "Sends the intro mail", "trigger_type": "lead_created" });
    let (status, _) = app.post("/api/automation/workflows", &rep.access, body.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, workflow) = app.post("/api/automation/workflows", &admin.access, body).await;
    assert_eq!(status, StatusCode::CREATED, "{workflow}");
    let uri = format!("/api/automation/workflows/{}", workflow["id"].as_str().unwrap());

    let (status, updated) = app
        .patch(&uri, &admin.access, json!({ "description": null, "status": "active" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert!(updated["description"].is_null());
    assert_eq!(updated["status"], "active");
    assert_eq!(updated["name"], "Welcome new leads");
}

#[tokio::test]
async fn test_reports_private_until_published() {
    let app = TestApp::new().await;
    let author = app.register("morgan", "manager").await;
    let peer = app.register("riley", "manager").await;
    let rep = app.register("dana", "sales").await;

    let (status, _) = app.get("/api/analytics/reports", &rep.access).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, report) = app
        .post(
            "/api/analytics/reports",
            &author.access,
            json!({ "name": "Pipeline", "report_type": "sales", "description": "Weekly" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{report}");
    assert_eq!(report["is_public"], false);
    let uri = format!("/api/analytics/reports/{}", report["id"].as_str().unwrap());

    let (status, _) = app.get(&uri, &peer.access).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, published) = app
        .patch(&uri, &author.access, json!({ "is_public": true, "description": null }))
        .await;
    assert_eq!(status, StatusCode::OK, "{published}");
    assert!(published["description"].is_null());

    let (status, _) = app.get(&uri, &peer.access).await;
    assert_eq!(status, StatusCode::OK);

    // Public reports stay read-only for everyone but the creator.
    let (status, _) = app.patch(&uri, &peer.access, json!({ "name": "Mine now" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
