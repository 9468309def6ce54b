//! # Record Tests
//!
//! Lead score history, the notification queue and subscriptions, integration
//! channel settings and data syncs, insights and predictive models, and
//! automation logs.

mod common;

use axum::http::StatusCode;
use common::{TestApp, TestUser};
use serde_json::json;

async fn template(app: &TestApp, admin: &TestUser) -> String {
    let (status, body) = app
        .post(
            "/api/notifications/templates",
            &admin.access,
            json!({ "name": "Welcome", "subject_template": "Hi {{name}}", "body_template": "Welcome aboard" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

async fn integration(app: &TestApp, admin: &TestUser, name: &str, kind: &str) -> String {
    let (status, body) = app
        .post(
            "/api/integrations",
            &admin.access,
            json!({ "name": name, "integration_type": kind }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_lead_score_updates_current_score() {
    let app = TestApp::new().await;
    let rep = app.register("dana", "sales").await;
    let other = app.register("eli", "sales").await;

    let (status, lead) = app
        .post(
            "/api/leads",
            &rep.access,
            json!({ "first_name": "Grace", "last_name": "Hopper", "email": "grace@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{lead}");
    let lead_id = lead["id"].as_str().unwrap();

    let (status, score) = app
        .post(
            "/api/leads/scores",
            &rep.access,
            json!({ "lead_id": lead_id, "score": 72, "factors": { "email_opened": 10 } }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{score}");
    assert_eq!(score["calculated_by"], "ai");
    let score_id = score["id"].as_str().unwrap();

    let (_, lead) = app.get(&format!("/api/leads/{lead_id}"), &rep.access).await;
    assert_eq!(lead["score"], 72);

    let (status, _) = app
        .post("/api/leads/scores", &rep.access, json!({ "lead_id": lead_id, "score": 101 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // History follows the lead's visibility.
    let (status, _) = app.get(&format!("/api/leads/scores/{score_id}"), &other.access).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, page) = app.get("/api/leads/scores", &other.access).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 0);

    let (status, body) = app
        .post("/api/leads/scores", &other.access, json!({ "lead_id": lead_id, "score": 10 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
}

#[tokio::test]
async fn test_queue_entries_visible_to_recipient() {
    let app = TestApp::new().await;
    let admin = app.admin("root").await;
    let rep = app.register("dana", "sales").await;
    let other = app.register("eli", "sales").await;
    let template_id = template(&app, &admin).await;

    let (status, entry) = app
        .post(
            "/api/notifications/queue",
            &admin.access,
            json!({
                "template_id": template_id,
                "recipient_id": rep.id,
                "subject": "Welcome",
                "message": "Glad to have you",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{entry}");
    assert_eq!(entry["status"], "pending");
    assert_eq!(entry["max_retries"], 3);
    assert!(entry["sent_at"].is_null());
    let entry_id = entry["id"].as_str().unwrap();
    let uri = format!("/api/notifications/queue/{entry_id}");

    let (status, _) = app.get(&uri, &rep.access).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&uri, &other.access).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Only administrators write the queue.
    let (status, _) = app.patch(&uri, &rep.access, json!({ "status": "sent" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.patch(&uri, &admin.access, json!({ "retry_count": 4 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, failed) = app
        .patch(&uri, &admin.access, json!({ "status": "failed", "retry_count": 1 }))
        .await;
    assert_eq!(status, StatusCode::OK, "{failed}");
    assert_eq!(failed["can_retry"], true);

    let (status, sent) = app.patch(&uri, &admin.access, json!({ "status": "sent" })).await;
    assert_eq!(status, StatusCode::OK, "{sent}");
    assert!(sent["sent_at"].is_string());
    assert_eq!(sent["can_retry"], false);
}

#[tokio::test]
async fn test_subscription_per_category() {
    let app = TestApp::new().await;
    let rep = app.register("dana", "sales").await;
    let other = app.register("eli", "sales").await;

    let (status, sub) = app
        .post("/api/notifications/subscriptions", &rep.access, json!({ "category": "task_due" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{sub}");
    assert_eq!(sub["is_subscribed"], true);
    assert_eq!(sub["user_id"], rep.id.as_str());
    let sub_id = sub["id"].as_str().unwrap();

    let (status, _) = app
        .post(
            "/api/notifications/subscriptions",
            &rep.access,
            json!({ "category": "task_due", "is_subscribed": false }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The same category is free for another user.
    let (status, _) = app
        .post("/api/notifications/subscriptions", &other.access, json!({ "category": "task_due" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/notifications/subscriptions/{sub_id}");
    let (status, _) = app.get(&uri, &other.access).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, muted) = app.patch(&uri, &rep.access, json!({ "is_subscribed": false })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(muted["is_subscribed"], false);
}

#[tokio::test]
async fn test_email_settings_one_per_integration() {
    let app = TestApp::new().await;
    let admin = app.admin("root").await;
    let rep = app.register("dana", "sales").await;
    let integration_id = integration(&app, &admin, "Mailbox", "email").await;

    let settings = json!({
        "integration_id": integration_id,
        "service": "custom_smtp",
        "email_address": "crm@example.com",
        "smtp_server": "smtp.example.com",
        "smtp_port": 587,
    });

    let (status, _) = app.post("/api/integrations/email", &rep.access, settings.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, email) = app.post("/api/integrations/email", &admin.access, settings.clone()).await;
    assert_eq!(status, StatusCode::CREATED, "{email}");
    assert_eq!(email["use_tls"], true);
    assert_eq!(email["use_ssl"], false);

    let (status, body) = app.post("/api/integrations/email", &admin.access, settings).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let other_id = integration(&app, &admin, "Second mailbox", "email").await;
    let (status, _) = app
        .post(
            "/api/integrations/email",
            &admin.access,
            json!({
                "integration_id": other_id,
                "service": "custom_smtp",
                "email_address": "crm@example.com",
                "smtp_port": 70000,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/api/integrations/email",
            &admin.access,
            json!({ "integration_id": "missing", "service": "gmail", "email_address": "crm@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
}

#[tokio::test]
async fn test_sync_log_updates_sync_counters() {
    let app = TestApp::new().await;
    let admin = app.admin("root").await;
    let source = integration(&app, &admin, "Ledger", "accounting").await;
    let target = integration(&app, &admin, "Drive", "storage").await;

    let (status, _) = app
        .post(
            "/api/integrations/syncs",
            &admin.access,
            json!({ "name": "Loop", "source_integration_id": source, "target_integration_id": source, "sync_type": "import" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, sync) = app
        .post(
            "/api/integrations/syncs",
            &admin.access,
            json!({ "name": "Invoices", "source_integration_id": source, "target_integration_id": target, "sync_type": "export" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{sync}");
    assert_eq!(sync["sync_count"], 0);
    assert!(sync["last_sync"].is_null());
    let sync_id = sync["id"].as_str().unwrap();

    let (status, _) = app
        .post(
            "/api/integrations/sync-logs",
            &admin.access,
            json!({ "data_sync_id": sync_id, "status": "error", "records_processed": 2, "records_successful": 2, "records_failed": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, log) = app
        .post(
            "/api/integrations/sync-logs",
            &admin.access,
            json!({
                "data_sync_id": sync_id,
                "status": "error",
                "records_processed": 10,
                "records_successful": 5,
                "records_failed": 5,
                "error_message": "Rate limited",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{log}");
    assert_eq!(log["success_rate"].as_f64(), Some(50.0));

    let (status, _) = app
        .post(
            "/api/integrations/sync-logs",
            &admin.access,
            json!({ "data_sync_id": sync_id, "status": "success", "records_processed": 3, "records_successful": 3 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, sync) = app.get(&format!("/api/integrations/syncs/{sync_id}"), &admin.access).await;
    assert_eq!(sync["sync_count"], 2);
    assert_eq!(sync["error_count"], 1);
    assert!(sync["last_sync"].is_string());

    let (_, logs) = app
        .get(&format!("/api/integrations/sync-logs?data_sync_id={sync_id}"), &admin.access)
        .await;
    assert_eq!(logs["pagination"]["total"], 2);
}

#[tokio::test]
async fn test_customer_insights_follow_customer_scope() {
    let app = TestApp::new().await;
    let admin = app.admin("root").await;
    let rep = app.register("dana", "sales").await;
    let other = app.register("eli", "sales").await;
    let customer_id = app.customer(&rep.access, "ada@example.com").await;

    let insight = json!({
        "customer_id": customer_id,
        "insight_type": "churn_prediction",
        "title": "Usage dropping",
        "description": "Logins fell by half this quarter",
        "confidence_score": 80,
    });

    let (status, _) = app.post("/api/analytics/customer-insights", &rep.access, insight.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = app.post("/api/analytics/customer-insights", &admin.access, insight).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["is_actionable"], true);
    assert_eq!(created["is_expired"], false);
    let uri = format!("/api/analytics/customer-insights/{}", created["id"].as_str().unwrap());

    let (status, seen) = app.get(&uri, &rep.access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seen["customer_id"], customer_id.as_str());
    let (status, _) = app.get(&uri, &other.access).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_predictive_model_names_unique() {
    let app = TestApp::new().await;
    let admin = app.admin("root").await;

    let (status, model) = app
        .post(
            "/api/analytics/models",
            &admin.access,
            json!({ "name": "Churn v1", "model_type": "churn_prediction", "accuracy": 87.5 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{model}");
    assert_eq!(model["version"], "1.0");
    assert_eq!(model["is_active"], true);

    let (status, _) = app
        .post(
            "/api/analytics/models",
            &admin.access,
            json!({ "name": "Churn v1", "model_type": "lead_scoring" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(
            "/api/analytics/models",
            &admin.access,
            json!({ "name": "Overfit", "model_type": "lead_scoring", "accuracy": 120.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_automation_log_requires_settings_permission() {
    let app = TestApp::new().await;
    let admin = app.admin("root").await;
    let rep = app.register("dana", "sales").await;

    let (status, rule) = app
        .post(
            "/api/automation/rules",
            &admin.access,
            json!({ "name": "Round robin", "rule_type": "lead_assignment" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{rule}");
    let rule_id = rule["id"].as_str().unwrap();

    let entry = json!({ "rule_id": rule_id, "status": "failed", "error_message": "No eligible users", "execution_time": 12 });
    let (status, _) = app.post("/api/automation/logs", &rep.access, entry.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, log) = app.post("/api/automation/logs", &admin.access, entry).await;
    assert_eq!(status, StatusCode::CREATED, "{log}");
    assert_eq!(log["rule_id"], rule_id);

    let (status, _) = app
        .post("/api/automation/logs", &admin.access, json!({ "rule_id": "missing", "status": "success" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, logs) = app
        .get(&format!("/api/automation/logs?rule_id={rule_id}"), &admin.access)
        .await;
    assert_eq!(logs["pagination"]["total"], 1);
}
