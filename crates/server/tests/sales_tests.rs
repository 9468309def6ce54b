//! # Sales Pipeline Tests
//!
//! Lead conversion, deal derived values, the single default pipeline rule and
//! campaign rates.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use entity::sales_pipelines;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

#[tokio::test]
async fn test_deal_weighted_value_and_closing() {
    let app = TestApp::new().await;
    let rep = app.register("dana", "sales").await;
    let customer = app.customer(&rep.access, "buyer@example.com").await;

    let (status, deal) = app
        .post(
            "/api/deals",
            &rep.access,
            json!({
                "name": "Annual licence",
                "customer_id": customer,
                "value": 12000.0,
                "probability": 25,
                "stage": "proposal",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{deal}");
    assert_eq!(deal["weighted_value"], 3000.0);
    assert_eq!(deal["currency"], "USD");
    assert_eq!(deal["is_closed"], false);
    assert!(deal["actual_close_date"].is_null());

    let deal_id = deal["id"].as_str().unwrap();
    let (status, closed) = app
        .patch(
            &format!("/api/deals/{deal_id}"),
            &rep.access,
            json!({ "stage": "closed_won", "probability": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["is_closed"], true);
    assert_eq!(closed["weighted_value"], 12000.0);
    assert!(closed["actual_close_date"].is_string());

    let (status, body) = app
        .post(
            "/api/deals",
            &rep.access,
            json!({ "name": "Bad", "value": 10.0, "probability": 101 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["probability"].is_array());
}

#[tokio::test]
async fn test_lead_conversion_is_one_shot() {
    let app = TestApp::new().await;
    let rep = app.register("dana", "sales").await;

    let (status, lead) = app
        .post(
            "/api/leads",
            &rep.access,
            json!({
                "first_name": "Alan",
                "last_name": "Turing",
                "email": "alan@example.com",
                "company": "Bletchley",
                "score": 85,
                "priority": "high",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{lead}");
    assert_eq!(lead["is_hot"], true);
    let lead_id = lead["id"].as_str().unwrap();

    let (status, converted) = app
        .post(&format!("/api/leads/{lead_id}/convert"), &rep.access, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{converted}");
    assert_eq!(converted["lead"]["status"], "closed_won");
    let customer_id = converted["customer_id"].as_str().unwrap();

    let (status, customer) = app
        .get(&format!("/api/customers/{customer_id}"), &rep.access)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(customer["email"], "alan@example.com");
    assert_eq!(customer["company"], "Bletchley");

    let (status, _) = app
        .post(&format!("/api/leads/{lead_id}/convert"), &rep.access, json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_lead_conversion_body_is_optional_but_must_parse() {
    let app = TestApp::new().await;
    let rep = app.register("dana", "sales").await;

    let (status, lead) = app
        .post(
            "/api/leads",
            &rep.access,
            json!({ "first_name": "Grace", "last_name": "Hopper", "email": "grace@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{lead}");
    let convert = format!("/api/leads/{}/convert", lead["id"].as_str().unwrap());

    let status = app.post_raw(&convert, &rep.access, "{\"customer_id\": ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The rejected request left the lead unconverted.
    let status = app.post_raw(&convert, &rep.access, "").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_exactly_one_default_pipeline() {
    let app = TestApp::new().await;
    let admin = app.admin("root").await;

    let (status, first) = app
        .post("/api/deals/pipelines", &admin.access, json!({ "name": "Direct" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    assert_eq!(first["is_default"], true);
    let first_id = first["id"].as_str().unwrap().to_string();

    let (status, second) = app
        .post(
            "/api/deals/pipelines",
            &admin.access,
            json!({ "name": "Partners", "is_default": true }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["is_default"], true);
    let second_id = second["id"].as_str().unwrap().to_string();

    let defaults = sales_pipelines::Entity::find()
        .filter(sales_pipelines::Column::IsDefault.eq(true))
        .count(&app.state.db)
        .await
        .unwrap();
    assert_eq!(defaults, 1);

    let (status, _) = app
        .post(
            &format!("/api/deals/pipelines/{first_id}/set_default"),
            &admin.access,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, reloaded) = app
        .get(&format!("/api/deals/pipelines/{second_id}"), &admin.access)
        .await;
    assert_eq!(reloaded["is_default"], false);

    // The current default can be neither deleted nor unset in place.
    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/deals/pipelines/{first_id}"),
            Some(&admin.access),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .patch(
            &format!("/api/deals/pipelines/{first_id}"),
            &admin.access,
            json!({ "is_default": false }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pipeline_stages_are_kept_in_order() {
    let app = TestApp::new().await;
    let admin = app.admin("root").await;

    let mut stage_ids = Vec::new();
    for (name, order) in [("Won", 3), ("Discovery", 1), ("Proposal", 2)] {
        let (status, stage) = app
            .post(
                "/api/deals/stages",
                &admin.access,
                json!({ "name": name, "order": order, "probability": order * 30 }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{stage}");
        assert_eq!(stage["color"], "#3B82F6");
        stage_ids.push(stage["id"].as_str().unwrap().to_string());
    }

    let (status, pipeline) = app
        .post(
            "/api/deals/pipelines",
            &admin.access,
            json!({ "name": "Standard", "stage_ids": stage_ids }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let names: Vec<&str> = pipeline["stages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|stage| stage["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Discovery", "Proposal", "Won"]);

    let (status, body) = app
        .post(
            "/api/deals/pipelines",
            &admin.access,
            json!({ "name": "Broken", "stage_ids": ["missing"] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["stage_ids"].is_array());
}

#[tokio::test]
async fn test_email_campaign_rates() {
    let app = TestApp::new().await;
    let admin = app.admin("root").await;

    let (status, campaign) = app
        .post(
            "/api/automation/email-campaigns",
            &admin.access,
            json!({ "name": "Spring launch" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{campaign}");
    assert_eq!(campaign["open_rate"], 0.0);
    let campaign_id = campaign["id"].as_str().unwrap();

    let (status, updated) = app
        .patch(
            &format!("/api/automation/email-campaigns/{campaign_id}"),
            &admin.access,
            json!({ "sent_count": 200, "opened_count": 50, "clicked_count": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["open_rate"], 25.0);
    assert_eq!(updated["click_rate"], 5.0);

    let (status, _) = app
        .post(
            "/api/automation/email-campaigns",
            &admin.access,
            json!({ "name": "Unscheduled", "status": "scheduled" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
