//! Enum values and derived-field helpers of the entity crate

use chrono::{NaiveTime, Utc};
use entity::{
    customers::{self, ContactMethod, CustomerStatus, CustomerType},
    deal_forecasts,
    deal_products,
    deals::{self, DealStageKind},
    email_campaigns,
    kpi_measurements,
    lead_campaigns,
    leads::{self, LeadSourceKind, LeadStatus},
    notification_preferences,
    shared::Priority,
    users::UserRole,
};
use sea_orm::ActiveEnum;
use serde_json::json;

fn customer() -> customers::Model {
    customers::Model {
        id:                       entity::new_id(),
        first_name:               "Ada".to_string(),
        last_name:                "Lovelace".to_string(),
        email:                    "ada@example.com".to_string(),
        phone:                    None,
        company:                  None,
        job_title:                None,
        customer_type:            CustomerType::default(),
        status:                   CustomerStatus::default(),
        address:                  Some("12 Analytical Row".to_string()),
        city:                     Some("London".to_string()),
        state:                    None,
        postal_code:              Some("  ".to_string()),
        country:                  Some("UK".to_string()),
        website:                  None,
        industry:                 None,
        annual_revenue:           None,
        employee_count:           None,
        preferred_contact_method: ContactMethod::default(),
        assigned_to:              None,
        created_by:               None,
        tags:                     json!([]),
        custom_fields:            json!({}),
        created_at:               Utc::now(),
        updated_at:               Utc::now(),
    }
}

fn lead(score: i32, priority: Priority) -> leads::Model {
    leads::Model {
        id: entity::new_id(),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        email: "grace@example.com".to_string(),
        phone: None,
        company: None,
        job_title: None,
        source: LeadSourceKind::default(),
        status: LeadStatus::default(),
        priority,
        score,
        estimated_value: None,
        expected_close_date: None,
        notes: None,
        assigned_to: None,
        created_by: None,
        converted_to_customer_id: None,
        conversion_date: None,
        campaign_id: None,
        tags: json!([]),
        custom_fields: json!({}),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn test_user_role_values() {
    assert_eq!(UserRole::Admin.to_string(), "admin");
    assert_eq!(UserRole::Marketing.to_string(), "marketing");
    assert_eq!(UserRole::default(), UserRole::Sales);
    assert!(UserRole::Manager.is_privileged());
    assert!(!UserRole::Support.is_privileged());
}

#[test]
fn test_user_role_serde_matches_stored_value() {
    let json = serde_json::to_string(&UserRole::Manager).unwrap();
    assert_eq!(json, "\"manager\"");
    assert_eq!(UserRole::Manager.to_value(), "manager");
}

#[test]
fn test_customer_defaults() {
    assert_eq!(CustomerStatus::default().to_string(), "prospect");
    assert_eq!(CustomerType::default().to_string(), "individual");
}

#[test]
fn test_customer_full_address_skips_blank_parts() {
    assert_eq!(
        customer().full_address(),
        "12 Analytical Row, London, UK"
    );
    assert_eq!(customer().full_name(), "Ada Lovelace");
}

#[test]
fn test_lead_is_hot() {
    assert!(lead(85, Priority::High).is_hot());
    assert!(lead(80, Priority::Urgent).is_hot());
    assert!(!lead(79, Priority::Urgent).is_hot());
    assert!(!lead(95, Priority::Medium).is_hot());
}

#[test]
fn test_lead_is_converted() {
    let mut model = lead(10, Priority::Low);
    assert!(!model.is_converted());
    model.converted_to_customer_id = Some(entity::new_id());
    assert!(model.is_converted());
    assert_eq!(model.days_since_created(), 0);
}

#[test]
fn test_weighted_value() {
    assert_eq!(deals::weighted_value(1000.0, 25), 250.0);
    assert_eq!(deals::weighted_value(1000.0, 0), 0.0);
    assert_eq!(deals::weighted_value(1000.0, 100), 1000.0);
}

#[test]
fn test_deal_stage_closed() {
    assert!(DealStageKind::ClosedWon.is_closed());
    assert!(DealStageKind::ClosedLost.is_closed());
    assert!(!DealStageKind::Negotiation.is_closed());
}

#[test]
fn test_deal_product_total_price() {
    assert_eq!(deal_products::total_price(100.0, 10.0, 3), 270.0);
    assert_eq!(deal_products::total_price(50.0, 0.0, 2), 100.0);
}

#[test]
fn test_forecast_accuracy() {
    assert_eq!(deal_forecasts::accuracy(1000.0, None), None);
    assert_eq!(deal_forecasts::accuracy(1000.0, Some(900.0)), Some(10.0));
    assert_eq!(deal_forecasts::accuracy(0.0, Some(900.0)), Some(0.0));
}

#[test]
fn test_campaign_rates() {
    assert_eq!(email_campaigns::open_rate(0, 0), 0.0);
    assert_eq!(email_campaigns::open_rate(100, 40), 40.0);
    assert_eq!(email_campaigns::click_rate(200, 10), 5.0);
    assert_eq!(lead_campaigns::conversion_rate(3, 12), 25.0);
    assert_eq!(lead_campaigns::conversion_rate(3, 0), 0.0);
}

#[test]
fn test_kpi_achievement() {
    assert_eq!(kpi_measurements::achievement(50.0, Some(200.0)), Some(25.0));
    assert_eq!(kpi_measurements::achievement(50.0, Some(0.0)), None);
    assert_eq!(kpi_measurements::achievement(50.0, None), None);
}

#[test]
fn test_quiet_hours_wrap_midnight() {
    let at = |h: u32, m: u32| NaiveTime::from_hms_opt(h, m, 0).unwrap();
    let prefs = notification_preferences::Model {
        id:                entity::new_id(),
        user_id:           entity::new_id(),
        email_enabled:     true,
        sms_enabled:       false,
        push_enabled:      true,
        in_app_enabled:    true,
        type_settings:     json!({}),
        quiet_hours_start: Some(at(22, 0)),
        quiet_hours_end:   Some(at(7, 0)),
        created_at:        Utc::now(),
        updated_at:        Utc::now(),
    };

    assert!(prefs.is_quiet_at(at(23, 30)));
    assert!(prefs.is_quiet_at(at(6, 59)));
    assert!(!prefs.is_quiet_at(at(12, 0)));

    let daytime = notification_preferences::Model {
        quiet_hours_start: Some(at(12, 0)),
        quiet_hours_end: Some(at(13, 0)),
        ..prefs.clone()
    };
    assert!(daytime.is_quiet_at(at(12, 30)));
    assert!(!daytime.is_quiet_at(at(13, 0)));

    let none = notification_preferences::Model {
        quiet_hours_start: None,
        ..prefs
    };
    assert!(!none.is_quiet_at(at(23, 0)));
}
