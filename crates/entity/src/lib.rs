//! Entity definitions for the CRM backend
//!
//! Sea-ORM entities for every table, grouped by domain. Primary keys are CUID2
//! strings generated by the application. Enumerations are stored as short
//! strings so the schema runs unchanged on PostgreSQL and SQLite.

/// Implements `Display` for an active enum by writing its stored string value.
macro_rules! display_as_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    use sea_orm::ActiveEnum as _;
                    f.write_str(&self.to_value())
                }
            }
        )+
    };
}

// Identity
pub mod permissions;
pub mod refresh_tokens;
pub mod role_permissions;
pub mod team_members;
pub mod teams;
pub mod user_profiles;
pub mod users;

// Customers
pub mod customer_contacts;
pub mod customer_interactions;
pub mod customer_notes;
pub mod customer_segment_members;
pub mod customer_segments;
pub mod customers;

// Leads
pub mod lead_activities;
pub mod lead_campaigns;
pub mod lead_scores;
pub mod lead_sources;
pub mod leads;

// Deals
pub mod deal_activities;
pub mod deal_forecasts;
pub mod deal_products;
pub mod deal_stages;
pub mod deals;
pub mod pipeline_stages;
pub mod sales_pipelines;

// Automation
pub mod automation_logs;
pub mod automation_rules;
pub mod email_campaigns;
pub mod email_templates;
pub mod tasks;
pub mod workflow_executions;
pub mod workflows;

// Notifications
pub mod notification_campaigns;
pub mod notification_deliveries;
pub mod notification_preferences;
pub mod notification_queue;
pub mod notification_subscriptions;
pub mod notification_templates;
pub mod notifications;

// Integrations
pub mod api_integrations;
pub mod calendar_integrations;
pub mod data_syncs;
pub mod email_integrations;
pub mod integration_logs;
pub mod integrations;
pub mod sync_logs;
pub mod webhook_integrations;

// Analytics
pub mod analytics_dashboards;
pub mod customer_insights;
pub mod deal_insights;
pub mod kpi_measurements;
pub mod kpis;
pub mod lead_insights;
pub mod predictive_models;
pub mod report_executions;
pub mod reports;
pub mod sentiment_analyses;

pub mod shared;

pub use customers::Entity as Customers;
pub use deals::Entity as Deals;
pub use leads::Entity as Leads;
pub use permissions::Entity as Permissions;
pub use role_permissions::Entity as RolePermissions;
pub use teams::Entity as Teams;
pub use users::Entity as Users;

/// Generate a new primary key.
#[inline]
pub fn new_id() -> String { cuid2::create_id() }

/// `part / whole * 100`, or zero when `whole` is zero.
///
/// Used by every derived rate (open rate, conversion rate, ...) so an empty
/// campaign reports 0 instead of NaN.
#[must_use]
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_zero_denominator() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(40, 100), 40.0);
        assert_eq!(percentage(1, 4), 25.0);
    }

    #[test]
    fn test_new_id_is_unique() {
        assert_ne!(new_id(), new_id());
    }
}
