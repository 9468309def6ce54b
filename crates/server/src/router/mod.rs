//! # API Router Configuration
//!
//! Configures the CRM API routes. Authentication endpoints that issue tokens
//! are public; everything else runs behind [`auth_middleware`]. Every update
//! route accepts both `PUT` and `PATCH` since updates are always partial.

use axum::{
    extract::State,
    http::{HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Json,
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{
    middleware::{auth::auth_middleware, request_id::request_id_middleware},
    AppState,
};

/// Public token-issuing routes
fn public_routes() -> Router<AppState> {
    use crate::auth::handlers;

    Router::new()
        .route("/api/auth/users/register", post(handlers::register))
        .route("/api/auth/users/login", post(handlers::login))
        .route("/api/token", post(handlers::obtain_token))
        .route("/api/token/refresh", post(handlers::refresh_token))
}

fn auth_routes() -> Router<AppState> {
    use crate::auth::{handlers, permissions, profiles, teams, users};

    Router::new()
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/users/me", get(handlers::me))
        .route(
            "/api/auth/users/update_profile",
            put(handlers::update_profile).patch(handlers::update_profile),
        )
        .route("/api/auth/users/change_password", post(handlers::change_password))
        .route("/api/auth/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/auth/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/api/auth/profiles/my_profile", get(profiles::my_profile))
        .route(
            "/api/auth/profiles/update_my_profile",
            put(profiles::update_my_profile).patch(profiles::update_my_profile),
        )
        .route(
            "/api/auth/profiles",
            get(profiles::list_profiles).post(profiles::create_profile),
        )
        .route(
            "/api/auth/profiles/:id",
            get(profiles::get_profile)
                .put(profiles::update_profile)
                .patch(profiles::update_profile)
                .delete(profiles::delete_profile),
        )
        .route("/api/auth/teams", get(teams::list_teams).post(teams::create_team))
        .route(
            "/api/auth/teams/:id",
            get(teams::get_team)
                .put(teams::update_team)
                .patch(teams::update_team)
                .delete(teams::delete_team),
        )
        .route("/api/auth/teams/:id/add_member", post(teams::add_member))
        .route("/api/auth/teams/:id/remove_member", post(teams::remove_member))
        .route("/api/auth/permissions", get(permissions::list_permissions))
        .route("/api/auth/permissions/:id", get(permissions::get_permission))
        .route("/api/auth/role-permissions", get(permissions::list_role_permissions))
        .route("/api/auth/role-permissions/:id", get(permissions::get_role_permission))
}

fn customer_routes() -> Router<AppState> {
    use crate::customers::{contacts, handlers, interactions, notes, segments};

    Router::new()
        .route(
            "/api/customers",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/api/customers/:id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .patch(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
        .route(
            "/api/customers/contacts",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route(
            "/api/customers/contacts/:id",
            get(contacts::get_contact)
                .put(contacts::update_contact)
                .patch(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
        .route(
            "/api/customers/interactions",
            get(interactions::list_interactions).post(interactions::create_interaction),
        )
        .route(
            "/api/customers/interactions/:id",
            get(interactions::get_interaction)
                .put(interactions::update_interaction)
                .patch(interactions::update_interaction)
                .delete(interactions::delete_interaction),
        )
        .route("/api/customers/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/api/customers/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .patch(notes::update_note)
                .delete(notes::delete_note),
        )
        .route(
            "/api/customers/segments",
            get(segments::list_segments).post(segments::create_segment),
        )
        .route(
            "/api/customers/segments/:id",
            get(segments::get_segment)
                .put(segments::update_segment)
                .patch(segments::update_segment)
                .delete(segments::delete_segment),
        )
        .route("/api/customers/segments/:id/add_customers", post(segments::add_customers))
        .route(
            "/api/customers/segments/:id/remove_customers",
            post(segments::remove_customers),
        )
}

fn lead_routes() -> Router<AppState> {
    use crate::leads::{activities, campaigns, handlers, scores, sources};

    Router::new()
        .route("/api/leads", get(handlers::list_leads).post(handlers::create_lead))
        .route(
            "/api/leads/:id",
            get(handlers::get_lead)
                .put(handlers::update_lead)
                .patch(handlers::update_lead)
                .delete(handlers::delete_lead),
        )
        .route("/api/leads/:id/convert", post(handlers::convert_lead))
        .route(
            "/api/leads/activities",
            get(activities::list_activities).post(activities::create_activity),
        )
        .route(
            "/api/leads/activities/:id",
            get(activities::get_activity)
                .put(activities::update_activity)
                .patch(activities::update_activity)
                .delete(activities::delete_activity),
        )
        .route("/api/leads/scores", get(scores::list_scores).post(scores::create_score))
        .route(
            "/api/leads/scores/:id",
            get(scores::get_score).delete(scores::delete_score),
        )
        .route("/api/leads/sources", get(sources::list_sources).post(sources::create_source))
        .route(
            "/api/leads/sources/:id",
            get(sources::get_source)
                .put(sources::update_source)
                .patch(sources::update_source)
                .delete(sources::delete_source),
        )
        .route(
            "/api/leads/campaigns",
            get(campaigns::list_campaigns).post(campaigns::create_campaign),
        )
        .route(
            "/api/leads/campaigns/:id",
            get(campaigns::get_campaign)
                .put(campaigns::update_campaign)
                .patch(campaigns::update_campaign)
                .delete(campaigns::delete_campaign),
        )
}

fn deal_routes() -> Router<AppState> {
    use crate::deals::{activities, forecasts, handlers, pipelines, products, stages};

    Router::new()
        .route("/api/deals", get(handlers::list_deals).post(handlers::create_deal))
        .route(
            "/api/deals/:id",
            get(handlers::get_deal)
                .put(handlers::update_deal)
                .patch(handlers::update_deal)
                .delete(handlers::delete_deal),
        )
        .route(
            "/api/deals/activities",
            get(activities::list_activities).post(activities::create_activity),
        )
        .route(
            "/api/deals/activities/:id",
            get(activities::get_activity)
                .put(activities::update_activity)
                .patch(activities::update_activity)
                .delete(activities::delete_activity),
        )
        .route(
            "/api/deals/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/api/deals/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
        .route("/api/deals/stages", get(stages::list_stages).post(stages::create_stage))
        .route(
            "/api/deals/stages/:id",
            get(stages::get_stage)
                .put(stages::update_stage)
                .patch(stages::update_stage)
                .delete(stages::delete_stage),
        )
        .route(
            "/api/deals/pipelines",
            get(pipelines::list_pipelines).post(pipelines::create_pipeline),
        )
        .route(
            "/api/deals/pipelines/:id",
            get(pipelines::get_pipeline)
                .put(pipelines::update_pipeline)
                .patch(pipelines::update_pipeline)
                .delete(pipelines::delete_pipeline),
        )
        .route("/api/deals/pipelines/:id/set_default", post(pipelines::set_default))
        .route(
            "/api/deals/forecasts",
            get(forecasts::list_forecasts).post(forecasts::create_forecast),
        )
        .route(
            "/api/deals/forecasts/:id",
            get(forecasts::get_forecast)
                .put(forecasts::update_forecast)
                .patch(forecasts::update_forecast)
                .delete(forecasts::delete_forecast),
        )
}

fn automation_routes() -> Router<AppState> {
    use crate::automation::{email, executions, logs, rules, tasks, workflows};

    Router::new()
        .route(
            "/api/automation/workflows",
            get(workflows::list_workflows).post(workflows::create_workflow),
        )
        .route(
            "/api/automation/workflows/:id",
            get(workflows::get_workflow)
                .put(workflows::update_workflow)
                .patch(workflows::update_workflow)
                .delete(workflows::delete_workflow),
        )
        .route(
            "/api/automation/executions",
            get(executions::list_executions).post(executions::create_execution),
        )
        .route(
            "/api/automation/executions/:id",
            get(executions::get_execution)
                .put(executions::update_execution)
                .patch(executions::update_execution)
                .delete(executions::delete_execution),
        )
        .route(
            "/api/automation/email-templates",
            get(email::list_templates).post(email::create_template),
        )
        .route(
            "/api/automation/email-templates/:id",
            get(email::get_template)
                .put(email::update_template)
                .patch(email::update_template)
                .delete(email::delete_template),
        )
        .route(
            "/api/automation/email-campaigns",
            get(email::list_campaigns).post(email::create_campaign),
        )
        .route(
            "/api/automation/email-campaigns/:id",
            get(email::get_campaign)
                .put(email::update_campaign)
                .patch(email::update_campaign)
                .delete(email::delete_campaign),
        )
        .route("/api/automation/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/automation/tasks/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/api/automation/tasks/:id/complete", post(tasks::complete_task))
        .route("/api/automation/rules", get(rules::list_rules).post(rules::create_rule))
        .route(
            "/api/automation/rules/:id",
            get(rules::get_rule)
                .put(rules::update_rule)
                .patch(rules::update_rule)
                .delete(rules::delete_rule),
        )
        .route("/api/automation/logs", get(logs::list_logs).post(logs::create_log))
        .route("/api/automation/logs/:id", get(logs::get_log).delete(logs::delete_log))
}

fn notification_routes() -> Router<AppState> {
    use crate::notifications::{campaigns, deliveries, handlers, preferences, queue, subscriptions, templates};

    Router::new()
        .route(
            "/api/notifications",
            get(handlers::list_notifications).post(handlers::create_notification),
        )
        .route("/api/notifications/mark_all_read", post(handlers::mark_all_read))
        .route("/api/notifications/unread_count", get(handlers::unread_count))
        .route(
            "/api/notifications/:id",
            get(handlers::get_notification).delete(handlers::delete_notification),
        )
        .route("/api/notifications/:id/mark_read", post(handlers::mark_read))
        .route(
            "/api/notifications/templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/api/notifications/templates/:id",
            get(templates::get_template)
                .put(templates::update_template)
                .patch(templates::update_template)
                .delete(templates::delete_template),
        )
        .route("/api/notifications/preferences", get(preferences::list_preferences))
        .route(
            "/api/notifications/preferences/me",
            get(preferences::my_preferences)
                .put(preferences::update_my_preferences)
                .patch(preferences::update_my_preferences),
        )
        .route(
            "/api/notifications/campaigns",
            get(campaigns::list_campaigns).post(campaigns::create_campaign),
        )
        .route(
            "/api/notifications/campaigns/:id",
            get(campaigns::get_campaign)
                .put(campaigns::update_campaign)
                .patch(campaigns::update_campaign)
                .delete(campaigns::delete_campaign),
        )
        .route("/api/notifications/queue", get(queue::list_queue).post(queue::create_queued))
        .route(
            "/api/notifications/queue/:id",
            get(queue::get_queued)
                .put(queue::update_queued)
                .patch(queue::update_queued)
                .delete(queue::delete_queued),
        )
        .route(
            "/api/notifications/deliveries",
            get(deliveries::list_deliveries).post(deliveries::create_delivery),
        )
        .route("/api/notifications/deliveries/:id", get(deliveries::get_delivery))
        .route(
            "/api/notifications/subscriptions",
            get(subscriptions::list_subscriptions).post(subscriptions::create_subscription),
        )
        .route(
            "/api/notifications/subscriptions/:id",
            get(subscriptions::get_subscription)
                .put(subscriptions::update_subscription)
                .patch(subscriptions::update_subscription)
                .delete(subscriptions::delete_subscription),
        )
}

fn integration_routes() -> Router<AppState> {
    use crate::integrations::{channels, handlers, logs, syncs};

    Router::new()
        .route(
            "/api/integrations",
            get(handlers::list_integrations).post(handlers::create_integration),
        )
        .route(
            "/api/integrations/:id",
            get(handlers::get_integration)
                .put(handlers::update_integration)
                .patch(handlers::update_integration)
                .delete(handlers::delete_integration),
        )
        .route("/api/integrations/logs", get(logs::list_logs).post(logs::create_log))
        .route(
            "/api/integrations/email",
            get(channels::list_email).post(channels::create_email),
        )
        .route(
            "/api/integrations/email/:id",
            get(channels::get_email)
                .put(channels::update_email)
                .patch(channels::update_email)
                .delete(channels::delete_email),
        )
        .route(
            "/api/integrations/calendar",
            get(channels::list_calendar).post(channels::create_calendar),
        )
        .route(
            "/api/integrations/calendar/:id",
            get(channels::get_calendar)
                .put(channels::update_calendar)
                .patch(channels::update_calendar)
                .delete(channels::delete_calendar),
        )
        .route(
            "/api/integrations/webhooks",
            get(channels::list_webhooks).post(channels::create_webhook),
        )
        .route(
            "/api/integrations/webhooks/:id",
            get(channels::get_webhook)
                .put(channels::update_webhook)
                .patch(channels::update_webhook)
                .delete(channels::delete_webhook),
        )
        .route("/api/integrations/api", get(channels::list_api).post(channels::create_api))
        .route(
            "/api/integrations/api/:id",
            get(channels::get_api)
                .put(channels::update_api)
                .patch(channels::update_api)
                .delete(channels::delete_api),
        )
        .route("/api/integrations/syncs", get(syncs::list_syncs).post(syncs::create_sync))
        .route(
            "/api/integrations/syncs/:id",
            get(syncs::get_sync)
                .put(syncs::update_sync)
                .patch(syncs::update_sync)
                .delete(syncs::delete_sync),
        )
        .route(
            "/api/integrations/sync-logs",
            get(syncs::list_sync_logs).post(syncs::create_sync_log),
        )
        .route("/api/integrations/sync-logs/:id", get(syncs::get_sync_log))
}

fn analytics_routes() -> Router<AppState> {
    use crate::analytics::{dashboard, insights, kpis, models, overview, reports};

    Router::new()
        .route(
            "/api/analytics/dashboard",
            get(dashboard::get_dashboard)
                .put(dashboard::update_dashboard)
                .patch(dashboard::update_dashboard),
        )
        .route("/api/analytics/kpis", get(kpis::list_kpis).post(kpis::create_kpi))
        .route(
            "/api/analytics/kpis/:id",
            get(kpis::get_kpi)
                .put(kpis::update_kpi)
                .patch(kpis::update_kpi)
                .delete(kpis::delete_kpi),
        )
        .route(
            "/api/analytics/measurements",
            get(kpis::list_measurements).post(kpis::create_measurement),
        )
        .route(
            "/api/analytics/measurements/:id",
            get(kpis::get_measurement).delete(kpis::delete_measurement),
        )
        .route(
            "/api/analytics/reports",
            get(reports::list_reports).post(reports::create_report),
        )
        .route(
            "/api/analytics/reports/:id",
            get(reports::get_report)
                .put(reports::update_report)
                .patch(reports::update_report)
                .delete(reports::delete_report),
        )
        .route(
            "/api/analytics/report-executions",
            get(reports::list_executions).post(reports::create_execution),
        )
        .route(
            "/api/analytics/report-executions/:id",
            get(reports::get_execution)
                .put(reports::update_execution)
                .patch(reports::update_execution),
        )
        .route(
            "/api/analytics/customer-insights",
            get(insights::list_customer_insights).post(insights::create_customer_insight),
        )
        .route(
            "/api/analytics/customer-insights/:id",
            get(insights::get_customer_insight).delete(insights::delete_customer_insight),
        )
        .route(
            "/api/analytics/lead-insights",
            get(insights::list_lead_insights).post(insights::create_lead_insight),
        )
        .route(
            "/api/analytics/lead-insights/:id",
            get(insights::get_lead_insight).delete(insights::delete_lead_insight),
        )
        .route(
            "/api/analytics/deal-insights",
            get(insights::list_deal_insights).post(insights::create_deal_insight),
        )
        .route(
            "/api/analytics/deal-insights/:id",
            get(insights::get_deal_insight).delete(insights::delete_deal_insight),
        )
        .route(
            "/api/analytics/sentiment",
            get(insights::list_sentiment).post(insights::create_sentiment),
        )
        .route(
            "/api/analytics/sentiment/:id",
            get(insights::get_sentiment).delete(insights::delete_sentiment),
        )
        .route("/api/analytics/models", get(models::list_models).post(models::create_model))
        .route(
            "/api/analytics/models/:id",
            get(models::get_model)
                .put(models::update_model)
                .patch(models::update_model)
                .delete(models::delete_model),
        )
        .route("/api/analytics/overview", get(overview::overview))
}

/// Creates the API router with all routes
///
/// # Arguments
///
/// * `state` - Application state containing DB pool and config
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .merge(auth_routes())
        .merge(customer_routes())
        .merge(lead_routes())
        .merge(deal_routes())
        .merge(automation_routes())
        .merge(notification_routes())
        .merge(integration_routes())
        .merge(analytics_routes())
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    public_routes().merge(protected_routes).with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status:         &'static str,
    pub version:        &'static str,
    pub uptime_seconds: u64,
    pub database:       &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!(error = %e, "Health check could not reach the database");
            "disconnected"
        },
    };

    Json(HealthResponse {
        status: if database == "connected" { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database,
    })
}

/// Creates the health check router
pub fn create_health_router(state: AppState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// CORS policy from the configured origins. `*` allows any origin; an empty
/// list allows none.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            },
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Creates the main application router
///
/// # Arguments
///
/// * `state` - Application state containing DB pool and config
///
/// # Returns
///
/// Main router with health checks and API routes, wrapped in the request id,
/// tracing and CORS layers
pub fn create_app_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .merge(create_health_router(state.clone()))
        .merge(create_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(from_fn(request_id_middleware))
}
