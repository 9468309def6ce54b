//! # Access Scoping
//!
//! Role-dependent row filters. Every list and single-row lookup is narrowed by
//! one of these conditions before it reaches the database, so a record outside
//! the requester's scope behaves exactly like a missing one.
//!
//! - admin: every row
//! - manager: own rows plus rows belonging to direct reports
//! - other roles: own rows only
//!
//! Filters are computed fresh on every request.

use entity::{
    analytics_dashboards,
    customer_contacts,
    customer_insights,
    customer_interactions,
    customer_notes,
    customers,
    deal_activities,
    deal_insights,
    deal_products,
    deals,
    lead_activities,
    lead_insights,
    lead_scores,
    leads,
    notification_deliveries,
    notification_preferences,
    notification_queue,
    notification_subscriptions,
    notifications,
    reports,
    sentiment_analyses,
    tasks,
    team_members,
    teams,
    user_profiles,
    users::{self, UserRole},
};
use sea_orm::{
    sea_query::{Query, SelectStatement},
    ColumnTrait,
    Condition,
    EntityName,
};

use crate::middleware::auth::AuthenticatedUser;

/// The requesting user as seen by the scoping layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub id:   String,
    pub role: UserRole,
}

impl From<&AuthenticatedUser> for Viewer {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            id:   user.id.clone(),
            role: user.role.clone(),
        }
    }
}

impl Viewer {
    pub fn new(id: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool { self.role == UserRole::Admin }

    /// Ids of the users reporting directly to this viewer.
    fn direct_reports(&self) -> SelectStatement {
        Query::select()
            .column(users::Column::Id)
            .from(users::Entity.table_ref())
            .and_where(users::Column::ManagerId.eq(self.id.as_str()))
            .to_owned()
    }

    /// Users: managers see themselves and their direct reports.
    pub fn users(&self) -> Condition {
        match self.role {
            UserRole::Admin => Condition::all(),
            UserRole::Manager => {
                Condition::any()
                    .add(users::Column::ManagerId.eq(self.id.as_str()))
                    .add(users::Column::Id.eq(self.id.as_str()))
            },
            _ => Condition::all().add(users::Column::Id.eq(self.id.as_str())),
        }
    }

    /// Profiles: everyone but admins sees only their own.
    pub fn profiles(&self) -> Condition {
        if self.is_admin() {
            Condition::all()
        }
        else {
            Condition::all().add(user_profiles::Column::UserId.eq(self.id.as_str()))
        }
    }

    /// Teams: admins and managers see all, other roles only teams they belong
    /// to or lead.
    pub fn teams(&self) -> Condition {
        if self.role.is_privileged() {
            return Condition::all();
        }
        let memberships = Query::select()
            .column(team_members::Column::TeamId)
            .from(team_members::Entity.table_ref())
            .and_where(team_members::Column::UserId.eq(self.id.as_str()))
            .to_owned();
        Condition::any()
            .add(teams::Column::Id.in_subquery(memberships))
            .add(teams::Column::LeaderId.eq(self.id.as_str()))
    }

    /// Records owned through an assignment column.
    pub fn owned<C: ColumnTrait>(&self, column: C) -> Condition {
        match self.role {
            UserRole::Admin => Condition::all(),
            UserRole::Manager => {
                Condition::any()
                    .add(column.eq(self.id.as_str()))
                    .add(column.in_subquery(self.direct_reports()))
            },
            _ => Condition::all().add(column.eq(self.id.as_str())),
        }
    }

    pub fn customers(&self) -> Condition { self.owned(customers::Column::AssignedTo) }

    pub fn leads(&self) -> Condition { self.owned(leads::Column::AssignedTo) }

    pub fn deals(&self) -> Condition { self.owned(deals::Column::AssignedTo) }

    pub fn tasks(&self) -> Condition { self.owned(tasks::Column::AssignedTo) }

    /// Rows whose `column` references a visible customer.
    fn child_of_customer<C: ColumnTrait>(&self, column: C) -> Condition {
        if self.is_admin() {
            return Condition::all();
        }
        let visible = Query::select()
            .column(customers::Column::Id)
            .from(customers::Entity.table_ref())
            .cond_where(self.customers())
            .to_owned();
        Condition::all().add(column.in_subquery(visible))
    }

    fn child_of_lead<C: ColumnTrait>(&self, column: C) -> Condition {
        if self.is_admin() {
            return Condition::all();
        }
        let visible = Query::select()
            .column(leads::Column::Id)
            .from(leads::Entity.table_ref())
            .cond_where(self.leads())
            .to_owned();
        Condition::all().add(column.in_subquery(visible))
    }

    fn child_of_deal<C: ColumnTrait>(&self, column: C) -> Condition {
        if self.is_admin() {
            return Condition::all();
        }
        let visible = Query::select()
            .column(deals::Column::Id)
            .from(deals::Entity.table_ref())
            .cond_where(self.deals())
            .to_owned();
        Condition::all().add(column.in_subquery(visible))
    }

    pub fn customer_contacts(&self) -> Condition { self.child_of_customer(customer_contacts::Column::CustomerId) }

    pub fn customer_interactions(&self) -> Condition {
        self.child_of_customer(customer_interactions::Column::CustomerId)
    }

    /// Notes of visible customers; private notes only for their author.
    pub fn customer_notes(&self) -> Condition {
        if self.is_admin() {
            return Condition::all();
        }
        self.child_of_customer(customer_notes::Column::CustomerId)
            .add(
                Condition::any()
                    .add(customer_notes::Column::IsPrivate.eq(false))
                    .add(customer_notes::Column::AuthorId.eq(self.id.as_str())),
            )
    }

    pub fn lead_activities(&self) -> Condition { self.child_of_lead(lead_activities::Column::LeadId) }

    pub fn deal_activities(&self) -> Condition { self.child_of_deal(deal_activities::Column::DealId) }

    pub fn deal_products(&self) -> Condition { self.child_of_deal(deal_products::Column::DealId) }

    pub fn lead_scores(&self) -> Condition { self.child_of_lead(lead_scores::Column::LeadId) }

    pub fn customer_insights(&self) -> Condition { self.child_of_customer(customer_insights::Column::CustomerId) }

    pub fn lead_insights(&self) -> Condition { self.child_of_lead(lead_insights::Column::LeadId) }

    pub fn deal_insights(&self) -> Condition { self.child_of_deal(deal_insights::Column::DealId) }

    pub fn sentiment_analyses(&self) -> Condition { self.child_of_customer(sentiment_analyses::Column::CustomerId) }

    pub fn notifications(&self) -> Condition {
        if self.is_admin() {
            Condition::all()
        }
        else {
            Condition::all().add(notifications::Column::RecipientId.eq(self.id.as_str()))
        }
    }

    pub fn notification_preferences(&self) -> Condition {
        if self.is_admin() {
            Condition::all()
        }
        else {
            Condition::all().add(notification_preferences::Column::UserId.eq(self.id.as_str()))
        }
    }

    /// Queued notifications: only the recipient's own.
    pub fn notification_queue(&self) -> Condition {
        if self.is_admin() {
            Condition::all()
        }
        else {
            Condition::all().add(notification_queue::Column::RecipientId.eq(self.id.as_str()))
        }
    }

    /// Delivery records of visible queued notifications.
    pub fn notification_deliveries(&self) -> Condition {
        if self.is_admin() {
            return Condition::all();
        }
        let visible = Query::select()
            .column(notification_queue::Column::Id)
            .from(notification_queue::Entity.table_ref())
            .cond_where(self.notification_queue())
            .to_owned();
        Condition::all().add(notification_deliveries::Column::QueuedNotificationId.in_subquery(visible))
    }

    pub fn notification_subscriptions(&self) -> Condition {
        if self.is_admin() {
            Condition::all()
        }
        else {
            Condition::all().add(notification_subscriptions::Column::UserId.eq(self.id.as_str()))
        }
    }

    /// Public reports plus the viewer's own.
    pub fn reports(&self) -> Condition {
        if self.is_admin() {
            return Condition::all();
        }
        Condition::any()
            .add(reports::Column::IsPublic.eq(true))
            .add(reports::Column::CreatedBy.eq(self.id.as_str()))
    }

    /// Dashboards are private to their owner.
    pub fn dashboards(&self) -> Condition {
        Condition::all().add(analytics_dashboards::Column::UserId.eq(self.id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    use super::*;

    fn sql<E: EntityTrait>(condition: Condition) -> String {
        E::find()
            .filter(condition)
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn test_admin_users_unfiltered() {
        let viewer = Viewer::new("admin1", UserRole::Admin);
        assert!(!sql::<users::Entity>(viewer.users()).contains("admin1"));
    }

    #[test]
    fn test_manager_users_include_self_and_reports() {
        let viewer = Viewer::new("mgr1", UserRole::Manager);
        let query = sql::<users::Entity>(viewer.users());
        assert!(query.contains(r#""users"."manager_id" = 'mgr1'"#));
        assert!(query.contains(r#""users"."id" = 'mgr1'"#));
        assert!(query.contains(" OR "));
    }

    #[test]
    fn test_sales_users_self_only() {
        let viewer = Viewer::new("rep1", UserRole::Sales);
        let query = sql::<users::Entity>(viewer.users());
        assert!(query.contains(r#""users"."id" = 'rep1'"#));
        assert!(!query.contains("manager_id"));
    }

    #[test]
    fn test_support_teams_by_membership() {
        let viewer = Viewer::new("sup1", UserRole::Support);
        let query = sql::<teams::Entity>(viewer.teams());
        assert!(query.contains("IN (SELECT"));
        assert!(query.contains("team_members"));
    }

    #[test]
    fn test_sales_teams_include_led() {
        let viewer = Viewer::new("rep1", UserRole::Sales);
        let query = sql::<teams::Entity>(viewer.teams());
        assert!(query.contains(r#""teams"."leader_id" = 'rep1'"#));
        assert!(query.contains(" OR "));
    }

    #[test]
    fn test_manager_teams_unfiltered() {
        let viewer = Viewer::new("mgr1", UserRole::Manager);
        assert!(!sql::<teams::Entity>(viewer.teams()).contains("team_members"));
    }

    #[test]
    fn test_manager_owned_includes_reports() {
        let viewer = Viewer::new("mgr1", UserRole::Manager);
        let query = sql::<customers::Entity>(viewer.customers());
        assert!(query.contains(r#""customers"."assigned_to" = 'mgr1'"#));
        assert!(query.contains("IN (SELECT"));
    }

    #[test]
    fn test_private_notes_restricted_to_author() {
        let viewer = Viewer::new("rep1", UserRole::Sales);
        let query = sql::<customer_notes::Entity>(viewer.customer_notes());
        assert!(query.contains(r#""customer_notes"."is_private""#));
        assert!(query.contains(r#""customer_notes"."author_id" = 'rep1'"#));
    }

    #[test]
    fn test_reports_public_or_own() {
        let viewer = Viewer::new("rep1", UserRole::Marketing);
        let query = sql::<reports::Entity>(viewer.reports());
        assert!(query.contains(r#""reports"."is_public""#));
        assert!(query.contains(r#""reports"."created_by" = 'rep1'"#));
    }

    #[test]
    fn test_deliveries_follow_queue_recipient() {
        let viewer = Viewer::new("rep1", UserRole::Sales);
        let query = sql::<notification_deliveries::Entity>(viewer.notification_deliveries());
        assert!(query.contains("notification_queue"));
        assert!(query.contains(r#""notification_queue"."recipient_id" = 'rep1'"#));
    }

    #[test]
    fn test_lead_scores_follow_lead_scope() {
        let viewer = Viewer::new("rep1", UserRole::Sales);
        let query = sql::<lead_scores::Entity>(viewer.lead_scores());
        assert!(query.contains(r#""leads"."assigned_to" = 'rep1'"#));

        let admin = Viewer::new("admin1", UserRole::Admin);
        assert!(!sql::<lead_scores::Entity>(admin.lead_scores()).contains("IN (SELECT"));
    }
}
