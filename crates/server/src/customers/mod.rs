//! # Customers Module
//!
//! Customers and the records hanging off them. Child records follow the
//! visibility of their customer.

use entity::customers;
use error::{AppError, Result};
use sea_orm::{EntityTrait, QueryFilter};

use crate::{scope::Viewer, AppState};

pub mod contacts;
pub mod handlers;
pub mod interactions;
pub mod notes;
pub mod segments;

/// The customer `customer_id` refers to, as a field error when it is missing
/// or outside the viewer's scope.
pub(crate) async fn parent_customer(state: &AppState, viewer: &Viewer, customer_id: &str) -> Result<customers::Model> {
    customers::Entity::find_by_id(customer_id)
        .filter(viewer.customers())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::field("customer_id", "Customer not found"))
}
