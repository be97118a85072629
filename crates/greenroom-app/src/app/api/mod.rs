mod healthcheck;
mod schedule;

use salvo::Router;

// Re-export route constants from core
pub use greenroom_core::constants::{
    ADMIN_ROUTE_COMPONENT, ADMIN_ROUTE_PREFIX, API_ROUTE_COMPONENT, API_ROUTE_PREFIX,
    SCHEDULE_ROUTE_COMPONENT, SCHEDULE_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the main API router.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(healthcheck::routes())
        .push(schedule::routes())
}
