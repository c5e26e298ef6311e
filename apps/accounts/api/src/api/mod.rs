use axum::{Router, routing::get};

use crate::state::AppState;

pub mod health;
pub mod users;

/// Creates the API routes without the `/api/v1` prefix.
/// The prefix is added by the `create_router` helper.
pub fn routes(state: &AppState) -> Router {
    Router::new().merge(users::router(state))
}

/// Creates a router with the /ready endpoint that performs actual health checks.
///
/// This router has state applied and can be merged with the stateless app router
/// from `create_router`.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
