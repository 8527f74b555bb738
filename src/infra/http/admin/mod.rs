mod auth;
mod forms;
mod handlers;
mod state;

pub use state::AdminState;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::middleware::{log_responses, set_request_context};

pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/", get(handlers::admin_overview))
        .route("/settings", post(handlers::admin_settings_update))
        .route("/cache/clear", post(handlers::admin_clear_cache))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_privilege,
        ))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}
