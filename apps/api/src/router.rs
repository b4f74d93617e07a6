use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;
use slot_cell::router::slot_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic slots API is running!" }))
        .nest("/appointments", slot_routes(state.clone()))
}
