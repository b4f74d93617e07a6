// libs/slot-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn slot_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        // Slot lifecycle
        .route("/", post(handlers::create_slot))
        .route("/{slot_id}/book", post(handlers::book_slot))
        .route("/{slot_id}/cancel", post(handlers::cancel_slot))
        .route("/{slot_id}/cancel-delete", post(handlers::cancel_and_delete_slot))
        .route("/{slot_id}/status", patch(handlers::set_slot_status))
        .route(
            "/{slot_id}",
            patch(handlers::update_slot).delete(handlers::delete_slot),
        )
        // Slot listings
        .route("/doctor/{doctor_id}", get(handlers::get_doctor_slots))
        .route(
            "/doctor/{doctor_id}/available",
            get(handlers::get_available_doctor_slots),
        )
        .route("/patient/{patient_id}", get(handlers::get_patient_slots))
        .with_state(state)
}
