// libs/slot-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    BookSlotRequest, CancelSlotRequest, CreateSlotRequest, SetSlotStatusRequest, Slot, SlotError,
    UpdateSlotRequest,
};
use crate::services::booking::SlotBookingService;

fn map_slot_error(e: SlotError) -> AppError {
    match e {
        SlotError::SlotNotFound | SlotError::DoctorNotFound | SlotError::PatientNotFound => {
            AppError::NotFound(e.to_string())
        }
        SlotError::NotAvailable => AppError::Conflict(e.to_string()),
        SlotError::NotSlotPatient => AppError::Auth(e.to_string()),
        SlotError::Store(msg) => AppError::Database(msg),
    }
}

/// Doctor publishes an open slot.
#[axum::debug_handler]
pub async fn create_slot(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreateSlotRequest>,
) -> Result<Json<Slot>, AppError> {
    let service = SlotBookingService::new(&state);

    let slot = service.create_slot(request).await.map_err(map_slot_error)?;
    Ok(Json(slot))
}

/// Patient books an open slot.
#[axum::debug_handler]
pub async fn book_slot(
    State(state): State<Arc<AppConfig>>,
    Path(slot_id): Path<Uuid>,
    Json(request): Json<BookSlotRequest>,
) -> Result<Json<Slot>, AppError> {
    let service = SlotBookingService::new(&state);

    let slot = service.book(slot_id, request).await.map_err(map_slot_error)?;
    Ok(Json(slot))
}

/// Patient cancels their booking; the slot reopens.
#[axum::debug_handler]
pub async fn cancel_slot(
    State(state): State<Arc<AppConfig>>,
    Path(slot_id): Path<Uuid>,
    Json(request): Json<CancelSlotRequest>,
) -> Result<Json<Slot>, AppError> {
    let service = SlotBookingService::new(&state);

    let slot = service
        .cancel_by_patient(slot_id, request.patient_id)
        .await
        .map_err(map_slot_error)?;
    Ok(Json(slot))
}

/// Patient cancels their booking and the slot is removed outright.
#[axum::debug_handler]
pub async fn cancel_and_delete_slot(
    State(state): State<Arc<AppConfig>>,
    Path(slot_id): Path<Uuid>,
    Json(request): Json<CancelSlotRequest>,
) -> Result<StatusCode, AppError> {
    let service = SlotBookingService::new(&state);

    service
        .cancel_and_delete(slot_id, request.patient_id)
        .await
        .map_err(map_slot_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Administrative/doctor status override (completed, no-show, ...).
#[axum::debug_handler]
pub async fn set_slot_status(
    State(state): State<Arc<AppConfig>>,
    Path(slot_id): Path<Uuid>,
    Json(request): Json<SetSlotStatusRequest>,
) -> Result<Json<Slot>, AppError> {
    let service = SlotBookingService::new(&state);

    let slot = service
        .set_status(slot_id, request)
        .await
        .map_err(map_slot_error)?;
    Ok(Json(slot))
}

/// Doctor edits slot details; booking state is untouched.
#[axum::debug_handler]
pub async fn update_slot(
    State(state): State<Arc<AppConfig>>,
    Path(slot_id): Path<Uuid>,
    Json(request): Json<UpdateSlotRequest>,
) -> Result<Json<Slot>, AppError> {
    let service = SlotBookingService::new(&state);

    let slot = service
        .update_slot(slot_id, request)
        .await
        .map_err(map_slot_error)?;
    Ok(Json(slot))
}

#[axum::debug_handler]
pub async fn delete_slot(
    State(state): State<Arc<AppConfig>>,
    Path(slot_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = SlotBookingService::new(&state);

    service.delete_slot(slot_id).await.map_err(map_slot_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Everything the doctor has published, stale slots rotated first.
#[axum::debug_handler]
pub async fn get_doctor_slots(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Vec<Slot>>, AppError> {
    let service = SlotBookingService::new(&state);

    let slots = service
        .list_by_doctor(doctor_id)
        .await
        .map_err(map_slot_error)?;
    Ok(Json(slots))
}

/// Public bookable listing for a doctor.
#[axum::debug_handler]
pub async fn get_available_doctor_slots(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Vec<Slot>>, AppError> {
    let service = SlotBookingService::new(&state);

    let slots = service
        .list_available_by_doctor(doctor_id)
        .await
        .map_err(map_slot_error)?;
    Ok(Json(slots))
}

#[axum::debug_handler]
pub async fn get_patient_slots(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<Slot>>, AppError> {
    let service = SlotBookingService::new(&state);

    let slots = service
        .list_by_patient(patient_id)
        .await
        .map_err(map_slot_error)?;
    Ok(Json(slots))
}
