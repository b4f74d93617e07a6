// libs/slot-cell/src/models.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// CORE SLOT MODEL
// ==============================================================================

/// A bookable unit of doctor time, occupied by at most one patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub session_kind: SessionKind,
    pub price: f64,
    pub notes: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub recurrence: Recurrence,
    pub status: SlotStatus,
    pub created_at: DateTime<Utc>,
}

impl Slot {
    /// Calculate the end time based on start_time and duration
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(self.duration_minutes as i64)
    }

    pub fn is_open(&self) -> bool {
        self.status == SlotStatus::Available
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Booked,
    PendingPayment,
    Completed,
    Cancelled,
    NoShow,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotStatus::Available => write!(f, "available"),
            SlotStatus::Booked => write!(f, "booked"),
            SlotStatus::PendingPayment => write!(f, "pending_payment"),
            SlotStatus::Completed => write!(f, "completed"),
            SlotStatus::Cancelled => write!(f, "cancelled"),
            SlotStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    #[default]
    Online,
    InPerson,
}

impl SessionKind {
    pub fn parse(input: &str) -> Option<SessionKind> {
        match input.trim().to_ascii_lowercase().as_str() {
            "online" => Some(SessionKind::Online),
            "in_person" => Some(SessionKind::InPerson),
            _ => None,
        }
    }

    /// Missing or unrecognized kinds fall back to Online rather than erroring.
    pub fn coerce(input: Option<&str>) -> SessionKind {
        input.and_then(SessionKind::parse).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    OneTime,
    #[default]
    Weekly,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSlotRequest {
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    /// Free-form on the wire; coerced to a valid kind, never rejected.
    pub session_kind: Option<String>,
    pub price: Option<f64>,
    pub notes: Option<String>,
    pub recurrence: Option<Recurrence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSlotRequest {
    pub patient_id: Uuid,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelSlotRequest {
    pub patient_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetSlotStatusRequest {
    pub status: SlotStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSlotRequest {
    pub start_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub session_kind: Option<String>,
    pub price: Option<f64>,
    pub notes: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum SlotError {
    #[error("Appointment slot not found")]
    SlotNotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Appointment slot is not available for booking")]
    NotAvailable,

    #[error("You can only cancel your own appointment slot")]
    NotSlotPatient,

    #[error("Storage error: {0}")]
    Store(String),
}
