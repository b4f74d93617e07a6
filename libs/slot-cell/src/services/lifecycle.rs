// libs/slot-cell/src/services/lifecycle.rs
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use doctor_cell::models::DoctorProfile;

use crate::models::{
    CreateSlotRequest, PaymentMethod, Recurrence, SessionKind, Slot, SlotStatus, UpdateSlotRequest,
};

const DEFAULT_DURATION_MINUTES: i32 = 60;

/// Pure transition rules for the slot state machine. Holds no store handle
/// and no clock; callers pass `now` in, which keeps every rule deterministic.
pub struct SlotLifecycleService;

impl SlotLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Build a fresh open slot, applying the creation defaults: one hour,
    /// online, the doctor's consultation fee, weekly recurrence.
    pub fn new_slot(
        &self,
        doctor: &DoctorProfile,
        request: &CreateSlotRequest,
        now: DateTime<Utc>,
    ) -> Slot {
        Slot {
            id: Uuid::new_v4(),
            doctor_id: doctor.id,
            patient_id: None,
            start_time: request.start_time,
            duration_minutes: request.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
            session_kind: SessionKind::coerce(request.session_kind.as_deref()),
            price: request.price.unwrap_or(doctor.consultation_fee),
            notes: request.notes.clone(),
            payment_method: None,
            recurrence: request.recurrence.unwrap_or_default(),
            status: SlotStatus::Available,
            created_at: now,
        }
    }

    /// Card payments wait for confirmation; everything else is booked outright.
    pub fn booking_status(&self, payment_method: PaymentMethod) -> SlotStatus {
        match payment_method {
            PaymentMethod::Card => SlotStatus::PendingPayment,
            PaymentMethod::Cash => SlotStatus::Booked,
        }
    }

    /// Reopen a slot: occupant and payment are cleared together so the
    /// available/unoccupied invariant holds.
    pub fn release(&self, slot: &mut Slot) {
        slot.patient_id = None;
        slot.payment_method = None;
        slot.status = SlotStatus::Available;
    }

    /// Partial field update. Session kind is only replaced when the input
    /// names a valid kind; status, occupant and recurrence are never touched
    /// here.
    pub fn apply_update(&self, slot: &mut Slot, request: &UpdateSlotRequest) {
        if let Some(start_time) = request.start_time {
            slot.start_time = start_time;
        }
        if let Some(duration_minutes) = request.duration_minutes {
            slot.duration_minutes = duration_minutes;
        }
        if let Some(kind) = request
            .session_kind
            .as_deref()
            .and_then(SessionKind::parse)
        {
            slot.session_kind = kind;
        }
        if let Some(price) = request.price {
            slot.price = price;
        }
        if let Some(notes) = &request.notes {
            slot.notes = Some(notes.clone());
        }
    }

    /// Advance a start time by whole weeks until it is no longer in the past.
    /// Loops rather than adding one period, so a slot stale for months lands
    /// on its next real occurrence.
    pub fn next_weekly_occurrence(
        &self,
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let mut next = start_time;
        while next < now {
            next += Duration::weeks(1);
        }
        next
    }

    /// Roll an expired weekly slot to its next occurrence, clearing any
    /// occupant remnants so it comes back clean.
    pub fn roll_forward(&self, slot: &mut Slot, now: DateTime<Utc>) {
        debug_assert_eq!(slot.recurrence, Recurrence::Weekly);

        slot.start_time = self.next_weekly_occurrence(slot.start_time, now);
        slot.patient_id = None;
        slot.payment_method = None;
        slot.status = SlotStatus::Available;
    }
}

impl Default for SlotLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
