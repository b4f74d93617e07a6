// libs/slot-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::{DoctorDirectory, SupabaseDoctorDirectory};
use patient_cell::{PatientDirectory, SupabasePatientDirectory};
use shared_config::AppConfig;
use shared_utils::clock::{Clock, SystemClock};

use crate::models::{
    BookSlotRequest, CreateSlotRequest, PaymentMethod, SetSlotStatusRequest, Slot, SlotError,
    UpdateSlotRequest,
};
use crate::services::lifecycle::SlotLifecycleService;
use crate::services::rotation::SlotRotationService;
use crate::store::{SlotStore, SupabaseSlotStore};

/// The externally consumed contract for the slot lifecycle. Composes the
/// lifecycle rules with the store, the doctor/patient directories and the
/// rotation sweeper; the booking transition goes through the store's
/// conditional claim so concurrent callers serialize on the row itself.
pub struct SlotBookingService {
    store: Arc<dyn SlotStore>,
    doctors: Arc<dyn DoctorDirectory>,
    patients: Arc<dyn PatientDirectory>,
    clock: Arc<dyn Clock>,
    lifecycle: SlotLifecycleService,
    rotation: SlotRotationService,
}

impl SlotBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_parts(
            Arc::new(SupabaseSlotStore::new(config)),
            Arc::new(SupabaseDoctorDirectory::new(config)),
            Arc::new(SupabasePatientDirectory::new(config)),
            Arc::new(SystemClock),
        )
    }

    pub fn with_parts(
        store: Arc<dyn SlotStore>,
        doctors: Arc<dyn DoctorDirectory>,
        patients: Arc<dyn PatientDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let rotation = SlotRotationService::with_store(Arc::clone(&store));

        Self {
            store,
            doctors,
            patients,
            clock,
            lifecycle: SlotLifecycleService::new(),
            rotation,
        }
    }

    /// Publish a new open slot for a doctor.
    pub async fn create_slot(&self, request: CreateSlotRequest) -> Result<Slot, SlotError> {
        debug!("Creating slot for doctor {}", request.doctor_id);

        let doctor = self
            .doctors
            .find(request.doctor_id)
            .await
            .map_err(store_error)?
            .ok_or(SlotError::DoctorNotFound)?;

        let slot = self.lifecycle.new_slot(&doctor, &request, self.clock.now());
        let created = self.store.insert(&slot).await.map_err(store_error)?;

        info!("Slot {} created for doctor {}", created.id, created.doctor_id);
        Ok(created)
    }

    /// Book an open slot for a patient. At most one concurrent caller can
    /// take a given slot out of `available`; everyone else gets
    /// `NotAvailable`, the same error a stale read would produce.
    pub async fn book(&self, slot_id: Uuid, request: BookSlotRequest) -> Result<Slot, SlotError> {
        debug!("Booking slot {} for patient {}", slot_id, request.patient_id);

        let current = self
            .store
            .fetch(slot_id)
            .await
            .map_err(store_error)?
            .ok_or(SlotError::SlotNotFound)?;

        if !current.is_open() {
            return Err(SlotError::NotAvailable);
        }

        let known = self
            .patients
            .exists(request.patient_id)
            .await
            .map_err(store_error)?;
        if !known {
            return Err(SlotError::PatientNotFound);
        }

        let payment_method = request.payment_method.unwrap_or(PaymentMethod::Cash);
        let status = self.lifecycle.booking_status(payment_method);

        let claimed = self
            .store
            .claim(slot_id, request.patient_id, payment_method, status)
            .await
            .map_err(store_error)?;

        match claimed {
            Some(slot) => {
                info!(
                    "Slot {} booked by patient {} ({})",
                    slot.id, request.patient_id, slot.status
                );
                Ok(slot)
            }
            // Lost the race between the availability read and the claim.
            None => Err(SlotError::NotAvailable),
        }
    }

    /// Release a booked slot back to the open pool. Only the recorded
    /// occupant may do this, whatever the current status.
    pub async fn cancel_by_patient(
        &self,
        slot_id: Uuid,
        patient_id: Uuid,
    ) -> Result<Slot, SlotError> {
        let mut slot = self.occupied_by(slot_id, patient_id).await?;

        self.lifecycle.release(&mut slot);
        let freed = self.store.update(&slot).await.map_err(store_error)?;

        info!("Slot {} released by patient {}", slot_id, patient_id);
        Ok(freed)
    }

    /// Cancel and remove the slot entirely, for bookings that should not
    /// reappear as open.
    pub async fn cancel_and_delete(&self, slot_id: Uuid, patient_id: Uuid) -> Result<(), SlotError> {
        self.occupied_by(slot_id, patient_id).await?;

        self.store.delete(slot_id).await.map_err(store_error)?;

        info!("Slot {} cancelled and removed by patient {}", slot_id, patient_id);
        Ok(())
    }

    /// Administrative status override. Writes the status as given and leaves
    /// occupant and payment fields alone.
    pub async fn set_status(
        &self,
        slot_id: Uuid,
        request: SetSlotStatusRequest,
    ) -> Result<Slot, SlotError> {
        let mut slot = self
            .store
            .fetch(slot_id)
            .await
            .map_err(store_error)?
            .ok_or(SlotError::SlotNotFound)?;

        slot.status = request.status;
        self.store.update(&slot).await.map_err(store_error)
    }

    /// Partial update of the slot's own fields; booking state is untouched.
    pub async fn update_slot(
        &self,
        slot_id: Uuid,
        request: UpdateSlotRequest,
    ) -> Result<Slot, SlotError> {
        let mut slot = self
            .store
            .fetch(slot_id)
            .await
            .map_err(store_error)?
            .ok_or(SlotError::SlotNotFound)?;

        self.lifecycle.apply_update(&mut slot, &request);
        self.store.update(&slot).await.map_err(store_error)
    }

    pub async fn delete_slot(&self, slot_id: Uuid) -> Result<(), SlotError> {
        let deleted = self.store.delete(slot_id).await.map_err(store_error)?;
        if !deleted {
            return Err(SlotError::SlotNotFound);
        }

        info!("Slot {} deleted", slot_id);
        Ok(())
    }

    /// All of a doctor's slots, freshly swept. A sweep failure degrades to
    /// the unswept listing instead of failing the read.
    pub async fn list_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Slot>, SlotError> {
        self.sweep_before_read(doctor_id).await;
        self.store.by_doctor(doctor_id).await.map_err(store_error)
    }

    /// The doctor's open, still-upcoming slots: the bookable set.
    pub async fn list_available_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Slot>, SlotError> {
        self.sweep_before_read(doctor_id).await;

        let now = self.clock.now();
        let slots = self
            .store
            .available_by_doctor(doctor_id)
            .await
            .map_err(store_error)?;

        Ok(slots
            .into_iter()
            .filter(|slot| slot.start_time >= now)
            .collect())
    }

    pub async fn list_by_patient(&self, patient_id: Uuid) -> Result<Vec<Slot>, SlotError> {
        self.store.by_patient(patient_id).await.map_err(store_error)
    }

    async fn sweep_before_read(&self, doctor_id: Uuid) {
        if let Err(e) = self
            .rotation
            .sweep_for_doctor(doctor_id, self.clock.now())
            .await
        {
            warn!(
                "Slot sweep failed for doctor {}, serving unswept listing: {}",
                doctor_id, e
            );
        }
    }

    async fn occupied_by(&self, slot_id: Uuid, patient_id: Uuid) -> Result<Slot, SlotError> {
        let slot = self
            .store
            .fetch(slot_id)
            .await
            .map_err(store_error)?
            .ok_or(SlotError::SlotNotFound)?;

        if slot.patient_id != Some(patient_id) {
            return Err(SlotError::NotSlotPatient);
        }

        Ok(slot)
    }
}

fn store_error(e: anyhow::Error) -> SlotError {
    SlotError::Store(e.to_string())
}
