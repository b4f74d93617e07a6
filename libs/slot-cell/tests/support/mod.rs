#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use doctor_cell::models::DoctorProfile;
use doctor_cell::DoctorDirectory;
use patient_cell::PatientDirectory;
use shared_utils::clock::Clock;
use shared_utils::test_utils::FixedClock;
use slot_cell::store::{MemorySlotStore, SlotStore};
use slot_cell::{PaymentMethod, Recurrence, SessionKind, Slot, SlotBookingService, SlotStatus};

/// Directory stub resolving a fixed set of doctors to a flat fee each.
pub struct StaticDoctors {
    fees: HashMap<Uuid, f64>,
}

impl StaticDoctors {
    pub fn with_fee(doctor_id: Uuid, fee: f64) -> Self {
        Self {
            fees: HashMap::from([(doctor_id, fee)]),
        }
    }
}

#[async_trait]
impl DoctorDirectory for StaticDoctors {
    async fn find(&self, doctor_id: Uuid) -> Result<Option<DoctorProfile>> {
        Ok(self.fees.get(&doctor_id).map(|fee| DoctorProfile {
            id: doctor_id,
            first_name: "Test".to_string(),
            last_name: "Doctor".to_string(),
            consultation_fee: *fee,
        }))
    }
}

/// Directory stub recognizing a fixed set of patients.
pub struct StaticPatients {
    ids: Vec<Uuid>,
}

impl StaticPatients {
    pub fn of(ids: &[Uuid]) -> Self {
        Self { ids: ids.to_vec() }
    }
}

#[async_trait]
impl PatientDirectory for StaticPatients {
    async fn exists(&self, patient_id: Uuid) -> Result<bool> {
        Ok(self.ids.contains(&patient_id))
    }
}

/// Store wrapper whose batch writes always fail, for exercising the
/// degraded listing path.
pub struct BatchFailStore {
    inner: MemorySlotStore,
}

impl BatchFailStore {
    pub fn new(inner: MemorySlotStore) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl SlotStore for BatchFailStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<Slot>> {
        self.inner.fetch(id).await
    }

    async fn insert(&self, slot: &Slot) -> Result<Slot> {
        self.inner.insert(slot).await
    }

    async fn update(&self, slot: &Slot) -> Result<Slot> {
        self.inner.update(slot).await
    }

    async fn update_batch(&self, _slots: &[Slot]) -> Result<()> {
        Err(anyhow!("batch write refused"))
    }

    async fn claim(
        &self,
        id: Uuid,
        patient_id: Uuid,
        payment_method: PaymentMethod,
        status: SlotStatus,
    ) -> Result<Option<Slot>> {
        self.inner.claim(id, patient_id, payment_method, status).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        self.inner.delete(id).await
    }

    async fn by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Slot>> {
        self.inner.by_doctor(doctor_id).await
    }

    async fn by_patient(&self, patient_id: Uuid) -> Result<Vec<Slot>> {
        self.inner.by_patient(patient_id).await
    }

    async fn available_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Slot>> {
        self.inner.available_by_doctor(doctor_id).await
    }

    async fn expired_available(
        &self,
        doctor_id: Option<Uuid>,
        before: DateTime<Utc>,
    ) -> Result<Vec<Slot>> {
        self.inner.expired_available(doctor_id, before).await
    }
}

/// A Monday morning, so relative offsets in tests stay readable.
pub fn anchor_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
}

pub fn open_slot(doctor_id: Uuid, start_time: DateTime<Utc>, recurrence: Recurrence) -> Slot {
    Slot {
        id: Uuid::new_v4(),
        doctor_id,
        patient_id: None,
        start_time,
        duration_minutes: 60,
        session_kind: SessionKind::Online,
        price: 90.0,
        notes: None,
        payment_method: None,
        recurrence,
        status: SlotStatus::Available,
        created_at: anchor_time(),
    }
}

pub struct TestBed {
    pub store: Arc<MemorySlotStore>,
    pub clock: Arc<FixedClock>,
    pub service: SlotBookingService,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
}

/// One known doctor (fee 90), one known patient, clock pinned to the anchor.
pub fn test_bed() -> TestBed {
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();
    let store = Arc::new(MemorySlotStore::new());
    let clock = Arc::new(FixedClock::at(anchor_time()));

    let service = SlotBookingService::with_parts(
        Arc::clone(&store) as Arc<dyn SlotStore>,
        Arc::new(StaticDoctors::with_fee(doctor_id, 90.0)),
        Arc::new(StaticPatients::of(&[patient_id])),
        Arc::clone(&clock) as Arc<dyn Clock>,
    );

    TestBed {
        store,
        clock,
        service,
        doctor_id,
        patient_id,
    }
}
