// libs/slot-cell/src/store.rs
use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{PaymentMethod, Slot, SlotStatus};

/// Durable collection of appointment slots. The only shared mutable resource
/// in the scheduling core; every adapter must make `claim` a single
/// conditional write so concurrent bookings cannot both win.
#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Option<Slot>>;

    async fn insert(&self, slot: &Slot) -> Result<Slot>;

    /// Unconditional write-by-id of every mutable field.
    async fn update(&self, slot: &Slot) -> Result<Slot>;

    /// One persistence call for a whole sweep where the backend supports it.
    async fn update_batch(&self, slots: &[Slot]) -> Result<()>;

    /// Attach an occupant only if the row is still `available`. Returns the
    /// updated row, or None when the condition did not match (already
    /// claimed, or gone).
    async fn claim(
        &self,
        id: Uuid,
        patient_id: Uuid,
        payment_method: PaymentMethod,
        status: SlotStatus,
    ) -> Result<Option<Slot>>;

    /// Returns false when nothing matched the id.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Slot>>;

    async fn by_patient(&self, patient_id: Uuid) -> Result<Vec<Slot>>;

    async fn available_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Slot>>;

    /// Open slots whose start_time has already passed, optionally scoped to
    /// one doctor. Input to the rotation sweep.
    async fn expired_available(
        &self,
        doctor_id: Option<Uuid>,
        before: DateTime<Utc>,
    ) -> Result<Vec<Slot>>;
}

// ==============================================================================
// SUPABASE ADAPTER
// ==============================================================================

const SLOTS_TABLE: &str = "/rest/v1/appointment_slots";

pub struct SupabaseSlotStore {
    supabase: SupabaseClient,
}

impl SupabaseSlotStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    fn representation_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    fn parse_rows(rows: Vec<Value>) -> Result<Vec<Slot>> {
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| anyhow!("Failed to parse slot: {}", e)))
            .collect()
    }
}

#[async_trait]
impl SlotStore for SupabaseSlotStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<Slot>> {
        let path = format!("{}?id=eq.{}", SLOTS_TABLE, id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(Self::parse_rows(rows)?.into_iter().next())
    }

    async fn insert(&self, slot: &Slot) -> Result<Slot> {
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                SLOTS_TABLE,
                Some(serde_json::to_value(slot)?),
                Some(Self::representation_headers()),
            )
            .await?;

        Self::parse_rows(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Failed to create appointment slot"))
    }

    async fn update(&self, slot: &Slot) -> Result<Slot> {
        let path = format!("{}?id=eq.{}", SLOTS_TABLE, slot.id);
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(serde_json::to_value(slot)?),
                Some(Self::representation_headers()),
            )
            .await?;

        Self::parse_rows(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Failed to update appointment slot {}", slot.id))
    }

    async fn update_batch(&self, slots: &[Slot]) -> Result<()> {
        if slots.is_empty() {
            return Ok(());
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
        );

        let _: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                SLOTS_TABLE,
                Some(serde_json::to_value(slots)?),
                Some(headers),
            )
            .await?;

        Ok(())
    }

    async fn claim(
        &self,
        id: Uuid,
        patient_id: Uuid,
        payment_method: PaymentMethod,
        status: SlotStatus,
    ) -> Result<Option<Slot>> {
        // Single conditional PATCH: the status filter makes the write a
        // compare-and-swap on the row, so only one concurrent caller gets a
        // non-empty representation back.
        let path = format!(
            "{}?id=eq.{}&status=eq.{}",
            SLOTS_TABLE,
            id,
            SlotStatus::Available
        );
        let body = serde_json::json!({
            "patient_id": patient_id,
            "payment_method": payment_method,
            "status": status,
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(body),
                Some(Self::representation_headers()),
            )
            .await?;

        debug!("Claim on slot {} matched {} rows", id, rows.len());
        Ok(Self::parse_rows(rows)?.into_iter().next())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let path = format!("{}?id=eq.{}", SLOTS_TABLE, id);
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(Method::DELETE, &path, None, Some(Self::representation_headers()))
            .await?;

        Ok(!rows.is_empty())
    }

    async fn by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Slot>> {
        let path = format!(
            "{}?doctor_id=eq.{}&order=start_time.asc",
            SLOTS_TABLE, doctor_id
        );
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        Self::parse_rows(rows)
    }

    async fn by_patient(&self, patient_id: Uuid) -> Result<Vec<Slot>> {
        let path = format!(
            "{}?patient_id=eq.{}&order=start_time.asc",
            SLOTS_TABLE, patient_id
        );
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        Self::parse_rows(rows)
    }

    async fn available_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Slot>> {
        let path = format!(
            "{}?doctor_id=eq.{}&status=eq.{}&order=start_time.asc",
            SLOTS_TABLE,
            doctor_id,
            SlotStatus::Available
        );
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        Self::parse_rows(rows)
    }

    async fn expired_available(
        &self,
        doctor_id: Option<Uuid>,
        before: DateTime<Utc>,
    ) -> Result<Vec<Slot>> {
        let cutoff = urlencoding::encode(&before.to_rfc3339()).into_owned();
        let mut path = format!(
            "{}?status=eq.{}&start_time=lt.{}",
            SLOTS_TABLE,
            SlotStatus::Available,
            cutoff
        );
        if let Some(doctor_id) = doctor_id {
            path.push_str(&format!("&doctor_id=eq.{}", doctor_id));
        }
        path.push_str("&order=start_time.asc");

        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        Self::parse_rows(rows)
    }
}

// ==============================================================================
// IN-MEMORY ADAPTER
// ==============================================================================

/// Deterministic adapter used by the test suites and local development. The
/// write lock in `claim` plays the role of the database's conditional write.
#[derive(Default)]
pub struct MemorySlotStore {
    slots: RwLock<HashMap<Uuid, Slot>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut slots: Vec<Slot>) -> Vec<Slot> {
        slots.sort_by_key(|slot| slot.start_time);
        slots
    }
}

#[async_trait]
impl SlotStore for MemorySlotStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<Slot>> {
        Ok(self.slots.read().await.get(&id).cloned())
    }

    async fn insert(&self, slot: &Slot) -> Result<Slot> {
        let mut slots = self.slots.write().await;
        slots.insert(slot.id, slot.clone());
        Ok(slot.clone())
    }

    async fn update(&self, slot: &Slot) -> Result<Slot> {
        let mut slots = self.slots.write().await;
        if !slots.contains_key(&slot.id) {
            return Err(anyhow!("Failed to update appointment slot {}", slot.id));
        }
        slots.insert(slot.id, slot.clone());
        Ok(slot.clone())
    }

    async fn update_batch(&self, batch: &[Slot]) -> Result<()> {
        let mut slots = self.slots.write().await;
        for slot in batch {
            slots.insert(slot.id, slot.clone());
        }
        Ok(())
    }

    async fn claim(
        &self,
        id: Uuid,
        patient_id: Uuid,
        payment_method: PaymentMethod,
        status: SlotStatus,
    ) -> Result<Option<Slot>> {
        let mut slots = self.slots.write().await;
        match slots.get_mut(&id) {
            Some(slot) if slot.status == SlotStatus::Available => {
                slot.patient_id = Some(patient_id);
                slot.payment_method = Some(payment_method);
                slot.status = status;
                Ok(Some(slot.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.slots.write().await.remove(&id).is_some())
    }

    async fn by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Slot>> {
        let slots = self.slots.read().await;
        Ok(Self::sorted(
            slots
                .values()
                .filter(|slot| slot.doctor_id == doctor_id)
                .cloned()
                .collect(),
        ))
    }

    async fn by_patient(&self, patient_id: Uuid) -> Result<Vec<Slot>> {
        let slots = self.slots.read().await;
        Ok(Self::sorted(
            slots
                .values()
                .filter(|slot| slot.patient_id == Some(patient_id))
                .cloned()
                .collect(),
        ))
    }

    async fn available_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Slot>> {
        let slots = self.slots.read().await;
        Ok(Self::sorted(
            slots
                .values()
                .filter(|slot| slot.doctor_id == doctor_id && slot.status == SlotStatus::Available)
                .cloned()
                .collect(),
        ))
    }

    async fn expired_available(
        &self,
        doctor_id: Option<Uuid>,
        before: DateTime<Utc>,
    ) -> Result<Vec<Slot>> {
        let slots = self.slots.read().await;
        Ok(Self::sorted(
            slots
                .values()
                .filter(|slot| {
                    slot.status == SlotStatus::Available
                        && slot.start_time < before
                        && doctor_id.map_or(true, |id| slot.doctor_id == id)
                })
                .cloned()
                .collect(),
        ))
    }
}
