// libs/slot-cell/src/services/rotation.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{Recurrence, SlotError};
use crate::services::lifecycle::SlotLifecycleService;
use crate::store::{SlotStore, SupabaseSlotStore};

/// What a sweep did, for the scheduler's log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    pub rolled: usize,
    pub removed: usize,
}

/// Keeps the set of open slots free of stale, past-dated entries: weekly
/// slots are advanced to their next future occurrence, one-time slots are
/// discarded.
pub struct SlotRotationService {
    store: Arc<dyn SlotStore>,
    lifecycle: SlotLifecycleService,
}

impl SlotRotationService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_store(Arc::new(SupabaseSlotStore::new(config)))
    }

    pub fn with_store(store: Arc<dyn SlotStore>) -> Self {
        Self {
            store,
            lifecycle: SlotLifecycleService::new(),
        }
    }

    /// Sweep one doctor's expired open slots. Invoked synchronously ahead of
    /// doctor-scoped listings.
    pub async fn sweep_for_doctor(
        &self,
        doctor_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<SweepOutcome, SlotError> {
        self.sweep(Some(doctor_id), now).await
    }

    /// Sweep every doctor's expired open slots. Invoked by the scheduled
    /// runner; a failure here is retried on its next tick.
    pub async fn sweep_global(&self, now: DateTime<Utc>) -> Result<SweepOutcome, SlotError> {
        self.sweep(None, now).await
    }

    async fn sweep(
        &self,
        doctor_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<SweepOutcome, SlotError> {
        let expired = self
            .store
            .expired_available(doctor_id, now)
            .await
            .map_err(|e| SlotError::Store(e.to_string()))?;

        let mut rolled = Vec::new();
        let mut removed = 0usize;

        for mut slot in expired {
            match slot.recurrence {
                Recurrence::Weekly => {
                    self.lifecycle.roll_forward(&mut slot, now);
                    rolled.push(slot);
                }
                Recurrence::OneTime => match self.store.delete(slot.id).await {
                    // Re-advancing an already-future slot never happens: a
                    // rolled slot no longer matches the expiry scan, so one
                    // failed delete is safe to leave for the next sweep.
                    Ok(_) => removed += 1,
                    Err(e) => {
                        warn!("Failed to remove expired one-time slot {}: {}", slot.id, e);
                    }
                },
            }
        }

        // One write for the whole batch; partial progress is fine since each
        // roll-forward is idempotent.
        self.store
            .update_batch(&rolled)
            .await
            .map_err(|e| SlotError::Store(e.to_string()))?;

        if !rolled.is_empty() || removed > 0 {
            info!(
                "Slot sweep rolled {} weekly and removed {} one-time slots",
                rolled.len(),
                removed
            );
        }

        Ok(SweepOutcome {
            rolled: rolled.len(),
            removed,
        })
    }
}
