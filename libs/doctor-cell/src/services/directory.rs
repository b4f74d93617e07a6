use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::DoctorProfile;

/// Directory the scheduling core consults to check that a slot's owner is a
/// real doctor and to read their default consultation fee.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn find(&self, doctor_id: Uuid) -> Result<Option<DoctorProfile>>;
}

pub struct SupabaseDoctorDirectory {
    supabase: SupabaseClient,
}

impl SupabaseDoctorDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }
}

#[async_trait]
impl DoctorDirectory for SupabaseDoctorDirectory {
    async fn find(&self, doctor_id: Uuid) -> Result<Option<DoctorProfile>> {
        debug!("Resolving doctor: {}", doctor_id);

        let path = format!(
            "/rest/v1/doctors?id=eq.{}&select=id,first_name,last_name,consultation_fee",
            doctor_id
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }
}
