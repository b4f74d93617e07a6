use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The slice of a doctor record the scheduling core needs: identity plus the
/// fee used to price slots that are created without an explicit price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub consultation_fee: f64,
}

impl DoctorProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
