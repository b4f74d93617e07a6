pub mod models;
pub mod services;

pub use models::DoctorProfile;
pub use services::directory::{DoctorDirectory, SupabaseDoctorDirectory};
