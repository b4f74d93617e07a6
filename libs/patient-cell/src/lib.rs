pub mod services;

pub use services::directory::{PatientDirectory, SupabasePatientDirectory};
