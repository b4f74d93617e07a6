pub mod directory;

pub use directory::{PatientDirectory, SupabasePatientDirectory};
