pub mod directory;

pub use directory::{DoctorDirectory, SupabaseDoctorDirectory};
