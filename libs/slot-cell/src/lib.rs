pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

// Re-export the externally consumed surface
pub use models::*;
pub use services::booking::SlotBookingService;
pub use services::lifecycle::SlotLifecycleService;
pub use services::rotation::{SlotRotationService, SweepOutcome};
pub use store::{MemorySlotStore, SlotStore, SupabaseSlotStore};
