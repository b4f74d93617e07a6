pub mod booking;
pub mod lifecycle;
pub mod rotation;

pub use booking::SlotBookingService;
pub use lifecycle::SlotLifecycleService;
pub use rotation::{SlotRotationService, SweepOutcome};
