pub mod error;
pub mod models;
pub mod services;
pub mod sources;

// Re-export the engine surface for external use
pub use error::AvailabilityError;
pub use models::{
    AbsoluteInterval, AppointmentType, AvailabilitySlot, OrganizationBlock, TaggedInterval,
    TimeOfDayRange, WeeklySchedule,
};
pub use services::availability::AvailabilityService;
pub use services::executor::ComputeExecutor;
pub use services::validation::{validate_blocks, ScheduleConflict};
pub use sources::{BusyIntervalSource, MergedBusySource, OpenHoursSource};
