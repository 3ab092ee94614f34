pub mod availability;
pub mod executor;
pub mod recurrence;
pub mod slots;
pub mod subtraction;
pub mod validation;
