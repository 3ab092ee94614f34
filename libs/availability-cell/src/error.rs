use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::services::validation::ScheduleConflict;

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Invalid window: start {start} is not before end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Collaborator request failed: {0}")]
    Collaborator(String),

    #[error("Schedule validation failed with {} conflict(s)", .0.len())]
    ScheduleConflicts(Vec<ScheduleConflict>),

    #[error("Computation canceled")]
    Canceled,

    #[error("Internal error: {0}")]
    Internal(String),
}
