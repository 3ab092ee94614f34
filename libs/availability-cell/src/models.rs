use std::fmt;

use chrono::{DateTime, Duration, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::AvailabilityError;

pub const MINUTES_PER_DAY: u16 = 1440;

/// Modality a schedule range or slot supports. `Both` serves either an
/// ambulatory or a virtual booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    Ambulatory,
    Virtual,
    Both,
}

impl AppointmentType {
    /// Whether a slot carrying `self` satisfies a request for `requested`.
    pub fn matches(self, requested: AppointmentType) -> bool {
        self == AppointmentType::Both || requested == AppointmentType::Both || self == requested
    }

    /// Whether two overlapping schedule ranges would double-book the same
    /// modality. Equal types collide, and `Both` collides with everything.
    pub fn conflicts_with(self, other: AppointmentType) -> bool {
        self == other || self == AppointmentType::Both || other == AppointmentType::Both
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::Ambulatory => write!(f, "ambulatory"),
            AppointmentType::Virtual => write!(f, "virtual"),
            AppointmentType::Both => write!(f, "both"),
        }
    }
}

/// One open-hours range within a single day, in minutes from local midnight.
/// `end_minute` of 1440 is the midnight-exclusive end of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDayRange {
    pub start_minute: u16,
    pub end_minute: u16,
    pub appointment_type: AppointmentType,
}

impl TimeOfDayRange {
    pub fn new(
        start_minute: u16,
        end_minute: u16,
        appointment_type: AppointmentType,
    ) -> Result<Self, AvailabilityError> {
        let range = Self {
            start_minute,
            end_minute,
            appointment_type,
        };
        if !range.is_well_formed() {
            return Err(AvailabilityError::InvalidRange(format!(
                "time-of-day range must satisfy 0 <= start < end <= {}, got {}..{}",
                MINUTES_PER_DAY, start_minute, end_minute
            )));
        }
        Ok(range)
    }

    pub fn is_well_formed(&self) -> bool {
        self.start_minute < self.end_minute && self.end_minute <= MINUTES_PER_DAY
    }

    /// Whether the two ranges share any minute of the day.
    pub fn overlaps(&self, other: &TimeOfDayRange) -> bool {
        self.start_minute < other.end_minute && other.start_minute < self.end_minute
    }
}

impl fmt::Display for TimeOfDayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02} ({})",
            self.start_minute / 60,
            self.start_minute % 60,
            self.end_minute / 60,
            self.end_minute % 60,
            self.appointment_type
        )
    }
}

/// Recurring weekly open hours, keyed by day of week. Days with no entries
/// are simply closed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    #[serde(default)]
    pub sun: Vec<TimeOfDayRange>,
    #[serde(default)]
    pub mon: Vec<TimeOfDayRange>,
    #[serde(default)]
    pub tue: Vec<TimeOfDayRange>,
    #[serde(default)]
    pub wed: Vec<TimeOfDayRange>,
    #[serde(default)]
    pub thu: Vec<TimeOfDayRange>,
    #[serde(default)]
    pub fri: Vec<TimeOfDayRange>,
    #[serde(default)]
    pub sat: Vec<TimeOfDayRange>,
}

impl WeeklySchedule {
    pub fn ranges_for(&self, weekday: Weekday) -> &[TimeOfDayRange] {
        match weekday {
            Weekday::Sun => &self.sun,
            Weekday::Mon => &self.mon,
            Weekday::Tue => &self.tue,
            Weekday::Wed => &self.wed,
            Weekday::Thu => &self.thu,
            Weekday::Fri => &self.fri,
            Weekday::Sat => &self.sat,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sun.is_empty()
            && self.mon.is_empty()
            && self.tue.is_empty()
            && self.wed.is_empty()
            && self.thu.is_empty()
            && self.fri.is_empty()
            && self.sat.is_empty()
    }
}

/// A doctor's weekly open hours at one organization. A doctor owns at most
/// one block per organization id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationBlock {
    pub organization_id: String,
    pub schedule: WeeklySchedule,
}

/// Half-open absolute time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsoluteInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AbsoluteInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AvailabilityError> {
        if start >= end {
            return Err(AvailabilityError::InvalidRange(format!(
                "interval start {} is not before end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn overlaps(&self, other: &AbsoluteInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// An absolute interval that still carries the modality of the open-hours
/// range it was expanded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedInterval {
    pub interval: AbsoluteInterval,
    pub appointment_type: AppointmentType,
}

/// One bookable slot, exactly one configured slot length wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub instant: DateTime<Utc>,
    pub appointment_type: AppointmentType,
}
