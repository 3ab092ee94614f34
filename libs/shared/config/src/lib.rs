use std::env;

use chrono::Duration;
use chrono_tz::Tz;
use tracing::warn;

const DEFAULT_SLOT_LENGTH_MINUTES: i64 = 30;
const DEFAULT_LEAD_TIME_MINUTES: i64 = 30;
const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Asuncion;
const DEFAULT_MAX_CONCURRENT_COMPUTATIONS: usize = 4;

/// Scheduling parameters for the availability engine.
///
/// Loaded once at startup and passed explicitly into every engine entry
/// point; nothing reads environment state at computation time.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    pub slot_length_minutes: i64,
    pub lead_time_minutes: i64,
    pub timezone: Tz,
    pub max_concurrent_computations: usize,
}

impl SchedulingConfig {
    pub fn from_env() -> Self {
        Self {
            slot_length_minutes: env_i64("SLOT_LENGTH_MINUTES", DEFAULT_SLOT_LENGTH_MINUTES)
                .max(1),
            lead_time_minutes: env_i64("BOOKING_LEAD_TIME_MINUTES", DEFAULT_LEAD_TIME_MINUTES)
                .max(0),
            timezone: env_timezone("CLINIC_TIMEZONE", DEFAULT_TIMEZONE),
            max_concurrent_computations: env_i64(
                "AVAILABILITY_WORKER_CONCURRENCY",
                DEFAULT_MAX_CONCURRENT_COMPUTATIONS as i64,
            )
            .max(1) as usize,
        }
    }

    /// Length of one bookable slot.
    pub fn slot_length(&self) -> Duration {
        Duration::minutes(self.slot_length_minutes)
    }

    /// Minimum offset from "now" before a slot may be offered.
    pub fn lead_time(&self) -> Duration {
        Duration::minutes(self.lead_time_minutes)
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            slot_length_minutes: DEFAULT_SLOT_LENGTH_MINUTES,
            lead_time_minutes: DEFAULT_LEAD_TIME_MINUTES,
            timezone: DEFAULT_TIMEZONE,
            max_concurrent_computations: DEFAULT_MAX_CONCURRENT_COMPUTATIONS,
        }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid number, using default {}", key, default);
            default
        }),
        Err(_) => default,
    }
}

fn env_timezone(key: &str, default: Tz) -> Tz {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid IANA timezone, using default {}", key, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_clinic_defaults() {
        let config = SchedulingConfig::default();

        assert_eq!(config.slot_length_minutes, 30);
        assert_eq!(config.lead_time_minutes, 30);
        assert_eq!(config.timezone, chrono_tz::America::Asuncion);
        assert_eq!(config.max_concurrent_computations, 4);
    }

    #[test]
    fn duration_helpers_use_configured_minutes() {
        let config = SchedulingConfig {
            slot_length_minutes: 20,
            lead_time_minutes: 120,
            ..SchedulingConfig::default()
        };

        assert_eq!(config.slot_length(), Duration::minutes(20));
        assert_eq!(config.lead_time(), Duration::hours(2));
    }
}
