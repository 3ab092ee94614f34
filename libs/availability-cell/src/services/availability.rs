use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::debug;
use uuid::Uuid;

use shared_config::SchedulingConfig;

use crate::error::AvailabilityError;
use crate::models::{AbsoluteInterval, AppointmentType, AvailabilitySlot};
use crate::services::executor::ComputeExecutor;
use crate::services::recurrence::{expand_open_hours, minute_of_day_to_utc};
use crate::services::slots::quantize_slots;
use crate::services::subtraction::subtract_busy;
use crate::sources::{BusyIntervalSource, OpenHoursSource};

const SHORT_SEARCH_DAYS: i64 = 7;
const LONG_SEARCH_DAYS: i64 = 24;

/// Computes concrete bookable slots for one doctor/organization/window from
/// the configured open hours and the already-consumed busy intervals. Pure
/// given its collaborator inputs; concurrent calls share nothing but the
/// compute executor.
pub struct AvailabilityService {
    open_hours: Arc<dyn OpenHoursSource>,
    busy_intervals: Arc<dyn BusyIntervalSource>,
    executor: Arc<ComputeExecutor>,
    config: SchedulingConfig,
}

impl AvailabilityService {
    pub fn new(
        open_hours: Arc<dyn OpenHoursSource>,
        busy_intervals: Arc<dyn BusyIntervalSource>,
        executor: Arc<ComputeExecutor>,
        config: SchedulingConfig,
    ) -> Self {
        Self {
            open_hours,
            busy_intervals,
            executor,
            config,
        }
    }

    /// Returns every bookable slot inside `[window_start, window_end]`,
    /// ascending. An empty list is a legitimate result: no configured
    /// schedule, a closed week, or a fully booked one all yield `Ok(vec![])`.
    pub async fn calculate_availability(
        &self,
        doctor_id: Uuid,
        organization_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<AvailabilitySlot>, AvailabilityError> {
        if window_start >= window_end {
            return Err(AvailabilityError::InvalidWindow {
                start: window_start,
                end: window_end,
            });
        }

        debug!(
            "Calculating availability for doctor {} at organization {} in [{}, {}]",
            doctor_id, organization_id, window_start, window_end
        );

        let schedule = self
            .open_hours
            .get_open_hours(doctor_id, organization_id)
            .await
            .map_err(|err| AvailabilityError::Collaborator(err.to_string()))?;

        let Some(schedule) = schedule else {
            debug!(
                "No open hours configured for doctor {} at organization {}",
                doctor_id, organization_id
            );
            return Ok(Vec::new());
        };
        if schedule.is_empty() {
            return Ok(Vec::new());
        }

        // Busy lookups cover the full clinic-zone calendar days touching the
        // window, so a booking that starts before the window but runs into
        // it still blocks its slots. The quantizer filter below stays strict
        // to the caller's instants.
        let tz = self.config.timezone;
        let (query_start, query_end) = clinic_day_bounds(window_start, window_end, tz);
        let busy = self
            .busy_intervals
            .get_busy_intervals(doctor_id, organization_id, query_start, query_end)
            .await
            .map_err(|err| AvailabilityError::Collaborator(err.to_string()))?;

        let window = AbsoluteInterval::new(window_start, window_end)?;
        let slot_length = self.config.slot_length();
        let slots = self
            .executor
            .run(move || {
                let open = expand_open_hours(&schedule, &window, tz);
                let open = subtract_busy(open, &busy);
                quantize_slots(&open, slot_length, &window)
            })
            .await?;

        debug!(
            "Found {} available slots for doctor {} at organization {}",
            slots.len(),
            doctor_id,
            organization_id
        );
        Ok(slots)
    }

    /// Finds the first bookable slot at least one lead time in the future,
    /// optionally restricted to one modality (`both` serves any request).
    ///
    /// Searches a cheap one-week window first and a 24-day follow-up window
    /// only when the first comes back empty, bounding the worst-case cost
    /// instead of scanning an unbounded horizon.
    pub async fn calculate_next_availability(
        &self,
        doctor_id: Uuid,
        organization_id: &str,
        appointment_type: Option<AppointmentType>,
    ) -> Result<Option<AvailabilitySlot>, AvailabilityError> {
        let earliest = Utc::now() + self.config.lead_time();
        let short_end = earliest + Duration::days(SHORT_SEARCH_DAYS);

        if let Some(slot) = self
            .first_matching_slot(doctor_id, organization_id, earliest, short_end, appointment_type)
            .await?
        {
            return Ok(Some(slot));
        }

        debug!(
            "No availability for doctor {} at organization {} within {} days, widening",
            doctor_id, organization_id, SHORT_SEARCH_DAYS
        );
        let long_end = short_end + Duration::days(LONG_SEARCH_DAYS);
        self.first_matching_slot(doctor_id, organization_id, short_end, long_end, appointment_type)
            .await
    }

    async fn first_matching_slot(
        &self,
        doctor_id: Uuid,
        organization_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        appointment_type: Option<AppointmentType>,
    ) -> Result<Option<AvailabilitySlot>, AvailabilityError> {
        let slots = self
            .calculate_availability(doctor_id, organization_id, window_start, window_end)
            .await?;

        Ok(slots.into_iter().find(|slot| {
            appointment_type
                .map_or(true, |requested| slot.appointment_type.matches(requested))
        }))
    }
}

/// Widens a window to the clinic-zone midnights surrounding it.
fn clinic_day_bounds(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    tz: Tz,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let day_start = minute_of_day_to_utc(window_start.with_timezone(&tz).date_naive(), 0, tz)
        .unwrap_or(window_start);
    let day_end = minute_of_day_to_utc(window_end.with_timezone(&tz).date_naive(), 1440, tz)
        .unwrap_or(window_end);

    (day_start.min(window_start), day_end.max(window_end))
}
