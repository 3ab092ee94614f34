use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{AbsoluteInterval, WeeklySchedule};

/// Read-only access to a doctor's configured open hours at one organization.
///
/// `Ok(None)` means no schedule is configured for the pair, which is a
/// normal state and yields empty availability rather than an error.
#[async_trait]
pub trait OpenHoursSource: Send + Sync {
    async fn get_open_hours(
        &self,
        doctor_id: Uuid,
        organization_id: &str,
    ) -> Result<Option<WeeklySchedule>>;
}

/// Read-only access to the time ranges already consumed for a doctor at one
/// organization. Busy intervals carry no modality; they block every
/// appointment type equally.
#[async_trait]
pub trait BusyIntervalSource: Send + Sync {
    async fn get_busy_intervals(
        &self,
        doctor_id: Uuid,
        organization_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AbsoluteInterval>>;
}

/// Concatenates several busy-interval sources into one, e.g. internally
/// tracked blocked events plus externally booked appointments. Ordering of
/// the merged list is irrelevant to the subtraction step. Any failing
/// source fails the whole fetch; partial busy data must never be used.
pub struct MergedBusySource {
    sources: Vec<Arc<dyn BusyIntervalSource>>,
}

impl MergedBusySource {
    pub fn new(sources: Vec<Arc<dyn BusyIntervalSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl BusyIntervalSource for MergedBusySource {
    async fn get_busy_intervals(
        &self,
        doctor_id: Uuid,
        organization_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AbsoluteInterval>> {
        let fetches = self
            .sources
            .iter()
            .map(|source| source.get_busy_intervals(doctor_id, organization_id, from, to));

        let results = futures::future::try_join_all(fetches).await?;
        Ok(results.into_iter().flatten().collect())
    }
}
