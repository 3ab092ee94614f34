use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::{AbsoluteInterval, TaggedInterval, WeeklySchedule};

/// Expands a recurring weekly schedule into absolute intervals, one per
/// configured range per calendar day of the window. Days are enumerated in
/// the clinic timezone, from the window start's day through the window
/// end's day inclusive.
pub fn expand_open_hours(
    schedule: &WeeklySchedule,
    window: &AbsoluteInterval,
    tz: Tz,
) -> Vec<TaggedInterval> {
    let first_day = window.start.with_timezone(&tz).date_naive();
    let last_day = window.end.with_timezone(&tz).date_naive();

    let mut intervals = Vec::new();
    let mut day = first_day;
    while day <= last_day {
        for range in schedule.ranges_for(day.weekday()) {
            let start = minute_of_day_to_utc(day, range.start_minute, tz);
            let end = minute_of_day_to_utc(day, range.end_minute, tz);
            if let (Some(start), Some(end)) = (start, end) {
                // A DST transition can collapse a short range to nothing.
                if start < end {
                    intervals.push(TaggedInterval {
                        interval: AbsoluteInterval { start, end },
                        appointment_type: range.appointment_type,
                    });
                }
            }
        }
        day = day + Duration::days(1);
    }
    intervals
}

/// Resolves a wall-clock minute of a local calendar day to an absolute
/// instant. Minute 1440 is the midnight-exclusive end of the day.
pub(crate) fn minute_of_day_to_utc(day: NaiveDate, minute: u16, tz: Tz) -> Option<DateTime<Utc>> {
    let naive = day.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minute));
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Some(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        // Wall-clock minute skipped by a spring-forward gap; the same
        // minute exists exactly one hour later.
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|instant| instant.with_timezone(&Utc)),
    }
}
