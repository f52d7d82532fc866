//! Calendar bucketing: fold a chronologically sorted event sequence into one
//! aggregate per UTC calendar day.

use chrono::{DateTime, NaiveDate, Utc};

use super::error::EngineError;
use crate::model::DailyAggregate;

/// Groups `events` into per-day aggregates. `timestamp_of` picks the field
/// that places an event on the calendar; `seconds_of` is the event's
/// duration contribution (0 for pure counts). Each event always counts as 1.
///
/// Days with no events are not emitted; the gap filler densifies later.
/// An empty input yields an empty output.
pub fn bucket_daily<T>(
    events: &[T],
    timestamp_of: impl Fn(&T) -> DateTime<Utc>,
    seconds_of: impl Fn(&T) -> i64,
) -> Result<Vec<DailyAggregate>, EngineError> {
    let mut buckets: Vec<DailyAggregate> = Vec::new();

    let mut current_day: Option<NaiveDate> = None;
    let mut count = 0i64;
    let mut total_seconds = 0i64;

    for (index, event) in events.iter().enumerate() {
        let day = timestamp_of(event).date_naive();

        match current_day {
            None => current_day = Some(day),
            Some(open) if day == open => {}
            Some(open) => {
                if day < open {
                    return Err(EngineError::UnsortedInput {
                        context: "calendar bucketing",
                        index,
                    });
                }
                buckets.push(DailyAggregate::new(open, count, total_seconds));
                current_day = Some(day);
                count = 0;
                total_seconds = 0;
            }
        }

        count += 1;
        total_seconds += seconds_of(event);
    }

    if let Some(open) = current_day {
        buckets.push(DailyAggregate::new(open, count, total_seconds));
    }

    Ok(buckets)
}
