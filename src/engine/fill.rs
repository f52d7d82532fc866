//! Gap filling: align a sparse per-day aggregate list with a dense date
//! list, zero-filling the days storage never wrote.

use chrono::NaiveDate;

use super::error::EngineError;
use crate::model::DailyAggregate;

/// Dense per-day series aligned 1:1 with the date list handed to
/// [`fill_gaps`]. Counts and duration totals are split out so callers can
/// feed either into the moving-average engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledDaily {
    pub counts: Vec<f64>,
    pub totals: Vec<f64>,
}

/// Two-pointer merge of `days` (dense, ascending) and `sparse` (ascending,
/// unique dates). Days missing from `sparse` contribute 0. A sparse entry
/// that is out of order, duplicated, or not present in `days` fails
/// explicitly rather than producing misaligned output.
pub fn fill_gaps(
    days: &[NaiveDate],
    sparse: &[DailyAggregate],
) -> Result<FilledDaily, EngineError> {
    let mut counts = Vec::with_capacity(days.len());
    let mut totals = Vec::with_capacity(days.len());

    let mut cursor = 0usize;
    for day in days {
        match sparse.get(cursor) {
            Some(aggregate) if aggregate.day == *day => {
                counts.push(aggregate.count as f64);
                totals.push(aggregate.total_seconds as f64);
                cursor += 1;
            }
            Some(aggregate) if aggregate.day < *day => {
                // Behind the dense walk: either unsorted, duplicated, or
                // before the range start.
                return Err(EngineError::UnsortedInput {
                    context: "gap filler",
                    index: cursor,
                });
            }
            _ => {
                counts.push(0.0);
                totals.push(0.0);
            }
        }
    }

    if let Some(leftover) = sparse.get(cursor) {
        return Err(EngineError::Misaligned { day: leftover.day });
    }

    Ok(FilledDaily { counts, totals })
}
