//! Compute busy periods and free gaps from event lists.
//!
//! Sorts intervals by start time, merges overlapping or touching busy periods,
//! then computes the gaps between merged periods within a given window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Event;

/// A merged stretch of time during which someone is busy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyPeriod {
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

/// A free time slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

/// Merge overlapping or adjacent intervals, clipped to the given window.
///
/// Returns a sorted, non-overlapping list of busy periods.
pub fn merge_intervals<I>(
    intervals: I,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<BusyPeriod>
where
    I: IntoIterator<Item = (DateTime<Utc>, DateTime<Utc>)>,
{
    let mut clipped: Vec<(DateTime<Utc>, DateTime<Utc>)> = intervals
        .into_iter()
        .filter(|&(start, end)| start < window_end && end > window_start)
        .map(|(start, end)| (start.max(window_start), end.min(window_end)))
        .collect();

    if clipped.is_empty() {
        return Vec::new();
    }

    clipped.sort_by_key(|&(start, end)| (start, end));

    let mut merged: Vec<BusyPeriod> = Vec::new();
    for (start, end) in clipped {
        if let Some(last) = merged.last_mut() {
            if start <= last.end {
                // Overlapping or adjacent: extend the current period.
                last.end = last.end.max(end);
                continue;
            }
        }
        merged.push(BusyPeriod { start, end });
    }

    merged
}

/// Merged busy periods of `events` inside the window.
pub fn merge_busy_periods<'a, I>(
    events: I,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<BusyPeriod>
where
    I: IntoIterator<Item = &'a Event>,
{
    merge_intervals(
        events.into_iter().map(|e| (e.start, e.end)),
        window_start,
        window_end,
    )
}

/// The gaps between already-merged busy periods inside the window.
pub fn free_between(
    busy: &[BusyPeriod],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<FreeSlot> {
    let mut free_slots = Vec::new();
    let mut cursor = window_start;

    for period in busy {
        if cursor < period.start {
            free_slots.push(FreeSlot {
                start: cursor,
                end: period.start,
                duration_minutes: (period.start - cursor).num_minutes(),
            });
        }
        cursor = cursor.max(period.end);
    }

    if cursor < window_end {
        free_slots.push(FreeSlot {
            start: cursor,
            end: window_end,
            duration_minutes: (window_end - cursor).num_minutes(),
        });
    }

    free_slots
}
