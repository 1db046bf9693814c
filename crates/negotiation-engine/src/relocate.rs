//! Find a new home for an event displaced by a higher-priority meeting.
//!
//! The search walks forward from the event's original start, within business
//! hours, for up to the configured horizon. Instead of stepping through a long
//! busy stretch, a blocked candidate jumps straight to the end of whatever
//! blocks it: the meeting being placed, a merged busy period of one of the
//! attendees, or a slot already promised to another moved event. Only one slot
//! is needed, so the first clear one wins.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::freebusy;
use crate::hours::BusinessHours;
use crate::model::{Event, TimeWindow};

/// First start at which `event` fits again with all `attendees` free.
///
/// `known_events` may contain anything; only events involving one of the
/// attendees count as busy, and `event`'s own occupancy is ignored. No
/// candidate may overlap `excluded`.
pub fn relocate(
    hours: &BusinessHours,
    event: &Event,
    attendees: &[String],
    known_events: &[Event],
    excluded: TimeWindow,
) -> Option<DateTime<Utc>> {
    relocate_avoiding(hours, event, attendees, known_events, excluded, &[])
}

/// [`relocate`], additionally treating every window in `claimed` as busy.
pub fn relocate_avoiding(
    hours: &BusinessHours,
    event: &Event,
    attendees: &[String],
    known_events: &[Event],
    excluded: TimeWindow,
    claimed: &[TimeWindow],
) -> Option<DateTime<Utc>> {
    let duration = event.duration();
    let horizon_end = event.start + hours.relocation_horizon;

    let busy = freebusy::merge_intervals(
        known_events
            .iter()
            .filter(|e| e.id != event.id && attendees.iter().any(|a| e.involves(a)))
            .map(|e| (e.start, e.end))
            .chain(claimed.iter().map(|w| (w.start, w.end))),
        event.start,
        horizon_end + duration,
    );

    let mut cursor = event.start;
    loop {
        cursor = hours.next_valid_start(cursor, duration, horizon_end)?;
        let end = cursor + duration;

        if excluded.overlaps(cursor, end) {
            cursor = excluded.end;
            continue;
        }
        if let Some(blocker) = busy.iter().find(|b| b.overlaps(cursor, end)) {
            cursor = blocker.end;
            continue;
        }

        debug!(
            event_id = %event.id,
            title = %event.title,
            from = %event.start,
            to = %cursor,
            "found relocation slot"
        );
        return Some(cursor);
    }
}
