//! Detect events that collide with a candidate meeting slot.
//!
//! Overlap is half-open: an event that ends exactly when the candidate starts,
//! or starts exactly when it ends, is NOT a conflict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Event;

/// An existing event overlapping a candidate slot, with the minutes they share.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap {
    pub event: Event,
    pub overlap_minutes: i64,
}

/// All events in `events` overlapping `[start, end)`, in input order.
///
/// The overlap duration is `min(event.end, end) - max(event.start, start)`.
pub fn find_overlaps(events: &[Event], start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Overlap> {
    events
        .iter()
        .filter(|event| event.overlaps(start, end))
        .map(|event| {
            let overlap_start = event.start.max(start);
            let overlap_end = event.end.min(end);
            Overlap {
                event: event.clone(),
                overlap_minutes: (overlap_end - overlap_start).num_minutes(),
            }
        })
        .collect()
}

/// A lower-priority event standing in the way of a proposed meeting.
///
/// `relocation_start`/`relocation_end` stay `None` until the relocator has
/// found a free slot for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub event_id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Effective priority: the stored one, or the evaluated one when the event
    /// has none.
    pub priority: u8,
    /// Priority as stored on the event, restored when it is recreated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_priority: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recurrence: Vec<String>,
    pub relocation_start: Option<DateTime<Utc>>,
    pub relocation_end: Option<DateTime<Utc>>,
}

impl Conflict {
    /// Unresolved conflict for `event` evaluated at `priority`.
    pub fn from_event(event: &Event, priority: u8) -> Self {
        Self {
            event_id: event.id.clone(),
            title: event.title.clone(),
            start: event.start,
            end: event.end,
            attendees: event.attendees.clone(),
            organizer: event.organizer.clone(),
            description: event.description.clone(),
            priority,
            stored_priority: event.priority,
            recurrence: event.recurrence.clone(),
            relocation_start: None,
            relocation_end: None,
        }
    }

    /// Record the slot the event will move to; it keeps its original length.
    pub fn resolve(&mut self, new_start: DateTime<Utc>) {
        self.relocation_start = Some(new_start);
        self.relocation_end = Some(new_start + (self.end - self.start));
    }

    pub fn is_resolved(&self) -> bool {
        self.relocation_start.is_some() && self.relocation_end.is_some()
    }

    /// Attendees plus organizer, without duplicates.
    pub fn participants(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.attendees.len() + 1);
        for p in self.organizer.iter().chain(self.attendees.iter()) {
            if !out.contains(p) {
                out.push(p.clone());
            }
        }
        out
    }
}
