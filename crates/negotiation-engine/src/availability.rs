//! Multi-participant availability merging with privacy-preserving output.
//!
//! Accepts one calendar per participant and merges them into unified busy and
//! free blocks within a time window. This is what the embedding layer shows
//! when a search comes back empty: where everyone is busy, and where the gaps
//! are.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::freebusy::{self, BusyPeriod, FreeSlot};
use crate::hours::BusinessHours;
use crate::model::Event;
use crate::priority::evaluate_priority;
use crate::store::EventStore;

/// One participant's events inside the analysis window.
#[derive(Debug, Clone)]
pub struct ParticipantCalendar {
    pub participant: String,
    pub events: Vec<Event>,
}

/// An event with the priority the scheduler will treat it as having.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub effective_priority: u8,
}

/// One participant's events, each rated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Agenda {
    pub participant: String,
    pub events: Vec<RatedEvent>,
}

impl From<&ParticipantCalendar> for Agenda {
    fn from(calendar: &ParticipantCalendar) -> Self {
        Self {
            participant: calendar.participant.clone(),
            events: calendar
                .events
                .iter()
                .map(|event| RatedEvent {
                    event: event.clone(),
                    effective_priority: evaluate_priority(event),
                })
                .collect(),
        }
    }
}

/// Privacy level for availability output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    /// Name the participants that are busy in each block.
    Full,
    /// Show only busy/free time ranges. `participants` is left empty.
    #[default]
    Opaque,
}

/// A merged busy block in the unified availability view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusyBlock {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Participants with at least one event in this block, in input order.
    /// Empty when privacy is `Opaque`.
    pub participants: Vec<String>,
}

/// Unified availability after merging every participant's calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    /// Merged busy blocks (sorted by start, non-overlapping).
    pub busy: Vec<BusyBlock>,
    /// Free slots (gaps between busy blocks within the window).
    pub free: Vec<FreeSlot>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub privacy: PrivacyLevel,
}

impl Availability {
    /// Busy blocks without participant details.
    pub fn busy_periods(&self) -> Vec<BusyPeriod> {
        self.busy
            .iter()
            .map(|b| BusyPeriod {
                start: b.start,
                end: b.end,
            })
            .collect()
    }

    /// Free slots cut down to business hours, keeping only pieces of at least
    /// `min_minutes`.
    pub fn business_free(&self, hours: &BusinessHours, min_minutes: i64) -> Vec<FreeSlot> {
        let mut out = Vec::new();
        for slot in &self.free {
            let mut date = hours.local_date(slot.start);
            let last = hours.local_date(slot.end);
            while date <= last {
                if hours.is_business_day(date) {
                    let start = slot.start.max(hours.day_start(date));
                    let end = slot.end.min(hours.day_end(date));
                    if end > start && (end - start).num_minutes() >= min_minutes {
                        out.push(FreeSlot {
                            start,
                            end,
                            duration_minutes: (end - start).num_minutes(),
                        });
                    }
                }
                date += Duration::days(1);
            }
        }
        out
    }
}

/// Pull each participant's events for the window from the store.
pub fn collect_calendars<S: EventStore + ?Sized>(
    store: &S,
    participants: &[String],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<ParticipantCalendar> {
    participants
        .iter()
        .map(|p| ParticipantCalendar {
            participant: p.clone(),
            events: store.query(p, window_start, window_end),
        })
        .collect()
}

/// Merge participant calendars into unified availability within a window.
///
/// All events are clipped to the window and merged into non-overlapping busy
/// blocks. Free slots are the gaps between busy blocks.
pub fn merge_availability(
    calendars: &[ParticipantCalendar],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    privacy: PrivacyLevel,
) -> Availability {
    if window_start >= window_end {
        return Availability {
            busy: vec![],
            free: vec![],
            window_start,
            window_end,
            privacy,
        };
    }

    let merged = freebusy::merge_busy_periods(
        calendars.iter().flat_map(|c| c.events.iter()),
        window_start,
        window_end,
    );

    let busy = merged
        .iter()
        .map(|period| BusyBlock {
            start: period.start,
            end: period.end,
            participants: match privacy {
                PrivacyLevel::Full => busy_participants(calendars, period),
                PrivacyLevel::Opaque => Vec::new(),
            },
        })
        .collect();

    let free = freebusy::free_between(&merged, window_start, window_end);

    Availability {
        busy,
        free,
        window_start,
        window_end,
        privacy,
    }
}

fn busy_participants(calendars: &[ParticipantCalendar], period: &BusyPeriod) -> Vec<String> {
    calendars
        .iter()
        .filter(|c| c.events.iter().any(|e| period.overlaps(e.start, e.end)))
        .map(|c| c.participant.clone())
        .collect()
}
