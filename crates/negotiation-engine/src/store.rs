//! Event storage contract and the in-memory reference backend.
//!
//! The engine only ever talks to storage through [`EventStore`]: create,
//! delete by id, and a per-participant range query. Callers must serialize
//! mutating operations; the trait takes `&mut self` for them so a single
//! owner cannot interleave two negotiations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Event, NewEvent, MAX_PRIORITY, MIN_PRIORITY};

pub trait EventStore {
    /// Store `event` under every participant (attendees plus organizer) and
    /// return it with a fresh unique id.
    fn create(&mut self, event: NewEvent) -> Result<Event, StoreError>;

    /// Remove the event from every participant. Returns whether anything was
    /// removed.
    fn delete(&mut self, event_id: &str) -> bool;

    /// Events of `participant` overlapping `[start, end)`, in no particular order.
    fn query(&self, participant: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Event>;
}

/// Check the invariants every backend enforces before storing an event.
pub fn validate_new_event(event: &NewEvent) -> Result<(), StoreError> {
    if event.end <= event.start {
        return Err(StoreError::InvalidRange {
            title: event.title.clone(),
            start: event.start,
            end: event.end,
        });
    }
    if let Some(priority) = event.priority {
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
            return Err(StoreError::InvalidPriority {
                title: event.title.clone(),
                priority,
            });
        }
    }
    if event.participants().is_empty() {
        return Err(StoreError::NoParticipants(event.title.clone()));
    }
    Ok(())
}

/// Events held in memory, one list per participant.
///
/// Each participant's list holds its own copy of a shared event; deletion
/// removes every copy.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    calendars: BTreeMap<String, Vec<Event>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an event by id across all calendars.
    pub fn get(&self, event_id: &str) -> Option<Event> {
        self.calendars
            .values()
            .flat_map(|events| events.iter())
            .find(|e| e.id == event_id)
            .cloned()
    }

    /// Every distinct event, sorted by start time then title.
    pub fn events(&self) -> Vec<Event> {
        let mut unique: BTreeMap<&str, &Event> = BTreeMap::new();
        for event in self.calendars.values().flatten() {
            unique.entry(event.id.as_str()).or_insert(event);
        }
        let mut events: Vec<Event> = unique.into_values().cloned().collect();
        events.sort_by(|a, b| (a.start, &a.title).cmp(&(b.start, &b.title)));
        events
    }

    /// Number of distinct events.
    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calendars.values().all(Vec::is_empty)
    }

    /// Participants that have ever had a calendar in this store.
    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.calendars.keys().map(String::as_str)
    }
}

impl EventStore for InMemoryEventStore {
    fn create(&mut self, event: NewEvent) -> Result<Event, StoreError> {
        validate_new_event(&event)?;

        let mut event = event;
        let mut seen: Vec<String> = Vec::with_capacity(event.attendees.len());
        event.attendees.retain(|a| {
            if seen.contains(a) {
                false
            } else {
                seen.push(a.clone());
                true
            }
        });

        let participants = event.participants();
        let created = event.into_event(Uuid::new_v4().to_string());
        for participant in participants {
            self.calendars
                .entry(participant)
                .or_default()
                .push(created.clone());
        }

        info!(
            event_id = %created.id,
            title = %created.title,
            start = %created.start,
            end = %created.end,
            "created event"
        );
        Ok(created)
    }

    fn delete(&mut self, event_id: &str) -> bool {
        let mut deleted = false;
        for events in self.calendars.values_mut() {
            let before = events.len();
            events.retain(|e| e.id != event_id);
            deleted |= events.len() != before;
        }
        if deleted {
            info!(event_id, "deleted event");
        } else {
            debug!(event_id, "delete requested for unknown event");
        }
        deleted
    }

    fn query(&self, participant: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Event> {
        self.calendars
            .get(participant)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.overlaps(start, end))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
