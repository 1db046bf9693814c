//! Search a window for meeting start times.
//!
//! Candidates are walked chronologically in fixed steps through business
//! hours. Each candidate is classified against every participant's events:
//!
//! - **perfect**: nothing overlaps;
//! - **negotiable**: every overlapping event has a strictly lower priority than
//!   the request and can be relocated to a free slot;
//! - **infeasible**: an overlapping event is at least as important as the
//!   request, or one of the lower-priority events has nowhere to go.
//!
//! The earliest perfect candidate wins outright. Without one, the negotiable
//! candidates are ranked by impact score.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::conflict::{find_overlaps, Conflict};
use crate::error::ValidationError;
use crate::hours::BusinessHours;
use crate::model::{Event, MeetingRequest, TimeWindow};
use crate::priority::evaluate_priority;
use crate::relocate::relocate_avoiding;
use crate::store::EventStore;

/// A candidate start time for a request, with whatever has to move for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingProposal {
    pub request: MeetingRequest,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Events to relocate, in the order they were found. Every entry is resolved.
    pub conflicts: Vec<Conflict>,
    /// Attendees of the events being moved. Organizers who are not also
    /// attendees are not counted.
    pub affected_attendees: BTreeSet<String>,
    /// `conflicts + 0.5 * affected_attendees`; lower is better, 0 means perfect.
    pub impact_score: f64,
}

impl MeetingProposal {
    pub fn perfect(request: MeetingRequest, start: DateTime<Utc>) -> Self {
        let end = start + request.duration();
        Self {
            request,
            start,
            end,
            conflicts: Vec::new(),
            affected_attendees: BTreeSet::new(),
            impact_score: 0.0,
        }
    }

    pub fn negotiable(request: MeetingRequest, start: DateTime<Utc>, conflicts: Vec<Conflict>) -> Self {
        let end = start + request.duration();
        let affected_attendees: BTreeSet<String> =
            conflicts.iter().flat_map(|c| c.attendees.iter().cloned()).collect();
        let impact_score = impact_score(conflicts.len(), affected_attendees.len());
        Self {
            request,
            start,
            end,
            conflicts,
            affected_attendees,
            impact_score,
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.conflicts.is_empty()
    }
}

pub fn impact_score(conflicts: usize, affected_attendees: usize) -> f64 {
    conflicts as f64 + 0.5 * affected_attendees as f64
}

/// Why a candidate was dropped.
#[derive(Debug, Clone, PartialEq)]
enum Rejection {
    Unmovable { event_id: String, priority: u8 },
    NoRelocation { event_id: String },
    OutsidePreferredWindows,
}

/// Ranked proposals for `request` inside `[window_start, window_end)`.
///
/// Returns at most one proposal when a perfect slot exists (the earliest),
/// otherwise up to `hours.max_proposals` negotiable proposals ordered by
/// impact score, earlier start first on ties. An empty list means nothing
/// fits.
///
/// # Errors
/// Returns a [`ValidationError`] for malformed requests or an empty window,
/// before any store access.
pub fn find_slots<S: EventStore + ?Sized>(
    store: &S,
    hours: &BusinessHours,
    request: &MeetingRequest,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<Vec<MeetingProposal>, ValidationError> {
    request.validate(hours)?;
    if window_start >= window_end {
        return Err(ValidationError::InvalidWindow {
            start: window_start,
            end: window_end,
        });
    }

    let participants = request.participants();
    info!(
        title = %request.title,
        priority = request.priority,
        duration_minutes = request.duration_minutes,
        participants = ?participants,
        %window_start,
        %window_end,
        "searching for meeting slots"
    );

    let mut finder = SlotFinder {
        store,
        hours,
        request,
        events: fetch_events(
            store,
            &participants,
            window_start,
            window_end + request.duration(),
        ),
        relocation_context: HashMap::new(),
    };
    Ok(finder.run(window_start, window_end))
}

struct SlotFinder<'a, S: ?Sized> {
    store: &'a S,
    hours: &'a BusinessHours,
    request: &'a MeetingRequest,
    /// Participants' events touching the search window, unique by id.
    events: Vec<Event>,
    /// Busy events seen by each conflict's participants over its relocation
    /// horizon, keyed by the conflict's event id.
    relocation_context: HashMap<String, Vec<Event>>,
}

impl<S: EventStore + ?Sized> SlotFinder<'_, S> {
    fn run(&mut self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Vec<MeetingProposal> {
        let duration = self.request.duration();
        let mut negotiable: Vec<MeetingProposal> = Vec::new();
        let mut cursor = window_start;

        while let Some(start) = self.hours.next_valid_start(cursor, duration, window_end) {
            cursor = start + self.hours.step;
            let end = start + duration;

            match self.evaluate(start, end) {
                Ok(conflicts) if conflicts.is_empty() => {
                    info!(%start, %end, "selected earliest perfect slot");
                    return vec![MeetingProposal::perfect(self.request.clone(), start)];
                }
                Ok(conflicts) => {
                    debug!(%start, conflicts = conflicts.len(), "negotiable slot");
                    negotiable.push(MeetingProposal::negotiable(
                        self.request.clone(),
                        start,
                        conflicts,
                    ));
                }
                Err(rejection) => {
                    debug!(%start, ?rejection, "rejected slot");
                }
            }
        }

        // Stable: equal scores keep chronological order.
        negotiable.sort_by(|a, b| a.impact_score.total_cmp(&b.impact_score));
        negotiable.truncate(self.hours.max_proposals);
        info!(proposals = negotiable.len(), "no perfect slot, returning negotiable proposals");
        negotiable
    }

    /// Resolved conflicts for `[start, end)`, empty when the slot is free.
    fn evaluate(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Conflict>, Rejection> {
        if !self.request.preferred_windows.is_empty()
            && !self
                .request
                .preferred_windows
                .iter()
                .any(|w| w.contains(start, end))
        {
            return Err(Rejection::OutsidePreferredWindows);
        }

        let overlaps = find_overlaps(&self.events, start, end);
        let mut conflicts = Vec::with_capacity(overlaps.len());
        for overlap in &overlaps {
            let priority = evaluate_priority(&overlap.event);
            debug!(
                %start,
                event_id = %overlap.event.id,
                priority,
                overlap_minutes = overlap.overlap_minutes,
                "overlapping event"
            );
            if priority >= self.request.priority {
                return Err(Rejection::Unmovable {
                    event_id: overlap.event.id.clone(),
                    priority,
                });
            }
            conflicts.push(Conflict::from_event(&overlap.event, priority));
        }

        let hours = self.hours;
        let excluded = TimeWindow::new(start, end);
        let mut claimed: Vec<TimeWindow> = Vec::new();
        for (conflict, overlap) in conflicts.iter_mut().zip(&overlaps) {
            let attendees = overlap.event.participants();
            let known = self.relocation_events(&overlap.event, &attendees);
            let new_start = relocate_avoiding(
                hours,
                &overlap.event,
                &attendees,
                known,
                excluded,
                &claimed,
            )
            .ok_or_else(|| Rejection::NoRelocation {
                event_id: overlap.event.id.clone(),
            })?;
            conflict.resolve(new_start);
            claimed.push(TimeWindow::new(new_start, new_start + overlap.event.duration()));
        }

        Ok(conflicts)
    }

    fn relocation_events(&mut self, event: &Event, attendees: &[String]) -> &[Event] {
        let store = self.store;
        let horizon = self.hours.relocation_horizon;
        self.relocation_context
            .entry(event.id.clone())
            .or_insert_with(|| {
                fetch_events(
                    store,
                    attendees,
                    event.start,
                    event.start + horizon + event.duration(),
                )
            })
    }
}

/// Every participant's events in the range, de-duplicated by id and sorted by
/// start.
fn fetch_events<S: EventStore + ?Sized>(
    store: &S,
    participants: &[String],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<Event> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut events: Vec<Event> = participants
        .iter()
        .flat_map(|p| store.query(p, start, end))
        .filter(|e| seen.insert(e.id.clone()))
        .collect();
    events.sort_by(|a, b| (a.start, a.end, &a.id).cmp(&(b.start, b.end, &b.id)));
    events
}
