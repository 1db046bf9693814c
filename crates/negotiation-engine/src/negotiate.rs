//! Execute an accepted proposal against the event store.
//!
//! Sequence: re-check every conflict, delete each displaced event once, create
//! the new meeting, then recreate the displaced events at their relocation
//! slots. This is a best-effort saga rather than a transaction. The only
//! compensation is removing the new meeting when a recreation fails; displaced
//! events that were deleted but not recreated are reported in `lost` and left
//! for the caller to repair.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::conflict::Conflict;
use crate::error::NegotiationError;
use crate::hours::BusinessHours;
use crate::model::{Event, NewEvent};
use crate::slots::MeetingProposal;
use crate::store::EventStore;

/// Where a displaced event ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relocation {
    pub original_id: String,
    /// Id of the recreated event.
    pub new_id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<String>,
    pub priority: u8,
    /// Original slot, e.g. `"Mon Mar 16 10:00 AM - 11:00 AM EDT"`.
    pub original_time: String,
}

/// A fully executed negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationOutcome {
    pub event: Event,
    /// Keyed by the displaced event's original id.
    pub relocated: BTreeMap<String, Relocation>,
}

/// Apply `proposal` to `store`.
///
/// # Errors
/// `PriorityViolation` or `UnresolvedConflict` when the proposal should never
/// have been offered (nothing is mutated), `DeleteFailed`, `CreateFailed` or
/// `RelocationFailed` when the store rejects a step.
pub fn execute<S: EventStore + ?Sized>(
    store: &mut S,
    hours: &BusinessHours,
    proposal: &MeetingProposal,
) -> Result<NegotiationOutcome, NegotiationError> {
    let request = &proposal.request;
    for conflict in &proposal.conflicts {
        if conflict.priority >= request.priority {
            return Err(NegotiationError::PriorityViolation {
                event_id: conflict.event_id.clone(),
                title: conflict.title.clone(),
                priority: conflict.priority,
                request_priority: request.priority,
            });
        }
        if !conflict.is_resolved() {
            return Err(NegotiationError::UnresolvedConflict {
                event_id: conflict.event_id.clone(),
                title: conflict.title.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    let moves: Vec<&Conflict> = proposal
        .conflicts
        .iter()
        .filter(|c| seen.insert(c.event_id.as_str()))
        .collect();

    let mut deleted: Vec<String> = Vec::with_capacity(moves.len());
    for conflict in &moves {
        if !store.delete(&conflict.event_id) {
            error!(event_id = %conflict.event_id, title = %conflict.title, "failed to delete conflicting event");
            return Err(NegotiationError::DeleteFailed {
                event_id: conflict.event_id.clone(),
                title: conflict.title.clone(),
                lost: deleted,
            });
        }
        info!(
            event_id = %conflict.event_id,
            title = %conflict.title,
            original = %hours.format_dated_range(conflict.start, conflict.end),
            "deleted conflicting event"
        );
        deleted.push(conflict.event_id.clone());
    }

    let event = match store.create(request.to_new_event(proposal.start)) {
        Ok(event) => event,
        Err(source) => {
            error!(title = %request.title, %source, "failed to create meeting");
            return Err(NegotiationError::CreateFailed {
                title: request.title.clone(),
                source,
                lost: deleted,
            });
        }
    };
    info!(event_id = %event.id, title = %event.title, start = %event.start, "created meeting");

    let mut relocated = BTreeMap::new();
    for (index, conflict) in moves.iter().enumerate() {
        let original_time = hours.format_dated_range(conflict.start, conflict.end);
        match store.create(moved_event(conflict, &request.title, &original_time)) {
            Ok(moved) => {
                info!(
                    original_id = %conflict.event_id,
                    new_id = %moved.id,
                    title = %moved.title,
                    to = %hours.format_dated_range(moved.start, moved.end),
                    "moved event"
                );
                relocated.insert(
                    conflict.event_id.clone(),
                    Relocation {
                        original_id: conflict.event_id.clone(),
                        new_id: moved.id,
                        title: moved.title,
                        start: moved.start,
                        end: moved.end,
                        attendees: moved.attendees,
                        priority: conflict.priority,
                        original_time,
                    },
                );
            }
            Err(source) => {
                let compensated = store.delete(&event.id);
                warn!(
                    event_id = %event.id,
                    compensated,
                    "rolled back new meeting after failed relocation"
                );
                return Err(NegotiationError::RelocationFailed {
                    event_id: conflict.event_id.clone(),
                    title: conflict.title.clone(),
                    source,
                    compensated,
                    lost: moves[index..].iter().map(|c| c.event_id.clone()).collect(),
                });
            }
        }
    }

    Ok(NegotiationOutcome { event, relocated })
}

/// The displaced event recreated at its relocation slot.
fn moved_event(conflict: &Conflict, displaced_by: &str, original_time: &str) -> NewEvent {
    let note = format!("Rescheduled from {original_time} due to conflict with '{displaced_by}'");
    let description = match conflict.description.as_deref() {
        Some(existing) if !existing.is_empty() => format!("{note}\n\n{existing}"),
        _ => note,
    };

    // Only called on resolved conflicts.
    let start = conflict.relocation_start.unwrap_or(conflict.start);
    let end = conflict.relocation_end.unwrap_or(conflict.end);

    NewEvent {
        title: conflict.title.clone(),
        start,
        end,
        attendees: conflict.attendees.clone(),
        organizer: conflict.organizer.clone(),
        priority: conflict.stored_priority,
        description: Some(description),
        recurrence: conflict.recurrence.clone(),
    }
}
