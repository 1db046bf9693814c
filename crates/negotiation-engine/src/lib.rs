//! # negotiation-engine
//!
//! Priority-aware meeting scheduling across shared calendars.
//!
//! Given a meeting request and the participants' existing events, the engine
//! finds a start time that is either free for everyone, or blocked only by
//! lower-priority events that can themselves be moved to free slots. An
//! accepted proposal is then executed against the event store: displaced
//! events are deleted, the meeting is created, and the displaced events are
//! recreated at their new times.
//!
//! ## Modules
//!
//! - [`scheduler`]: `Scheduler`, the entry points over one store
//! - [`slots`]: candidate search and proposal ranking
//! - [`relocate`]: find a new slot for a displaced event
//! - [`negotiate`]: delete/create/recreate with compensation
//! - [`priority`]: heuristic priority for events stored without one
//! - [`store`]: `EventStore` trait and the in-memory backend
//! - [`conflict`]: overlap detection and the `Conflict` record
//! - [`freebusy`]: merge busy periods and compute free gaps
//! - [`availability`]: merged availability across participants
//! - [`hours`]: business-day arithmetic in the reference timezone
//! - [`config`]: `SchedulingConfig` (TOML)
//! - [`model`]: events and meeting requests
//! - [`scenario`]: JSON scenario documents
//! - [`summary`]: human-readable proposal and outcome text
//! - [`error`]: Error types

pub mod availability;
pub mod config;
pub mod conflict;
pub mod error;
pub mod freebusy;
pub mod hours;
pub mod model;
pub mod negotiate;
pub mod priority;
pub mod relocate;
pub mod scenario;
pub mod scheduler;
pub mod slots;
pub mod store;
pub mod summary;

pub use config::SchedulingConfig;
pub use conflict::{find_overlaps, Conflict};
pub use error::{
    ConfigError, NegotiationError, ScenarioError, SchedulingError, StoreError, ValidationError,
};
pub use freebusy::{BusyPeriod, FreeSlot};
pub use hours::BusinessHours;
pub use model::{Event, MeetingRequest, NewEvent, TimeWindow};
pub use negotiate::{NegotiationOutcome, Relocation};
pub use priority::evaluate_priority;
pub use relocate::relocate;
pub use scenario::Scenario;
pub use scheduler::Scheduler;
pub use slots::{find_slots, MeetingProposal};
pub use store::{EventStore, InMemoryEventStore};
