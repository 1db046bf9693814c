//! Error types for negotiation-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::freebusy::BusyPeriod;

/// A meeting request that cannot be searched at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("meeting title must not be empty")]
    EmptyTitle,

    #[error("meeting organizer must not be empty")]
    EmptyOrganizer,

    #[error("meeting duration must be positive, got {0} minutes")]
    NonPositiveDuration(i64),

    #[error(
        "meeting duration ({duration_minutes} minutes) exceeds the business day ({business_minutes} minutes)"
    )]
    DurationExceedsBusinessDay {
        duration_minutes: i64,
        business_minutes: i64,
    },

    #[error("priority must be between 1 and 5, got {0}")]
    PriorityOutOfRange(u8),

    #[error("search window is empty: {start} is not before {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Failures surfaced by the slot search entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The window was exhausted without a perfect or negotiable proposal.
    /// `busy` lists the participants' merged busy periods for diagnosis.
    #[error("no {duration_minutes}-minute slot found between {window_start} and {window_end}")]
    NoSlotsFound {
        duration_minutes: i64,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        busy: Vec<BusyPeriod>,
    },
}

/// Failures while executing a negotiation against the event store.
///
/// Every variant raised after the first deletion carries `lost`: ids of
/// conflicting events that were deleted and not recreated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NegotiationError {
    #[error(
        "conflict '{title}' ({event_id}) has priority {priority}, which is not below the request priority {request_priority}"
    )]
    PriorityViolation {
        event_id: String,
        title: String,
        priority: u8,
        request_priority: u8,
    },

    #[error("conflict '{title}' ({event_id}) has no relocation slot")]
    UnresolvedConflict { event_id: String, title: String },

    #[error("failed to delete conflicting event '{title}' ({event_id})")]
    DeleteFailed {
        event_id: String,
        title: String,
        lost: Vec<String>,
    },

    #[error("failed to create meeting '{title}': {source}")]
    CreateFailed {
        title: String,
        #[source]
        source: StoreError,
        lost: Vec<String>,
    },

    #[error("failed to recreate moved event '{title}' ({event_id}): {source}")]
    RelocationFailed {
        event_id: String,
        title: String,
        #[source]
        source: StoreError,
        /// Whether the newly created meeting was removed again.
        compensated: bool,
        lost: Vec<String>,
    },
}

/// Rejections from [`crate::store::EventStore::create`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("event '{title}' ends ({end}) before or when it starts ({start})")]
    InvalidRange {
        title: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("event '{title}' has priority {priority}, expected 1-5")]
    InvalidPriority { title: String, priority: u8 },

    #[error("event '{0}' has neither attendees nor an organizer")]
    NoParticipants(String),

    #[error("event store unavailable: {0}")]
    Unavailable(String),
}

/// Invalid scheduling configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("business hours must satisfy start < end <= 24, got {start}..{end}")]
    InvalidBusinessHours { start: u32, end: u32 },

    #[error("slot step must be between 1 and 1440 minutes, got {0}")]
    InvalidStep(u32),

    #[error("relocation horizon must be at least one day, got {0}")]
    InvalidHorizon(u32),

    #[error("max_proposals must be at least 1")]
    InvalidMaxProposals,

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while loading a JSON scenario.
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("scenario parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to seed event: {0}")]
    Store(#[from] StoreError),
}
