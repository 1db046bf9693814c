//! Calendar events and meeting requests.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::hours::BusinessHours;

/// Highest priority an event or request may carry.
pub const MAX_PRIORITY: u8 = 5;
/// Lowest priority an event or request may carry.
pub const MIN_PRIORITY: u8 = 1;

/// A stored calendar event. Only [`EventStore`](crate::store::EventStore)
/// implementations construct these; everyone else works on clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// RRULE strings; their presence marks the event as recurring.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recurrence: Vec<String>,
}

impl Event {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_recurring(&self) -> bool {
        !self.recurrence.is_empty()
    }

    /// Attendees plus the organizer, without duplicates.
    pub fn participants(&self) -> Vec<String> {
        participants_of(self.organizer.as_deref(), &self.attendees)
    }

    pub fn involves(&self, participant: &str) -> bool {
        self.organizer.as_deref() == Some(participant)
            || self.attendees.iter().any(|a| a == participant)
    }

    /// Half-open overlap with `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

/// Payload for [`EventStore::create`](crate::store::EventStore::create).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub recurrence: Vec<String>,
}

impl NewEvent {
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            attendees: Vec::new(),
            organizer: None,
            priority: None,
            description: None,
            recurrence: Vec::new(),
        }
    }

    pub fn with_attendees<I, S>(mut self, attendees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attendees = attendees.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_organizer(mut self, organizer: impl Into<String>) -> Self {
        self.organizer = Some(organizer.into());
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_recurrence(mut self, rule: impl Into<String>) -> Self {
        self.recurrence.push(rule.into());
        self
    }

    pub fn participants(&self) -> Vec<String> {
        participants_of(self.organizer.as_deref(), &self.attendees)
    }

    /// Attach a store-assigned id.
    pub fn into_event(self, id: String) -> Event {
        Event {
            id,
            title: self.title,
            start: self.start,
            end: self.end,
            attendees: self.attendees,
            organizer: self.organizer,
            priority: self.priority,
            description: self.description,
            recurrence: self.recurrence,
        }
    }
}

/// A closed-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }

    pub fn contains(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start <= start && end <= self.end
    }
}

/// A request to place a new meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub title: String,
    pub duration_minutes: i64,
    pub organizer: String,
    #[serde(default)]
    pub attendees: Vec<String>,
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When non-empty, candidates must fall entirely inside one of these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_windows: Vec<TimeWindow>,
}

impl MeetingRequest {
    pub fn new<I, S>(
        title: impl Into<String>,
        duration_minutes: i64,
        organizer: impl Into<String>,
        attendees: I,
        priority: u8,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            duration_minutes,
            organizer: organizer.into(),
            attendees: attendees.into_iter().map(Into::into).collect(),
            priority,
            description: None,
            preferred_windows: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_preferred_window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.preferred_windows.push(TimeWindow::new(start, end));
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }

    /// Organizer first, then attendees, without duplicates.
    pub fn participants(&self) -> Vec<String> {
        participants_of(Some(&self.organizer), &self.attendees)
    }

    /// Reject requests that can never be placed.
    pub fn validate(&self, hours: &BusinessHours) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.organizer.trim().is_empty() {
            return Err(ValidationError::EmptyOrganizer);
        }
        if self.duration_minutes <= 0 {
            return Err(ValidationError::NonPositiveDuration(self.duration_minutes));
        }
        if self.duration_minutes > hours.business_minutes() {
            return Err(ValidationError::DurationExceedsBusinessDay {
                duration_minutes: self.duration_minutes,
                business_minutes: hours.business_minutes(),
            });
        }
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&self.priority) {
            return Err(ValidationError::PriorityOutOfRange(self.priority));
        }
        Ok(())
    }

    /// The event created when this request is scheduled at `start`.
    pub fn to_new_event(&self, start: DateTime<Utc>) -> NewEvent {
        NewEvent {
            title: self.title.clone(),
            start,
            end: start + self.duration(),
            attendees: self.attendees.clone(),
            organizer: Some(self.organizer.clone()),
            priority: Some(self.priority),
            description: self.description.clone(),
            recurrence: Vec::new(),
        }
    }
}

fn participants_of(organizer: Option<&str>, attendees: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(attendees.len() + 1);
    for p in organizer.into_iter().chain(attendees.iter().map(String::as_str)) {
        if !out.iter().any(|seen| seen == p) {
            out.push(p.to_string());
        }
    }
    out
}
