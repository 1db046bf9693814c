//! JSON scenario documents: seed events, one meeting request, a search window.
//!
//! ```json
//! {
//!   "events": [
//!     {"title": "Standup", "start": "2026-03-16T09:00:00-04:00",
//!      "end": "2026-03-16T09:30:00-04:00", "attendees": ["ann@example.com"]}
//!   ],
//!   "request": {"title": "Planning", "duration_minutes": 60,
//!               "organizer": "ann@example.com", "attendees": ["bob@example.com"],
//!               "priority": 3},
//!   "window": {"start": "2026-03-16T00:00:00Z", "end": "2026-03-20T00:00:00Z"}
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;
use crate::model::{MeetingRequest, NewEvent, TimeWindow};
use crate::store::{EventStore, InMemoryEventStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub events: Vec<NewEvent>,
    pub request: Option<MeetingRequest>,
    pub window: Option<TimeWindow>,
}

impl Scenario {
    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// An in-memory store holding every seed event.
    ///
    /// # Errors
    /// Fails on the first event the store rejects.
    pub fn seed_store(&self) -> Result<InMemoryEventStore, ScenarioError> {
        let mut store = InMemoryEventStore::new();
        for event in &self.events {
            store.create(event.clone())?;
        }
        Ok(store)
    }
}
