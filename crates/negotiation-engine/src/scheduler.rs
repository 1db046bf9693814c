//! The engine's entry points bundled with a store and validated configuration.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::availability::{self, Agenda, Availability, PrivacyLevel};
use crate::config::SchedulingConfig;
use crate::error::{ConfigError, NegotiationError, SchedulingError, ValidationError};
use crate::hours::BusinessHours;
use crate::model::{Event, MeetingRequest};
use crate::negotiate::{self, NegotiationOutcome};
use crate::priority;
use crate::slots::{self, MeetingProposal};
use crate::store::EventStore;

/// Finds slots in, and negotiates against, one event store.
///
/// Mutation goes through `&mut self`, so one scheduler never runs two
/// negotiations at once. Share it across threads behind a lock.
#[derive(Debug, Clone)]
pub struct Scheduler<S> {
    store: S,
    config: SchedulingConfig,
    hours: BusinessHours,
}

impl<S: EventStore> Scheduler<S> {
    /// # Errors
    /// Returns a `ConfigError` when `config` does not validate.
    pub fn new(store: S, config: SchedulingConfig) -> Result<Self, ConfigError> {
        let hours = config.business_hours()?;
        Ok(Self {
            store,
            config,
            hours,
        })
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    pub fn hours(&self) -> &BusinessHours {
        &self.hours
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn evaluate_priority(&self, event: &Event) -> u8 {
        priority::evaluate_priority(event)
    }

    /// See [`slots::find_slots`].
    pub fn find_slots(
        &self,
        request: &MeetingRequest,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<MeetingProposal>, ValidationError> {
        slots::find_slots(&self.store, &self.hours, request, window_start, window_end)
    }

    /// Like [`Scheduler::find_slots`], but an empty result becomes
    /// `SchedulingError::NoSlotsFound` listing the participants' busy periods.
    pub fn propose(
        &self,
        request: &MeetingRequest,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<MeetingProposal>, SchedulingError> {
        let proposals = self.find_slots(request, window_start, window_end)?;
        if !proposals.is_empty() {
            return Ok(proposals);
        }

        let busy = self
            .availability(
                &request.participants(),
                window_start,
                window_end,
                PrivacyLevel::Opaque,
            )
            .busy_periods();
        warn!(
            title = %request.title,
            busy_periods = busy.len(),
            "no slot found for meeting"
        );
        Err(SchedulingError::NoSlotsFound {
            duration_minutes: request.duration_minutes,
            window_start,
            window_end,
            busy,
        })
    }

    /// See [`negotiate::execute`].
    pub fn execute_negotiation(
        &mut self,
        proposal: &MeetingProposal,
    ) -> Result<NegotiationOutcome, NegotiationError> {
        negotiate::execute(&mut self.store, &self.hours, proposal)
    }

    pub fn availability(
        &self,
        participants: &[String],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        privacy: PrivacyLevel,
    ) -> Availability {
        let calendars =
            availability::collect_calendars(&self.store, participants, window_start, window_end);
        availability::merge_availability(&calendars, window_start, window_end, privacy)
    }

    /// Each participant's events in the window with their effective priority.
    pub fn agendas(
        &self,
        participants: &[String],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Vec<Agenda> {
        availability::collect_calendars(&self.store, participants, window_start, window_end)
            .iter()
            .map(Agenda::from)
            .collect()
    }
}
