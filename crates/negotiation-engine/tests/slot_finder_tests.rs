//! Tests for the slot search: perfect slots, negotiable slots, ranking.

use chrono::{DateTime, TimeZone, Utc};
use negotiation_engine::{
    EventStore, InMemoryEventStore, MeetingRequest, NewEvent, Scheduler, SchedulingConfig,
    SchedulingError, ValidationError,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

/// 2026-03-16 is a Monday.
fn at(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, min, 0).unwrap()
}

fn scheduler(events: Vec<NewEvent>) -> Scheduler<InMemoryEventStore> {
    let mut store = InMemoryEventStore::new();
    for event in events {
        store.create(event).unwrap();
    }
    Scheduler::new(store, SchedulingConfig::with_timezone("UTC")).unwrap()
}

fn busy(
    title: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    attendees: &[&str],
    priority: u8,
) -> NewEvent {
    NewEvent::new(title, start, end)
        .with_attendees(attendees.iter().copied())
        .with_priority(priority)
}

fn request(priority: u8) -> MeetingRequest {
    MeetingRequest::new("Planning", 60, "ann@x.io", ["bob@x.io"], priority)
}

// ── Perfect slots ───────────────────────────────────────────────────────────

#[test]
fn earliest_free_slot_wins_outright() {
    let s = scheduler(vec![busy("Standup", at(16, 9, 0), at(16, 10, 0), &["ann@x.io"], 5)]);

    let proposals = s.find_slots(&request(3), at(16, 0, 0), at(20, 0, 0)).unwrap();

    assert_eq!(proposals.len(), 1);
    let p = &proposals[0];
    assert!(p.is_perfect());
    assert_eq!(p.start, at(16, 10, 0));
    assert_eq!(p.end, at(16, 11, 0));
    assert_eq!(p.impact_score, 0.0);
    assert!(p.affected_attendees.is_empty());
}

#[test]
fn weekend_window_start_moves_to_monday_morning() {
    let s = scheduler(vec![]);

    // Saturday 2026-03-21.
    let proposals = s.find_slots(&request(3), at(21, 0, 0), at(25, 0, 0)).unwrap();

    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].start, at(23, 9, 0));
}

#[test]
fn business_hours_follow_reference_timezone() {
    let store = InMemoryEventStore::new();
    let s = Scheduler::new(store, SchedulingConfig::with_timezone("America/New_York")).unwrap();

    let proposals = s.find_slots(&request(3), at(16, 0, 0), at(20, 0, 0)).unwrap();

    // 09:00 EDT
    assert_eq!(proposals[0].start, at(16, 13, 0));
}

#[test]
fn touching_events_do_not_conflict() {
    let s = scheduler(vec![
        busy("Morning", at(16, 9, 0), at(16, 10, 0), &["ann@x.io"], 5),
        busy("Later", at(16, 11, 0), at(16, 12, 0), &["bob@x.io"], 5),
    ]);

    let proposals = s.find_slots(&request(3), at(16, 0, 0), at(17, 0, 0)).unwrap();

    assert_eq!(proposals[0].start, at(16, 10, 0));
    assert!(proposals[0].is_perfect());
}

#[test]
fn preferred_windows_restrict_candidates() {
    let s = scheduler(vec![]);
    let req = request(3).with_preferred_window(at(17, 14, 0), at(17, 16, 0));

    let proposals = s.find_slots(&req, at(16, 0, 0), at(20, 0, 0)).unwrap();

    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].start, at(17, 14, 0));
}

// ── Negotiable slots ────────────────────────────────────────────────────────

#[test]
fn lower_priority_blocker_yields_ranked_negotiable_proposals() {
    let s = scheduler(vec![busy(
        "Design review",
        at(16, 9, 0),
        at(16, 17, 0),
        &["ann@x.io", "bob@x.io"],
        2,
    )]);

    let proposals = s.find_slots(&request(4), at(16, 9, 0), at(16, 17, 0)).unwrap();

    // Every candidate scores the same, so the cap keeps the three earliest.
    assert_eq!(proposals.len(), 3);
    let starts: Vec<_> = proposals.iter().map(|p| p.start).collect();
    assert_eq!(starts, vec![at(16, 9, 0), at(16, 9, 30), at(16, 10, 0)]);

    for p in &proposals {
        assert!(!p.is_perfect());
        assert_eq!(p.conflicts.len(), 1, "shared event is reported once");
        assert_eq!(p.impact_score, 1.0 + 0.5 * 2.0);
        let conflict = &p.conflicts[0];
        assert_eq!(conflict.title, "Design review");
        assert_eq!(conflict.priority, 2);
        assert!(conflict.is_resolved());
        // Eight hours only fit on Tuesday.
        assert_eq!(conflict.relocation_start, Some(at(17, 9, 0)));
        assert_eq!(conflict.relocation_end, Some(at(17, 17, 0)));
    }
}

#[test]
fn impact_score_counts_attendees_not_organizers() {
    let s = scheduler(vec![busy(
        "Vendor call",
        at(16, 9, 0),
        at(16, 10, 0),
        &["ann@x.io", "bob@x.io"],
        2,
    )
    .with_organizer("carol@x.io")]);

    let proposals = s.find_slots(&request(4), at(16, 9, 0), at(16, 9, 30)).unwrap();

    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].impact_score, 2.0);
    assert_eq!(
        proposals[0].affected_attendees.iter().collect::<Vec<_>>(),
        vec!["ann@x.io", "bob@x.io"]
    );
    assert_eq!(proposals[0].conflicts[0].organizer.as_deref(), Some("carol@x.io"));
    assert_eq!(proposals[0].conflicts[0].relocation_start, Some(at(16, 10, 0)));
}

#[test]
fn proposals_are_ordered_by_impact_score() {
    let s = scheduler(vec![
        busy("Roadmap", at(16, 9, 0), at(16, 10, 30), &["ann@x.io", "bob@x.io", "cat@x.io"], 2),
        busy("Inbox zero", at(16, 10, 30), at(16, 12, 0), &["ann@x.io"], 1),
    ]);

    // Candidate starts 09:00 through 11:00.
    let proposals = s.find_slots(&request(3), at(16, 9, 0), at(16, 11, 30)).unwrap();

    let ranked: Vec<_> = proposals.iter().map(|p| (p.start, p.impact_score)).collect();
    assert_eq!(
        ranked,
        vec![
            (at(16, 10, 30), 1.5),
            (at(16, 11, 0), 1.5),
            (at(16, 9, 0), 2.5),
        ]
    );
    assert_eq!(
        proposals[2].affected_attendees.iter().collect::<Vec<_>>(),
        vec!["ann@x.io", "bob@x.io", "cat@x.io"]
    );
}

#[test]
fn equal_priority_blocks_the_slot() {
    let s = scheduler(vec![busy(
        "Design review",
        at(16, 9, 0),
        at(16, 17, 0),
        &["ann@x.io"],
        3,
    )]);

    let proposals = s.find_slots(&request(3), at(16, 9, 0), at(16, 17, 0)).unwrap();

    assert!(proposals.is_empty());
}

#[test]
fn conflict_without_relocation_slot_disqualifies_candidate() {
    let s = scheduler(vec![
        busy("Sync", at(16, 9, 0), at(16, 17, 0), &["ann@x.io", "dan@x.io"], 1),
        // Dan is booked for the whole relocation horizon.
        busy("Offsite", at(16, 17, 0), at(25, 18, 0), &["dan@x.io"], 5),
    ]);

    let proposals = s.find_slots(&request(4), at(16, 9, 0), at(16, 17, 0)).unwrap();

    assert!(proposals.is_empty());
}

// ── Failures ────────────────────────────────────────────────────────────────

#[test]
fn top_priority_blocker_leaves_no_proposal() {
    let s = scheduler(vec![busy(
        "Board meeting",
        at(16, 9, 0),
        at(16, 17, 0),
        &["ann@x.io"],
        5,
    )]);

    let proposals = s.find_slots(&request(5), at(16, 9, 0), at(16, 17, 0)).unwrap();
    assert!(proposals.is_empty());

    let err = s.propose(&request(5), at(16, 9, 0), at(16, 17, 0)).unwrap_err();
    match err {
        SchedulingError::NoSlotsFound {
            duration_minutes,
            busy,
            ..
        } => {
            assert_eq!(duration_minutes, 60);
            assert_eq!(busy.len(), 1);
            assert_eq!(busy[0].start, at(16, 9, 0));
            assert_eq!(busy[0].end, at(16, 17, 0));
        }
        other => panic!("expected NoSlotsFound, got {other:?}"),
    }
}

#[test]
fn duration_longer_than_business_day_is_rejected() {
    let s = scheduler(vec![]);
    let req = MeetingRequest::new("Marathon", 600, "ann@x.io", ["bob@x.io"], 3);

    let err = s.find_slots(&req, at(16, 0, 0), at(20, 0, 0)).unwrap_err();

    assert_eq!(
        err,
        ValidationError::DurationExceedsBusinessDay {
            duration_minutes: 600,
            business_minutes: 480,
        }
    );
}

#[test]
fn malformed_requests_are_rejected_before_searching() {
    let s = scheduler(vec![]);

    let untitled = MeetingRequest::new("  ", 30, "ann@x.io", ["bob@x.io"], 3);
    assert_eq!(
        s.find_slots(&untitled, at(16, 0, 0), at(20, 0, 0)),
        Err(ValidationError::EmptyTitle)
    );

    let zero = MeetingRequest::new("Sync", 0, "ann@x.io", ["bob@x.io"], 3);
    assert_eq!(
        s.find_slots(&zero, at(16, 0, 0), at(20, 0, 0)),
        Err(ValidationError::NonPositiveDuration(0))
    );

    let loud = MeetingRequest::new("Sync", 30, "ann@x.io", ["bob@x.io"], 6);
    assert_eq!(
        s.find_slots(&loud, at(16, 0, 0), at(20, 0, 0)),
        Err(ValidationError::PriorityOutOfRange(6))
    );

    let err = s.propose(&request(3), at(20, 0, 0), at(16, 0, 0)).unwrap_err();
    assert!(matches!(
        err,
        SchedulingError::Validation(ValidationError::InvalidWindow { .. })
    ));
}
