//! Tests for the in-memory event store.

use chrono::{DateTime, TimeZone, Utc};
use negotiation_engine::{EventStore, InMemoryEventStore, NewEvent, StoreError};

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, hour, min, 0).unwrap()
}

#[test]
fn create_stores_under_every_participant() {
    let mut store = InMemoryEventStore::new();

    let created = store
        .create(
            NewEvent::new("Planning", at(10, 0), at(11, 0))
                .with_attendees(["bob@x.io", "cat@x.io"])
                .with_organizer("ann@x.io")
                .with_priority(3),
        )
        .unwrap();

    assert!(!created.id.is_empty());
    for who in ["ann@x.io", "bob@x.io", "cat@x.io"] {
        let events = store.query(who, at(0, 0), at(23, 0));
        assert_eq!(events.len(), 1, "{who} should see the event");
        assert_eq!(events[0].id, created.id);
    }
    assert_eq!(store.len(), 1, "one event, many calendars");
}

#[test]
fn ids_are_unique() {
    let mut store = InMemoryEventStore::new();
    let a = store
        .create(NewEvent::new("A", at(9, 0), at(10, 0)).with_attendees(["ann@x.io"]))
        .unwrap();
    let b = store
        .create(NewEvent::new("A", at(9, 0), at(10, 0)).with_attendees(["ann@x.io"]))
        .unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(store.len(), 2);
}

#[test]
fn duplicate_attendees_are_collapsed() {
    let mut store = InMemoryEventStore::new();
    let created = store
        .create(
            NewEvent::new("Sync", at(9, 0), at(10, 0))
                .with_attendees(["ann@x.io", "bob@x.io", "ann@x.io"]),
        )
        .unwrap();

    assert_eq!(created.attendees, vec!["ann@x.io", "bob@x.io"]);
    assert_eq!(store.query("ann@x.io", at(0, 0), at(23, 0)).len(), 1);
}

#[test]
fn delete_removes_from_every_participant() {
    let mut store = InMemoryEventStore::new();
    let created = store
        .create(NewEvent::new("Review", at(9, 0), at(10, 0)).with_attendees(["ann@x.io", "bob@x.io"]))
        .unwrap();

    assert!(store.delete(&created.id));

    assert!(store.query("ann@x.io", at(0, 0), at(23, 0)).is_empty());
    assert!(store.query("bob@x.io", at(0, 0), at(23, 0)).is_empty());
    assert!(store.get(&created.id).is_none());
    assert!(store.is_empty());
}

#[test]
fn deleting_unknown_event_reports_false() {
    let mut store = InMemoryEventStore::new();
    assert!(!store.delete("missing"));

    let created = store
        .create(NewEvent::new("Review", at(9, 0), at(10, 0)).with_attendees(["ann@x.io"]))
        .unwrap();
    assert!(store.delete(&created.id));
    assert!(!store.delete(&created.id), "second delete finds nothing");
}

#[test]
fn query_is_half_open() {
    let mut store = InMemoryEventStore::new();
    store
        .create(NewEvent::new("Morning", at(9, 0), at(10, 0)).with_attendees(["ann@x.io"]))
        .unwrap();

    assert!(store.query("ann@x.io", at(10, 0), at(11, 0)).is_empty());
    assert!(store.query("ann@x.io", at(8, 0), at(9, 0)).is_empty());
    assert_eq!(store.query("ann@x.io", at(9, 59), at(11, 0)).len(), 1);
}

#[test]
fn query_unknown_participant_is_empty() {
    let store = InMemoryEventStore::new();
    assert!(store.query("nobody@x.io", at(0, 0), at(23, 0)).is_empty());
}

#[test]
fn create_rejects_invalid_events() {
    let mut store = InMemoryEventStore::new();

    let backwards = store.create(NewEvent::new("Oops", at(10, 0), at(9, 0)).with_attendees(["ann@x.io"]));
    assert!(matches!(backwards, Err(StoreError::InvalidRange { .. })));

    let empty = store.create(NewEvent::new("Oops", at(10, 0), at(10, 0)).with_attendees(["ann@x.io"]));
    assert!(matches!(empty, Err(StoreError::InvalidRange { .. })));

    let loud = store.create(
        NewEvent::new("Oops", at(9, 0), at(10, 0))
            .with_attendees(["ann@x.io"])
            .with_priority(9),
    );
    assert_eq!(
        loud,
        Err(StoreError::InvalidPriority {
            title: "Oops".to_string(),
            priority: 9
        })
    );

    let lonely = store.create(NewEvent::new("Oops", at(9, 0), at(10, 0)));
    assert_eq!(lonely, Err(StoreError::NoParticipants("Oops".to_string())));

    assert!(store.is_empty());
}

#[test]
fn events_lists_each_event_once_in_start_order() {
    let mut store = InMemoryEventStore::new();
    store
        .create(NewEvent::new("Late", at(15, 0), at(16, 0)).with_attendees(["ann@x.io", "bob@x.io"]))
        .unwrap();
    store
        .create(NewEvent::new("Early", at(9, 0), at(10, 0)).with_attendees(["bob@x.io"]))
        .unwrap();

    let titles: Vec<String> = store.events().into_iter().map(|e| e.title).collect();
    assert_eq!(titles, vec!["Early", "Late"]);
    assert_eq!(
        store.participants().collect::<Vec<_>>(),
        vec!["ann@x.io", "bob@x.io"]
    );
}
