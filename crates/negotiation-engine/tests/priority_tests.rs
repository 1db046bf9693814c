//! Tests for the event priority heuristic.

use chrono::{TimeZone, Utc};
use negotiation_engine::{evaluate_priority, Event};
use proptest::prelude::*;

fn event(title: &str, attendees: usize, recurring: bool, priority: Option<u8>) -> Event {
    Event {
        id: "evt".to_string(),
        title: title.to_string(),
        start: Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 3, 16, 11, 0, 0).unwrap(),
        attendees: (0..attendees).map(|i| format!("user{i}@example.com")).collect(),
        organizer: None,
        priority,
        description: None,
        recurrence: if recurring {
            vec!["FREQ=WEEKLY".to_string()]
        } else {
            vec![]
        },
    }
}

#[test]
fn plain_event_gets_baseline() {
    assert_eq!(evaluate_priority(&event("Design review", 2, false, None)), 3);
}

#[test]
fn explicit_priority_passes_through() {
    // Keywords and attendees would push this to 5; the stored value wins.
    assert_eq!(
        evaluate_priority(&event("Urgent all-hands", 10, false, Some(1))),
        1
    );
    assert_eq!(evaluate_priority(&event("1:1 sync", 1, true, Some(5))), 5);
}

#[test]
fn urgent_large_meeting_scores_high() {
    assert_eq!(
        evaluate_priority(&event("Urgent Team Meeting", 6, false, None)),
        5
    );
}

#[test]
fn recurring_one_on_one_sync_scores_low() {
    // 3 - 1 (recurring) - 1 (sync / 1:1) = 1
    assert_eq!(evaluate_priority(&event("1:1 Sync", 1, true, None)), 1);
}

#[test]
fn keyword_match_is_case_insensitive_substring() {
    assert_eq!(evaluate_priority(&event("VERY IMPORTANT demo", 1, false, None)), 4);
    assert_eq!(evaluate_priority(&event("Weekly CheckIn", 1, false, None)), 2);
    assert_eq!(evaluate_priority(&event("Top PRIORITY item", 1, false, None)), 4);
    assert_eq!(evaluate_priority(&event("Prioritization", 1, false, None)), 3);
}

#[test]
fn raising_and_lowering_keywords_cancel_out() {
    assert_eq!(evaluate_priority(&event("Urgent sync", 2, false, None)), 3);
}

#[test]
fn exactly_three_attendees_does_not_raise() {
    assert_eq!(evaluate_priority(&event("Planning", 3, false, None)), 3);
    assert_eq!(evaluate_priority(&event("Planning", 4, false, None)), 4);
}

#[test]
fn clamped_to_lower_bound() {
    // 3 - 1 (recurring) - 1 (checkin) = 1, cannot drop further.
    assert_eq!(evaluate_priority(&event("checkin 1:1 sync", 0, true, None)), 1);
}

fn arb_title() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Urgent fix".to_string()),
        Just("important: budget".to_string()),
        Just("daily sync".to_string()),
        Just("1:1".to_string()),
        Just("Roadmap".to_string()),
        "[a-zA-Z0-9: ]{0,24}",
    ]
}

proptest! {
    #[test]
    fn derived_priority_always_in_range(
        title in arb_title(),
        attendees in 0usize..12,
        recurring in any::<bool>(),
    ) {
        let e = event(&title, attendees, recurring, None);
        let p = evaluate_priority(&e);
        prop_assert!((1..=5).contains(&p));
        prop_assert_eq!(p, evaluate_priority(&e), "evaluation must be deterministic");
    }

    #[test]
    fn stored_priority_is_idempotent(
        title in arb_title(),
        attendees in 0usize..12,
        recurring in any::<bool>(),
        stored in 1u8..=5,
    ) {
        let e = event(&title, attendees, recurring, Some(stored));
        prop_assert_eq!(evaluate_priority(&e), stored);
    }
}
