//! Heuristic priority for events that were stored without one.

use crate::model::{Event, MAX_PRIORITY, MIN_PRIORITY};

const BASELINE: i32 = 3;
const RAISING_KEYWORDS: [&str; 3] = ["urgent", "important", "priority"];
const LOWERING_KEYWORDS: [&str; 3] = ["sync", "checkin", "1:1"];

/// Priority of `event` in `1..=5`.
///
/// An explicit priority is returned unchanged. Otherwise start from 3, add one
/// for more than three attendees, subtract one for recurring events, add one
/// if the title mentions urgency and subtract one if it reads like a routine
/// sync or 1:1. Keyword matching is a case-insensitive substring match.
pub fn evaluate_priority(event: &Event) -> u8 {
    if let Some(priority) = event.priority {
        return priority;
    }

    let mut priority = BASELINE;
    if event.attendees.len() > 3 {
        priority += 1;
    }
    if event.is_recurring() {
        priority -= 1;
    }

    let title = event.title.to_lowercase();
    if RAISING_KEYWORDS.iter().any(|kw| title.contains(kw)) {
        priority += 1;
    }
    if LOWERING_KEYWORDS.iter().any(|kw| title.contains(kw)) {
        priority -= 1;
    }

    priority.clamp(i32::from(MIN_PRIORITY), i32::from(MAX_PRIORITY)) as u8
}
