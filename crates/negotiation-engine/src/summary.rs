//! Plain-text descriptions of proposals and negotiation results, for showing
//! to the people whose meetings are about to move.

use crate::conflict::Conflict;
use crate::hours::BusinessHours;
use crate::negotiate::NegotiationOutcome;
use crate::slots::MeetingProposal;

/// Describe a proposal, listing each participant's conflicts with their
/// current and proposed times.
pub fn describe_proposal(hours: &BusinessHours, proposal: &MeetingProposal) -> String {
    let request = &proposal.request;
    let mut lines = vec![
        format!(
            "Scheduling '{}' (Priority: {})",
            request.title, request.priority
        ),
        format!("Start: {}", hours.format_instant(proposal.start)),
        format!("End: {}", hours.format_instant(proposal.end)),
        format!("Organizer: {}", request.organizer),
        format!("Attendees: {}", request.attendees.join(", ")),
    ];

    if proposal.is_perfect() {
        lines.push(String::new());
        lines.push("All participants are free at this time.".to_string());
        return join_lines(lines);
    }

    lines.push(String::new());
    lines.push(format!(
        "This slot has {} conflict(s) that can be rescheduled (impact score {:.1}):",
        proposal.conflicts.len(),
        proposal.impact_score
    ));
    for participant in request.participants() {
        let theirs: Vec<&Conflict> = proposal
            .conflicts
            .iter()
            .filter(|c| c.participants().contains(&participant))
            .collect();
        if theirs.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{participant}:"));
        for conflict in theirs {
            lines.push(format!("- {} (Priority: {})", conflict.title, conflict.priority));
            lines.push(format!(
                "  Current time: {}",
                hours.format_dated_range(conflict.start, conflict.end)
            ));
            if let (Some(start), Some(end)) = (conflict.relocation_start, conflict.relocation_end) {
                lines.push(format!(
                    "  Proposed time: {}",
                    hours.format_dated_range(start, end)
                ));
            }
            lines.push(format!("  Attendees: {}", conflict.attendees.join(", ")));
        }
    }

    let affected: Vec<&str> = proposal.affected_attendees.iter().map(String::as_str).collect();
    lines.push(String::new());
    lines.push(format!("Total affected attendees: {}", affected.join(", ")));
    join_lines(lines)
}

/// Describe a completed negotiation.
pub fn describe_outcome(hours: &BusinessHours, outcome: &NegotiationOutcome) -> String {
    let mut lines = vec![format!(
        "Scheduled '{}' at {}",
        outcome.event.title,
        hours.format_instant(outcome.event.start)
    )];
    lines.extend(outcome.relocated.values().map(|relocation| {
        format!(
            "Moved '{}' from {} to {}",
            relocation.title,
            relocation.original_time,
            hours.format_dated_range(relocation.start, relocation.end)
        )
    }));
    join_lines(lines)
}

/// One line each, newline-terminated.
fn join_lines(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}
