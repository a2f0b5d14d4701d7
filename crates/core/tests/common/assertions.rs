//! Custom assertion helpers for workflow tests.

use lf_protocol::{Case, Event, StageStatus};

/// Drain every event currently queued on the channel.
#[allow(dead_code)]
pub fn drain_events(rx: &mut tokio::sync::mpsc::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// True when the events contain a CommandRejected event.
#[allow(dead_code)]
pub fn has_rejection(events: &[Event]) -> bool {
    events
        .iter()
        .any(|e| matches!(e, Event::CommandRejected { .. }))
}

/// Assert the statuses of a case's stages, in order.
#[allow(dead_code)]
pub fn assert_statuses(case: &Case, expected: &[StageStatus]) {
    let actual: Vec<StageStatus> = case.stages.iter().map(|s| s.status).collect();
    assert_eq!(actual, expected, "stage statuses of case {}", case.id);
}

/// Assert that a string contains a substring (case-insensitive).
#[allow(dead_code)]
pub fn assert_contains_ci(haystack: &str, needle: &str) {
    let haystack_lower = haystack.to_lowercase();
    let needle_lower = needle.to_lowercase();
    assert!(
        haystack_lower.contains(&needle_lower),
        "Expected '{}' to contain '{}' (case-insensitive)",
        haystack,
        needle
    );
}
