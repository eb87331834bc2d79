//! Election phase resolution

use std::fmt;

use serde::Serialize;

/// Derived election status at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    NotStarted,
    Ongoing,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::NotStarted => "not started",
            Phase::Ongoing => "ongoing",
            Phase::Ended => "ended",
        };
        f.write_str(s)
    }
}

/// Resolves the phase of an election window at `now`. The window is closed
/// on both ends: `now == start` and `now == end` are Ongoing.
pub fn resolve_phase(start_time: u64, end_time: u64, now: u64) -> Phase {
    if now < start_time {
        Phase::NotStarted
    } else if now > end_time {
        Phase::Ended
    } else {
        Phase::Ongoing
    }
}

/// Seconds left in the voting window; zero unless the election is Ongoing.
pub fn remaining_secs(start_time: u64, end_time: u64, now: u64) -> u64 {
    match resolve_phase(start_time, end_time, now) {
        Phase::Ongoing => end_time - now,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_before_window() {
        assert_eq!(resolve_phase(100, 200, 99), Phase::NotStarted);
    }

    #[test]
    fn phase_boundaries_are_ongoing() {
        assert_eq!(resolve_phase(100, 200, 100), Phase::Ongoing);
        assert_eq!(resolve_phase(100, 200, 200), Phase::Ongoing);
    }

    #[test]
    fn phase_after_window() {
        assert_eq!(resolve_phase(100, 200, 201), Phase::Ended);
    }

    #[test]
    fn phase_is_total_over_the_window() {
        // Sweep across the window and its edges; exactly one phase each time,
        // transitioning NotStarted -> Ongoing -> Ended without gaps.
        let (start, end) = (50u64, 60u64);
        let mut last = resolve_phase(start, end, 0);
        assert_eq!(last, Phase::NotStarted);
        for now in 0..=70 {
            let phase = resolve_phase(start, end, now);
            match (last, phase) {
                (Phase::NotStarted, Phase::Ongoing) => assert_eq!(now, start),
                (Phase::Ongoing, Phase::Ended) => assert_eq!(now, end + 1),
                (a, b) => assert_eq!(a, b, "unexpected transition at {}", now),
            }
            last = phase;
        }
        assert_eq!(last, Phase::Ended);
    }

    #[test]
    fn remaining_is_zero_outside_window() {
        assert_eq!(remaining_secs(100, 200, 50), 0);
        assert_eq!(remaining_secs(100, 200, 201), 0);
        assert_eq!(remaining_secs(100, 200, 150), 50);
        assert_eq!(remaining_secs(100, 200, 200), 0);
    }
}
