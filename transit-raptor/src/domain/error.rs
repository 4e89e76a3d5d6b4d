//! Domain error types.
//!
//! These errors represent validation failures when building the transit
//! model. They are distinct from request validation errors, which live with
//! the planner.

use super::{StopIndex, StopPosition};

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A pattern must visit at least two stops
    #[error("pattern must have at least two stops, got {0}")]
    PatternTooShort(usize),

    /// Time arrays don't match the pattern they belong to
    #[error("expected {expected} stop times, got {actual}")]
    TimesLengthMismatch { expected: usize, actual: usize },

    /// A trip departs a stop before arriving there
    #[error("departure before arrival at position {0}")]
    DepartureBeforeArrival(StopPosition),

    /// A trip arrives at the next stop before departing the previous one
    #[error("times decrease between positions {0} and the next")]
    DecreasingTimes(StopPosition),

    /// Frequency headway must be positive
    #[error("invalid headway: {0}s")]
    InvalidHeadway(i32),

    /// Frequency entry ends before it starts
    #[error("frequency window ends before it starts")]
    InvertedFrequencyWindow,

    /// Opening hours close before they open
    #[error("opening hours close before they open")]
    InvertedOpeningHours,

    /// A route needs at least one scheduled or frequency trip
    #[error("route {0} has no trips")]
    EmptyRoute(String),

    /// Stop index is outside the snapshot's stop space
    #[error("stop {stop} is out of range ({stops} stops)")]
    StopOutOfRange { stop: StopIndex, stops: usize },

    /// A path must run access, then transit/transfers, then egress
    #[error("invalid path: {0}")]
    InvalidPath(&'static str),

    /// Durations and costs cannot be negative
    #[error("negative {0}")]
    Negative(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::PatternTooShort(1);
        assert_eq!(err.to_string(), "pattern must have at least two stops, got 1");

        let err = DomainError::TimesLengthMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "expected 3 stop times, got 2");

        let err = DomainError::DepartureBeforeArrival(StopPosition(2));
        assert_eq!(err.to_string(), "departure before arrival at position 2");

        let err = DomainError::StopOutOfRange {
            stop: StopIndex(9),
            stops: 4,
        };
        assert_eq!(err.to_string(), "stop 9 is out of range (4 stops)");

        let err = DomainError::Negative("transfer duration");
        assert_eq!(err.to_string(), "negative transfer duration");
    }
}
