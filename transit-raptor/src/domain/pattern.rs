//! Trip patterns and transit modes.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DomainError, StopIndex, StopPosition};

/// Transit mode of a route.
///
/// The mode's ordinal doubles as the default transit reluctance index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitMode {
    Bus,
    Rail,
    Tram,
    Subway,
    Ferry,
    Coach,
    Flex,
}

impl TransitMode {
    /// Index into a transit reluctance factor table.
    pub fn reluctance_index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TransitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransitMode::Bus => "BUS",
            TransitMode::Rail => "RAIL",
            TransitMode::Tram => "TRAM",
            TransitMode::Subway => "SUBWAY",
            TransitMode::Ferry => "FERRY",
            TransitMode::Coach => "COACH",
            TransitMode::Flex => "FLEX",
        };
        f.write_str(s)
    }
}

/// An ordered stop sequence shared by the trips of one route.
///
/// # Invariants
///
/// - At least two stops
/// - Immutable once constructed
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::{StopIndex, StopPosition, TripPattern};
///
/// let pattern = TripPattern::new("R1", vec![StopIndex(0), StopIndex(1)]).unwrap();
/// assert_eq!(pattern.len(), 2);
/// assert_eq!(pattern.stop(StopPosition(1)), StopIndex(1));
///
/// assert!(TripPattern::new("bad", vec![StopIndex(0)]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripPattern {
    name: String,
    stops: Vec<StopIndex>,
}

impl TripPattern {
    /// Create a pattern.
    pub fn new(name: impl Into<String>, stops: Vec<StopIndex>) -> Result<Self, DomainError> {
        if stops.len() < 2 {
            return Err(DomainError::PatternTooShort(stops.len()));
        }
        Ok(Self {
            name: name.into(),
            stops,
        })
    }

    /// Pattern name, used in debug output.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stop sequence.
    pub fn stops(&self) -> &[StopIndex] {
        &self.stops
    }

    /// Number of stop positions.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Always false: patterns have at least two stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Stop at the given position.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the pattern.
    pub fn stop(&self, pos: StopPosition) -> StopIndex {
        self.stops[pos.0]
    }

    /// The last position in the pattern.
    pub fn last_position(&self) -> StopPosition {
        StopPosition(self.stops.len() - 1)
    }

    /// All positions at which the pattern visits `stop`.
    pub fn positions_of(&self, stop: StopIndex) -> impl Iterator<Item = StopPosition> + '_ {
        self.stops
            .iter()
            .enumerate()
            .filter(move |(_, s)| **s == stop)
            .map(|(i, _)| StopPosition(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops(ids: &[usize]) -> Vec<StopIndex> {
        ids.iter().copied().map(StopIndex).collect()
    }

    #[test]
    fn loop_pattern_positions() {
        let pattern = TripPattern::new("loop", stops(&[1, 2, 3, 1])).unwrap();
        let positions: Vec<_> = pattern.positions_of(StopIndex(1)).collect();
        assert_eq!(positions, vec![StopPosition(0), StopPosition(3)]);
        assert_eq!(pattern.last_position(), StopPosition(3));
    }

    #[test]
    fn too_short() {
        assert_eq!(
            TripPattern::new("x", vec![]).unwrap_err(),
            DomainError::PatternTooShort(0)
        );
    }

    #[test]
    fn mode_display_and_index() {
        assert_eq!(TransitMode::Bus.to_string(), "BUS");
        assert_eq!(TransitMode::Bus.reluctance_index(), 0);
        assert_eq!(TransitMode::Rail.reluctance_index(), 1);
    }
}
