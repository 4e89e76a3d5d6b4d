//! Stop and stop position indices.

use serde::Serialize;
use std::fmt;

/// Index of a stop in the snapshot's flat stop space.
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::StopIndex;
///
/// let stop = StopIndex(3);
/// assert_eq!(stop.0, 3);
/// assert_eq!(usize::from(stop), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StopIndex(pub usize);

impl fmt::Display for StopIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for StopIndex {
    fn from(value: usize) -> Self {
        StopIndex(value)
    }
}

impl From<StopIndex> for usize {
    fn from(value: StopIndex) -> Self {
        value.0
    }
}

/// Index of a stop within a pattern's stop sequence.
///
/// Used instead of [`StopIndex`] wherever a pattern may visit the same stop
/// more than once (loops, out-and-back workings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StopPosition(pub usize);

impl StopPosition {
    /// Returns the next position.
    pub fn next(self) -> Self {
        StopPosition(self.0 + 1)
    }

    /// Returns the previous position, if any.
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(StopPosition)
    }
}

impl fmt::Display for StopPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for StopPosition {
    fn from(value: usize) -> Self {
        StopPosition(value)
    }
}
