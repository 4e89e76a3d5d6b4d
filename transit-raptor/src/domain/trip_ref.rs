//! References to routes and trip occurrences inside a snapshot.

use serde::Serialize;
use std::fmt;

use super::ServiceTime;

/// Index of a route in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RouteIndex(pub usize);

impl fmt::Display for RouteIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one run of a vehicle within a route's timetable.
///
/// Scheduled trips are addressed by their sort position; frequency trips by
/// their entry and the first-stop departure of the occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TripHandle {
    Scheduled(usize),
    Frequency {
        entry: usize,
        first_departure: ServiceTime,
    },
}

impl TripHandle {
    pub fn is_frequency(self) -> bool {
        matches!(self, TripHandle::Frequency { .. })
    }
}

/// A trip occurrence together with its route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TripRef {
    pub route: RouteIndex,
    pub trip: TripHandle,
}
