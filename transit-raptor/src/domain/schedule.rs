//! Trip schedules.

use super::{Accessibility, DomainError, ServiceTime, StopPosition, TripId};

/// One trip's arrival and departure times along its pattern.
///
/// # Invariants
///
/// - `arrivals` and `departures` have the same length (at least two)
/// - `arrival(p) <= departure(p) <= arrival(p + 1)` for every position
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::{parse_times, StopPosition, TripId, TripSchedule};
///
/// let times = parse_times("0:01 0:02:40").unwrap();
/// let trip = TripSchedule::uniform(TripId::new("T1").unwrap(), times).unwrap();
/// assert_eq!(trip.departure(StopPosition(0)).to_string(), "0:01");
/// assert_eq!(trip.arrival(StopPosition(1)).to_string(), "0:02:40");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripSchedule {
    id: TripId,
    arrivals: Vec<ServiceTime>,
    departures: Vec<ServiceTime>,
    reluctance_index: usize,
    accessibility: Accessibility,
}

impl TripSchedule {
    /// Create a schedule from separate arrival and departure times.
    pub fn new(
        id: TripId,
        arrivals: Vec<ServiceTime>,
        departures: Vec<ServiceTime>,
    ) -> Result<Self, DomainError> {
        if arrivals.len() != departures.len() {
            return Err(DomainError::TimesLengthMismatch {
                expected: arrivals.len(),
                actual: departures.len(),
            });
        }
        if arrivals.len() < 2 {
            return Err(DomainError::PatternTooShort(arrivals.len()));
        }
        for (i, (arr, dep)) in arrivals.iter().zip(&departures).enumerate() {
            if dep < arr {
                return Err(DomainError::DepartureBeforeArrival(StopPosition(i)));
            }
            if let Some(next_arr) = arrivals.get(i + 1) {
                if next_arr < dep {
                    return Err(DomainError::DecreasingTimes(StopPosition(i)));
                }
            }
        }

        Ok(Self {
            id,
            arrivals,
            departures,
            reluctance_index: 0,
            accessibility: Accessibility::NoInformation,
        })
    }

    /// Create a schedule with no dwell: arrival equals departure everywhere.
    pub fn uniform(id: TripId, times: Vec<ServiceTime>) -> Result<Self, DomainError> {
        Self::new(id, times.clone(), times)
    }

    /// Set the transit reluctance index.
    pub fn with_reluctance_index(mut self, index: usize) -> Self {
        self.reluctance_index = index;
        self
    }

    /// Set the wheelchair accessibility tag.
    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn id(&self) -> &TripId {
        &self.id
    }

    /// Arrival at a position.
    pub fn arrival(&self, pos: StopPosition) -> ServiceTime {
        self.arrivals[pos.0]
    }

    /// Departure from a position.
    pub fn departure(&self, pos: StopPosition) -> ServiceTime {
        self.departures[pos.0]
    }

    /// Number of stop positions.
    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    /// Always false for a validated schedule.
    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    pub fn reluctance_index(&self) -> usize {
        self.reluctance_index
    }

    pub fn accessibility(&self) -> Accessibility {
        self.accessibility
    }

    /// The same trip with every time shifted by `secs`.
    pub(crate) fn shifted(&self, secs: i32) -> Self {
        Self {
            id: self.id.clone(),
            arrivals: self.arrivals.iter().map(|t| *t + secs).collect(),
            departures: self.departures.iter().map(|t| *t + secs).collect(),
            reluctance_index: self.reluctance_index,
            accessibility: self.accessibility,
        }
    }
}
