//! Access and egress paths.
//!
//! The street router hands the search a list of paths from the origin to
//! nearby stops (access) and from stops to the destination (egress). Plain
//! walks can be used at any time; flexible services may only run inside
//! their opening hours and count as rides.

use super::{DomainError, ServiceTime, StopIndex};

/// Daily window during which a time-dependent leg may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningHours {
    open: ServiceTime,
    close: ServiceTime,
}

impl OpeningHours {
    /// Create an opening window. Both bounds are inclusive.
    pub fn new(open: ServiceTime, close: ServiceTime) -> Result<Self, DomainError> {
        if close < open {
            return Err(DomainError::InvertedOpeningHours);
        }
        Ok(Self { open, close })
    }

    pub fn open(&self) -> ServiceTime {
        self.open
    }

    pub fn close(&self) -> ServiceTime {
        self.close
    }
}

/// A precomputed path between the origin/destination and a stop.
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::{AccessEgress, OpeningHours, ServiceTime, StopIndex};
///
/// let walk = AccessEgress::walk(StopIndex(1), 30, 60);
/// assert_eq!(walk.earliest_departure_time(ServiceTime::hms(7, 0, 0)), Some(ServiceTime::hms(7, 0, 0)));
/// assert!(!walk.stop_reached_on_board());
///
/// let hours = OpeningHours::new(ServiceTime::hms(8, 0, 0), ServiceTime::hms(10, 0, 0)).unwrap();
/// let flex = AccessEgress::flex(StopIndex(2), 600, 900, 1).with_opening_hours(hours);
/// assert_eq!(flex.earliest_departure_time(ServiceTime::hms(7, 0, 0)), Some(ServiceTime::hms(8, 0, 0)));
/// assert_eq!(flex.earliest_departure_time(ServiceTime::hms(11, 0, 0)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEgress {
    stop: StopIndex,
    duration: i32,
    cost: i32,
    num_rides: u8,
    opening_hours: Option<OpeningHours>,
}

impl AccessEgress {
    /// A walk (or bike, car...) path without rides.
    pub fn walk(stop: StopIndex, duration_secs: i32, cost: i32) -> Self {
        Self {
            stop,
            duration: duration_secs,
            cost,
            num_rides: 0,
            opening_hours: None,
        }
    }

    /// A path containing `num_rides` rides, e.g. a flexible service.
    pub fn flex(stop: StopIndex, duration_secs: i32, cost: i32, num_rides: u8) -> Self {
        Self {
            num_rides,
            ..Self::walk(stop, duration_secs, cost)
        }
    }

    /// Restrict when the path may start.
    pub fn with_opening_hours(mut self, hours: OpeningHours) -> Self {
        self.opening_hours = Some(hours);
        self
    }

    pub fn stop(&self) -> StopIndex {
        self.stop
    }

    /// Duration in seconds.
    pub fn duration(&self) -> i32 {
        self.duration
    }

    pub fn cost(&self) -> i32 {
        self.cost
    }

    pub fn num_rides(&self) -> u8 {
        self.num_rides
    }

    pub fn opening_hours(&self) -> Option<OpeningHours> {
        self.opening_hours
    }

    /// True when the stop is reached on board a vehicle, so the path counts
    /// as a ride and may be followed by a transfer.
    pub fn stop_reached_on_board(&self) -> bool {
        self.num_rides > 0
    }

    /// Earliest time at or after `requested` at which the path can start.
    pub fn earliest_departure_time(&self, requested: ServiceTime) -> Option<ServiceTime> {
        match self.opening_hours {
            None => Some(requested),
            Some(hours) if requested < hours.open => Some(hours.open),
            Some(hours) if requested > hours.close => None,
            Some(_) => Some(requested),
        }
    }

    /// Latest time at or before `requested` at which the path can end.
    pub fn latest_arrival_time(&self, requested: ServiceTime) -> Option<ServiceTime> {
        let departure = requested - self.duration;
        match self.opening_hours {
            None => Some(requested),
            Some(hours) if departure > hours.close => Some(hours.close + self.duration),
            Some(hours) if departure < hours.open => None,
            Some(_) => Some(requested),
        }
    }
}
