//! Transfers between stops.

use super::{DomainError, StopIndex};

/// A directed walking (or otherwise street-based) edge between two stops.
///
/// The origin stop is implied by where the transfer is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    to_stop: StopIndex,
    duration: i32,
    cost: i32,
    distance_meters: Option<u32>,
    geometry: Option<Vec<(f64, f64)>>,
}

impl Transfer {
    /// Create a transfer with a duration and generalized cost.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Negative`] for a negative duration or cost.
    pub fn new(to_stop: StopIndex, duration_secs: i32, cost: i32) -> Result<Self, DomainError> {
        if duration_secs < 0 {
            return Err(DomainError::Negative("transfer duration"));
        }
        if cost < 0 {
            return Err(DomainError::Negative("transfer cost"));
        }
        Ok(Self {
            to_stop,
            duration: duration_secs,
            cost,
            distance_meters: None,
            geometry: None,
        })
    }

    /// Attach the walked distance.
    pub fn with_distance(mut self, meters: u32) -> Self {
        self.distance_meters = Some(meters);
        self
    }

    /// Attach a (lon, lat) polyline.
    pub fn with_geometry(mut self, geometry: Vec<(f64, f64)>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn to_stop(&self) -> StopIndex {
        self.to_stop
    }

    /// Duration in seconds.
    pub fn duration(&self) -> i32 {
        self.duration
    }

    pub fn cost(&self) -> i32 {
        self.cost
    }

    pub fn distance_meters(&self) -> Option<u32> {
        self.distance_meters
    }

    pub fn geometry(&self) -> Option<&[(f64, f64)]> {
        self.geometry.as_deref()
    }
}
