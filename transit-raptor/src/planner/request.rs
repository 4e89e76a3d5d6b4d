//! Search requests and their validation.

use crate::cost::CostParams;
use crate::domain::{AccessEgress, DomainError, ServiceTime, StopIndex};

/// Error from transit search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// No access paths were given
    #[error("no access paths")]
    EmptyAccess,

    /// No egress paths were given
    #[error("no egress paths")]
    EmptyEgress,

    /// The latest arrival is before the earliest departure
    #[error("latest arrival {latest_arrival} is before earliest departure {earliest_departure}")]
    InvertedTimeWindow {
        earliest_departure: ServiceTime,
        latest_arrival: ServiceTime,
    },

    /// An access or egress path references a stop the network doesn't have
    #[error("stop {stop} is out of range ({stops} stops)")]
    StopOutOfRange { stop: StopIndex, stops: usize },

    /// Invalid search request
    #[error("invalid search request: {0}")]
    InvalidRequest(String),
}

impl From<DomainError> for SearchError {
    fn from(err: DomainError) -> Self {
        SearchError::InvalidRequest(err.to_string())
    }
}

/// Request for transit search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Earliest time the traveller can leave the origin.
    pub earliest_departure: ServiceTime,

    /// Arrivals after this time are discarded.
    pub latest_arrival: Option<ServiceTime>,

    /// Street paths from the origin to nearby stops.
    pub access: Vec<AccessEgress>,

    /// Street paths from nearby stops to the destination.
    pub egress: Vec<AccessEgress>,

    /// Cost weights for this search.
    pub cost: CostParams,
}

impl SearchRequest {
    /// Create a new search request with default cost weights.
    pub fn new(
        earliest_departure: ServiceTime,
        access: Vec<AccessEgress>,
        egress: Vec<AccessEgress>,
    ) -> Self {
        Self {
            earliest_departure,
            latest_arrival: None,
            access,
            egress,
            cost: CostParams::default(),
        }
    }

    /// Discard arrivals after `time`.
    pub fn with_latest_arrival(mut self, time: ServiceTime) -> Self {
        self.latest_arrival = Some(time);
        self
    }

    /// Use these cost weights.
    pub fn with_cost(mut self, cost: CostParams) -> Self {
        self.cost = cost;
        self
    }

    /// Validate the search request against a network with `stops` stops.
    pub fn validate(&self, stops: usize) -> Result<(), SearchError> {
        if self.access.is_empty() {
            return Err(SearchError::EmptyAccess);
        }
        if self.egress.is_empty() {
            return Err(SearchError::EmptyEgress);
        }
        if let Some(latest_arrival) = self.latest_arrival {
            if latest_arrival < self.earliest_departure {
                return Err(SearchError::InvertedTimeWindow {
                    earliest_departure: self.earliest_departure,
                    latest_arrival,
                });
            }
        }
        for path in self.access.iter().chain(&self.egress) {
            if path.stop().0 >= stops {
                return Err(SearchError::StopOutOfRange {
                    stop: path.stop(),
                    stops,
                });
            }
        }
        self.cost.validate()?;
        Ok(())
    }
}
