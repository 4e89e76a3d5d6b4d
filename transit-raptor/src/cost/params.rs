//! Generalized-cost parameters.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, RouteId};

/// `constant + coefficient × t`, with `t` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFunction {
    pub constant: i32,
    pub coefficient: f64,
}

impl LinearFunction {
    pub const fn new(constant: i32, coefficient: f64) -> Self {
        Self {
            constant,
            coefficient,
        }
    }

    /// Evaluate at `secs`, rounding to whole cost units.
    pub fn calculate(&self, secs: i32) -> i32 {
        self.constant + (self.coefficient * f64::from(secs)).round() as i32
    }
}

impl Default for LinearFunction {
    fn default() -> Self {
        Self::new(0, 1.0)
    }
}

/// Wheelchair accessibility preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilityRequest {
    /// Whether accessibility is taken into account at all.
    pub enabled: bool,
    /// Refuse to board trips known to be inaccessible.
    pub only_accessible: bool,
    /// Penalty for boarding a trip without accessibility information.
    pub unknown_cost: i32,
    /// Penalty for boarding an inaccessible trip when boarding is allowed.
    pub inaccessible_cost: i32,
}

impl Default for AccessibilityRequest {
    fn default() -> Self {
        Self {
            enabled: false,
            only_accessible: true,
            unknown_cost: 600,
            inaccessible_cost: 3600,
        }
    }
}

/// Weights of the generalized cost.
///
/// One cost unit is roughly one second of in-vehicle time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostParams {
    /// Added to every boarding.
    pub board_cost: i32,

    /// Added to every boarding after the first ride.
    pub transfer_cost: i32,

    /// Added per kilometre of a street transfer with a known distance.
    pub transfer_cost_per_km: f64,

    /// Multiplier for time spent waiting between rides.
    pub wait_reluctance: f64,

    /// Per-mode ride-time multipliers, indexed by a schedule's reluctance
    /// index. Missing entries count as 1.0.
    pub transit_reluctance: Vec<f64>,

    pub unpreferred_routes: HashSet<RouteId>,

    /// Penalty for riding an unpreferred route, as a function of ride time.
    pub unpreferred_cost: LinearFunction,

    pub accessibility: AccessibilityRequest,
}

impl CostParams {
    /// Reject weights that would make costs decrease along a path.
    pub fn validate(&self) -> Result<(), DomainError> {
        let non_negative = |x: f64| x >= 0.0 && x.is_finite();
        if self.board_cost < 0 {
            return Err(DomainError::Negative("board_cost"));
        }
        if self.transfer_cost < 0 {
            return Err(DomainError::Negative("transfer_cost"));
        }
        if !non_negative(self.transfer_cost_per_km) {
            return Err(DomainError::Negative("transfer_cost_per_km"));
        }
        if !non_negative(self.wait_reluctance) {
            return Err(DomainError::Negative("wait_reluctance"));
        }
        if !self.transit_reluctance.iter().copied().all(non_negative) {
            return Err(DomainError::Negative("transit_reluctance"));
        }
        if self.unpreferred_cost.constant < 0 || !non_negative(self.unpreferred_cost.coefficient) {
            return Err(DomainError::Negative("unpreferred_cost"));
        }
        let a = &self.accessibility;
        if a.unknown_cost < 0 || a.inaccessible_cost < 0 {
            return Err(DomainError::Negative("accessibility cost"));
        }
        Ok(())
    }
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            board_cost: 600,
            transfer_cost: 0,
            transfer_cost_per_km: 0.0,
            wait_reluctance: 1.0,
            transit_reluctance: Vec::new(),
            unpreferred_routes: HashSet::new(),
            unpreferred_cost: LinearFunction::default(),
            accessibility: AccessibilityRequest::default(),
        }
    }
}
