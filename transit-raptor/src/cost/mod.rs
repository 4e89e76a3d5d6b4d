//! Generalized cost model.

mod calculator;
mod params;

pub use calculator::CostCalculator;
pub use params::{AccessibilityRequest, CostParams, LinearFunction};
