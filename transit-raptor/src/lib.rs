//! Round-based public transit search.
//!
//! Given access paths to nearby stops, egress paths from stops near the
//! destination and a timetable snapshot, finds the Pareto-optimal paths on
//! arrival time, number of transfers and generalized cost.

pub mod cost;
pub mod domain;
pub mod optimize;
pub mod planner;
pub mod transit;

#[cfg(test)]
mod testing;
