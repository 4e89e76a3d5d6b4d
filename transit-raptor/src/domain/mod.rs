//! Domain types for the transit search.
//!
//! This module contains the transit model (patterns, schedules, frequencies,
//! transfers, constraints), the access/egress paths handed in by the street
//! router, and the paths handed back by the search. All types enforce their
//! invariants at construction time.

mod access_egress;
mod accessibility;
mod constraint;
mod error;
mod frequency;
mod ids;
mod path;
mod pattern;
mod schedule;
mod stop;
mod time;
mod transfer;
mod trip_ref;

pub use access_egress::{AccessEgress, OpeningHours};
pub use accessibility::Accessibility;
pub use constraint::{
    ConstrainedTransfer, NOT_ALLOWED_PRIORITY_COST, TransferConstraint, TransferPriority,
    priority_cost,
};
pub use error::DomainError;
pub use frequency::FrequencyEntry;
pub use ids::{InvalidId, RouteId, TripId};
pub use path::{AccessLeg, EgressLeg, Leg, Path, TransferLeg, TransitLeg};
pub use pattern::{TransitMode, TripPattern};
pub use schedule::TripSchedule;
pub use stop::{StopIndex, StopPosition};
pub use time::{ServiceTime, TimeError, format_duration, parse_times};
pub use transfer::Transfer;
pub use trip_ref::{RouteIndex, TripHandle, TripRef};
