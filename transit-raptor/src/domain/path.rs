//! Paths returned by the search.
//!
//! A path is an immutable sequence of legs: one access leg, any mix of
//! transit and transfer legs, and one egress leg. Its three criteria
//! (arrival time, transfers, generalized cost) decide domination; the legs
//! are carried along for presentation and post-processing.

use serde::Serialize;
use std::fmt;

use super::{
    Accessibility, DomainError, RouteId, RouteIndex, ServiceTime, StopIndex, StopPosition,
    TransitMode, TripHandle, TripId, format_duration,
};

/// Leg from the origin to the first stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessLeg {
    pub stop: StopIndex,
    pub departure: ServiceTime,
    pub arrival: ServiceTime,
    pub cost: i32,
    pub num_rides: u8,
}

/// Ride on one trip between two positions of its pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitLeg {
    pub route: RouteIndex,
    pub route_id: RouteId,
    pub mode: TransitMode,
    pub trip: TripHandle,
    pub trip_id: TripId,
    pub board_position: StopPosition,
    pub alight_position: StopPosition,
    pub board_stop: StopIndex,
    pub alight_stop: StopIndex,
    pub board_time: ServiceTime,
    pub alight_time: ServiceTime,
    pub reluctance_index: usize,
    pub accessibility: Accessibility,
}

/// Street transfer between two stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferLeg {
    pub from_stop: StopIndex,
    pub to_stop: StopIndex,
    pub departure: ServiceTime,
    pub arrival: ServiceTime,
    pub cost: i32,
    pub distance_meters: Option<u32>,
}

/// Leg from the last stop to the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EgressLeg {
    pub stop: StopIndex,
    pub departure: ServiceTime,
    pub arrival: ServiceTime,
    pub cost: i32,
    pub num_rides: u8,
}

/// A leg of a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Leg {
    Access(AccessLeg),
    Transit(TransitLeg),
    Transfer(TransferLeg),
    Egress(EgressLeg),
}

impl Leg {
    /// When the leg starts.
    pub fn departure(&self) -> ServiceTime {
        match self {
            Leg::Access(l) => l.departure,
            Leg::Transit(l) => l.board_time,
            Leg::Transfer(l) => l.departure,
            Leg::Egress(l) => l.departure,
        }
    }

    /// When the leg ends.
    pub fn arrival(&self) -> ServiceTime {
        match self {
            Leg::Access(l) => l.arrival,
            Leg::Transit(l) => l.alight_time,
            Leg::Transfer(l) => l.arrival,
            Leg::Egress(l) => l.arrival,
        }
    }

    /// Stop where the leg ends, if it ends at a stop.
    pub fn to_stop(&self) -> Option<StopIndex> {
        match self {
            Leg::Access(l) => Some(l.stop),
            Leg::Transit(l) => Some(l.alight_stop),
            Leg::Transfer(l) => Some(l.to_stop),
            Leg::Egress(_) => None,
        }
    }

    /// Number of rides this leg contributes.
    pub fn rides(&self) -> usize {
        match self {
            Leg::Access(l) => l.num_rides.into(),
            Leg::Transit(_) => 1,
            Leg::Transfer(_) => 0,
            Leg::Egress(l) => l.num_rides.into(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Leg::Access(l) => street_leg("Walk", l.arrival - l.departure, l.num_rides),
            Leg::Transit(l) => format!(
                "{} {} {} {}",
                l.mode, l.route_id, l.board_time, l.alight_time
            ),
            Leg::Transfer(l) => street_leg("Walk", l.arrival - l.departure, 0),
            Leg::Egress(l) => street_leg("Walk", l.arrival - l.departure, l.num_rides),
        }
    }
}

fn street_leg(label: &str, duration: i32, rides: u8) -> String {
    if rides > 0 {
        format!("Flex {} {}x", format_duration(duration), rides)
    } else {
        format!("{label} {}", format_duration(duration))
    }
}

/// A complete origin-to-destination path.
///
/// # Invariants
///
/// - The first leg is `Access`, the last is `Egress`, and no other leg is
///   either
/// - Legs are contiguous in space
/// - `number_of_transfers` is the number of rides minus one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    legs: Vec<Leg>,
    departure_time: ServiceTime,
    arrival_time: ServiceTime,
    number_of_transfers: usize,
    generalized_cost: i32,
}

impl Path {
    /// Build a path from its legs and total generalized cost.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidPath`] if the legs are not access,
    /// transit/transfers, egress, or if consecutive legs don't connect.
    pub fn new(legs: Vec<Leg>, generalized_cost: i32) -> Result<Self, DomainError> {
        let (Some(Leg::Access(first)), Some(Leg::Egress(last))) = (legs.first(), legs.last())
        else {
            return Err(DomainError::InvalidPath("must start with access and end with egress"));
        };
        let middle = &legs[1..legs.len() - 1];
        let mut at = first.stop;
        for leg in middle {
            let from = match leg {
                Leg::Transit(l) => l.board_stop,
                Leg::Transfer(l) => l.from_stop,
                Leg::Access(_) | Leg::Egress(_) => {
                    return Err(DomainError::InvalidPath("access or egress in the middle"));
                }
            };
            if from != at {
                return Err(DomainError::InvalidPath("legs are not contiguous"));
            }
            at = leg.to_stop().unwrap_or(at);
        }
        if last.stop != at {
            return Err(DomainError::InvalidPath("egress does not start at the last stop"));
        }

        let rides: usize = legs.iter().map(Leg::rides).sum();
        Ok(Self {
            departure_time: first.departure,
            arrival_time: last.arrival,
            number_of_transfers: rides.saturating_sub(1),
            generalized_cost,
            legs,
        })
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// The transit legs, in travel order.
    pub fn transit_legs(&self) -> impl Iterator<Item = &TransitLeg> {
        self.legs.iter().filter_map(|l| match l {
            Leg::Transit(t) => Some(t),
            _ => None,
        })
    }

    pub fn departure_time(&self) -> ServiceTime {
        self.departure_time
    }

    pub fn arrival_time(&self) -> ServiceTime {
        self.arrival_time
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> i32 {
        self.arrival_time - self.departure_time
    }

    pub fn number_of_transfers(&self) -> usize {
        self.number_of_transfers
    }

    pub fn generalized_cost(&self) -> i32 {
        self.generalized_cost
    }

    /// Whether this path is at least as good on arrival time, transfers and
    /// cost, and strictly better on one of them.
    pub fn dominates(&self, other: &Path) -> bool {
        self.arrival_time <= other.arrival_time
            && self.number_of_transfers <= other.number_of_transfers
            && self.generalized_cost <= other.generalized_cost
            && (self.arrival_time < other.arrival_time
                || self.number_of_transfers < other.number_of_transfers
                || self.generalized_cost < other.generalized_cost)
    }

    /// Like [`dominates`](Self::dominates), with a later departure as a
    /// fourth criterion. Range searches use this so that a path leaving
    /// later is kept even when it arrives later.
    pub fn dominates_with_departure(&self, other: &Path) -> bool {
        self.departure_time >= other.departure_time
            && self.arrival_time <= other.arrival_time
            && self.number_of_transfers <= other.number_of_transfers
            && self.generalized_cost <= other.generalized_cost
            && (self.departure_time > other.departure_time
                || self.arrival_time < other.arrival_time
                || self.number_of_transfers < other.number_of_transfers
                || self.generalized_cost < other.generalized_cost)
    }

    /// Render the path in a compact single-line form, naming stops with
    /// `stop_name`.
    ///
    /// # Examples
    ///
    /// ```text
    /// Walk 30s ~ A ~ BUS R1 0:01 0:02:40 ~ B ~ Walk 20s [0:00:30 0:03 2m30s 0tx $800]
    /// ```
    pub fn display_with<F>(&self, stop_name: F) -> String
    where
        F: Fn(StopIndex) -> String,
    {
        let mut parts = Vec::with_capacity(self.legs.len() * 2);
        for leg in &self.legs {
            parts.push(leg.describe());
            if let Some(stop) = leg.to_stop() {
                parts.push(stop_name(stop));
            }
        }
        format!(
            "{} [{} {} {} {}tx ${}]",
            parts.join(" ~ "),
            self.departure_time,
            self.arrival_time,
            format_duration(self.duration()),
            self.number_of_transfers,
            self.generalized_cost
        )
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_with(|s| s.to_string()))
    }
}
