//! Generalized-cost calculation.
//!
//! The engine and path extraction both price journeys through the same
//! [`CostCalculator`], so a path's cost never depends on how it was found.

use crate::domain::{Accessibility, Leg, RouteIndex, ServiceTime, TripSchedule, Transfer};
use crate::transit::TransitDataProvider;

use super::params::CostParams;

/// Prices boardings, rides and transfers.
///
/// Built once per search from the request's [`CostParams`]; holds no
/// mutable state, so one calculator can be shared across threads.
#[derive(Debug, Clone)]
pub struct CostCalculator {
    params: CostParams,
    unpreferred: Vec<bool>,
}

impl CostCalculator {
    /// Resolve the unpreferred route set against `data`.
    pub fn new<D: TransitDataProvider + ?Sized>(params: CostParams, data: &D) -> Self {
        let unpreferred = (0..data.number_of_routes())
            .map(|i| {
                params
                    .unpreferred_routes
                    .contains(data.route(RouteIndex(i)).id())
            })
            .collect();
        Self {
            params,
            unpreferred,
        }
    }

    pub fn params(&self) -> &CostParams {
        &self.params
    }

    fn is_unpreferred(&self, route: RouteIndex) -> bool {
        self.unpreferred.get(route.0).copied().unwrap_or(false)
    }

    /// Whether the rider may board this trip at all.
    pub fn boardable(&self, schedule: &TripSchedule) -> bool {
        let a = &self.params.accessibility;
        !(a.enabled && a.only_accessible && schedule.accessibility() == Accessibility::NotPossible)
    }

    fn accessibility_penalty(&self, accessibility: Accessibility) -> i32 {
        let a = &self.params.accessibility;
        if !a.enabled {
            return 0;
        }
        match accessibility {
            Accessibility::Possible => 0,
            Accessibility::NoInformation => a.unknown_cost,
            Accessibility::NotPossible => a.inaccessible_cost,
        }
    }

    /// Cost of boarding a trip.
    ///
    /// `after_ride` is true when the rider has already ridden something, in
    /// which case the transfer cost and the wait since the previous leg are
    /// charged. Negative waits (guaranteed connections) count as zero.
    pub fn boarding_cost(
        &self,
        after_ride: bool,
        wait_secs: i32,
        accessibility: Accessibility,
    ) -> i32 {
        let mut cost = self.params.board_cost + self.accessibility_penalty(accessibility);
        if after_ride {
            cost += self.params.transfer_cost + self.wait_cost(wait_secs);
        }
        cost
    }

    /// Cost of waiting `wait_secs` between two legs.
    pub fn wait_cost(&self, wait_secs: i32) -> i32 {
        (f64::from(wait_secs.max(0)) * self.params.wait_reluctance).round() as i32
    }

    fn transit_factor(&self, reluctance_index: usize) -> f64 {
        self.params
            .transit_reluctance
            .get(reluctance_index)
            .copied()
            .unwrap_or(1.0)
    }

    /// Cost of riding `route` for `ride_secs` on a trip with the given
    /// reluctance index.
    pub fn ride_cost(&self, route: RouteIndex, reluctance_index: usize, ride_secs: i32) -> i32 {
        let mut cost = (f64::from(ride_secs) * self.transit_factor(reluctance_index)).round() as i32;
        if self.is_unpreferred(route) {
            cost += self.params.unpreferred_cost.calculate(ride_secs);
        }
        cost
    }

    /// Cost on board, shifted so that two riders of the same trip compare
    /// fairly regardless of where they boarded.
    ///
    /// Cost accrues linearly with ride time, so subtracting the slope times
    /// the boarding time leaves a value independent of the current position.
    pub fn relative_cost(
        &self,
        route: RouteIndex,
        reluctance_index: usize,
        cost_at_board: i32,
        board_time: ServiceTime,
    ) -> f64 {
        let mut slope = self.transit_factor(reluctance_index);
        if self.is_unpreferred(route) {
            slope += self.params.unpreferred_cost.coefficient;
        }
        f64::from(cost_at_board) - slope * f64::from(board_time.secs())
    }

    /// Cost of walking a street transfer, including its own cost.
    pub fn transfer_cost(&self, transfer: &Transfer) -> i32 {
        transfer.cost() + self.distance_cost(transfer.distance_meters())
    }

    fn distance_cost(&self, meters: Option<u32>) -> i32 {
        meters.map_or(0, |m| {
            (f64::from(m) / 1000.0 * self.params.transfer_cost_per_km).round() as i32
        })
    }

    /// Total cost of a sequence of legs.
    ///
    /// Mirrors the charges the engine applies while searching; waiting
    /// between the access leg and the first boarding is never charged.
    pub fn path_cost(&self, legs: &[Leg]) -> i32 {
        let mut total = 0;
        let mut rides = 0usize;
        let mut previous_arrival: Option<ServiceTime> = None;

        for leg in legs {
            match leg {
                Leg::Access(l) => {
                    total += l.cost;
                    rides += usize::from(l.num_rides);
                }
                Leg::Transit(l) => {
                    let wait = previous_arrival.map_or(0, |t| l.board_time - t);
                    total += self.boarding_cost(rides > 0, wait, l.accessibility);
                    total += self.ride_cost(l.route, l.reluctance_index, l.alight_time - l.board_time);
                    rides += 1;
                }
                Leg::Transfer(l) => total += l.cost,
                Leg::Egress(l) => total += l.cost,
            }
            previous_arrival = match leg {
                Leg::Access(_) => None,
                other => Some(other.arrival()),
            };
        }
        total
    }
}
