//! The Range-RAPTOR round loop.
//!
//! The engine is generic over [`StopArrivals`]; the standard and
//! multi-criteria searches share this code and differ only in the state
//! they are instantiated with.

use std::time::Instant;

use tracing::{debug, trace};

use crate::cost::CostCalculator;
use crate::domain::{RouteIndex, ServiceTime, StopPosition};
use crate::transit::{Route, TransitDataProvider};

use super::boarding::{BoardingSearch, Slack, constraint_source};
use super::config::SearchConfig;
use super::request::SearchRequest;
use super::state::pareto::{Dominance, ParetoOrdering, ParetoSet, dominance};
use super::state::{ArrivalKind, ArrivalRecord, NodeId, OnboardLabel, StopArrivals};

/// Counters describing one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SearchStats {
    /// Range iterations started.
    pub iterations: usize,
    /// Rounds run over all iterations, not counting access seeding.
    pub rounds: usize,
    pub arrivals_accepted: usize,
    pub arrivals_rejected: usize,
    /// Frontier entries dropped by the size cap.
    pub frontier_truncations: usize,
}

/// An arrival at the destination through one egress path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DestinationArrival {
    /// The stop arrival the egress leaves from.
    pub(crate) node: NodeId,
    /// Index into the request's egress list.
    pub(crate) egress: usize,
    pub(crate) time: ServiceTime,
    pub(crate) rides: u8,
    pub(crate) cost: i32,
    /// Departure time of the iteration that found it. Later is better, so a
    /// range search keeps later departures arriving later.
    pub(crate) departure: ServiceTime,
}

impl ParetoOrdering for DestinationArrival {
    fn compare(&self, other: &Self) -> Dominance {
        dominance([
            other.departure.cmp(&self.departure),
            self.time.cmp(&other.time),
            self.rides.cmp(&other.rides),
            self.cost.cmp(&other.cost),
        ])
    }
}

/// What the round loop leaves behind.
pub(crate) struct EngineOutput<S> {
    pub(crate) state: S,
    pub(crate) destinations: ParetoSet<DestinationArrival>,
    pub(crate) stats: SearchStats,
    pub(crate) timed_out: bool,
}

impl<S> EngineOutput<S> {
    pub(crate) fn map_state<T>(self, f: impl FnOnce(S) -> T) -> EngineOutput<T> {
        EngineOutput {
            state: f(self.state),
            destinations: self.destinations,
            stats: self.stats,
            timed_out: self.timed_out,
        }
    }
}

/// Departure times of the range iterations, latest first.
pub(crate) fn departure_times(
    earliest: ServiceTime,
    window_secs: i32,
    step_secs: i32,
) -> Vec<ServiceTime> {
    let mut times = Vec::new();
    let mut t = earliest + window_secs.max(0);
    while t > earliest {
        times.push(t);
        t = t - step_secs.max(1);
    }
    times.push(earliest);
    times
}

pub(crate) struct RangeRaptor<'a, D: ?Sized, S> {
    data: &'a D,
    request: &'a SearchRequest,
    cost: &'a CostCalculator,
    boarding: BoardingSearch<'a>,
    state: S,
    max_rounds: usize,
    window_secs: i32,
    step_secs: i32,
    deadline: Option<Instant>,
    /// Egress indices grouped by the stop they leave from.
    egress_by_stop: Vec<Vec<usize>>,
    /// Highest ride count of any access, so seeding isn't cut short.
    max_access_rides: usize,
    destinations: ParetoSet<DestinationArrival>,
    /// Departure time of the running iteration.
    departure: ServiceTime,
    stats: SearchStats,
    route_marked: Vec<bool>,
    scratch: Vec<NodeId>,
}

impl<'a, D, S> RangeRaptor<'a, D, S>
where
    D: TransitDataProvider + ?Sized,
    S: StopArrivals,
{
    pub(crate) fn new(
        data: &'a D,
        config: &SearchConfig,
        request: &'a SearchRequest,
        cost: &'a CostCalculator,
        state: S,
    ) -> Self {
        let mut egress_by_stop = vec![Vec::new(); data.number_of_stops()];
        for (i, egress) in request.egress.iter().enumerate() {
            egress_by_stop[egress.stop().0].push(i);
        }
        let max_access_rides = request
            .access
            .iter()
            .map(|a| usize::from(a.num_rides()))
            .max()
            .unwrap_or(0);

        Self {
            data,
            request,
            cost,
            boarding: BoardingSearch::new(
                data.constrained_transfers(),
                cost,
                Slack::from_config(config),
            ),
            state,
            max_rounds: config.max_rounds(),
            window_secs: config.search_window_secs,
            step_secs: config.iteration_step_secs,
            deadline: config.timeout().map(|t| Instant::now() + t),
            egress_by_stop,
            max_access_rides,
            destinations: ParetoSet::new(),
            departure: request.earliest_departure,
            stats: SearchStats::default(),
            route_marked: vec![false; data.number_of_routes()],
            scratch: Vec::new(),
        }
    }

    pub(crate) fn run(mut self) -> EngineOutput<S> {
        let departures = departure_times(
            self.request.earliest_departure,
            self.window_secs,
            self.step_secs,
        );
        let mut timed_out = false;

        'iterations: for (iteration, departure) in departures.into_iter().enumerate() {
            self.stats.iterations += 1;
            self.departure = departure;
            self.state.begin_iteration(iteration);
            self.state.begin_round(0);
            self.seed_access(departure, 0);

            for round in 1..=self.max_rounds {
                if self.expired() {
                    timed_out = true;
                    break 'iterations;
                }
                let round = round as u8;
                self.state.begin_round(round);
                self.stats.rounds += 1;

                self.scan_routes(round);
                self.seed_access(departure, usize::from(round));
                self.relax_transfers(round);

                let updated = self.state.updated_in_round().len();
                trace!(iteration, %departure, round, updated, "round complete");
                if updated == 0 && usize::from(round) >= self.max_access_rides {
                    break;
                }
            }
        }

        self.stats.frontier_truncations = self.state.truncations();
        debug!(
            iterations = self.stats.iterations,
            rounds = self.stats.rounds,
            accepted = self.stats.arrivals_accepted,
            rejected = self.stats.arrivals_rejected,
            destinations = self.destinations.len(),
            timed_out,
            "round loop finished"
        );

        EngineOutput {
            state: self.state,
            destinations: self.destinations,
            stats: self.stats,
            timed_out,
        }
    }

    fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Seed the access paths whose ride count matches `round`.
    fn seed_access(&mut self, departure: ServiceTime, round: usize) {
        let request = self.request;
        for (i, access) in request.access.iter().enumerate() {
            if usize::from(access.num_rides()) != round {
                continue;
            }
            let Some(start) = access.earliest_departure_time(departure) else {
                continue;
            };
            self.offer(ArrivalRecord {
                parent: None,
                stop: access.stop(),
                time: start + access.duration(),
                rides: access.num_rides(),
                cost: access.cost(),
                round: round as u8,
                kind: ArrivalKind::Access {
                    access: i,
                    on_board: access.stop_reached_on_board(),
                },
            });
        }
    }

    /// Routes visiting a stop improved in the previous round, ascending.
    fn marked_routes(&mut self) -> Vec<RouteIndex> {
        let data = self.data;
        let mut routes = Vec::new();
        for &stop in self.state.updated_in_previous_round() {
            for &route in data.routes_through(stop) {
                if !self.route_marked[route.0] {
                    self.route_marked[route.0] = true;
                    routes.push(route);
                }
            }
        }
        for route in &routes {
            self.route_marked[route.0] = false;
        }
        routes.sort_unstable();
        routes
    }

    fn scan_routes(&mut self, round: u8) {
        let data = self.data;
        for index in self.marked_routes() {
            self.scan_route(data.route(index), round);
        }
    }

    /// Ride every trip boarded on `route` forward, alighting at each later
    /// position and boarding new riders along the way.
    fn scan_route(&mut self, route: &'a Route, round: u8) {
        let pattern = route.pattern();
        let last = pattern.last_position();
        let mut riders: Vec<OnboardLabel<'a>> = Vec::new();
        let mut boardable = std::mem::take(&mut self.scratch);

        for p in 0..pattern.len() {
            let pos = StopPosition(p);
            let stop = pattern.stop(pos);

            for rider in &riders {
                let time = rider.trip.arrival(pos);
                let ride = self.cost.ride_cost(
                    route.index(),
                    rider.trip.schedule().reluctance_index(),
                    time - rider.board_time,
                );
                self.offer(ArrivalRecord {
                    parent: Some(rider.parent),
                    stop,
                    time,
                    rides: rider.rides,
                    cost: rider.cost_at_board + ride,
                    round,
                    kind: ArrivalKind::Transit {
                        route: route.index(),
                        trip: rider.trip.handle(),
                        board_pos: rider.board_pos,
                        alight_pos: pos,
                        board_time: rider.board_time,
                    },
                });
            }

            if pos == last {
                break;
            }
            self.state.boardable(stop, &mut boardable);
            for &id in &boardable {
                if let Some(rider) = self.board(route, pos, id) {
                    add_rider::<S>(&mut riders, rider, pos);
                }
            }
        }

        self.scratch = boardable;
    }

    fn board(&self, route: &'a Route, pos: StopPosition, from: NodeId) -> Option<OnboardLabel<'a>> {
        let arrival = self.state.arrival(from);
        let source = constraint_source(self.state.arena(), arrival);
        let trip = self.boarding.find(route, pos, arrival, source.as_ref())?;
        let schedule = trip.schedule();
        let board_time = trip.departure(pos);
        let wait = if arrival.is_access() {
            0
        } else {
            board_time - arrival.time
        };
        let cost_at_board = arrival.cost
            + self
                .cost
                .boarding_cost(arrival.rides > 0, wait, schedule.accessibility());

        Some(OnboardLabel {
            parent: from,
            trip,
            board_pos: pos,
            board_time,
            cost_at_board,
            relative_cost: self.cost.relative_cost(
                route.index(),
                schedule.reluctance_index(),
                cost_at_board,
                board_time,
            ),
            rides: arrival.rides.saturating_add(1),
        })
    }

    /// Walk transfers out of the stops reached on board this round.
    fn relax_transfers(&mut self, round: u8) {
        let data = self.data;
        let stops = self.state.updated_on_board().to_vec();
        let mut from = std::mem::take(&mut self.scratch);

        for stop in stops {
            self.state.transferable(stop, &mut from);
            for &id in &from {
                let (time, cost, rides) = {
                    let a = self.state.arrival(id);
                    (a.time, a.cost, a.rides)
                };
                for (i, transfer) in data.transfers_from(stop).iter().enumerate() {
                    if transfer.to_stop() == stop {
                        continue;
                    }
                    self.offer(ArrivalRecord {
                        parent: Some(id),
                        stop: transfer.to_stop(),
                        time: time + transfer.duration(),
                        rides,
                        cost: cost + self.cost.transfer_cost(transfer),
                        round,
                        kind: ArrivalKind::Transfer { from: stop, transfer: i },
                    });
                }
            }
        }

        self.scratch = from;
    }

    /// Propose an arrival, then try the egress paths from its stop.
    fn offer(&mut self, candidate: ArrivalRecord) -> Option<NodeId> {
        if self
            .request
            .latest_arrival
            .is_some_and(|latest| candidate.time > latest)
        {
            self.state.reject(&candidate);
            self.stats.arrivals_rejected += 1;
            return None;
        }
        match self.state.offer(candidate) {
            Some(id) => {
                self.stats.arrivals_accepted += 1;
                self.reach_destination(id);
                Some(id)
            }
            None => {
                self.stats.arrivals_rejected += 1;
                None
            }
        }
    }

    fn reach_destination(&mut self, id: NodeId) {
        let request = self.request;
        let arrival = self.state.arrival(id);
        for &e in &self.egress_by_stop[arrival.stop.0] {
            let egress = &request.egress[e];
            // A walk needs a vehicle to step off; flex may follow anything.
            if !egress.stop_reached_on_board() && !arrival.on_board() {
                continue;
            }
            let Some(start) = egress.earliest_departure_time(arrival.time) else {
                continue;
            };
            let time = start + egress.duration();
            if request.latest_arrival.is_some_and(|latest| time > latest) {
                continue;
            }
            self.destinations.insert(DestinationArrival {
                node: id,
                egress: e,
                time,
                rides: arrival.rides.saturating_add(egress.num_rides()),
                cost: arrival.cost + egress.cost(),
                departure: self.departure,
            });
        }
    }
}

/// Add `rider` unless an existing rider makes it redundant, dropping the
/// riders it makes redundant.
fn add_rider<'r, S: StopArrivals>(
    riders: &mut Vec<OnboardLabel<'r>>,
    rider: OnboardLabel<'r>,
    at: StopPosition,
) {
    if riders.iter().any(|r| S::onboard_dominates(r, &rider, at)) {
        return;
    }
    riders.retain(|r| !S::onboard_dominates(&rider, r, at));
    riders.push(rider);
}
