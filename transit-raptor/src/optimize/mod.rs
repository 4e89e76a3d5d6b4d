//! Transfer optimization.
//!
//! The search settles on the first place two trips connect, which is not
//! always where a rider would choose to change. For each path the optimizer
//! keeps the trips fixed and moves every connection to the best feasible
//! (alight, board) pair: the same stop, or two stops joined by a transfer.
//! Connections are chosen together by dynamic programming over the rides,
//! since moving one alight position changes where the next ride can board.
//!
//! Arrival time, number of transfers and the trips themselves never change,
//! and the original path is kept unless an alternative is strictly better.

use tracing::trace;

use crate::cost::CostCalculator;
use crate::domain::{
    Leg, Path, StopPosition, Transfer, TransferConstraint, TransferLeg, TransferPriority,
    TransitLeg, TripHandle, priority_cost,
};
use crate::planner::{OptimizationMode, SearchConfig};
use crate::transit::{ConstraintRecord, Route, TransitDataProvider, TripOccurrence, TripStopPoint};

/// Minimized lexicographically: the objective, then generalized cost.
type Score = (i64, i64);

/// One transit leg of the path being optimized, resolved against the
/// snapshot.
struct Ride<'a> {
    leg: &'a TransitLeg,
    route: &'a Route,
    trip: TripOccurrence<'a>,
}

impl Ride<'_> {
    fn point(&self, position: StopPosition) -> Option<TripStopPoint> {
        match self.leg.trip {
            TripHandle::Scheduled(trip) => Some(TripStopPoint {
                route: self.route.index(),
                trip,
                position,
            }),
            TripHandle::Frequency { .. } => None,
        }
    }
}

/// A feasible change between two rides.
#[derive(Clone, Copy)]
struct Connection<'a> {
    alight: StopPosition,
    board: StopPosition,
    transfer: Option<&'a Transfer>,
    score: Score,
}

#[derive(Clone, Copy)]
struct Node<'a> {
    score: Score,
    /// Board position of the previous ride and the connection taken.
    back: Option<(StopPosition, Connection<'a>)>,
}

/// Moves transfers within paths to better places.
pub struct TransferOptimizer<'a, D: ?Sized> {
    data: &'a D,
    cost: &'a CostCalculator,
    mode: OptimizationMode,
    slack: i32,
    inverse_wait_reluctance: f64,
}

impl<'a, D: TransitDataProvider + ?Sized> TransferOptimizer<'a, D> {
    pub fn new(data: &'a D, cost: &'a CostCalculator, config: &SearchConfig) -> Self {
        Self {
            data,
            cost,
            mode: config.transfer_optimization,
            slack: config.board_slack_secs + config.transfer_slack_secs,
            inverse_wait_reluctance: config.inverse_wait_reluctance,
        }
    }

    pub fn optimize_all(&self, paths: Vec<Path>) -> Vec<Path> {
        paths.into_iter().map(|p| self.optimize(p)).collect()
    }

    /// The best variant of `path`, or `path` itself.
    pub fn optimize(&self, path: Path) -> Path {
        if self.mode == OptimizationMode::Off || path.transit_legs().count() < 2 {
            return path;
        }
        match self.improve(&path) {
            Some(better) => {
                trace!(
                    before = path.generalized_cost(),
                    after = better.generalized_cost(),
                    "moved transfers"
                );
                better
            }
            None => path,
        }
    }

    fn improve(&self, path: &Path) -> Option<Path> {
        let rides: Vec<Ride<'_>> = path
            .transit_legs()
            .map(|leg| {
                let route = self.data.route(leg.route);
                let trip = route.occurrence(leg.trip)?;
                Some(Ride { leg, route, trip })
            })
            .collect::<Option<_>>()?;

        let original = self.original_score(path, &rides)?;
        let (best, connections) = self.best_connections(&rides)?;
        if best >= original {
            return None;
        }
        self.rebuild(path, &rides, &connections)
    }

    /// Score of the connections the path already uses.
    fn original_score<'r>(&self, path: &'r Path, rides: &[Ride<'r>]) -> Option<Score>
    where
        'a: 'r,
    {
        let mut total = (0, 0);
        for pair in rides.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            let transfer = match transfer_after(path.legs(), from.leg) {
                Some(leg) => Some(self.original_transfer(leg)?),
                None => None,
            };
            let link = self.link(
                from,
                from.leg.board_position,
                from.leg.alight_position,
                to,
                to.leg.board_position,
                transfer,
            );
            total = add(total, link.score);
        }
        let last = rides.last()?;
        Some(add(
            total,
            self.ride_score(last, last.leg.board_position, last.leg.alight_position),
        ))
    }

    /// The snapshot transfer a path's transfer leg was built from.
    fn original_transfer(&self, leg: &TransferLeg) -> Option<&'a Transfer> {
        let walk = leg.arrival - leg.departure;
        let data = self.data;
        data.transfers_from(leg.from_stop)
            .iter()
            .find(|t| t.to_stop() == leg.to_stop && t.duration() == walk)
            .or_else(|| data.transfer_between(leg.from_stop, leg.to_stop))
    }

    /// Dynamic program over the rides; returns the best total score and the
    /// connections achieving it.
    fn best_connections<'r>(&self, rides: &[Ride<'r>]) -> Option<(Score, Vec<Connection<'r>>)>
    where
        'a: 'r,
    {
        let first = rides.first()?;
        let mut layers: Vec<Vec<Option<Node<'r>>>> = Vec::with_capacity(rides.len());
        let mut start = vec![None; first.route.pattern().len()];
        start[first.leg.board_position.0] = Some(Node {
            score: (0, 0),
            back: None,
        });
        layers.push(start);

        for (i, pair) in rides.windows(2).enumerate() {
            let (from, to) = (&pair[0], &pair[1]);
            let is_last = i + 2 == rides.len();
            let board_limit = if is_last {
                to.leg.alight_position.0
            } else {
                to.route.pattern().len() - 1
            };
            let mut next: Vec<Option<Node<'r>>> = vec![None; to.route.pattern().len()];

            for (p, node) in layers[i].iter().enumerate() {
                let Some(node) = node else { continue };
                for q in p + 1..from.route.pattern().len() {
                    for b in 0..board_limit {
                        let Some(connection) =
                            self.connect(from, StopPosition(p), StopPosition(q), to, StopPosition(b))
                        else {
                            continue;
                        };
                        let score = add(node.score, connection.score);
                        if next[b].is_none_or(|n| score < n.score) {
                            next[b] = Some(Node {
                                score,
                                back: Some((StopPosition(p), connection)),
                            });
                        }
                    }
                }
            }
            layers.push(next);
        }

        let last = rides.last()?;
        let (board, total) = layers
            .last()?
            .iter()
            .enumerate()
            .filter_map(|(b, node)| {
                let node = node.as_ref()?;
                let ride = self.ride_score(last, StopPosition(b), last.leg.alight_position);
                Some((StopPosition(b), add(node.score, ride)))
            })
            .min_by_key(|&(_, score)| score)?;

        let mut connections = Vec::with_capacity(rides.len() - 1);
        let mut at = board;
        for layer in layers.iter().skip(1).rev() {
            let (previous, connection) = layer[at.0].as_ref()?.back?;
            connections.push(connection);
            at = previous;
        }
        connections.reverse();
        Some((total, connections))
    }

    /// A feasible connection from `from` (boarded at `board_from`) alighting
    /// at `alight` to `to` boarding at `board`.
    fn connect<'r>(
        &self,
        from: &Ride<'r>,
        board_from: StopPosition,
        alight: StopPosition,
        to: &Ride<'r>,
        board: StopPosition,
    ) -> Option<Connection<'r>>
    where
        'a: 'r,
    {
        let alight_stop = from.route.pattern().stop(alight);
        let board_stop = to.route.pattern().stop(board);
        let transfer = if alight_stop == board_stop {
            None
        } else {
            Some(self.data.transfer_between(alight_stop, board_stop)?)
        };

        let alight_time = from.trip.arrival(alight);
        let at_stop = alight_time + transfer.map_or(0, Transfer::duration);
        let departure = to.trip.departure(board);
        let feasible = match self.constraint(from, alight, to, board).map(|r| r.constraint) {
            Some(TransferConstraint::NotAllowed) => false,
            Some(TransferConstraint::Guaranteed) => true,
            Some(TransferConstraint::MinTransferTime(d)) => departure >= at_stop.max(alight_time + d),
            None => departure >= at_stop + self.slack,
        };
        feasible.then(|| self.link(from, board_from, alight, to, board, transfer))
    }

    fn constraint(
        &self,
        from: &Ride<'_>,
        alight: StopPosition,
        to: &Ride<'_>,
        board: StopPosition,
    ) -> Option<ConstraintRecord> {
        self.data
            .constrained_transfers()
            .lookup(from.point(alight)?, to.point(board)?)
            .copied()
    }

    /// Score of riding `from` from `board_from` to `alight` and then
    /// connecting to `to` at `board`. Feasibility is not checked.
    fn link<'r>(
        &self,
        from: &Ride<'_>,
        board_from: StopPosition,
        alight: StopPosition,
        to: &Ride<'_>,
        board: StopPosition,
        transfer: Option<&'r Transfer>,
    ) -> Connection<'r> {
        let alight_time = from.trip.arrival(alight);
        let at_stop = alight_time + transfer.map_or(0, Transfer::duration);
        let wait = to.trip.departure(board) - at_stop;

        let cost = i64::from(self.ride_cost(from, board_from, alight))
            + i64::from(transfer.map_or(0, |t| self.cost.transfer_cost(t)))
            + i64::from(self.cost.boarding_cost(true, wait, to.leg.accessibility));

        let objective = match self.mode {
            OptimizationMode::WaitTime => {
                cost - (f64::from(wait.max(0)) * self.inverse_wait_reluctance).round() as i64
            }
            OptimizationMode::TransferPriority => {
                let record = self.constraint(from, alight, to, board);
                i64::from(priority_cost(
                    record.map(|r| r.constraint),
                    record.map_or(TransferPriority::Allowed, |r| r.priority),
                ))
            }
            OptimizationMode::Off => cost,
        };

        Connection {
            alight,
            board,
            transfer,
            score: (objective, cost),
        }
    }

    fn ride_cost(&self, ride: &Ride<'_>, board: StopPosition, alight: StopPosition) -> i32 {
        let secs = ride.trip.arrival(alight) - ride.trip.departure(board);
        self.cost
            .ride_cost(ride.route.index(), ride.leg.reluctance_index, secs)
    }

    fn ride_score(&self, ride: &Ride<'_>, board: StopPosition, alight: StopPosition) -> Score {
        let cost = i64::from(self.ride_cost(ride, board, alight));
        match self.mode {
            OptimizationMode::TransferPriority => (0, cost),
            _ => (cost, cost),
        }
    }

    /// Replace the rides and the legs between them.
    fn rebuild(&self, path: &Path, rides: &[Ride<'_>], connections: &[Connection<'_>]) -> Option<Path> {
        let legs = path.legs();
        let first = legs.iter().position(|l| matches!(l, Leg::Transit(_)))?;
        let last = legs.iter().rposition(|l| matches!(l, Leg::Transit(_)))?;

        let mut rebuilt: Vec<Leg> = legs[..first].to_vec();
        let mut board = rides.first()?.leg.board_position;
        for (i, ride) in rides.iter().enumerate() {
            let connection = connections.get(i);
            let alight = connection.map_or(ride.leg.alight_position, |c| c.alight);
            rebuilt.push(Leg::Transit(self.ride_leg(ride, board, alight)));

            if let Some(connection) = connection {
                if let Some(transfer) = connection.transfer {
                    let departure = ride.trip.arrival(alight);
                    rebuilt.push(Leg::Transfer(TransferLeg {
                        from_stop: ride.route.pattern().stop(alight),
                        to_stop: transfer.to_stop(),
                        departure,
                        arrival: departure + transfer.duration(),
                        cost: self.cost.transfer_cost(transfer),
                        distance_meters: transfer.distance_meters(),
                    }));
                }
                board = connection.board;
            }
        }
        rebuilt.extend_from_slice(&legs[last + 1..]);

        let cost = self.cost.path_cost(&rebuilt);
        Path::new(rebuilt, cost).ok()
    }

    fn ride_leg(&self, ride: &Ride<'_>, board: StopPosition, alight: StopPosition) -> TransitLeg {
        let pattern = ride.route.pattern();
        TransitLeg {
            board_position: board,
            alight_position: alight,
            board_stop: pattern.stop(board),
            alight_stop: pattern.stop(alight),
            board_time: ride.trip.departure(board),
            alight_time: ride.trip.arrival(alight),
            ..ride.leg.clone()
        }
    }
}

/// The transfer leg directly after `ride` in `legs`, if any.
fn transfer_after<'p>(legs: &'p [Leg], ride: &TransitLeg) -> Option<&'p TransferLeg> {
    let index = legs
        .iter()
        .position(|l| matches!(l, Leg::Transit(t) if std::ptr::eq(t, ride)))?;
    match legs.get(index + 1)? {
        Leg::Transfer(t) => Some(t),
        _ => None,
    }
}

fn add(a: Score, b: Score) -> Score {
    (a.0 + b.0, a.1 + b.1)
}
