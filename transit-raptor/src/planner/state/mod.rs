//! Stop-arrival state of the round-based search.
//!
//! Arrivals are immutable [`ArrivalRecord`]s kept in an append-only arena.
//! The engine proposes a record, asks the state whether it improves on what
//! is known, and then explicitly accepts or rejects it. The two state
//! variants differ only in what "improves" means:
//!
//! - [`StandardState`] keeps the earliest arrival per stop and round
//! - [`MultiCriteriaState`] keeps a Pareto frontier per stop over arrival
//!   time, rides, cost and whether the stop was reached on board
//!
//! [`DebugStopArrivals`] wraps either one and reports every decision to a
//! [`SearchListener`].

mod debug;
mod multi_criteria;
pub(crate) mod pareto;
mod standard;

pub use debug::{DebugStopArrivals, NoopListener, SearchListener};
pub use multi_criteria::MultiCriteriaState;
pub use standard::StandardState;

use crate::domain::{RouteIndex, ServiceTime, StopIndex, StopPosition, TripHandle};
use crate::transit::TripOccurrence;

/// Index of a record in the arrival arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// How a stop was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrivalKind {
    /// From the origin, via access path number `access`.
    Access { access: usize, on_board: bool },
    /// Alighting a trip.
    Transit {
        route: RouteIndex,
        trip: TripHandle,
        board_pos: StopPosition,
        alight_pos: StopPosition,
        board_time: ServiceTime,
    },
    /// Walking transfer number `transfer` out of `from`.
    Transfer { from: StopIndex, transfer: usize },
}

/// One arrival at a stop, with enough provenance to rebuild its leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalRecord {
    pub parent: Option<NodeId>,
    pub stop: StopIndex,
    pub time: ServiceTime,
    pub rides: u8,
    pub cost: i32,
    pub round: u8,
    pub kind: ArrivalKind,
}

impl ArrivalRecord {
    /// Whether the stop was reached on board a vehicle. Only such arrivals
    /// may be followed by a street transfer.
    pub fn on_board(&self) -> bool {
        match self.kind {
            ArrivalKind::Transit { .. } => true,
            ArrivalKind::Access { on_board, .. } => on_board,
            ArrivalKind::Transfer { .. } => false,
        }
    }

    pub fn is_access(&self) -> bool {
        matches!(self.kind, ArrivalKind::Access { .. })
    }
}

/// Append-only storage for arrival records.
#[derive(Debug, Default)]
pub struct Arena {
    records: Vec<ArrivalRecord>,
}

impl Arena {
    pub fn push(&mut self, record: ArrivalRecord) -> NodeId {
        self.records.push(record);
        NodeId(self.records.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> &ArrivalRecord {
        &self.records[id.0]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The chain of records from the access arrival to `id`.
    pub fn chain(&self, id: NodeId) -> Vec<&ArrivalRecord> {
        let mut chain = Vec::new();
        let mut next = Some(id);
        while let Some(id) = next {
            let record = self.get(id);
            chain.push(record);
            next = record.parent;
        }
        chain.reverse();
        chain
    }
}

/// A rider on a trip during a route scan.
#[derive(Debug, Clone, Copy)]
pub struct OnboardLabel<'r> {
    /// The arrival the rider boarded from.
    pub parent: NodeId,
    pub trip: TripOccurrence<'r>,
    pub board_pos: StopPosition,
    pub board_time: ServiceTime,
    pub cost_at_board: i32,
    /// Cost with the ride-time slope removed; see
    /// [`CostCalculator::relative_cost`](crate::cost::CostCalculator::relative_cost).
    pub relative_cost: f64,
    pub rides: u8,
}

/// Tracks which stops changed in a round.
#[derive(Debug, Clone, Default)]
pub(crate) struct StopSet {
    marked: Vec<bool>,
    stops: Vec<StopIndex>,
}

impl StopSet {
    pub(crate) fn new(stops: usize) -> Self {
        Self {
            marked: vec![false; stops],
            stops: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, stop: StopIndex) {
        if !self.marked[stop.0] {
            self.marked[stop.0] = true;
            self.stops.push(stop);
        }
    }

    pub(crate) fn contains(&self, stop: StopIndex) -> bool {
        self.marked[stop.0]
    }

    pub(crate) fn as_slice(&self) -> &[StopIndex] {
        &self.stops
    }

    pub(crate) fn clear(&mut self) {
        for stop in self.stops.drain(..) {
            self.marked[stop.0] = false;
        }
    }
}

/// Rotating per-round change tracking shared by both state variants.
#[derive(Debug, Clone, Default)]
pub(crate) struct RoundUpdates {
    /// Any arrival accepted in the previous round.
    pub(crate) previous: StopSet,
    /// Any arrival accepted in the current round.
    pub(crate) current: StopSet,
    /// On-board arrivals accepted in the current round.
    pub(crate) on_board: StopSet,
}

impl RoundUpdates {
    pub(crate) fn new(stops: usize) -> Self {
        Self {
            previous: StopSet::new(stops),
            current: StopSet::new(stops),
            on_board: StopSet::new(stops),
        }
    }

    pub(crate) fn next_round(&mut self) {
        std::mem::swap(&mut self.previous, &mut self.current);
        self.current.clear();
        self.on_board.clear();
    }

    pub(crate) fn reset(&mut self) {
        self.previous.clear();
        self.current.clear();
        self.on_board.clear();
    }

    pub(crate) fn record(&mut self, record: &ArrivalRecord) {
        self.current.insert(record.stop);
        if record.on_board() {
            self.on_board.insert(record.stop);
        }
    }
}

/// The capability the engine is written against.
///
/// The engine is generic over this trait, so each variant gets its own
/// monomorphized copy of the round loop.
pub trait StopArrivals {
    /// Start a range iteration. Arrivals from earlier iterations stay
    /// visible for pruning.
    fn begin_iteration(&mut self, iteration: usize);

    fn begin_round(&mut self, round: u8);

    fn round(&self) -> u8;

    /// Stops with an arrival accepted in the previous round.
    fn updated_in_previous_round(&self) -> &[StopIndex];

    /// Stops with an arrival accepted in the current round.
    fn updated_in_round(&self) -> &[StopIndex];

    /// Stops with an on-board arrival accepted in the current round.
    fn updated_on_board(&self) -> &[StopIndex];

    /// Arrivals at `stop` the current round may board from.
    fn boardable(&self, stop: StopIndex, out: &mut Vec<NodeId>);

    /// Arrivals at `stop` the current round may start a transfer from.
    fn transferable(&self, stop: StopIndex, out: &mut Vec<NodeId>);

    /// Whether `candidate` would be accepted.
    fn is_improvement(&self, candidate: &ArrivalRecord) -> bool;

    /// Store `candidate`. Call only after [`is_improvement`](Self::is_improvement)
    /// returned true.
    fn accept(&mut self, candidate: ArrivalRecord) -> NodeId;

    /// Note that `candidate` was not accepted.
    fn reject(&mut self, _candidate: &ArrivalRecord) {}

    fn arrival(&self, id: NodeId) -> &ArrivalRecord;

    fn arena(&self) -> &Arena;

    /// Best arrival time at `stop` using at most `round` rounds.
    fn best_time(&self, stop: StopIndex, round: u8) -> Option<ServiceTime>;

    /// Number of entries dropped by the frontier cap.
    fn truncations(&self) -> usize {
        0
    }

    /// Whether rider `a` makes rider `b` on the same route redundant at
    /// position `at`. The existing rider wins ties.
    fn onboard_dominates(a: &OnboardLabel<'_>, b: &OnboardLabel<'_>, at: StopPosition) -> bool
    where
        Self: Sized;

    /// Accept `candidate` if it improves the state, otherwise reject it.
    fn offer(&mut self, candidate: ArrivalRecord) -> Option<NodeId> {
        if self.is_improvement(&candidate) {
            Some(self.accept(candidate))
        } else {
            self.reject(&candidate);
            None
        }
    }
}
