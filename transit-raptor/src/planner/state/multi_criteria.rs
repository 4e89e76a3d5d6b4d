//! Multi-criteria state: a Pareto frontier per stop.

use tracing::trace;

use crate::domain::{ServiceTime, StopIndex, StopPosition};

use super::pareto::{Dominance, ParetoOrdering, ParetoSet, dominance};
use super::{ArrivalRecord, Arena, NodeId, OnboardLabel, RoundUpdates, StopArrivals};

/// A frontier entry: the criteria of an arrival plus where it came from.
#[derive(Debug, Clone, Copy)]
struct Entry {
    id: NodeId,
    /// Iteration and round the entry was accepted in.
    stamp: u32,
    time: ServiceTime,
    rides: u8,
    cost: i32,
    on_board: bool,
}

impl Entry {
    fn of(record: &ArrivalRecord, id: NodeId, stamp: u32) -> Self {
        Self {
            id,
            stamp,
            time: record.time,
            rides: record.rides,
            cost: record.cost,
            on_board: record.on_board(),
        }
    }
}

impl ParetoOrdering for Entry {
    fn compare(&self, other: &Self) -> Dominance {
        dominance([
            self.time.cmp(&other.time),
            self.rides.cmp(&other.rides),
            self.cost.cmp(&other.cost),
            // Arriving on board is better
            other.on_board.cmp(&self.on_board),
        ])
    }
}

fn stamp(iteration: usize, round: u8) -> u32 {
    ((iteration as u32) << 8) | u32::from(round)
}

/// Pareto state over (arrival time, rides, cost, arrived on board).
///
/// Each stop's frontier is capped at `max_frontier_size`; beyond that the
/// entry with the highest cost is dropped, then the latest, then the one
/// with most rides, then the newest.
#[derive(Debug)]
pub struct MultiCriteriaState {
    arena: Arena,
    frontiers: Vec<ParetoSet<Entry>>,
    updates: RoundUpdates,
    iteration: usize,
    round: u8,
    max_frontier_size: usize,
    truncations: usize,
}

impl MultiCriteriaState {
    pub fn new(stops: usize, max_frontier_size: usize) -> Self {
        Self {
            arena: Arena::default(),
            frontiers: (0..stops).map(|_| ParetoSet::new()).collect(),
            updates: RoundUpdates::new(stops),
            iteration: 0,
            round: 0,
            max_frontier_size: max_frontier_size.max(1),
            truncations: 0,
        }
    }

    fn candidate_entry(&self, record: &ArrivalRecord) -> Entry {
        Entry::of(record, NodeId(usize::MAX), stamp(self.iteration, self.round))
    }

    /// Number of entries currently in the frontier of `stop`.
    pub fn frontier_len(&self, stop: StopIndex) -> usize {
        self.frontiers[stop.0].len()
    }

    fn collect(&self, stop: StopIndex, out: &mut Vec<NodeId>, keep: impl Fn(&Entry) -> bool) {
        out.clear();
        out.extend(
            self.frontiers[stop.0]
                .iter()
                .filter(|e| keep(e))
                .map(|e| e.id),
        );
    }
}

impl StopArrivals for MultiCriteriaState {
    fn begin_iteration(&mut self, iteration: usize) {
        self.updates.reset();
        self.iteration = iteration;
        self.round = 0;
    }

    fn begin_round(&mut self, round: u8) {
        if round > 0 {
            self.updates.next_round();
        }
        self.round = round;
    }

    fn round(&self) -> u8 {
        self.round
    }

    fn updated_in_previous_round(&self) -> &[StopIndex] {
        self.updates.previous.as_slice()
    }

    fn updated_in_round(&self) -> &[StopIndex] {
        self.updates.current.as_slice()
    }

    fn updated_on_board(&self) -> &[StopIndex] {
        self.updates.on_board.as_slice()
    }

    fn boardable(&self, stop: StopIndex, out: &mut Vec<NodeId>) {
        let Some(previous) = self.round.checked_sub(1) else {
            out.clear();
            return;
        };
        let wanted = stamp(self.iteration, previous);
        self.collect(stop, out, |e| e.stamp == wanted);
    }

    fn transferable(&self, stop: StopIndex, out: &mut Vec<NodeId>) {
        let wanted = stamp(self.iteration, self.round);
        self.collect(stop, out, |e| e.stamp == wanted && e.on_board);
    }

    fn is_improvement(&self, candidate: &ArrivalRecord) -> bool {
        self.frontiers[candidate.stop.0].qualifies(&self.candidate_entry(candidate))
    }

    fn accept(&mut self, candidate: ArrivalRecord) -> NodeId {
        let stop = candidate.stop;
        self.updates.record(&candidate);
        let mut entry = self.candidate_entry(&candidate);
        let id = self.arena.push(candidate);
        entry.id = id;

        let frontier = &mut self.frontiers[stop.0];
        frontier.insert(entry);
        if frontier.len() > self.max_frontier_size {
            let dropped = frontier.remove_max_by_key(|e| (e.cost, e.time, e.rides, e.id));
            self.truncations += 1;
            trace!(stop = stop.0, dropped = ?dropped.map(|e| e.id), "frontier truncated");
        }
        id
    }

    fn arrival(&self, id: NodeId) -> &ArrivalRecord {
        self.arena.get(id)
    }

    fn arena(&self) -> &Arena {
        &self.arena
    }

    fn best_time(&self, stop: StopIndex, round: u8) -> Option<ServiceTime> {
        self.frontiers[stop.0]
            .iter()
            .filter(|e| (e.stamp & 0xff) <= u32::from(round))
            .map(|e| e.time)
            .min()
    }

    fn truncations(&self) -> usize {
        self.truncations
    }

    /// Relative costs only compare between trips whose ride cost grows at the
    /// same rate, so riders on trips with different reluctance never prune
    /// each other.
    fn onboard_dominates(a: &OnboardLabel<'_>, b: &OnboardLabel<'_>, at: StopPosition) -> bool {
        a.trip.schedule().reluctance_index() == b.trip.schedule().reluctance_index()
            && a.trip.departure(at) <= b.trip.departure(at)
            && a.rides <= b.rides
            && a.relative_cost <= b.relative_cost
    }
}
