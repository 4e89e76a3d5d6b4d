//! Single-criterion state: earliest arrival per stop and round.

use crate::domain::{ServiceTime, StopIndex, StopPosition};

use super::{ArrivalRecord, Arena, NodeId, OnboardLabel, RoundUpdates, StopArrivals};

/// Earliest-arrival state.
///
/// Two tables are kept per round: the best arrival of any kind, and the
/// best arrival on board. Walking arrivals can't start a transfer, so an
/// on-board arrival is kept even when a walking one is earlier.
///
/// Arrivals are compared against the best of all rounds up to and
/// including the current one, so a later round only ever adds earlier
/// arrivals.
#[derive(Debug)]
pub struct StandardState {
    arena: Arena,
    best: Vec<Vec<Option<NodeId>>>,
    on_board: Vec<Vec<Option<NodeId>>>,
    updates: RoundUpdates,
    round: u8,
}

impl StandardState {
    /// State for `stops` stops and up to `max_rounds` transit rounds.
    pub fn new(stops: usize, max_rounds: usize) -> Self {
        let rows = max_rounds + 1;
        Self {
            arena: Arena::default(),
            best: vec![vec![None; stops]; rows],
            on_board: vec![vec![None; stops]; rows],
            updates: RoundUpdates::new(stops),
            round: 0,
        }
    }

    /// Earliest entry of `table` at `stop` over rounds `0..=round`; ties go
    /// to the lowest round.
    fn best_in(&self, table: &[Vec<Option<NodeId>>], stop: StopIndex, round: usize) -> Option<NodeId> {
        let last = round.min(table.len().saturating_sub(1));
        table[..=last]
            .iter()
            .filter_map(|row| row[stop.0])
            .fold(None, |best: Option<NodeId>, id| match best {
                Some(b) if self.arena.get(b).time <= self.arena.get(id).time => Some(b),
                _ => Some(id),
            })
    }

    fn round_index(&self) -> usize {
        usize::from(self.round)
    }
}

impl StopArrivals for StandardState {
    fn begin_iteration(&mut self, _iteration: usize) {
        self.updates.reset();
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
        out.clear();
        let Some(previous) = self.round_index().checked_sub(1) else {
            return;
        };
        let any = self.best_in(&self.best, stop, previous);
        let on_board = self.best_in(&self.on_board, stop, previous);
        out.extend(any);
        if on_board != any {
            out.extend(on_board);
        }
    }

    fn transferable(&self, stop: StopIndex, out: &mut Vec<NodeId>) {
        out.clear();
        if self.updates.on_board.contains(stop) {
            out.extend(self.on_board[self.round_index()][stop.0]);
        }
    }

    fn is_improvement(&self, candidate: &ArrivalRecord) -> bool {
        let table = if candidate.on_board() {
            &self.on_board
        } else {
            &self.best
        };
        self.best_in(table, candidate.stop, self.round_index())
            .is_none_or(|id| candidate.time < self.arena.get(id).time)
    }

    fn accept(&mut self, candidate: ArrivalRecord) -> NodeId {
        let (stop, time, round) = (candidate.stop, candidate.time, self.round_index());
        let on_board = candidate.on_board();
        self.updates.record(&candidate);
        let id = self.arena.push(candidate);

        if on_board {
            self.on_board[round][stop.0] = Some(id);
        }
        let improves_best = self
            .best_in(&self.best, stop, round)
            .is_none_or(|b| time < self.arena.get(b).time);
        if improves_best {
            self.best[round][stop.0] = Some(id);
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
        self.best_in(&self.best, stop, usize::from(round))
            .map(|id| self.arena.get(id).time)
    }

    fn onboard_dominates(a: &OnboardLabel<'_>, b: &OnboardLabel<'_>, at: StopPosition) -> bool {
        a.trip.departure(at) <= b.trip.departure(at)
    }
}
