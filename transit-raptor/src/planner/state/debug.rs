//! Instrumented state for tests and debugging.

use crate::domain::{Path, ServiceTime, StopIndex, StopPosition};

use super::{ArrivalRecord, Arena, NodeId, OnboardLabel, StopArrivals};

/// Observer of search decisions.
///
/// All methods default to doing nothing. A listener never influences the
/// search; it only sees what was decided.
pub trait SearchListener {
    fn arrival_accepted(&mut self, _round: u8, _arrival: &ArrivalRecord) {}

    fn arrival_rejected(&mut self, _round: u8, _arrival: &ArrivalRecord) {}

    fn path_accepted(&mut self, _path: &Path) {}

    fn path_rejected(&mut self, _path: &Path, _reason: &str) {}
}

/// A listener that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl SearchListener for NoopListener {}

/// Decorator reporting every accept/reject decision of the wrapped state.
pub struct DebugStopArrivals<'l, S, L: ?Sized> {
    inner: S,
    listener: &'l mut L,
}

impl<'l, S, L: SearchListener + ?Sized> DebugStopArrivals<'l, S, L> {
    pub fn new(inner: S, listener: &'l mut L) -> Self {
        Self { inner, listener }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: StopArrivals, L: SearchListener + ?Sized> StopArrivals for DebugStopArrivals<'_, S, L> {
    fn begin_iteration(&mut self, iteration: usize) {
        self.inner.begin_iteration(iteration);
    }

    fn begin_round(&mut self, round: u8) {
        self.inner.begin_round(round);
    }

    fn round(&self) -> u8 {
        self.inner.round()
    }

    fn updated_in_previous_round(&self) -> &[StopIndex] {
        self.inner.updated_in_previous_round()
    }

    fn updated_in_round(&self) -> &[StopIndex] {
        self.inner.updated_in_round()
    }

    fn updated_on_board(&self) -> &[StopIndex] {
        self.inner.updated_on_board()
    }

    fn boardable(&self, stop: StopIndex, out: &mut Vec<NodeId>) {
        self.inner.boardable(stop, out);
    }

    fn transferable(&self, stop: StopIndex, out: &mut Vec<NodeId>) {
        self.inner.transferable(stop, out);
    }

    fn is_improvement(&self, candidate: &ArrivalRecord) -> bool {
        self.inner.is_improvement(candidate)
    }

    fn accept(&mut self, candidate: ArrivalRecord) -> NodeId {
        self.listener.arrival_accepted(self.inner.round(), &candidate);
        self.inner.accept(candidate)
    }

    fn reject(&mut self, candidate: &ArrivalRecord) {
        self.listener.arrival_rejected(self.inner.round(), candidate);
        self.inner.reject(candidate);
    }

    fn arrival(&self, id: NodeId) -> &ArrivalRecord {
        self.inner.arrival(id)
    }

    fn arena(&self) -> &Arena {
        self.inner.arena()
    }

    fn best_time(&self, stop: StopIndex, round: u8) -> Option<ServiceTime> {
        self.inner.best_time(stop, round)
    }

    fn truncations(&self) -> usize {
        self.inner.truncations()
    }

    fn onboard_dominates(a: &OnboardLabel<'_>, b: &OnboardLabel<'_>, at: StopPosition) -> bool {
        S::onboard_dominates(a, b, at)
    }
}
