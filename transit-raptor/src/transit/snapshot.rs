//! Immutable transit snapshots.
//!
//! A snapshot is built once from feed data and never mutated; searches
//! borrow it read-only. [`SnapshotHandle`] lets a real-time layer swap in a
//! new snapshot while searches already running keep the one they started
//! with.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::domain::{
    ConstrainedTransfer, DomainError, FrequencyEntry, RouteId, RouteIndex, StopIndex,
    StopPosition, Transfer, TransitMode, TripId, TripPattern, TripSchedule,
};

use super::provider::TransitDataProvider;
use super::constraints::{ConstrainedTransfers, ConstraintRecord, TripStopPoint};
use super::route::Route;

/// A point-in-time view of the transit network.
#[derive(Debug, Clone)]
pub struct TransitSnapshot {
    stop_names: Vec<String>,
    routes: Vec<Route>,
    routes_by_stop: Vec<Vec<RouteIndex>>,
    transfers: Vec<Vec<Transfer>>,
    constraints: ConstrainedTransfers,
}

impl TransitSnapshot {
    /// Start building a snapshot.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Display name of a stop.
    pub fn stop_name(&self, stop: StopIndex) -> Option<&str> {
        self.stop_names.get(stop.0).map(String::as_str)
    }

    /// Find a stop by its display name.
    pub fn stop_by_name(&self, name: &str) -> Option<StopIndex> {
        self.stop_names.iter().position(|n| n == name).map(StopIndex)
    }

    /// All routes, indexed by [`RouteIndex`].
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Resolve stop names for path rendering, falling back to the index.
    pub fn name_or_index(&self, stop: StopIndex) -> String {
        self.stop_name(stop)
            .map(str::to_owned)
            .unwrap_or_else(|| stop.to_string())
    }
}

impl TransitDataProvider for TransitSnapshot {
    fn number_of_stops(&self) -> usize {
        self.stop_names.len()
    }

    fn number_of_routes(&self) -> usize {
        self.routes.len()
    }

    fn route(&self, index: RouteIndex) -> &Route {
        &self.routes[index.0]
    }

    fn routes_through(&self, stop: StopIndex) -> &[RouteIndex] {
        self.routes_by_stop.get(stop.0).map_or(&[], Vec::as_slice)
    }

    fn transfers_from(&self, stop: StopIndex) -> &[Transfer] {
        self.transfers.get(stop.0).map_or(&[], Vec::as_slice)
    }

    fn constrained_transfers(&self) -> &ConstrainedTransfers {
        &self.constraints
    }
}

/// Builder for [`TransitSnapshot`].
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::{parse_times, RouteId, TransitMode, TripId, TripPattern, TripSchedule};
/// use transit_raptor::transit::{TransitDataProvider, TransitSnapshot};
///
/// let mut builder = TransitSnapshot::builder();
/// let a = builder.add_stop("A");
/// let b = builder.add_stop("B");
/// let trip = TripSchedule::uniform(TripId::new("T1").unwrap(), parse_times("0:01 0:02:40").unwrap()).unwrap();
/// builder
///     .add_route(
///         RouteId::new("R1").unwrap(),
///         TransitMode::Bus,
///         TripPattern::new("R1", vec![a, b]).unwrap(),
///         vec![trip],
///         vec![],
///     )
///     .unwrap();
/// let snapshot = builder.build();
/// assert_eq!(snapshot.number_of_stops(), 2);
/// assert_eq!(snapshot.routes_through(a).len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    stop_names: Vec<String>,
    routes: Vec<Route>,
    transfers: Vec<Vec<Transfer>>,
    constrained: Vec<ConstrainedTransfer>,
}

impl SnapshotBuilder {
    /// Add a stop and return its index.
    pub fn add_stop(&mut self, name: impl Into<String>) -> StopIndex {
        self.stop_names.push(name.into());
        self.transfers.push(Vec::new());
        StopIndex(self.stop_names.len() - 1)
    }

    fn check_stop(&self, stop: StopIndex) -> Result<(), DomainError> {
        if stop.0 >= self.stop_names.len() {
            return Err(DomainError::StopOutOfRange {
                stop,
                stops: self.stop_names.len(),
            });
        }
        Ok(())
    }

    /// Add a route over already-added stops.
    pub fn add_route(
        &mut self,
        id: RouteId,
        mode: TransitMode,
        pattern: impl Into<Arc<TripPattern>>,
        trips: Vec<TripSchedule>,
        frequencies: Vec<FrequencyEntry>,
    ) -> Result<RouteIndex, DomainError> {
        let pattern = pattern.into();
        for &stop in pattern.stops() {
            self.check_stop(stop)?;
        }
        let index = RouteIndex(self.routes.len());
        let route = Route::new(index, id, mode, pattern, trips, frequencies)?;
        self.routes.push(route);
        Ok(index)
    }

    /// Add a transfer leaving `from`.
    pub fn add_transfer(&mut self, from: StopIndex, transfer: Transfer) -> Result<(), DomainError> {
        self.check_stop(from)?;
        self.check_stop(transfer.to_stop())?;
        self.transfers[from.0].push(transfer);
        Ok(())
    }

    /// Add a constrained transfer. Trip ids are resolved in [`build`](Self::build).
    pub fn add_constrained_transfer(&mut self, transfer: ConstrainedTransfer) {
        self.constrained.push(transfer);
    }

    /// Finish the snapshot.
    ///
    /// Constrained transfers that reference unknown trips, frequency trips
    /// or positions outside the pattern are logged and dropped.
    pub fn build(mut self) -> TransitSnapshot {
        let mut routes_by_stop = vec![Vec::new(); self.stop_names.len()];
        let mut trip_index: HashMap<TripId, TripLocation> = HashMap::new();

        for route in &self.routes {
            for &stop in route.pattern().stops() {
                let through: &mut Vec<RouteIndex> = &mut routes_by_stop[stop.0];
                if through.last() != Some(&route.index()) {
                    through.push(route.index());
                }
            }
            let scheduled = route
                .trips()
                .iter()
                .enumerate()
                .map(|(i, t)| (t.id(), TripLocation::Scheduled(route.index(), i)));
            let frequency = route
                .frequencies()
                .iter()
                .map(|f| (f.template().id(), TripLocation::Frequency));
            for (id, location) in scheduled.chain(frequency) {
                if trip_index.contains_key(id) {
                    warn!(trip = %id, "trip id used more than once; keeping the first");
                    continue;
                }
                trip_index.insert(id.clone(), location);
            }
        }

        let mut constraints = ConstrainedTransfers::new();
        for ct in std::mem::take(&mut self.constrained) {
            let Some(from) = self.resolve(&trip_index, &ct.from_trip, ct.from_position) else {
                continue;
            };
            let Some(to) = self.resolve(&trip_index, &ct.to_trip, ct.to_position) else {
                continue;
            };
            let record = ConstraintRecord {
                constraint: ct.constraint,
                priority: ct.priority,
            };
            constraints.insert(from, to, record);
            self.routes[to.route.0].mark_constrained(to.position);
        }

        debug!(
            stops = self.stop_names.len(),
            routes = self.routes.len(),
            constrained_transfers = constraints.len(),
            "transit snapshot built"
        );

        TransitSnapshot {
            stop_names: self.stop_names,
            routes: self.routes,
            routes_by_stop,
            transfers: self.transfers,
            constraints,
        }
    }

    fn resolve(
        &self,
        index: &HashMap<TripId, TripLocation>,
        trip: &TripId,
        position: StopPosition,
    ) -> Option<TripStopPoint> {
        match index.get(trip) {
            None => {
                warn!(trip = %trip, "constrained transfer references unknown trip; ignored");
                None
            }
            Some(TripLocation::Frequency) => {
                warn!(
                    trip = %trip,
                    "constrained transfer references a frequency trip; ignored"
                );
                None
            }
            Some(&TripLocation::Scheduled(route, trip_idx)) => {
                if position.0 >= self.routes[route.0].pattern().len() {
                    warn!(
                        trip = %trip,
                        position = position.0,
                        "constrained transfer position outside pattern; ignored"
                    );
                    return None;
                }
                Some(TripStopPoint {
                    route,
                    trip: trip_idx,
                    position,
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TripLocation {
    Scheduled(RouteIndex, usize),
    Frequency,
}

/// Shared, swappable reference to the current snapshot.
///
/// Readers clone the inner `Arc` and keep it for the duration of a search;
/// replacing the snapshot never affects a search already in progress.
#[derive(Debug)]
pub struct SnapshotHandle {
    current: RwLock<Arc<TransitSnapshot>>,
}

impl SnapshotHandle {
    /// Wrap an initial snapshot.
    pub fn new(snapshot: TransitSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot searches should use right now.
    pub fn current(&self) -> Arc<TransitSnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Atomically replace the snapshot, returning the previous one.
    pub fn replace(&self, snapshot: TransitSnapshot) -> Arc<TransitSnapshot> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(snapshot))
    }
}
