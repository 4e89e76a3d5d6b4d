use crate::domain::{RouteIndex, StopIndex, Transfer};

use super::constraints::ConstrainedTransfers;
use super::route::Route;

/// Read-only view of the transit network used by one search.
///
/// Implementations must be immutable for the lifetime of the borrow: the
/// engine caches nothing about the network between rounds but relies on the
/// answers staying the same.
pub trait TransitDataProvider: Send + Sync {
    fn number_of_stops(&self) -> usize;

    fn number_of_routes(&self) -> usize;

    /// Route by index. Panics on an index not below
    /// [`number_of_routes`](Self::number_of_routes).
    fn route(&self, index: RouteIndex) -> &Route;

    /// Routes whose pattern visits `stop`, in ascending index order.
    fn routes_through(&self, stop: StopIndex) -> &[RouteIndex];

    /// Outgoing transfers of `stop`.
    fn transfers_from(&self, stop: StopIndex) -> &[Transfer];

    fn constrained_transfers(&self) -> &ConstrainedTransfers;

    /// Shortest transfer from `from` to `to`, if there is one.
    fn transfer_between(&self, from: StopIndex, to: StopIndex) -> Option<&Transfer> {
        self.transfers_from(from)
            .iter()
            .filter(|t| t.to_stop() == to)
            .min_by_key(|t| t.duration())
    }
}
