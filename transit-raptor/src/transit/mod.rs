//! The transit network as seen by the search.
//!
//! [`TransitDataProvider`] is the read interface the engine is written
//! against; [`TransitSnapshot`] is the in-memory implementation built from
//! feed data, and [`SnapshotHandle`] swaps snapshots between searches.

mod constraints;
mod provider;
mod route;
mod snapshot;

pub use constraints::{ConstrainedTransfers, ConstraintRecord, TripStopPoint};
pub use provider::TransitDataProvider;
pub use route::{Route, TripOccurrence};
pub(crate) use route::earlier_of;
pub use snapshot::{SnapshotBuilder, SnapshotHandle, TransitSnapshot};
