//! Lookup of constrained transfers.
//!
//! Constraints are keyed on the exact (trip, position) pair at both ends of
//! the connection. Only scheduled trips can carry constraints.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::{
    RouteIndex, StopPosition, TransferConstraint, TransferPriority, priority_cost,
};

/// A scheduled trip at one position of its pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripStopPoint {
    pub route: RouteIndex,
    /// Sort index of the trip in its route's timetable.
    pub trip: usize,
    pub position: StopPosition,
}

/// Constraint and priority attached to one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintRecord {
    pub constraint: TransferConstraint,
    pub priority: TransferPriority,
}

/// Exact-match index of constrained transfers, grouped by source.
#[derive(Debug, Clone, Default)]
pub struct ConstrainedTransfers {
    by_source: HashMap<TripStopPoint, Vec<(TripStopPoint, ConstraintRecord)>>,
    len: usize,
}

impl ConstrainedTransfers {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint.
    ///
    /// A second constraint for the same pair is a data error: it is logged
    /// and the more restrictive of the two is kept. Between equally
    /// restrictive ones the lower priority cost wins.
    pub fn insert(&mut self, from: TripStopPoint, to: TripStopPoint, record: ConstraintRecord) {
        let targets = self.by_source.entry(from).or_default();
        match targets.iter_mut().find(|(t, _)| *t == to) {
            Some((_, existing)) => {
                let kept = existing.constraint.most_restrictive(record.constraint);
                warn!(
                    from = ?from,
                    to = ?to,
                    existing = ?existing.constraint,
                    duplicate = ?record.constraint,
                    kept = ?kept,
                    "duplicate constrained transfer"
                );
                let better_priority = kept == record.constraint
                    && priority_cost(Some(kept), record.priority)
                        < priority_cost(Some(kept), existing.priority);
                if kept != existing.constraint || better_priority {
                    *existing = record;
                }
            }
            None => {
                targets.push((to, record));
                self.len += 1;
            }
        }
    }

    /// Constraint for exactly this pair, if any.
    pub fn lookup(&self, from: TripStopPoint, to: TripStopPoint) -> Option<&ConstraintRecord> {
        self.by_source
            .get(&from)?
            .iter()
            .find(|(t, _)| *t == to)
            .map(|(_, r)| r)
    }

    /// All constraints leaving `from` that board `route` at `position`.
    pub fn boarding(
        &self,
        from: TripStopPoint,
        route: RouteIndex,
        position: StopPosition,
    ) -> impl Iterator<Item = (usize, &ConstraintRecord)> {
        self.by_source
            .get(&from)
            .into_iter()
            .flatten()
            .filter(move |(t, _)| t.route == route && t.position == position)
            .map(|(t, r)| (t.trip, r))
    }

    /// Number of distinct constrained pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TransferConstraint::*;

    fn point(route: usize, trip: usize, pos: usize) -> TripStopPoint {
        TripStopPoint {
            route: RouteIndex(route),
            trip,
            position: StopPosition(pos),
        }
    }

    fn record(constraint: TransferConstraint) -> ConstraintRecord {
        ConstraintRecord {
            constraint,
            priority: TransferPriority::Allowed,
        }
    }

    #[test]
    fn exact_match_only() {
        let mut c = ConstrainedTransfers::new();
        c.insert(point(0, 0, 3), point(1, 0, 1), record(NotAllowed));

        assert_eq!(
            c.lookup(point(0, 0, 3), point(1, 0, 1)).map(|r| r.constraint),
            Some(NotAllowed)
        );
        // Neighbouring positions and trips don't match
        assert!(c.lookup(point(0, 0, 2), point(1, 0, 1)).is_none());
        assert!(c.lookup(point(0, 0, 3), point(1, 0, 2)).is_none());
        assert!(c.lookup(point(0, 1, 3), point(1, 0, 1)).is_none());
        assert!(c.lookup(point(0, 0, 3), point(1, 1, 1)).is_none());
    }

    #[test]
    fn duplicates_keep_most_restrictive() {
        let mut c = ConstrainedTransfers::new();
        c.insert(point(0, 0, 1), point(1, 0, 0), record(Guaranteed));
        c.insert(point(0, 0, 1), point(1, 0, 0), record(MinTransferTime(120)));
        c.insert(point(0, 0, 1), point(1, 0, 0), record(MinTransferTime(60)));

        assert_eq!(c.len(), 1);
        assert_eq!(
            c.lookup(point(0, 0, 1), point(1, 0, 0)).map(|r| r.constraint),
            Some(MinTransferTime(120))
        );

        c.insert(point(0, 0, 1), point(1, 0, 0), record(NotAllowed));
        assert_eq!(
            c.lookup(point(0, 0, 1), point(1, 0, 0)).map(|r| r.constraint),
            Some(NotAllowed)
        );
    }

    #[test]
    fn duplicate_resolution_is_order_independent() {
        let orders = [
            [Guaranteed, NotAllowed, MinTransferTime(30)],
            [NotAllowed, MinTransferTime(30), Guaranteed],
            [MinTransferTime(30), Guaranteed, NotAllowed],
        ];
        for order in orders {
            let mut c = ConstrainedTransfers::new();
            for constraint in order {
                c.insert(point(0, 0, 1), point(1, 0, 0), record(constraint));
            }
            assert_eq!(
                c.lookup(point(0, 0, 1), point(1, 0, 0)).map(|r| r.constraint),
                Some(NotAllowed)
            );
        }
    }

    #[test]
    fn equal_duplicates_keep_best_priority() {
        let preferred = ConstraintRecord {
            constraint: Guaranteed,
            priority: TransferPriority::Preferred,
        };
        for order in [[record(Guaranteed), preferred], [preferred, record(Guaranteed)]] {
            let mut c = ConstrainedTransfers::new();
            for r in order {
                c.insert(point(0, 0, 1), point(1, 0, 0), r);
            }
            assert_eq!(c.lookup(point(0, 0, 1), point(1, 0, 0)), Some(&preferred));
        }
    }

    #[test]
    fn boarding_filters_by_route_and_position() {
        let mut c = ConstrainedTransfers::new();
        let from = point(0, 0, 1);
        c.insert(from, point(1, 2, 0), record(Guaranteed));
        c.insert(from, point(1, 3, 1), record(NotAllowed));
        c.insert(from, point(2, 0, 0), record(NotAllowed));

        let found: Vec<_> = c
            .boarding(from, RouteIndex(1), StopPosition(0))
            .map(|(trip, r)| (trip, r.constraint))
            .collect();
        assert_eq!(found, vec![(2, Guaranteed)]);
        assert_eq!(c.boarding(point(9, 9, 9), RouteIndex(1), StopPosition(0)).count(), 0);
    }
}
