//! Finding the trip to board at a stop position.
//!
//! Without constraints this is the earliest trip departing after the
//! arrival plus slack. Constrained transfers from the trip the rider just
//! left can veto a trip, relax the slack to a minimum transfer time, or
//! guarantee a connection regardless of timing.

use crate::cost::CostCalculator;
use crate::domain::{ServiceTime, StopPosition, TransferConstraint, TripHandle, TripSchedule};
use crate::transit::{ConstrainedTransfers, Route, TripOccurrence, TripStopPoint, earlier_of};

use super::config::SearchConfig;
use super::state::{ArrivalKind, ArrivalRecord, Arena};

/// The scheduled trip a rider left, for constraint lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConstraintSource {
    pub(crate) point: TripStopPoint,
    pub(crate) alight_time: ServiceTime,
}

/// The trip the rider alighted from to reach `arrival`, directly or through
/// one street transfer. Only scheduled trips can carry constraints.
pub(crate) fn constraint_source(arena: &Arena, arrival: &ArrivalRecord) -> Option<ConstraintSource> {
    let transit = match arrival.kind {
        ArrivalKind::Transit { .. } => arrival,
        ArrivalKind::Transfer { .. } => arena.get(arrival.parent?),
        ArrivalKind::Access { .. } => return None,
    };
    match transit.kind {
        ArrivalKind::Transit {
            route,
            trip: TripHandle::Scheduled(trip),
            alight_pos,
            ..
        } => Some(ConstraintSource {
            point: TripStopPoint {
                route,
                trip,
                position: alight_pos,
            },
            alight_time: transit.time,
        }),
        _ => None,
    }
}

/// Slack between arriving somewhere and boarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slack {
    pub(crate) board: i32,
    pub(crate) transfer: i32,
}

impl Slack {
    pub(crate) fn from_config(config: &SearchConfig) -> Self {
        Self {
            board: config.board_slack_secs,
            transfer: config.transfer_slack_secs,
        }
    }

    /// Earliest unconstrained departure after arriving at `time` having
    /// already made `rides` rides.
    pub(crate) fn earliest_departure(&self, time: ServiceTime, rides: u8) -> ServiceTime {
        let transfer = if rides > 0 { self.transfer } else { 0 };
        time + (self.board + transfer)
    }
}

/// Boarding search over one snapshot's constraints.
pub(crate) struct BoardingSearch<'a> {
    constraints: &'a ConstrainedTransfers,
    cost: &'a CostCalculator,
    slack: Slack,
}

impl<'a> BoardingSearch<'a> {
    pub(crate) fn new(
        constraints: &'a ConstrainedTransfers,
        cost: &'a CostCalculator,
        slack: Slack,
    ) -> Self {
        Self {
            constraints,
            cost,
            slack,
        }
    }

    /// Earliest trip of `route` the rider can board at `pos`.
    pub(crate) fn find<'r>(
        &self,
        route: &'r Route,
        pos: StopPosition,
        arrival: &ArrivalRecord,
        source: Option<&ConstraintSource>,
    ) -> Option<TripOccurrence<'r>> {
        let floor = self.slack.earliest_departure(arrival.time, arrival.rides);
        let boardable = |s: &TripSchedule| self.cost.boardable(s);

        let Some(source) = source.filter(|_| route.has_constraints_at(pos)) else {
            return route.earliest_trip(pos, floor, boardable);
        };

        let constrained: Vec<(usize, TransferConstraint)> = self
            .constraints
            .boarding(source.point, route.index(), pos)
            .map(|(trip, record)| (trip, record.constraint))
            .collect();
        let constraint_of = |trip: usize| {
            constrained
                .iter()
                .find(|(t, _)| *t == trip)
                .map(|&(_, c)| c)
        };
        let min_transfer_floor = |d: i32| arrival.time.max(source.alight_time + d);

        let search_from = constrained
            .iter()
            .filter_map(|&(_, c)| match c {
                TransferConstraint::MinTransferTime(d) => Some(min_transfer_floor(d)),
                _ => None,
            })
            .fold(floor, ServiceTime::min);

        let scheduled = route.earliest_scheduled(pos, search_from, |trip, schedule| {
            if !boardable(schedule) {
                return false;
            }
            let departure = schedule.departure(pos);
            match constraint_of(trip) {
                Some(TransferConstraint::NotAllowed) => false,
                Some(TransferConstraint::MinTransferTime(d)) => departure >= min_transfer_floor(d),
                Some(TransferConstraint::Guaranteed) | None => departure >= floor,
            }
        });

        let guaranteed = constrained
            .iter()
            .filter(|&&(_, c)| c == TransferConstraint::Guaranteed)
            .filter_map(|&(trip, _)| route.scheduled(trip))
            .filter(|occ| boardable(occ.schedule()))
            .min_by_key(|occ| (occ.departure(pos), occ.handle()));

        let best = earlier_of(pos, guaranteed, scheduled);
        earlier_of(pos, best, route.earliest_frequency(pos, floor, boardable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostParams;
    use crate::domain::{
        Accessibility, ConstrainedTransfer, RouteId, RouteIndex, StopIndex, TransitMode, TripId,
    };
    use crate::testing::{pattern, schedule};
    use crate::transit::{TransitDataProvider, TransitSnapshot};

    fn t(s: &str) -> ServiceTime {
        ServiceTime::parse(s).unwrap()
    }

    /// R1 runs A→X; R2 runs X→B with three trips.
    fn network(constraint: Option<TransferConstraint>) -> TransitSnapshot {
        let mut b = TransitSnapshot::builder();
        for name in ["A", "X", "B"] {
            b.add_stop(name);
        }
        b.add_route(
            RouteId::new("R1").unwrap(),
            TransitMode::Bus,
            pattern(&[0, 1]),
            vec![schedule("T1", "0:05 0:10")],
            vec![],
        )
        .unwrap();
        b.add_route(
            RouteId::new("R2").unwrap(),
            TransitMode::Bus,
            pattern(&[1, 2]),
            vec![
                schedule("B0", "0:09:59 0:20"),
                schedule("B1", "0:10:30 0:21"),
                schedule("B2", "0:12 0:22"),
            ],
            vec![],
        )
        .unwrap();
        if let Some(c) = constraint {
            let to = match c {
                TransferConstraint::Guaranteed => "B0",
                _ => "B1",
            };
            b.add_constrained_transfer(ConstrainedTransfer::new(
                TripId::new("T1").unwrap(),
                StopPosition(1),
                TripId::new(to).unwrap(),
                StopPosition(0),
                c,
            ));
        }
        b.build()
    }

    fn alighted() -> ArrivalRecord {
        ArrivalRecord {
            parent: None,
            stop: StopIndex(1),
            time: t("0:10"),
            rides: 1,
            cost: 0,
            round: 1,
            kind: ArrivalKind::Transit {
                route: RouteIndex(0),
                trip: TripHandle::Scheduled(0),
                board_pos: StopPosition(0),
                alight_pos: StopPosition(1),
                board_time: t("0:05"),
            },
        }
    }

    fn board(data: &TransitSnapshot, params: CostParams) -> Option<String> {
        let cost = CostCalculator::new(params, data);
        let search = BoardingSearch::new(
            data.constrained_transfers(),
            &cost,
            Slack {
                board: 0,
                transfer: 60,
            },
        );
        let arrival = alighted();
        let arena = Arena::default();
        let source = constraint_source(&arena, &arrival);
        search
            .find(data.route(RouteIndex(1)), StopPosition(0), &arrival, source.as_ref())
            .map(|occ| occ.trip_id().to_string())
    }

    #[test]
    fn unconstrained_respects_transfer_slack() {
        // Alights at 0:10 with 60s slack, so B1 at 0:10:30 is too early
        assert_eq!(board(&network(None), CostParams::default()), Some("B2".into()));
    }

    #[test]
    fn guaranteed_overrides_negative_dwell() {
        let data = network(Some(TransferConstraint::Guaranteed));
        assert_eq!(board(&data, CostParams::default()), Some("B0".into()));
    }

    #[test]
    fn not_allowed_vetoes_trip() {
        let data = network(Some(TransferConstraint::NotAllowed));
        assert_eq!(board(&data, CostParams::default()), Some("B2".into()));
    }

    #[test]
    fn min_transfer_time_replaces_slack() {
        // 20s is shorter than the 60s slack, so B1 at 0:10:30 is reachable
        let data = network(Some(TransferConstraint::MinTransferTime(20)));
        assert_eq!(board(&data, CostParams::default()), Some("B1".into()));

        // 60s minimum on B1 makes it unreachable
        let data = network(Some(TransferConstraint::MinTransferTime(60)));
        assert_eq!(board(&data, CostParams::default()), Some("B2".into()));
    }

    #[test]
    fn inaccessible_trips_are_skipped() {
        let mut b = TransitSnapshot::builder();
        b.add_stop("A");
        b.add_stop("B");
        b.add_route(
            RouteId::new("R").unwrap(),
            TransitMode::Bus,
            pattern(&[0, 1]),
            vec![
                schedule("no", "0:01 0:02").with_accessibility(Accessibility::NotPossible),
                schedule("yes", "0:03 0:04").with_accessibility(Accessibility::Possible),
            ],
            vec![],
        )
        .unwrap();
        let data = b.build();
        let mut params = CostParams::default();
        params.accessibility.enabled = true;
        let cost = CostCalculator::new(params, &data);
        let search = BoardingSearch::new(
            data.constrained_transfers(),
            &cost,
            Slack {
                board: 0,
                transfer: 0,
            },
        );
        let mut arrival = alighted();
        arrival.time = t("0:00");
        arrival.kind = ArrivalKind::Access {
            access: 0,
            on_board: false,
        };
        let occ = search
            .find(data.route(RouteIndex(0)), StopPosition(0), &arrival, None)
            .unwrap();
        assert_eq!(occ.trip_id().as_str(), "yes");
    }

    #[test]
    fn source_through_transfer() {
        let mut arena = Arena::default();
        let parent = arena.push(alighted());
        let walked = ArrivalRecord {
            parent: Some(parent),
            stop: StopIndex(2),
            time: t("0:12"),
            rides: 1,
            cost: 0,
            round: 1,
            kind: ArrivalKind::Transfer {
                from: StopIndex(1),
                transfer: 0,
            },
        };
        let source = constraint_source(&arena, &walked).unwrap();
        assert_eq!(source.alight_time, t("0:10"));
        assert_eq!(source.point.position, StopPosition(1));

        let access = ArrivalRecord {
            kind: ArrivalKind::Access {
                access: 0,
                on_board: true,
            },
            ..walked
        };
        assert!(constraint_source(&arena, &access).is_none());
    }

    #[test]
    fn slack_applies_after_rides_only() {
        let slack = Slack {
            board: 10,
            transfer: 60,
        };
        assert_eq!(slack.earliest_departure(t("0:10"), 0), t("0:10:10"));
        assert_eq!(slack.earliest_departure(t("0:10"), 1), t("0:11:10"));
    }
}
