//! Rebuilding paths from destination arrivals.

use tracing::warn;

use crate::cost::CostCalculator;
use crate::domain::{
    AccessLeg, DomainError, EgressLeg, Leg, Path, TransferLeg, TransitLeg,
};
use crate::transit::TransitDataProvider;

use super::boarding::Slack;
use super::engine::DestinationArrival;
use super::request::SearchRequest;
use super::state::{ArrivalKind, ArrivalRecord, Arena};

pub(crate) struct PathBuilder<'a, D: ?Sized> {
    data: &'a D,
    request: &'a SearchRequest,
    cost: &'a CostCalculator,
    slack: Slack,
}

impl<'a, D: TransitDataProvider + ?Sized> PathBuilder<'a, D> {
    pub(crate) fn new(
        data: &'a D,
        request: &'a SearchRequest,
        cost: &'a CostCalculator,
        slack: Slack,
    ) -> Self {
        Self {
            data,
            request,
            cost,
            slack,
        }
    }

    /// One path per destination arrival. Arrivals whose chain can't be
    /// resolved against the snapshot are logged and skipped.
    pub(crate) fn build_all<'d>(
        &self,
        arena: &Arena,
        destinations: impl IntoIterator<Item = &'d DestinationArrival>,
    ) -> Vec<Path> {
        destinations
            .into_iter()
            .filter_map(|dest| match self.build(arena, dest) {
                Ok(path) => Some(path),
                Err(error) => {
                    warn!(%error, node = ?dest.node, "dropping unbuildable path");
                    None
                }
            })
            .collect()
    }

    pub(crate) fn build(&self, arena: &Arena, dest: &DestinationArrival) -> Result<Path, DomainError> {
        let chain = arena.chain(dest.node);
        let mut legs = Vec::with_capacity(chain.len() + 1);

        for (i, record) in chain.iter().enumerate() {
            let leg = match &record.kind {
                ArrivalKind::Access { access, .. } => self.access_leg(record, *access, chain.get(i + 1))?,
                ArrivalKind::Transit {
                    route,
                    trip,
                    board_pos,
                    alight_pos,
                    board_time,
                } => {
                    let route = self.data.route(*route);
                    let occurrence = route
                        .occurrence(*trip)
                        .ok_or(DomainError::InvalidPath("trip not in timetable"))?;
                    let schedule = occurrence.schedule();
                    Leg::Transit(TransitLeg {
                        route: route.index(),
                        route_id: route.id().clone(),
                        mode: route.mode(),
                        trip: *trip,
                        trip_id: occurrence.trip_id().clone(),
                        board_position: *board_pos,
                        alight_position: *alight_pos,
                        board_stop: route.pattern().stop(*board_pos),
                        alight_stop: record.stop,
                        board_time: *board_time,
                        alight_time: record.time,
                        reluctance_index: schedule.reluctance_index(),
                        accessibility: schedule.accessibility(),
                    })
                }
                ArrivalKind::Transfer { from, transfer } => {
                    let transfer = self
                        .data
                        .transfers_from(*from)
                        .get(*transfer)
                        .ok_or(DomainError::InvalidPath("transfer not in snapshot"))?;
                    Leg::Transfer(TransferLeg {
                        from_stop: *from,
                        to_stop: record.stop,
                        departure: record.time - transfer.duration(),
                        arrival: record.time,
                        cost: self.cost.transfer_cost(transfer),
                        distance_meters: transfer.distance_meters(),
                    })
                }
            };
            legs.push(leg);
        }

        let egress = self
            .request
            .egress
            .get(dest.egress)
            .ok_or(DomainError::InvalidPath("egress index out of range"))?;
        legs.push(Leg::Egress(EgressLeg {
            stop: egress.stop(),
            departure: dest.time - egress.duration(),
            arrival: dest.time,
            cost: egress.cost(),
            num_rides: egress.num_rides(),
        }));

        let cost = self.cost.path_cost(&legs);
        Path::new(legs, cost)
    }

    /// The access leg, shifted to arrive as late as the first boarding
    /// allows when a trip is boarded directly from it.
    fn access_leg(
        &self,
        record: &ArrivalRecord,
        index: usize,
        next: Option<&&ArrivalRecord>,
    ) -> Result<Leg, DomainError> {
        let access = self
            .request
            .access
            .get(index)
            .ok_or(DomainError::InvalidPath("access index out of range"))?;

        let mut arrival = record.time;
        if let Some(ArrivalKind::Transit { board_time, .. }) = next.map(|n| &n.kind) {
            let slack = self.slack.earliest_departure(record.time, record.rides) - record.time;
            if let Some(latest) = access.latest_arrival_time(*board_time - slack) {
                arrival = arrival.max(latest);
            }
        }

        Ok(Leg::Access(AccessLeg {
            stop: access.stop(),
            departure: arrival - access.duration(),
            arrival,
            cost: access.cost(),
            num_rides: access.num_rides(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostParams;
    use crate::domain::{
        AccessEgress, OpeningHours, RouteId, RouteIndex, ServiceTime, StopIndex, StopPosition,
        TransitMode, TripHandle,
    };
    use crate::planner::state::NodeId;
    use crate::testing::{pattern, schedule, walk};
    use crate::transit::TransitSnapshot;

    fn t(s: &str) -> ServiceTime {
        ServiceTime::parse(s).unwrap()
    }

    fn network() -> TransitSnapshot {
        let mut b = TransitSnapshot::builder();
        for name in ["O", "A", "B"] {
            b.add_stop(name);
        }
        b.add_route(
            RouteId::new("R1").unwrap(),
            TransitMode::Bus,
            pattern(&[1, 2]),
            vec![schedule("T1", "0:10 0:20")],
            vec![],
        )
        .unwrap();
        b.build()
    }

    fn ride(arena: &mut Arena, access_time: &str) -> NodeId {
        let access = arena.push(ArrivalRecord {
            parent: None,
            stop: StopIndex(1),
            time: t(access_time),
            rides: 0,
            cost: 60,
            round: 0,
            kind: ArrivalKind::Access {
                access: 0,
                on_board: false,
            },
        });
        arena.push(ArrivalRecord {
            parent: Some(access),
            stop: StopIndex(2),
            time: t("0:20"),
            rides: 1,
            cost: 1260,
            round: 1,
            kind: ArrivalKind::Transit {
                route: RouteIndex(0),
                trip: TripHandle::Scheduled(0),
                board_pos: StopPosition(0),
                alight_pos: StopPosition(1),
                board_time: t("0:10"),
            },
        })
    }

    fn destination(node: NodeId) -> DestinationArrival {
        DestinationArrival {
            node,
            egress: 0,
            time: t("0:20:20"),
            rides: 1,
            cost: 1300,
            departure: t("0:00"),
        }
    }

    fn build(access: AccessEgress, access_time: &str) -> Path {
        let data = network();
        let request = SearchRequest::new(t("0:00"), vec![access], vec![walk(2, 20)]);
        let cost = CostCalculator::new(CostParams::default(), &data);
        let slack = Slack {
            board: 30,
            transfer: 60,
        };
        let mut arena = Arena::default();
        let node = ride(&mut arena, access_time);
        PathBuilder::new(&data, &request, &cost, slack)
            .build(&arena, &destination(node))
            .unwrap()
    }

    #[test]
    fn access_is_shifted_to_first_boarding() {
        let path = build(walk(1, 30), "0:00:30");
        let Leg::Access(access) = &path.legs()[0] else {
            panic!("expected access leg");
        };
        // Board at 0:10 with 30s board slack
        assert_eq!(access.arrival, t("0:09:30"));
        assert_eq!(access.departure, t("0:09"));
        assert_eq!(path.departure_time(), t("0:09"));
        assert_eq!(path.arrival_time(), t("0:20:20"));
    }

    #[test]
    fn shift_respects_opening_hours() {
        let hours = OpeningHours::new(t("0:00"), t("0:05")).unwrap();
        let path = build(walk(1, 30).with_opening_hours(hours), "0:00:30");
        let Leg::Access(access) = &path.legs()[0] else {
            panic!("expected access leg");
        };
        assert_eq!(access.departure, t("0:05"));
        assert_eq!(access.arrival, t("0:05:30"));
    }

    #[test]
    fn cost_is_recomputed_from_legs() {
        let path = build(walk(1, 30), "0:00:30");
        // access 60 + board 600 + ride 600 + egress 40
        assert_eq!(path.generalized_cost(), 1300);
        assert_eq!(path.number_of_transfers(), 0);
    }

    #[test]
    fn unknown_trip_is_an_error() {
        let data = network();
        let request = SearchRequest::new(t("0:00"), vec![walk(1, 30)], vec![walk(2, 20)]);
        let cost = CostCalculator::new(CostParams::default(), &data);
        let mut arena = Arena::default();
        let node = ride(&mut arena, "0:00:30");
        let mut bad = arena.get(node).clone();
        bad.kind = ArrivalKind::Transit {
            route: RouteIndex(0),
            trip: TripHandle::Scheduled(5),
            board_pos: StopPosition(0),
            alight_pos: StopPosition(1),
            board_time: t("0:10"),
        };
        let bad = arena.push(bad);
        let builder = PathBuilder::new(
            &data,
            &request,
            &cost,
            Slack {
                board: 0,
                transfer: 0,
            },
        );
        assert!(builder.build(&arena, &destination(bad)).is_err());
        assert!(builder.build_all(&arena, &[destination(bad)]).is_empty());
    }
}
