//! Fixtures shared by the unit tests.

use crate::domain::{
    AccessEgress, AccessLeg, Accessibility, EgressLeg, Leg, Path, RouteId, RouteIndex,
    ServiceTime, StopIndex, StopPosition, TransitLeg, TransitMode, TripHandle, TripId,
    TripPattern, TripSchedule, parse_times,
};
use crate::planner::state::ArrivalRecord;
use crate::planner::SearchListener;

/// A pattern over the given stop indices.
pub fn pattern(stops: &[usize]) -> TripPattern {
    let name = stops
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join("-");
    TripPattern::new(name, stops.iter().copied().map(StopIndex).collect()).unwrap()
}

/// A trip with equal arrival and departure at each stop, from
/// space-separated times like `"0:01 0:02:40"`.
pub fn schedule(id: &str, times: &str) -> TripSchedule {
    TripSchedule::uniform(TripId::new(id).unwrap(), parse_times(times).unwrap()).unwrap()
}

/// A walk of `secs` to or from `stop`, costed at walk reluctance 2.
pub fn walk(stop: usize, secs: i32) -> AccessEgress {
    AccessEgress::walk(StopIndex(stop), secs, 2 * secs)
}

/// A flexible ride of `secs` to or from `stop`.
pub fn flex(stop: usize, secs: i32, rides: u8) -> AccessEgress {
    AccessEgress::flex(StopIndex(stop), secs, 2 * secs, rides)
}

/// Stop names in test networks: 1 is "A", 2 is "B" and so on.
pub fn stop_name(stop: StopIndex) -> String {
    char::from(b'@' + stop.0 as u8).to_string()
}

/// A path riding `rides` consecutive trips through stops 1, 2, ... with no
/// waiting, spread evenly between `departure` and `arrival`.
pub fn chained_path(departure: ServiceTime, arrival: ServiceTime, rides: usize, cost: i32) -> Path {
    let span = arrival - departure;
    let at = |i: usize| departure + span * i as i32 / rides as i32;

    let mut legs = vec![Leg::Access(AccessLeg {
        stop: StopIndex(1),
        departure,
        arrival: departure,
        cost: 0,
        num_rides: 0,
    })];
    for i in 0..rides {
        legs.push(Leg::Transit(TransitLeg {
            route: RouteIndex(i),
            route_id: RouteId::new(format!("R{}", i + 1)).unwrap(),
            mode: TransitMode::Bus,
            trip: TripHandle::Scheduled(0),
            trip_id: TripId::new(format!("T{}", i + 1)).unwrap(),
            board_position: StopPosition(0),
            alight_position: StopPosition(1),
            board_stop: StopIndex(i + 1),
            alight_stop: StopIndex(i + 2),
            board_time: at(i),
            alight_time: at(i + 1),
            reluctance_index: 0,
            accessibility: Accessibility::NoInformation,
        }));
    }
    legs.push(Leg::Egress(EgressLeg {
        stop: StopIndex(rides + 1),
        departure: arrival,
        arrival,
        cost: 0,
        num_rides: 0,
    }));
    Path::new(legs, cost).unwrap()
}

/// Listener that records what it is told.
#[derive(Debug, Default)]
pub struct RecordingListener {
    pub accepted: Vec<ArrivalRecord>,
    pub rejected: usize,
    pub paths: Vec<String>,
    pub rejected_paths: Vec<(String, String)>,
}

impl SearchListener for RecordingListener {
    fn arrival_accepted(&mut self, _round: u8, arrival: &ArrivalRecord) {
        self.accepted.push(arrival.clone());
    }

    fn arrival_rejected(&mut self, _round: u8, _arrival: &ArrivalRecord) {
        self.rejected += 1;
    }

    fn path_accepted(&mut self, path: &Path) {
        self.paths.push(path.display_with(stop_name));
    }

    fn path_rejected(&mut self, path: &Path, reason: &str) {
        self.rejected_paths
            .push((path.display_with(stop_name), reason.to_string()));
    }
}
