//! Routes and their timetables.
//!
//! A route pairs one pattern with the scheduled and frequency-based trips
//! that run it. Both kinds are exposed to the search as [`TripOccurrence`]s,
//! so the round loop never needs to know which one it is riding.

use std::sync::Arc;

use tracing::warn;

use crate::domain::{
    DomainError, FrequencyEntry, RouteId, RouteIndex, ServiceTime, StopPosition, TransitMode,
    TripHandle, TripId, TripPattern, TripSchedule,
};

/// One concrete run of a vehicle along a route's pattern.
///
/// For scheduled trips the times are read straight from the schedule. For
/// frequency trips they are the template shifted to the occurrence's first
/// departure, and arrivals carry an extra safety margin of one headway.
#[derive(Debug, Clone, Copy)]
pub struct TripOccurrence<'a> {
    schedule: &'a TripSchedule,
    offset: i32,
    arrival_margin: i32,
    handle: TripHandle,
}

impl<'a> TripOccurrence<'a> {
    fn scheduled(index: usize, schedule: &'a TripSchedule) -> Self {
        Self {
            schedule,
            offset: 0,
            arrival_margin: 0,
            handle: TripHandle::Scheduled(index),
        }
    }

    fn frequency(entry_index: usize, entry: &'a FrequencyEntry, first: ServiceTime) -> Self {
        Self {
            schedule: entry.template(),
            offset: first.secs(),
            arrival_margin: entry.headway(),
            handle: TripHandle::Frequency {
                entry: entry_index,
                first_departure: first,
            },
        }
    }

    /// Arrival at a position, including any headway margin.
    pub fn arrival(&self, pos: StopPosition) -> ServiceTime {
        self.schedule.arrival(pos) + (self.offset + self.arrival_margin)
    }

    /// Departure from a position.
    pub fn departure(&self, pos: StopPosition) -> ServiceTime {
        self.schedule.departure(pos) + self.offset
    }

    pub fn handle(&self) -> TripHandle {
        self.handle
    }

    /// The underlying schedule (the template, for frequency trips).
    pub fn schedule(&self) -> &'a TripSchedule {
        self.schedule
    }

    pub fn trip_id(&self) -> &'a TripId {
        self.schedule.id()
    }
}

/// A pattern and the trips that run it.
///
/// # Invariants
///
/// - Scheduled trips are sorted by departure at the first stop, keeping
///   input order on ties
/// - Every trip has one time per pattern position
#[derive(Debug, Clone)]
pub struct Route {
    index: RouteIndex,
    id: RouteId,
    mode: TransitMode,
    pattern: Arc<TripPattern>,
    trips: Vec<TripSchedule>,
    frequencies: Vec<FrequencyEntry>,
    sorted_at_every_position: bool,
    constrained_positions: Vec<bool>,
}

impl Route {
    /// Build a route, sorting its timetable.
    ///
    /// # Errors
    ///
    /// Returns an error if a trip's length doesn't match the pattern or the
    /// route has no trips at all.
    pub fn new(
        index: RouteIndex,
        id: RouteId,
        mode: TransitMode,
        pattern: Arc<TripPattern>,
        mut trips: Vec<TripSchedule>,
        mut frequencies: Vec<FrequencyEntry>,
    ) -> Result<Self, DomainError> {
        if trips.is_empty() && frequencies.is_empty() {
            return Err(DomainError::EmptyRoute(id.to_string()));
        }
        let expected = pattern.len();
        let lengths = trips
            .iter()
            .map(TripSchedule::len)
            .chain(frequencies.iter().map(|f| f.template().len()));
        for actual in lengths {
            if actual != expected {
                return Err(DomainError::TimesLengthMismatch { expected, actual });
            }
        }

        let first = StopPosition(0);
        trips.sort_by_key(|t| t.departure(first));
        frequencies.sort_by_key(FrequencyEntry::start);

        let sorted_at_every_position = trips.windows(2).all(|w| {
            (0..expected).all(|p| {
                let p = StopPosition(p);
                w[0].departure(p) <= w[1].departure(p) && w[0].arrival(p) <= w[1].arrival(p)
            })
        });
        if !sorted_at_every_position {
            warn!(
                route = %id,
                "timetable has overtaking trips; boarding falls back to a linear scan"
            );
        }

        Ok(Self {
            index,
            id,
            mode,
            constrained_positions: vec![false; expected],
            pattern,
            trips,
            frequencies,
            sorted_at_every_position,
        })
    }

    pub fn index(&self) -> RouteIndex {
        self.index
    }

    pub fn id(&self) -> &RouteId {
        &self.id
    }

    pub fn mode(&self) -> TransitMode {
        self.mode
    }

    pub fn pattern(&self) -> &TripPattern {
        &self.pattern
    }

    /// Scheduled trips in sort order.
    pub fn trips(&self) -> &[TripSchedule] {
        &self.trips
    }

    pub fn frequencies(&self) -> &[FrequencyEntry] {
        &self.frequencies
    }

    /// Whether any constrained transfer boards this route at `pos`.
    pub fn has_constraints_at(&self, pos: StopPosition) -> bool {
        self.constrained_positions.get(pos.0).copied().unwrap_or(false)
    }

    pub(crate) fn mark_constrained(&mut self, pos: StopPosition) {
        if let Some(flag) = self.constrained_positions.get_mut(pos.0) {
            *flag = true;
        }
    }

    /// Resolve a handle back into an occurrence.
    pub fn occurrence(&self, handle: TripHandle) -> Option<TripOccurrence<'_>> {
        match handle {
            TripHandle::Scheduled(i) => self.trips.get(i).map(|t| TripOccurrence::scheduled(i, t)),
            TripHandle::Frequency {
                entry,
                first_departure,
            } => {
                let e = self.frequencies.get(entry)?;
                e.is_occurrence(first_departure)
                    .then(|| TripOccurrence::frequency(entry, e, first_departure))
            }
        }
    }

    /// Scheduled trip accessor by sort index.
    pub fn scheduled(&self, index: usize) -> Option<TripOccurrence<'_>> {
        self.trips.get(index).map(|t| TripOccurrence::scheduled(index, t))
    }

    /// Earliest scheduled trip departing `pos` at or after `earliest` that
    /// `accept` agrees to board. Ties go to the lower sort index.
    ///
    /// `accept` may impose stricter, trip-specific departure bounds; trips are
    /// offered in departure order, so the first accepted one is the earliest.
    pub fn earliest_scheduled<F>(
        &self,
        pos: StopPosition,
        earliest: ServiceTime,
        mut accept: F,
    ) -> Option<TripOccurrence<'_>>
    where
        F: FnMut(usize, &TripSchedule) -> bool,
    {
        if self.sorted_at_every_position {
            let start = self.trips.partition_point(|t| t.departure(pos) < earliest);
            return (start..self.trips.len())
                .find(|&i| accept(i, &self.trips[i]))
                .map(|i| TripOccurrence::scheduled(i, &self.trips[i]));
        }

        let mut best: Option<usize> = None;
        for (i, trip) in self.trips.iter().enumerate() {
            let dep = trip.departure(pos);
            if dep < earliest || best.is_some_and(|b| self.trips[b].departure(pos) <= dep) {
                continue;
            }
            if accept(i, trip) {
                best = Some(i);
            }
        }
        best.map(|i| TripOccurrence::scheduled(i, &self.trips[i]))
    }

    /// Earliest frequency occurrence departing `pos` at or after `earliest`.
    /// Ties go to the entry with the earlier start.
    pub fn earliest_frequency<F>(
        &self,
        pos: StopPosition,
        earliest: ServiceTime,
        mut accept: F,
    ) -> Option<TripOccurrence<'_>>
    where
        F: FnMut(&TripSchedule) -> bool,
    {
        let mut best: Option<TripOccurrence<'_>> = None;
        for (i, entry) in self.frequencies.iter().enumerate() {
            if !accept(entry.template()) {
                continue;
            }
            let Some(first) = entry.earliest_departure_at(pos, earliest) else {
                continue;
            };
            let candidate = TripOccurrence::frequency(i, entry, first);
            if best.is_none_or(|b| candidate.departure(pos) < b.departure(pos)) {
                best = Some(candidate);
            }
        }
        best
    }

    /// Earliest trip of either kind departing `pos` at or after `earliest`.
    ///
    /// On equal departures a scheduled trip wins over a frequency trip.
    pub fn earliest_trip<F>(
        &self,
        pos: StopPosition,
        earliest: ServiceTime,
        mut accept: F,
    ) -> Option<TripOccurrence<'_>>
    where
        F: FnMut(&TripSchedule) -> bool,
    {
        let scheduled = self.earliest_scheduled(pos, earliest, |_, t| accept(t));
        let frequency = self.earliest_frequency(pos, earliest, &mut accept);
        earlier_of(pos, scheduled, frequency)
    }
}

/// Pick the earlier-departing occurrence, preferring `first` on ties.
pub(crate) fn earlier_of<'a>(
    pos: StopPosition,
    first: Option<TripOccurrence<'a>>,
    second: Option<TripOccurrence<'a>>,
) -> Option<TripOccurrence<'a>> {
    match (first, second) {
        (Some(a), Some(b)) if b.departure(pos) < a.departure(pos) => Some(b),
        (Some(a), _) => Some(a),
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Accessibility, StopIndex, parse_times};

    fn trip(id: &str, times: &str) -> TripSchedule {
        TripSchedule::uniform(TripId::new(id).unwrap(), parse_times(times).unwrap()).unwrap()
    }

    fn t(s: &str) -> ServiceTime {
        ServiceTime::parse(s).unwrap()
    }

    fn route(trips: Vec<TripSchedule>, frequencies: Vec<FrequencyEntry>) -> Route {
        let pattern = TripPattern::new(
            "P",
            vec![StopIndex(0), StopIndex(1), StopIndex(2)],
        )
        .unwrap();
        Route::new(
            RouteIndex(0),
            RouteId::new("R").unwrap(),
            TransitMode::Bus,
            Arc::new(pattern),
            trips,
            frequencies,
        )
        .unwrap()
    }

    fn ids(occ: Option<TripOccurrence<'_>>) -> Option<String> {
        occ.map(|o| o.trip_id().to_string())
    }

    #[test]
    fn trips_are_sorted_stably() {
        let r = route(
            vec![
                trip("late", "0:10 0:15 0:20"),
                trip("tie-a", "0:05 0:10 0:15"),
                trip("tie-b", "0:05 0:11 0:16"),
            ],
            vec![],
        );
        let order: Vec<_> = r.trips().iter().map(|t| t.id().to_string()).collect();
        assert_eq!(order, vec!["tie-a", "tie-b", "late"]);
    }

    #[test]
    fn earliest_scheduled_picks_first_departure_at_or_after() {
        let r = route(
            vec![trip("a", "0:00 0:05 0:10"), trip("b", "0:10 0:15 0:20")],
            vec![],
        );
        let pos = StopPosition(1);
        assert_eq!(ids(r.earliest_trip(pos, t("0:05"), |_| true)), Some("a".into()));
        assert_eq!(ids(r.earliest_trip(pos, t("0:05:01"), |_| true)), Some("b".into()));
        assert_eq!(ids(r.earliest_trip(pos, t("0:16"), |_| true)), None);
    }

    #[test]
    fn equal_departures_prefer_sort_order() {
        let r = route(
            vec![trip("x", "0:05 0:10 0:15"), trip("y", "0:05 0:10 0:14")],
            vec![],
        );
        assert_eq!(
            ids(r.earliest_trip(StopPosition(0), t("0:00"), |_| true)),
            Some("x".into())
        );
    }

    #[test]
    fn accept_filter_skips_trips() {
        let r = route(
            vec![
                trip("a", "0:00 0:05 0:10").with_accessibility(Accessibility::NotPossible),
                trip("b", "0:10 0:15 0:20"),
            ],
            vec![],
        );
        let occ = r.earliest_trip(StopPosition(0), t("0:00"), |s| {
            s.accessibility() != Accessibility::NotPossible
        });
        assert_eq!(ids(occ), Some("b".into()));
    }

    #[test]
    fn overtaking_falls_back_to_linear_scan() {
        // The express leaves later but overtakes the local
        let r = route(
            vec![trip("local", "0:00 0:20 0:40"), trip("express", "0:05 0:10 0:15")],
            vec![],
        );
        assert!(!r.sorted_at_every_position);
        let occ = r.earliest_trip(StopPosition(1), t("0:09"), |_| true);
        assert_eq!(ids(occ), Some("express".into()));
    }

    #[test]
    fn frequency_occurrence_times() {
        let template = trip("f", "0:00 0:05 0:10");
        let entry = FrequencyEntry::new(template, t("8:00"), t("9:00"), 600).unwrap();
        let r = route(vec![], vec![entry]);

        let occ = r.earliest_trip(StopPosition(1), t("8:07"), |_| true).unwrap();
        assert_eq!(occ.departure(StopPosition(1)), t("8:15"));
        // Arrival carries one headway of margin
        assert_eq!(occ.arrival(StopPosition(2)), t("8:30"));
        assert_eq!(
            occ.handle(),
            TripHandle::Frequency {
                entry: 0,
                first_departure: t("8:10")
            }
        );

        let again = r.occurrence(occ.handle()).unwrap();
        assert_eq!(again.departure(StopPosition(0)), t("8:10"));
        assert!(
            r.occurrence(TripHandle::Frequency {
                entry: 0,
                first_departure: t("8:11")
            })
            .is_none()
        );
    }

    #[test]
    fn scheduled_wins_ties_with_frequency() {
        let entry =
            FrequencyEntry::new(trip("f", "0:00 0:05 0:10"), t("8:00"), t("9:00"), 600).unwrap();
        let r = route(vec![trip("s", "8:10 8:15 8:20")], vec![entry]);
        let occ = r.earliest_trip(StopPosition(0), t("8:01"), |_| true).unwrap();
        assert_eq!(occ.handle(), TripHandle::Scheduled(0));
    }

    #[test]
    fn frequency_wins_when_earlier() {
        let entry =
            FrequencyEntry::new(trip("f", "0:00 0:05 0:10"), t("8:00"), t("9:00"), 600).unwrap();
        let r = route(vec![trip("s", "8:20 8:25 8:30")], vec![entry]);
        let occ = r.earliest_trip(StopPosition(0), t("8:01"), |_| true).unwrap();
        assert!(occ.handle().is_frequency());
    }

    #[test]
    fn reject_mismatched_trip() {
        let pattern = TripPattern::new("P", vec![StopIndex(0), StopIndex(1)]).unwrap();
        let err = Route::new(
            RouteIndex(0),
            RouteId::new("R").unwrap(),
            TransitMode::Bus,
            Arc::new(pattern),
            vec![trip("a", "0:00 0:05 0:10")],
            vec![],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DomainError::TimesLengthMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn reject_empty_route() {
        let pattern = TripPattern::new("P", vec![StopIndex(0), StopIndex(1)]).unwrap();
        let err = Route::new(
            RouteIndex(0),
            RouteId::new("R").unwrap(),
            TransitMode::Bus,
            Arc::new(pattern),
            vec![],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, DomainError::EmptyRoute("R".into()));
    }
}
