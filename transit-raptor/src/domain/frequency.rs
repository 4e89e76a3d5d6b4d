//! Frequency-based (headway) trips.

use super::{DomainError, ServiceTime, StopPosition, TripSchedule};

/// A trip that repeats at a fixed headway between a start and an end time.
///
/// The template schedule is stored relative to its own first departure, so
/// an occurrence leaving the first stop at `d` has departure
/// `d + template.departure(p)` at position `p`. `start` and `end` bound the
/// first-stop departure of the occurrences; both are inclusive.
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::{parse_times, FrequencyEntry, ServiceTime, StopPosition, TripId, TripSchedule};
///
/// let template = TripSchedule::uniform(TripId::new("F1").unwrap(), parse_times("0:00 0:05").unwrap()).unwrap();
/// let entry = FrequencyEntry::new(template, ServiceTime::hms(8, 0, 0), ServiceTime::hms(9, 0, 0), 600).unwrap();
///
/// // Rounded up to the next 10-minute departure
/// let first = entry.earliest_departure_at(StopPosition(0), ServiceTime::hms(8, 3, 0));
/// assert_eq!(first, Some(ServiceTime::hms(8, 10, 0)));
///
/// // Past the end of service
/// assert_eq!(entry.earliest_departure_at(StopPosition(0), ServiceTime::hms(9, 0, 1)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyEntry {
    template: TripSchedule,
    start: ServiceTime,
    end: ServiceTime,
    headway: i32,
}

impl FrequencyEntry {
    /// Create a frequency entry, normalising the template to depart at 0.
    pub fn new(
        template: TripSchedule,
        start: ServiceTime,
        end: ServiceTime,
        headway_secs: i32,
    ) -> Result<Self, DomainError> {
        if headway_secs <= 0 {
            return Err(DomainError::InvalidHeadway(headway_secs));
        }
        if end < start {
            return Err(DomainError::InvertedFrequencyWindow);
        }
        let base = template.departure(StopPosition(0)).secs();
        Ok(Self {
            template: template.shifted(-base),
            start,
            end,
            headway: headway_secs,
        })
    }

    /// Template schedule, relative to a first departure at 0.
    pub fn template(&self) -> &TripSchedule {
        &self.template
    }

    pub fn start(&self) -> ServiceTime {
        self.start
    }

    pub fn end(&self) -> ServiceTime {
        self.end
    }

    /// Headway in seconds.
    pub fn headway(&self) -> i32 {
        self.headway
    }

    /// First-stop departure of the earliest occurrence leaving `pos` at or
    /// after `earliest`, or `None` if no occurrence exists in the window.
    pub fn earliest_departure_at(
        &self,
        pos: StopPosition,
        earliest: ServiceTime,
    ) -> Option<ServiceTime> {
        let needed = earliest.secs() - self.template.departure(pos).secs();
        let from_start = needed - self.start.secs();
        let k = if from_start <= 0 {
            0
        } else {
            (from_start + self.headway - 1) / self.headway
        };
        let first = self.start + k * self.headway;
        (first <= self.end).then_some(first)
    }

    /// Whether `first_departure` is one of this entry's occurrences.
    pub fn is_occurrence(&self, first_departure: ServiceTime) -> bool {
        first_departure >= self.start
            && first_departure <= self.end
            && (first_departure - self.start) % self.headway == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{parse_times, TripId};

    fn entry(start: &str, end: &str, headway: i32) -> FrequencyEntry {
        let template = TripSchedule::uniform(
            TripId::new("F").unwrap(),
            parse_times("0:30 0:35 0:45").unwrap(),
        )
        .unwrap();
        FrequencyEntry::new(
            template,
            ServiceTime::parse(start).unwrap(),
            ServiceTime::parse(end).unwrap(),
            headway,
        )
        .unwrap()
    }

    #[test]
    fn template_is_normalised() {
        let e = entry("8:00", "9:00", 600);
        assert_eq!(e.template().departure(StopPosition(0)), ServiceTime::MIDNIGHT);
        assert_eq!(e.template().departure(StopPosition(2)).secs(), 900);
    }

    #[test]
    fn exact_headway_multiple_is_kept() {
        let e = entry("8:00", "9:00", 600);
        // Position 1 departs 5 minutes after the first stop
        let first = e.earliest_departure_at(StopPosition(1), ServiceTime::hms(8, 15, 0));
        assert_eq!(first, Some(ServiceTime::hms(8, 10, 0)));
    }

    #[test]
    fn before_start_uses_first_occurrence() {
        let e = entry("8:00", "9:00", 600);
        let first = e.earliest_departure_at(StopPosition(0), ServiceTime::hms(6, 0, 0));
        assert_eq!(first, Some(ServiceTime::hms(8, 0, 0)));
    }

    #[test]
    fn end_is_inclusive() {
        let e = entry("8:00", "9:00", 600);
        let last = e.earliest_departure_at(StopPosition(0), ServiceTime::hms(8, 55, 0));
        assert_eq!(last, Some(ServiceTime::hms(9, 0, 0)));
        assert!(e.is_occurrence(ServiceTime::hms(9, 0, 0)));
        assert!(!e.is_occurrence(ServiceTime::hms(8, 5, 0)));
    }

    #[test]
    fn invalid_entries() {
        let template =
            TripSchedule::uniform(TripId::new("F").unwrap(), parse_times("0:00 0:05").unwrap())
                .unwrap();
        assert_eq!(
            FrequencyEntry::new(template.clone(), ServiceTime::MIDNIGHT, ServiceTime::MIDNIGHT, 0)
                .unwrap_err(),
            DomainError::InvalidHeadway(0)
        );
        assert_eq!(
            FrequencyEntry::new(template, ServiceTime::hms(9, 0, 0), ServiceTime::hms(8, 0, 0), 60)
                .unwrap_err(),
            DomainError::InvertedFrequencyWindow
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{parse_times, TripId};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn occurrence_is_earliest_at_or_after(
            start in 0i32..20_000,
            span in 0i32..20_000,
            headway in 1i32..3_600,
            query in -5_000i32..50_000,
        ) {
            let template = TripSchedule::uniform(
                TripId::new("F").unwrap(),
                parse_times("0:00 0:07").unwrap(),
            ).unwrap();
            let start = ServiceTime::from_secs(start);
            let end = start + span;
            let e = FrequencyEntry::new(template, start, end, headway).unwrap();
            let pos = StopPosition(1);
            let query = ServiceTime::from_secs(query);

            match e.earliest_departure_at(pos, query) {
                Some(first) => {
                    prop_assert!(e.is_occurrence(first));
                    prop_assert!(first + 420 >= query);
                    // The previous occurrence would have left too early
                    if first > start {
                        prop_assert!(first - headway + 420 < query);
                    }
                }
                None => {
                    let last = start + (span / headway) * headway;
                    prop_assert!(last + 420 < query);
                }
            }
        }
    }
}
