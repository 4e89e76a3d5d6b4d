//! Searches running on several threads against a swappable snapshot.

use std::sync::Arc;

use transit_raptor::domain::{
    AccessEgress, RouteId, ServiceTime, StopIndex, TransitMode, TripId, TripPattern,
    TripSchedule, parse_times,
};
use transit_raptor::planner::{Planner, SearchConfig, SearchRequest, SearchResult};
use transit_raptor::transit::{SnapshotHandle, TransitSnapshot};

fn t(s: &str) -> ServiceTime {
    ServiceTime::parse(s).unwrap()
}

/// Stops A, B, C with one route A→B→C running the given trips.
fn network(trips: &[(&str, &str)]) -> TransitSnapshot {
    let mut b = TransitSnapshot::builder();
    let stops = vec![b.add_stop("A"), b.add_stop("B"), b.add_stop("C")];
    let trips = trips
        .iter()
        .map(|(id, times)| {
            TripSchedule::uniform(TripId::new(*id).unwrap(), parse_times(times).unwrap()).unwrap()
        })
        .collect();
    b.add_route(
        RouteId::new("R1").unwrap(),
        TransitMode::Bus,
        TripPattern::new("A-B-C", stops).unwrap(),
        trips,
        vec![],
    )
    .unwrap();
    b.build()
}

fn request() -> SearchRequest {
    SearchRequest::new(
        t("8:00"),
        vec![AccessEgress::walk(StopIndex(0), 60, 120)],
        vec![AccessEgress::walk(StopIndex(2), 60, 120)],
    )
}

fn search(data: &TransitSnapshot, config: &SearchConfig) -> SearchResult {
    Planner::new(data, config).search(&request()).unwrap()
}

#[test]
fn parallel_searches_agree() {
    let data = network(&[
        ("T1", "8:05 8:10 8:20"),
        ("T2", "8:15 8:20 8:30"),
        ("T3", "8:25 8:30 8:40"),
    ]);
    let config = SearchConfig {
        search_window_secs: 1800,
        ..SearchConfig::default()
    };
    let expected = search(&data, &config);
    assert_eq!(expected.paths.len(), 3);

    std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8).map(|_| scope.spawn(|| search(&data, &config))).collect();
        for worker in workers {
            let result = worker.join().unwrap();
            assert_eq!(result.paths, expected.paths);
            assert_eq!(result.stats, expected.stats);
        }
    });
}

#[test]
fn replacing_snapshot_leaves_running_searches_alone() {
    let handle = SnapshotHandle::new(network(&[("T1", "8:05 8:10 8:20")]));
    let config = SearchConfig::default();

    let before = handle.current();
    let old = handle.replace(network(&[("T9", "8:02 8:04 8:08")]));
    assert!(Arc::ptr_eq(&before, &old));

    // A search holding the old snapshot still sees the old timetable
    let result = search(&before, &config);
    assert_eq!(result.paths[0].arrival_time(), t("8:21"));

    let result = search(&handle.current(), &config);
    assert_eq!(result.paths[0].arrival_time(), t("8:09"));
}

#[test]
fn readers_during_swaps_see_whole_snapshots() {
    let handle = SnapshotHandle::new(network(&[("T1", "8:05 8:10 8:20")]));
    let config = SearchConfig::default();

    std::thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    for _ in 0..50 {
                        let data = handle.current();
                        let arrival = search(&data, &config).paths[0].arrival_time();
                        assert!(arrival == t("8:21") || arrival == t("8:09"), "{arrival}");
                    }
                })
            })
            .collect();

        for i in 0..20 {
            let trips: &[(&str, &str)] = if i % 2 == 0 {
                &[("T9", "8:02 8:04 8:08")]
            } else {
                &[("T1", "8:05 8:10 8:20")]
            };
            handle.replace(network(trips));
        }

        for reader in readers {
            reader.join().unwrap();
        }
    });
}
