//! Path filtering and ranking for search results.
//!
//! Ranks paths by a combination of factors to present the most useful
//! options first.

use crate::domain::Path;

/// Rank paths by preference.
///
/// Paths are ranked by:
/// 1. Arrival time (earlier is better)
/// 2. Number of transfers (fewer is better)
/// 3. Generalized cost (lower is better)
/// 4. Departure time (later is better)
///
/// The sort is stable, so equal paths keep their input order.
pub fn rank_paths(mut paths: Vec<Path>) -> Vec<Path> {
    paths.sort_by(|a, b| {
        a.arrival_time()
            .cmp(&b.arrival_time())
            .then_with(|| a.number_of_transfers().cmp(&b.number_of_transfers()))
            .then_with(|| a.generalized_cost().cmp(&b.generalized_cost()))
            .then_with(|| b.departure_time().cmp(&a.departure_time()))
    });
    paths
}

/// Remove dominated paths.
///
/// See [`Path::dominates`]. Paths with identical criteria are all kept.
pub fn remove_dominated(paths: Vec<Path>) -> Vec<Path> {
    partition_dominated(paths).0
}

/// Split paths into the non-dominated ones and the rest, each in input
/// order.
pub fn partition_dominated(paths: Vec<Path>) -> (Vec<Path>, Vec<Path>) {
    partition_dominated_by(paths, Path::dominates)
}

/// [`partition_dominated`] with a custom dominance test.
pub fn partition_dominated_by(
    paths: Vec<Path>,
    dominates: fn(&Path, &Path) -> bool,
) -> (Vec<Path>, Vec<Path>) {
    if paths.len() <= 1 {
        return (paths, Vec::new());
    }

    let mut kept: Vec<Path> = Vec::with_capacity(paths.len());
    let mut removed = Vec::new();

    for path in paths {
        if kept.iter().any(|existing| dominates(existing, &path)) {
            removed.push(path);
            continue;
        }
        // Also remove any kept paths dominated by this one
        let (survivors, beaten): (Vec<_>, Vec<_>) =
            kept.into_iter().partition(|existing| !dominates(&path, existing));
        kept = survivors;
        removed.extend(beaten);
        kept.push(path);
    }

    (kept, removed)
}

/// Collapse paths with identical legs.
///
/// Of two duplicates the one with lower cost is kept, then the one with
/// fewer transfers, then the earlier arrival; on a full tie the first wins.
pub fn deduplicate(paths: Vec<Path>) -> Vec<Path> {
    partition_duplicates(paths).0
}

/// Split paths into unique ones and the duplicates that were dropped.
pub fn partition_duplicates(paths: Vec<Path>) -> (Vec<Path>, Vec<Path>) {
    let mut kept: Vec<Path> = Vec::with_capacity(paths.len());
    let mut dropped = Vec::new();

    for path in paths {
        match kept.iter_mut().find(|k| k.legs() == path.legs()) {
            Some(existing) if preference(&path) < preference(existing) => {
                dropped.push(std::mem::replace(existing, path));
            }
            Some(_) => dropped.push(path),
            None => kept.push(path),
        }
    }

    (kept, dropped)
}

fn preference(path: &Path) -> (i32, usize, crate::domain::ServiceTime) {
    (
        path.generalized_cost(),
        path.number_of_transfers(),
        path.arrival_time(),
    )
}
