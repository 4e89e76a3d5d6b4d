use std::time::Instant;

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use transit_raptor::domain::{
    AccessEgress, DomainError, InvalidId, RouteId, ServiceTime, StopIndex, Transfer, TransitMode, TripId,
    TripPattern, TripSchedule,
};
use transit_raptor::planner::{Planner, SearchConfig, SearchRequest};
use transit_raptor::transit::{SnapshotHandle, TransitSnapshot};

/// Side of the demo grid, in stops.
const GRID: usize = 8;

/// Minutes between neighbouring stops on a line.
const HOP_MINUTES: i32 = 2;

#[derive(Debug, thiserror::Error)]
enum NetworkError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Id(#[from] InvalidId),
}

/// Build a grid with one line per row and per column, both directions,
/// every ten minutes from 6:00 to 9:00.
fn grid_network() -> Result<TransitSnapshot, NetworkError> {
    let mut builder = TransitSnapshot::builder();
    let stops: Vec<StopIndex> = (0..GRID * GRID)
        .map(|i| builder.add_stop(format!("S{}-{}", i / GRID, i % GRID)))
        .collect();
    let at = |row: usize, col: usize| stops[row * GRID + col];

    let mut lines = Vec::new();
    for i in 0..GRID {
        let row: Vec<_> = (0..GRID).map(|col| at(i, col)).collect();
        let col: Vec<_> = (0..GRID).map(|row| at(row, i)).collect();
        lines.push((format!("H{i}"), row.clone()));
        lines.push((format!("H{i}r"), row.into_iter().rev().collect()));
        lines.push((format!("V{i}"), col.clone()));
        lines.push((format!("V{i}r"), col.into_iter().rev().collect()));
    }

    for (name, line) in lines {
        let trips = (0..18)
            .map(|k| {
                let first = ServiceTime::hms(6, 10 * k, 0);
                let times = (0..line.len() as i32)
                    .map(|i| first + i * HOP_MINUTES * 60)
                    .collect();
                let id = TripId::new(format!("{name}-{k}"))?;
                Ok(TripSchedule::uniform(id, times)?)
            })
            .collect::<Result<Vec<_>, NetworkError>>()?;
        builder.add_route(
            RouteId::new(name.as_str())?,
            TransitMode::Bus,
            TripPattern::new(name, line)?,
            trips,
            vec![],
        )?;
    }

    // Diagonal walks between grid cells
    for row in 0..GRID - 1 {
        for col in 0..GRID - 1 {
            let walk = Transfer::new(at(row + 1, col + 1), 240, 480)?.with_distance(300);
            builder.add_transfer(at(row, col), walk)?;
        }
    }

    Ok(builder.build())
}

fn load_config() -> SearchConfig {
    let Ok(path) = std::env::var("RAPTOR_CONFIG") else {
        return SearchConfig::default();
    };
    match SearchConfig::from_json_file(&path) {
        Ok(config) => {
            info!(%path, "loaded search config");
            config
        }
        Err(e) => {
            warn!(%path, error = %e, "falling back to default search config");
            SearchConfig::default()
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = load_config();
    let snapshot = match grid_network() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!(error = %e, "failed to build demo network");
            std::process::exit(1);
        }
    };
    let handle = SnapshotHandle::new(snapshot);
    let departure = ServiceTime::hms(7, 0, 0);

    let started = Instant::now();
    let outcomes: Vec<_> = std::thread::scope(|scope| {
        let workers: Vec<_> = (1..GRID)
            .map(|target| {
                let handle = &handle;
                let config = &config;
                scope.spawn(move || {
                    let data = handle.current();
                    let request = SearchRequest::new(
                        departure,
                        vec![AccessEgress::walk(StopIndex(0), 120, 240)],
                        vec![AccessEgress::walk(StopIndex(target * GRID + target), 60, 120)],
                    );
                    (target, Planner::new(data.as_ref(), config).search(&request))
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join()).collect()
    });

    for outcome in outcomes {
        match outcome {
            Ok((target, Ok(result))) => {
                println!(
                    "S0-0 -> S{target}-{target}: {} paths, {} rounds{}",
                    result.paths.len(),
                    result.stats.rounds,
                    if result.timed_out { " (timed out)" } else { "" }
                );
                for path in &result.paths {
                    println!("  {path}");
                }
            }
            Ok((target, Err(e))) => error!(target, error = %e, "search failed"),
            Err(_) => error!("search thread panicked"),
        }
    }
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "all searches finished");
}
