//! The search entry point.
//!
//! [`Planner::search`] validates the request, runs the round loop with the
//! configured state variant, rebuilds paths from the destination arrivals,
//! filters and optionally optimizes them, and returns them ranked.

use tracing::{debug, warn};

use crate::cost::CostCalculator;
use crate::domain::Path;
use crate::optimize::TransferOptimizer;
use crate::transit::TransitDataProvider;

use super::boarding::Slack;
use super::config::{OptimizationMode, SearchConfig, SearchProfile};
use super::engine::{EngineOutput, RangeRaptor, SearchStats};
use super::extract::PathBuilder;
use super::rank::{partition_dominated_by, partition_duplicates, rank_paths};
use super::request::{SearchError, SearchRequest};
use super::state::{
    DebugStopArrivals, MultiCriteriaState, NoopListener, SearchListener, StandardState,
    StopArrivals,
};

/// Result of transit search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Found paths, ranked best-first and mutually non-dominated.
    pub paths: Vec<Path>,

    /// Counters from the round loop.
    pub stats: SearchStats,

    /// Whether the search stopped at the configured timeout. The paths
    /// found until then are still returned.
    pub timed_out: bool,
}

impl SearchResult {
    /// Create an empty result.
    pub fn empty() -> Self {
        Self {
            paths: Vec::new(),
            stats: SearchStats::default(),
            timed_out: false,
        }
    }
}

/// Transit planner over one network snapshot.
///
/// A planner holds only borrows, so it is cheap to create per request and
/// can be shared between threads when the provider is.
pub struct Planner<'a, D: TransitDataProvider + ?Sized> {
    data: &'a D,
    config: &'a SearchConfig,
}

impl<'a, D: TransitDataProvider + ?Sized> Planner<'a, D> {
    /// Create a new planner.
    pub fn new(data: &'a D, config: &'a SearchConfig) -> Self {
        Self { data, config }
    }

    /// Search for paths from the request's access stops to its egress stops.
    ///
    /// # Errors
    ///
    /// Returns a [`SearchError`] if the request or configuration is unusable.
    /// Finding no path is not an error.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        let cost = self.prepare(request)?;
        let stops = self.data.number_of_stops();
        let result = match self.config.profile {
            SearchProfile::Standard => {
                let state = StandardState::new(stops, self.config.max_rounds());
                self.finish(request, &cost, self.run(request, &cost, state), &mut NoopListener)
            }
            SearchProfile::MultiCriteria => {
                let state = MultiCriteriaState::new(stops, self.config.max_frontier_size);
                self.finish(request, &cost, self.run(request, &cost, state), &mut NoopListener)
            }
        };
        Ok(result)
    }

    /// Like [`search`](Self::search), reporting every decision to `listener`.
    ///
    /// The listener only observes: the result is the same as without it.
    pub fn search_with_listener<L>(
        &self,
        request: &SearchRequest,
        listener: &mut L,
    ) -> Result<SearchResult, SearchError>
    where
        L: SearchListener + ?Sized,
    {
        let cost = self.prepare(request)?;
        let stops = self.data.number_of_stops();
        let result = match self.config.profile {
            SearchProfile::Standard => {
                let state = StandardState::new(stops, self.config.max_rounds());
                let output = self
                    .run(request, &cost, DebugStopArrivals::new(state, &mut *listener))
                    .map_state(DebugStopArrivals::into_inner);
                self.finish(request, &cost, output, listener)
            }
            SearchProfile::MultiCriteria => {
                let state = MultiCriteriaState::new(stops, self.config.max_frontier_size);
                let output = self
                    .run(request, &cost, DebugStopArrivals::new(state, &mut *listener))
                    .map_state(DebugStopArrivals::into_inner);
                self.finish(request, &cost, output, listener)
            }
        };
        Ok(result)
    }

    fn prepare(&self, request: &SearchRequest) -> Result<CostCalculator, SearchError> {
        self.config
            .validate()
            .map_err(|e| SearchError::InvalidRequest(e.to_string()))?;
        request.validate(self.data.number_of_stops())?;
        Ok(CostCalculator::new(request.cost.clone(), self.data))
    }

    fn run<S: StopArrivals>(
        &self,
        request: &SearchRequest,
        cost: &CostCalculator,
        state: S,
    ) -> EngineOutput<S> {
        RangeRaptor::new(self.data, self.config, request, cost, state).run()
    }

    fn finish<S, L>(
        &self,
        request: &SearchRequest,
        cost: &CostCalculator,
        output: EngineOutput<S>,
        listener: &mut L,
    ) -> SearchResult
    where
        S: StopArrivals,
        L: SearchListener + ?Sized,
    {
        let EngineOutput {
            state,
            destinations,
            stats,
            timed_out,
        } = output;

        let builder = PathBuilder::new(self.data, request, cost, Slack::from_config(self.config));
        let paths = builder.build_all(state.arena(), &destinations);
        let found = paths.len();

        // A range search keeps later departures
        let dominates: fn(&Path, &Path) -> bool = if self.config.search_window_secs > 0 {
            Path::dominates_with_departure
        } else {
            Path::dominates
        };

        let (paths, duplicates) = partition_duplicates(paths);
        for path in &duplicates {
            listener.path_rejected(path, "duplicate");
        }
        let (mut paths, dominated) = partition_dominated_by(paths, dominates);
        for path in &dominated {
            listener.path_rejected(path, "dominated");
        }

        if self.config.transfer_optimization != OptimizationMode::Off {
            let optimizer = TransferOptimizer::new(self.data, cost, self.config);
            let (kept, dominated) = partition_dominated_by(optimizer.optimize_all(paths), dominates);
            for path in &dominated {
                listener.path_rejected(path, "dominated");
            }
            paths = kept;
        }

        let paths = rank_paths(paths);
        for path in &paths {
            listener.path_accepted(path);
        }

        if stats.frontier_truncations > 0 {
            warn!(
                truncations = stats.frontier_truncations,
                max_frontier_size = self.config.max_frontier_size,
                "stop frontiers overflowed; some paths may be missing"
            );
        }
        debug!(
            iterations = stats.iterations,
            rounds = stats.rounds,
            accepted = stats.arrivals_accepted,
            rejected = stats.arrivals_rejected,
            found,
            returned = paths.len(),
            timed_out,
            "search complete"
        );

        SearchResult {
            paths,
            stats,
            timed_out,
        }
    }
}
