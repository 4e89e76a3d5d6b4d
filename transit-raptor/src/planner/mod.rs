//! Transit planner using Range-RAPTOR.
//!
//! This module implements the round-based search that answers: "leaving
//! from these stops no earlier than this time, how can I reach one of
//! those stops?"
//!
//! Each round extends every known arrival by one more ride, then by one
//! street transfer. Arrivals are kept either as the earliest per stop and
//! round, or as a Pareto frontier over time, rides and generalized cost.

pub(crate) mod boarding;
mod config;
mod engine;
mod extract;
mod rank;
mod request;
mod search;
pub mod state;


pub use config::{ConfigError, OptimizationMode, SearchConfig, SearchProfile};
pub use engine::SearchStats;
pub use rank::{deduplicate, rank_paths, remove_dominated};
pub use request::{SearchError, SearchRequest};
pub use search::{Planner, SearchResult};
pub use state::{NoopListener, SearchListener};
