//! Search configuration for the transit planner.

use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Error loading or validating a [`SearchConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config is not valid JSON or has the wrong shape
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field has an unusable value
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Which stop-arrival state the engine runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchProfile {
    /// Earliest arrival per stop and round; cost is only computed for the
    /// paths found.
    Standard,
    /// Pareto frontier per stop over arrival time, rides and cost.
    #[default]
    MultiCriteria,
}

/// Post-processing applied to the transfers of each path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMode {
    #[default]
    #[serde(rename = "none")]
    Off,
    /// Spread waiting time evenly by maximizing the slack at transfers.
    WaitTime,
    /// Prefer guaranteed, preferred and recommended connections.
    TransferPriority,
}

/// Configuration parameters for transit search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of transfers; the engine runs one more round than this.
    pub max_transfers: usize,

    /// Width of the departure window (seconds). Zero runs a single
    /// iteration at the earliest departure time.
    pub search_window_secs: i32,

    /// Step between departure times inside the window (seconds).
    pub iteration_step_secs: i32,

    /// Minimum time between arriving at a stop and boarding (seconds).
    pub board_slack_secs: i32,

    /// Extra time required when boarding after a previous ride (seconds).
    pub transfer_slack_secs: i32,

    /// Maximum Pareto frontier size per stop.
    /// Entries beyond this are dropped, worst cost first.
    pub max_frontier_size: usize,

    /// Give up after this many milliseconds and return what was found.
    pub timeout_ms: Option<u64>,

    pub profile: SearchProfile,

    pub transfer_optimization: OptimizationMode,

    /// Weight of transfer wait time in the wait-time optimization.
    pub inverse_wait_reluctance: f64,
}

/// Rounds are packed into a byte next to the iteration number.
const MAX_TRANSFERS_LIMIT: usize = 250;

impl SearchConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });
        if self.max_transfers > MAX_TRANSFERS_LIMIT {
            return invalid("max_transfers", "must be at most 250");
        }
        if self.search_window_secs < 0 {
            return invalid("search_window_secs", "must not be negative");
        }
        if self.iteration_step_secs <= 0 {
            return invalid("iteration_step_secs", "must be positive");
        }
        if self.board_slack_secs < 0 || self.transfer_slack_secs < 0 {
            return invalid("slack", "must not be negative");
        }
        if self.max_frontier_size == 0 {
            return invalid("max_frontier_size", "must be positive");
        }
        if !(self.inverse_wait_reluctance >= 0.0 && self.inverse_wait_reluctance.is_finite()) {
            return invalid("inverse_wait_reluctance", "must be a non-negative number");
        }
        Ok(())
    }

    /// Number of rounds: one per ride.
    pub fn max_rounds(&self) -> usize {
        self.max_transfers + 1
    }

    /// Returns the search window as a Duration.
    pub fn search_window(&self) -> Duration {
        Duration::seconds(self.search_window_secs.into())
    }

    /// Returns the board slack as a Duration.
    pub fn board_slack(&self) -> Duration {
        Duration::seconds(self.board_slack_secs.into())
    }

    /// Returns the transfer slack as a Duration.
    pub fn transfer_slack(&self) -> Duration {
        Duration::seconds(self.transfer_slack_secs.into())
    }

    /// Returns the timeout, if any.
    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_ms.map(std::time::Duration::from_millis)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_transfers: 12,
            search_window_secs: 0,
            iteration_step_secs: 60,
            board_slack_secs: 0,
            transfer_slack_secs: 60,
            max_frontier_size: 200,
            timeout_ms: None,
            profile: SearchProfile::MultiCriteria,
            transfer_optimization: OptimizationMode::Off,
            inverse_wait_reluctance: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.max_transfers, 12);
        assert_eq!(config.max_rounds(), 13);
        assert_eq!(config.search_window_secs, 0);
        assert_eq!(config.iteration_step_secs, 60);
        assert_eq!(config.board_slack_secs, 0);
        assert_eq!(config.transfer_slack_secs, 60);
        assert_eq!(config.max_frontier_size, 200);
        assert_eq!(config.timeout_ms, None);
        assert_eq!(config.profile, SearchProfile::MultiCriteria);
        assert_eq!(config.transfer_optimization, OptimizationMode::Off);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn duration_methods() {
        let config = SearchConfig {
            search_window_secs: 3600,
            timeout_ms: Some(250),
            ..SearchConfig::default()
        };

        assert_eq!(config.search_window(), Duration::hours(1));
        assert_eq!(config.board_slack(), Duration::zero());
        assert_eq!(config.transfer_slack(), Duration::minutes(1));
        assert_eq!(config.timeout(), Some(std::time::Duration::from_millis(250)));
    }

    #[test]
    fn partial_json() {
        let config = SearchConfig::from_json_str(
            r#"{ "max_transfers": 3, "profile": "standard", "transfer_optimization": "none" }"#,
        )
        .unwrap();

        assert_eq!(config.max_transfers, 3);
        assert_eq!(config.profile, SearchProfile::Standard);
        assert_eq!(config.transfer_optimization, OptimizationMode::Off);
        assert_eq!(config.transfer_slack_secs, 60);
    }

    #[test]
    fn optimization_modes_from_json() {
        let config =
            SearchConfig::from_json_str(r#"{ "transfer_optimization": "transfer_priority" }"#)
                .unwrap();
        assert_eq!(config.transfer_optimization, OptimizationMode::TransferPriority);

        let config =
            SearchConfig::from_json_str(r#"{ "transfer_optimization": "wait_time" }"#).unwrap();
        assert_eq!(config.transfer_optimization, OptimizationMode::WaitTime);
    }

    #[test]
    fn reject_invalid_values() {
        let err = SearchConfig::from_json_str(r#"{ "iteration_step_secs": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "iteration_step_secs",
                ..
            }
        ));

        assert!(SearchConfig::from_json_str(r#"{ "max_transfers": 1000 }"#).is_err());
        assert!(SearchConfig::from_json_str(r#"{ "max_frontier_size": 0 }"#).is_err());
        assert!(matches!(
            SearchConfig::from_json_str("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "search_window_secs": 1800, "timeout_ms": 500 }}"#).unwrap();

        let config = SearchConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.search_window_secs, 1800);
        assert_eq!(config.timeout_ms, Some(500));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SearchConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
