//! Wheelchair accessibility tags.

use serde::{Deserialize, Serialize};

/// Wheelchair accessibility of a trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// Known to be accessible.
    Possible,
    /// Known to be inaccessible.
    NotPossible,
    /// The feed says nothing.
    #[default]
    NoInformation,
}
