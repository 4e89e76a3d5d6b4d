//! Constrained transfers between specific trips.

use serde::{Deserialize, Serialize};

use super::{StopPosition, TripId};

/// How a specific trip-to-trip connection deviates from default transfer rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferConstraint {
    /// The departing trip waits: always accepted, whatever the timing.
    Guaranteed,
    /// The connection may never be used.
    NotAllowed,
    /// The connection needs at least this many seconds, replacing the
    /// default transfer slack.
    MinTransferTime(i32),
}

impl TransferConstraint {
    fn restrictiveness(self) -> (u8, i32) {
        match self {
            TransferConstraint::NotAllowed => (2, 0),
            TransferConstraint::MinTransferTime(d) => (1, d),
            TransferConstraint::Guaranteed => (0, 0),
        }
    }

    /// The more restrictive of two constraints.
    ///
    /// `NotAllowed` beats `MinTransferTime`, which beats `Guaranteed`; between
    /// two minimum times the longer one wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_raptor::domain::TransferConstraint::*;
    ///
    /// assert_eq!(Guaranteed.most_restrictive(NotAllowed), NotAllowed);
    /// assert_eq!(MinTransferTime(60).most_restrictive(MinTransferTime(300)), MinTransferTime(300));
    /// assert_eq!(MinTransferTime(60).most_restrictive(Guaranteed), MinTransferTime(60));
    /// ```
    pub fn most_restrictive(self, other: Self) -> Self {
        if other.restrictiveness() > self.restrictiveness() {
            other
        } else {
            self
        }
    }
}

/// Rider preference attached to a connection, used by priority optimization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferPriority {
    #[default]
    Allowed,
    Recommended,
    Preferred,
}

/// Priority cost of a forbidden connection.
pub const NOT_ALLOWED_PRIORITY_COST: i32 = 1000;

const GUARANTEED_BONUS: i32 = 10;

/// Priority cost of a connection: lower is better.
///
/// Plain connections cost 33; recommended and preferred ones 32 and 31; a
/// guarantee takes another 10 off.
pub fn priority_cost(constraint: Option<TransferConstraint>, priority: TransferPriority) -> i32 {
    let base = match priority {
        TransferPriority::Allowed => 33,
        TransferPriority::Recommended => 32,
        TransferPriority::Preferred => 31,
    };
    match constraint {
        Some(TransferConstraint::NotAllowed) => NOT_ALLOWED_PRIORITY_COST,
        Some(TransferConstraint::Guaranteed) => base - GUARANTEED_BONUS,
        _ => base,
    }
}

/// A constraint between alighting one trip and boarding another.
///
/// Trips are referenced by id and resolved when the snapshot is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstrainedTransfer {
    pub from_trip: TripId,
    pub from_position: StopPosition,
    pub to_trip: TripId,
    pub to_position: StopPosition,
    pub constraint: TransferConstraint,
    pub priority: TransferPriority,
}

impl ConstrainedTransfer {
    /// Create a constrained transfer with the default priority.
    pub fn new(
        from_trip: TripId,
        from_position: StopPosition,
        to_trip: TripId,
        to_position: StopPosition,
        constraint: TransferConstraint,
    ) -> Self {
        Self {
            from_trip,
            from_position,
            to_trip,
            to_position,
            constraint,
            priority: TransferPriority::Allowed,
        }
    }

    /// Set the transfer priority.
    pub fn with_priority(mut self, priority: TransferPriority) -> Self {
        self.priority = priority;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TransferConstraint::*;

    #[test]
    fn precedence_is_total() {
        let all = [Guaranteed, NotAllowed, MinTransferTime(30), MinTransferTime(600)];
        for a in all {
            for b in all {
                assert_eq!(a.most_restrictive(b), b.most_restrictive(a));
                assert_eq!(a.most_restrictive(NotAllowed), NotAllowed);
            }
        }
    }

    #[test]
    fn priority_costs() {
        assert_eq!(priority_cost(None, TransferPriority::Allowed), 33);
        assert_eq!(priority_cost(None, TransferPriority::Preferred), 31);
        assert_eq!(priority_cost(Some(Guaranteed), TransferPriority::Allowed), 23);
        assert_eq!(
            priority_cost(Some(NotAllowed), TransferPriority::Preferred),
            NOT_ALLOWED_PRIORITY_COST
        );
        assert_eq!(priority_cost(Some(MinTransferTime(60)), TransferPriority::Recommended), 32);
    }
}
