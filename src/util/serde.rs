//! Serializable identifiers and shared value types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-assigned unit identifier.
pub type UnitId = String;

/// Requested or granted amounts keyed by resource dimension name.
pub type ResourceAmounts = BTreeMap<String, u64>;

/// Catalytic-synthesis units (ribosome-like capacity).
pub const CATALYTIC_UNITS: &str = "catalytic_units";
/// Memory-like storage, in abstract units.
pub const MEMORY: &str = "memory";
/// Energy currency, tracked as a percentage of the chassis budget.
pub const ENERGY_CURRENCY: &str = "energy_currency";

/// Scheduling priority. Lower values win; zero is not a valid priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Priority(pub u8);

impl Priority {
    /// Highest possible priority.
    pub const HIGHEST: Self = Self(1);

    /// Whether this value may be assigned to a unit.
    pub const fn is_valid(self) -> bool {
        self.0 >= 1
    }

    /// Raw priority value.
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(4)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Build a [`ResourceAmounts`] map from `(dimension, amount)` pairs.
pub fn amounts<I, K>(pairs: I) -> ResourceAmounts
where
    I: IntoIterator<Item = (K, u64)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
