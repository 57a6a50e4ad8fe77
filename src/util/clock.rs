//! Wall-clock and logical-clock helpers.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch, or `0` if the system clock is before it.
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Discrete clock advanced in fixed quanta by the time-slice loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalClock {
    now: u64,
    quantum: u64,
}

impl LogicalClock {
    /// Create a clock at tick zero. A zero quantum is bumped to one.
    pub fn new(quantum: u64) -> Self {
        Self {
            now: 0,
            quantum: quantum.max(1),
        }
    }

    /// Current tick.
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Ticks per quantum.
    pub const fn quantum(&self) -> u64 {
        self.quantum
    }

    /// Advance one quantum and return the new tick.
    pub fn advance(&mut self) -> u64 {
        self.now = self.now.saturating_add(self.quantum);
        self.now
    }
}
