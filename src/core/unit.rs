//! Unit entity and its lifecycle guard.
//!
//! The guard only knows which edges exist. Pairing a transition with its
//! resource side effect (for example releasing the claim on destroy) is the
//! scheduler's job.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::resource_pool::Reservation;
use crate::core::SchedulerError;
use crate::util::serde::{Priority, ResourceAmounts, UnitId};

/// Lifecycle state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    /// Admitted; resources claimed but never run.
    Created,
    /// Eligible for time slices.
    Running,
    /// Suspended; keeps its claim.
    Paused,
    /// Finished running; keeps its claim until destroyed.
    Stopped,
    /// Failed; keeps its claim until destroyed.
    Error,
    /// Terminal. Claim released, id free for reuse.
    Destroyed,
}

impl UnitState {
    /// Every state, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Created,
        Self::Running,
        Self::Paused,
        Self::Stopped,
        Self::Error,
        Self::Destroyed,
    ];

    /// Whether no transition leaves this state.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Destroyed)
    }

    /// Stable string tag for structured logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Error => "error",
            Self::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `from -> to` is an edge of the unit state machine.
pub const fn can_transition(from: UnitState, to: UnitState) -> bool {
    use UnitState as S;
    match (from, to) {
        (S::Created, S::Running)
        | (S::Running, S::Paused)
        | (S::Paused, S::Running | S::Stopped)
        | (S::Created | S::Running | S::Paused | S::Stopped, S::Error)
        | (S::Created | S::Running | S::Paused | S::Stopped | S::Error, S::Destroyed) => true,
        _ => false,
    }
}

/// A logical execution entity bound to one chassis.
#[derive(Debug, Clone, Serialize)]
pub struct Unit {
    id: UnitId,
    chassis: String,
    priority: Priority,
    claim: Reservation,
    state: UnitState,
    created_at_ms: u128,
    created_at_tick: u64,
    last_scheduled_at: Option<u64>,
    slices_granted: u64,
    metadata: Option<serde_json::Value>,
    error_reason: Option<String>,
}

impl Unit {
    /// New unit in `Created`, holding `claim`.
    pub fn new(
        id: UnitId,
        chassis: String,
        priority: Priority,
        claim: Reservation,
        created_at_ms: u128,
        created_at_tick: u64,
    ) -> Self {
        Self {
            id,
            chassis,
            priority,
            claim,
            state: UnitState::Created,
            created_at_ms,
            created_at_tick,
            last_scheduled_at: None,
            slices_granted: 0,
            metadata: None,
            error_reason: None,
        }
    }

    /// Unit id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Chassis the unit is bound to.
    pub fn chassis(&self) -> &str {
        &self.chassis
    }

    /// Scheduling priority.
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> UnitState {
        self.state
    }

    /// Reservation backing this unit's claim.
    pub const fn claim(&self) -> &Reservation {
        &self.claim
    }

    /// Logical tick of the most recent slice, `None` if never scheduled.
    pub const fn last_scheduled_at(&self) -> Option<u64> {
        self.last_scheduled_at
    }

    /// Number of slices granted so far.
    pub const fn slices_granted(&self) -> u64 {
        self.slices_granted
    }

    /// Opaque caller-supplied metadata.
    pub const fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }

    /// Move to `to` if the edge exists.
    pub fn apply_transition(&mut self, to: UnitState) -> Result<(), SchedulerError> {
        if !can_transition(self.state, to) {
            return Err(SchedulerError::InvalidStateTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    pub(crate) fn set_error_reason(&mut self, reason: String) {
        self.error_reason = Some(reason);
    }

    pub(crate) fn set_metadata(&mut self, metadata: serde_json::Value) {
        self.metadata = Some(metadata);
    }

    pub(crate) fn record_slice(&mut self, tick: u64) {
        self.last_scheduled_at = Some(tick);
        self.slices_granted += 1;
    }

    /// Status record for callers.
    pub fn status(&self) -> UnitStatus {
        UnitStatus {
            unit_id: self.id.clone(),
            state: self.state,
            chassis: self.chassis.clone(),
            resource_claim: self.claim.amounts().clone(),
            priority: self.priority,
            created_at_ms: self.created_at_ms,
            created_at_tick: self.created_at_tick,
            last_scheduled_at: self.last_scheduled_at,
            slices_granted: self.slices_granted,
            error_reason: self.error_reason.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// Serializable status record returned by the façade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStatus {
    /// Unit id.
    pub unit_id: UnitId,
    /// Lifecycle state.
    pub state: UnitState,
    /// Chassis profile name.
    pub chassis: String,
    /// Granted amounts per dimension.
    pub resource_claim: ResourceAmounts,
    /// Scheduling priority.
    pub priority: Priority,
    /// Wall-clock creation time, milliseconds since epoch.
    pub created_at_ms: u128,
    /// Logical-clock creation tick.
    pub created_at_tick: u64,
    /// Logical tick of the most recent slice.
    pub last_scheduled_at: Option<u64>,
    /// Slices granted so far.
    pub slices_granted: u64,
    /// Reason recorded when the unit entered `Error`.
    pub error_reason: Option<String>,
    /// Opaque caller-supplied metadata.
    pub metadata: Option<serde_json::Value>,
}
