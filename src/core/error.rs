//! Error types for scheduler operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::unit::UnitState;

/// One dimension that could not satisfy an allocation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    /// Dimension name.
    pub dimension: String,
    /// Amount requested.
    pub requested: u64,
    /// Amount still allocatable when the request was evaluated.
    pub available: u64,
}

/// Errors produced by scheduler components.
///
/// Every variant is caller-correctable; nothing here is retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    /// A live unit already holds this id.
    #[error("duplicate unit: {unit_id}")]
    DuplicateUnit {
        /// Offending id.
        unit_id: String,
    },
    /// No chassis profile is registered under this name.
    #[error("chassis not found: {name}")]
    ChassisNotFound {
        /// Requested profile name.
        name: String,
    },
    /// The request names a dimension outside the pool's schema.
    #[error("unknown resource dimension: {dimension}")]
    UnknownDimension {
        /// Offending dimension name.
        dimension: String,
    },
    /// At least one dimension lacks capacity. The flat fields describe the
    /// first failing dimension; `shortfalls` lists all of them.
    #[error(
        "resource exhausted: {dimension} requested {requested}, available {available}"
    )]
    ResourceExhausted {
        /// First failing dimension.
        dimension: String,
        /// Amount requested on that dimension.
        requested: u64,
        /// Amount available on that dimension.
        available: u64,
        /// Every failing dimension, in dimension-name order.
        shortfalls: Vec<Shortfall>,
    },
    /// The lifecycle edge is not part of the state machine.
    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// State the unit was in.
        from: UnitState,
        /// State that was requested.
        to: UnitState,
    },
    /// No live unit holds this id.
    #[error("unit not found: {unit_id}")]
    UnitNotFound {
        /// Requested id.
        unit_id: String,
    },
    /// Priority must be a positive integer.
    #[error("invalid priority: {0}")]
    InvalidPriority(u8),
    /// Configuration failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// Pool ledger and unit claims disagree, or a pool exceeds its usable capacity.
    #[error("invariant violation on chassis {chassis}: {detail}")]
    InvariantViolation {
        /// Chassis whose pool drifted.
        chassis: String,
        /// Human-readable description of the drift.
        detail: String,
    },
}

impl SchedulerError {
    /// Stable tag for structured logging and audit payloads.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DuplicateUnit { .. } => "duplicate_unit",
            Self::ChassisNotFound { .. } => "chassis_not_found",
            Self::UnknownDimension { .. } => "unknown_dimension",
            Self::ResourceExhausted { .. } => "resource_exhausted",
            Self::InvalidStateTransition { .. } => "invalid_state_transition",
            Self::UnitNotFound { .. } => "unit_not_found",
            Self::InvalidPriority(_) => "invalid_priority",
            Self::InvalidConfig(_) => "invalid_config",
            Self::InvariantViolation { .. } => "invariant_violation",
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
