//! API-facing request/response models.

use serde::{Deserialize, Serialize};

use crate::core::{SchedulerError, UnitStatus};
use crate::runtime::Hypervisor;
use crate::util::serde::{Priority, ResourceAmounts, UnitId};

/// Unit creation request as received from an external caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRequest {
    /// Caller-assigned id.
    pub unit_id: UnitId,
    /// Chassis profile name.
    pub chassis: String,
    /// Requested amounts per dimension.
    #[serde(default)]
    pub resources: ResourceAmounts,
    /// Scheduling priority.
    #[serde(default)]
    pub priority: Priority,
    /// Opaque metadata from the sequence loader.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Health response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Live units across all chassis.
    pub live_units: usize,
    /// Current logical tick.
    pub clock: u64,
    /// First invariant violation found, if any.
    pub violation: Option<String>,
}

/// Admit a unit from a request, attaching its metadata when present.
///
/// Admission and metadata happen under one façade lock acquisition.
pub fn create_from_request(
    hypervisor: &Hypervisor,
    req: UnitRequest,
) -> Result<UnitStatus, SchedulerError> {
    hypervisor.create_unit_with_metadata(
        &req.unit_id,
        &req.chassis,
        &req.resources,
        req.priority,
        req.metadata,
    )
}
