//! Builders to construct the scheduler stack from configuration.

use crate::config::SchedulerConfig;
use crate::core::{ChassisRegistry, InMemoryAuditSink, Scheduler, SchedulerError};
use crate::runtime::Hypervisor;

/// Validate `cfg` and build its chassis registry.
pub fn build_registry(cfg: &SchedulerConfig) -> Result<ChassisRegistry, SchedulerError> {
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;
    cfg.to_registry()
}

/// Build a scheduler with the configured registry and quantum.
pub fn build_scheduler(cfg: &SchedulerConfig) -> Result<Scheduler, SchedulerError> {
    let registry = build_registry(cfg)?;
    tracing::info!(
        chassis = ?registry.names(),
        quantum_ticks = cfg.quantum_ticks,
        "scheduler configured"
    );
    Ok(Scheduler::new(registry, cfg.quantum_ticks))
}

/// Build a façade with an in-memory audit sink sized from `cfg`.
pub fn build_hypervisor(cfg: &SchedulerConfig) -> Result<Hypervisor, SchedulerError> {
    let scheduler = build_scheduler(cfg)?;
    Ok(Hypervisor::new(scheduler)
        .with_audit(Box::new(InMemoryAuditSink::new(cfg.audit_capacity))))
}
