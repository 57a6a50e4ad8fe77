//! Tests for builder modules

use chassis_scheduler::builders::{build_hypervisor, build_registry, build_scheduler};
use chassis_scheduler::config::SchedulerConfig;
use chassis_scheduler::core::SchedulerError;
use chassis_scheduler::util::{amounts, Priority, CATALYTIC_UNITS};

#[test]
fn test_build_registry_from_default() {
    let registry = build_registry(&SchedulerConfig::default()).unwrap();
    assert_eq!(registry.names(), vec!["eukaryote", "minimal", "prokaryote"]);
}

#[test]
fn test_build_rejects_invalid_config() {
    let mut config = SchedulerConfig::default();
    config.quantum_ticks = 0;
    let err = build_scheduler(&config).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfig(_)));
}

#[test]
fn test_build_scheduler_uses_quantum() {
    let mut config = SchedulerConfig::default();
    config.quantum_ticks = 25;
    let mut scheduler = build_scheduler(&config).unwrap();
    scheduler.tick();
    assert_eq!(scheduler.clock(), 25);
}

#[test]
fn test_build_hypervisor_attaches_audit() {
    let hv = build_hypervisor(&SchedulerConfig::default()).unwrap();
    hv.create_unit("u1", "minimal", &amounts([(CATALYTIC_UNITS, 1)]), Priority(1))
        .unwrap();
    assert_eq!(hv.audit_events().len(), 1);
}
