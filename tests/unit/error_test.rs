//! Tests for error types

use chassis_scheduler::core::{SchedulerError, Shortfall, UnitState};

#[test]
fn test_duplicate_unit_error() {
    let err = SchedulerError::DuplicateUnit {
        unit_id: "x".to_string(),
    };
    assert_eq!(format!("{}", err), "duplicate unit: x");
    assert_eq!(err.code(), "duplicate_unit");
}

#[test]
fn test_resource_exhausted_error() {
    let err = SchedulerError::ResourceExhausted {
        dimension: "catalytic_units".to_string(),
        requested: 40,
        available: 30,
        shortfalls: vec![Shortfall {
            dimension: "catalytic_units".to_string(),
            requested: 40,
            available: 30,
        }],
    };
    assert_eq!(
        format!("{}", err),
        "resource exhausted: catalytic_units requested 40, available 30"
    );
}

#[test]
fn test_invalid_transition_error() {
    let err = SchedulerError::InvalidStateTransition {
        from: UnitState::Created,
        to: UnitState::Paused,
    };
    assert_eq!(format!("{}", err), "invalid state transition: created -> paused");
}

#[test]
fn test_not_found_errors() {
    let err = SchedulerError::UnitNotFound {
        unit_id: "ghost".to_string(),
    };
    assert_eq!(format!("{}", err), "unit not found: ghost");
    let err = SchedulerError::ChassisNotFound {
        name: "archaea".to_string(),
    };
    assert_eq!(format!("{}", err), "chassis not found: archaea");
}

#[test]
fn test_unknown_dimension_error() {
    let err = SchedulerError::UnknownDimension {
        dimension: "gtp".to_string(),
    };
    assert_eq!(format!("{}", err), "unknown resource dimension: gtp");
    assert_eq!(err.code(), "unknown_dimension");
}
