//! Tests for utility functions

use chassis_scheduler::util::{amounts, init_tracing, LogicalClock, Priority, CATALYTIC_UNITS, MEMORY};

#[test]
fn test_priority_ordering() {
    assert!(Priority(1) < Priority(2));
    assert!(Priority::HIGHEST < Priority::default());
}

#[test]
fn test_priority_validity() {
    assert!(!Priority(0).is_valid());
    assert!(Priority(1).is_valid());
    assert_eq!(Priority(7).to_string(), "p7");
}

#[test]
fn test_priority_serializes_as_number() {
    assert_eq!(serde_json::to_string(&Priority(3)).unwrap(), "3");
    let p: Priority = serde_json::from_str("5").unwrap();
    assert_eq!(p, Priority(5));
}

#[test]
fn test_amounts_builder() {
    let request = amounts([(CATALYTIC_UNITS, 10), (MEMORY, 256)]);
    assert_eq!(request.len(), 2);
    assert_eq!(request[CATALYTIC_UNITS], 10);
    assert_eq!(request[MEMORY], 256);
}

#[test]
fn test_logical_clock() {
    let mut clock = LogicalClock::new(3);
    clock.advance();
    clock.advance();
    assert_eq!(clock.now(), 6);
}

#[test]
fn test_init_tracing_is_repeatable() {
    init_tracing();
    init_tracing();
    tracing::info!("subscriber installed");
}
