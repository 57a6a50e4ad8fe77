//! Tests for audit sink

use chassis_scheduler::core::{build_audit_event, AuditSink, InMemoryAuditSink, TracingAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event("unit1", "prokaryote", "create", Some("payload".to_string()));

    sink.record(event);
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].unit_id, "unit1");
    assert_eq!(events[0].chassis, "prokaryote");
    assert_eq!(events[0].action, "create");
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event("u1", "minimal", "create", None));
    sink.record(build_audit_event("u2", "minimal", "create", None));
    sink.record(build_audit_event("u3", "minimal", "create", None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].unit_id, "u2"); // First one popped
    assert_eq!(events[1].unit_id, "u3");
}

#[test]
fn test_zero_capacity_sink_drops_everything() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event("u1", "minimal", "create", None));
    assert!(sink.events().is_empty());
}

#[test]
fn test_build_audit_event() {
    let a = build_audit_event("u1", "eukaryote", "destroy", Some("teardown".to_string()));
    let b = build_audit_event("u1", "eukaryote", "destroy", None);

    assert_eq!(a.chassis, "eukaryote");
    assert_eq!(a.action, "destroy");
    assert_eq!(a.payload, Some("teardown".to_string()));
    assert!(a.created_at_ms > 0);
    assert_ne!(a.event_id, b.event_id);
}

#[test]
fn test_tracing_sink_keeps_nothing() {
    let mut sink = TracingAuditSink;
    sink.record(build_audit_event("u1", "minimal", "start", None));
    assert!(sink.events().is_empty());
}
