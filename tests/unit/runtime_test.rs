//! Tests for API models and the tokio spawner

use chassis_scheduler::core::{ChassisRegistry, InMemoryAuditSink, Scheduler, SchedulerError, UnitState};
use chassis_scheduler::runtime::{create_from_request, Hypervisor, Spawn, TokioSpawner, UnitRequest};

fn hypervisor() -> Hypervisor {
    Hypervisor::new(Scheduler::new(ChassisRegistry::builtin(), 1))
}

#[test]
fn test_request_from_json_defaults() {
    let req: UnitRequest = serde_json::from_str(
        r#"{ "unit_id": "u1", "chassis": "minimal" }"#,
    )
    .unwrap();
    assert!(req.resources.is_empty());
    assert!(req.metadata.is_none());

    let status = create_from_request(&hypervisor(), req).unwrap();
    assert_eq!(status.state, UnitState::Created);
}

#[test]
fn test_request_metadata_attached() {
    let hv = hypervisor();
    let req: UnitRequest = serde_json::from_str(
        r#"{
            "unit_id": "u1",
            "chassis": "prokaryote",
            "resources": { "catalytic_units": 10, "nadh": 5 },
            "priority": 2,
            "metadata": { "accession": "NC_000913.3", "length": 4641652 }
        }"#,
    )
    .unwrap();
    let status = create_from_request(&hv, req).unwrap();
    assert_eq!(status.metadata.unwrap()["accession"], "NC_000913.3");
    assert_eq!(status.resource_claim["nadh"], 5);
}

#[test]
fn test_request_with_metadata_is_one_admission() {
    let hv = hypervisor().with_audit(Box::new(InMemoryAuditSink::new(16)));
    let req: UnitRequest = serde_json::from_str(
        r#"{ "unit_id": "u1", "chassis": "minimal", "metadata": { "plasmid": "pUC19" } }"#,
    )
    .unwrap();
    let status = create_from_request(&hv, req.clone()).unwrap();
    assert_eq!(status.metadata.as_ref().unwrap()["plasmid"], "pUC19");
    assert_eq!(hv.get_status("u1").unwrap(), status);

    // a rejected duplicate leaves the admitted unit and its metadata alone
    let err = create_from_request(&hv, req).unwrap_err();
    assert!(matches!(err, SchedulerError::DuplicateUnit { .. }));
    assert_eq!(hv.get_status("u1").unwrap(), status);

    let actions: Vec<String> = hv.audit_events().into_iter().map(|e| e.action).collect();
    assert_eq!(actions, vec!["create", "reject"]);
}

#[test]
fn test_request_with_unknown_dimension() {
    let req: UnitRequest = serde_json::from_str(
        r#"{ "unit_id": "u1", "chassis": "minimal", "resources": { "gtp": 1 } }"#,
    )
    .unwrap();
    let err = create_from_request(&hypervisor(), req).unwrap_err();
    assert!(matches!(err, SchedulerError::UnknownDimension { .. }));
}

#[test]
fn test_health_serializes() {
    let health = hypervisor().health();
    let json = serde_json::to_value(&health).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["live_units"], 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}
