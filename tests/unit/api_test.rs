//! Tests for the JSON API surface

use meter_service_engine::builders::EngineBuilder;
use meter_service_engine::config::EngineConfig;
use meter_service_engine::core::{
    ErrorKind, InMemoryAuditSink, MaintenanceEngine, Unit, UnitKey,
};
use meter_service_engine::infra::{InMemoryEquipmentStore, InMemoryServiceHistory};
use meter_service_engine::runtime::api::{self, ApiError, CompleteServiceRequest};
use meter_service_engine::runtime::handle_json;
use serde_json::json;

type Engine = MaintenanceEngine<InMemoryEquipmentStore, InMemoryServiceHistory>;

fn engine() -> Engine {
    let engine = EngineBuilder::new(EngineConfig::default())
        .with_audit(Box::new(InMemoryAuditSink::new(8)))
        .build_in_memory()
        .unwrap();
    engine
        .register(Unit::new_vehicle("V1", "Tipper", 120.0).with_threshold(100.0))
        .unwrap();
    engine.register(Unit::new_vehicle("V2", "Loader", 0.0)).unwrap();
    engine.register(Unit::new_part("I1", "Breaker #4", 0.0)).unwrap();
    engine
}

#[test]
fn test_complete_service_request() {
    let engine = engine();
    let record = api::complete_service(
        &engine,
        CompleteServiceRequest {
            unit_kind: meter_service_engine::core::UnitKind::Vehicle,
            unit_id: "V1".into(),
            service_meter: 150.0,
            next_threshold: Some(500.0),
            notes: Some("500h service".into()),
            performed_by: "Ravi".into(),
            service_date: "2024-07-02".into(),
        },
    )
    .unwrap();
    assert_eq!(record.unit_id, "V1");
    assert_eq!(record.notes.as_deref(), Some("500h service"));
    assert_eq!(serde_json::to_value(&record).unwrap()["service_date"], "2024-07-02");
    assert_eq!(
        engine.get_meter_state(&UnitKey::vehicle("V1")).unwrap().current_meter,
        150.0
    );
}

#[test]
fn test_error_status_mapping() {
    assert_eq!(ApiError::status_for(ErrorKind::NotFound), 404);
    assert_eq!(ApiError::status_for(ErrorKind::InvalidArgument), 400);
    assert_eq!(ApiError::status_for(ErrorKind::InvalidState), 422);
    assert_eq!(ApiError::status_for(ErrorKind::Conflict), 409);

    let engine = engine();
    let err = api::unfit_item(&engine, "I1").unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    assert_eq!(err.http_status, 422);
}

#[test]
fn test_handle_json_fit_and_list() {
    let engine = engine();

    let resp = handle_json(
        &engine,
        &json!({ "op": "fit_item", "instance_id": "I1", "vehicle_id": "V2" }).to_string(),
    );
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["status"], "fitted");
    assert_eq!(resp.body["fitted_to_vehicle_id"], "V2");

    let resp = handle_json(&engine, r#"{ "op": "list_fitted_to", "vehicle_id": "V2" }"#);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body.as_array().unwrap().len(), 1);

    let resp = handle_json(&engine, r#"{ "op": "list_available" }"#);
    assert_eq!(resp.body.as_array().unwrap().len(), 0);
}

#[test]
fn test_handle_json_alerts() {
    let engine = engine();

    let resp = handle_json(&engine, r#"{ "op": "list_alerts" }"#);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["count"], 1);
    assert_eq!(resp.body["alerts"][0]["unit_id"], "V1");
    assert_eq!(resp.body["alerts"][0]["status"], "OVERDUE");
    assert_eq!(resp.body["alerts"][0]["overdue_by"], 20.0);

    let resp = handle_json(&engine, r#"{ "op": "list_alerts", "unit_kind": "item" }"#);
    assert_eq!(resp.body["count"], 0);

    let resp = handle_json(&engine, r#"{ "op": "list_urgent_alerts" }"#);
    assert_eq!(resp.body["count"], 1);

    let resp = handle_json(&engine, r#"{ "op": "alert_summary" }"#);
    assert_eq!(resp.body["vehicle"]["overdue"], 1);
    assert_eq!(resp.body["item"]["overdue"], 0);
}

#[test]
fn test_handle_json_meter_operations() {
    let engine = engine();

    let resp = handle_json(
        &engine,
        r#"{ "op": "advance_meter", "unit_kind": "vehicle", "unit_id": "V2", "new_reading": 40 }"#,
    );
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["current_meter"], 40.0);

    let resp = handle_json(
        &engine,
        r#"{ "op": "advance_meter", "unit_kind": "vehicle", "unit_id": "V2", "new_reading": 10 }"#,
    );
    assert_eq!(resp.status, 400);
    assert_eq!(resp.body["kind"], "invalid_argument");

    let resp = handle_json(
        &engine,
        r#"{ "op": "set_threshold", "unit_kind": "vehicle", "unit_id": "V2", "threshold": 90 }"#,
    );
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["next_service_threshold"], 90.0);

    let resp = handle_json(
        &engine,
        r#"{ "op": "get_meter_state", "unit_kind": "compressor", "unit_id": "V2" }"#,
    );
    assert_eq!(resp.status, 404);
    assert_eq!(resp.body["kind"], "not_found");
}

#[test]
fn test_handle_json_rejects_malformed_requests() {
    let engine = engine();
    let resp = handle_json(&engine, r#"{ "op": "launch_rockets" }"#);
    assert_eq!(resp.status, 400);
    assert_eq!(resp.body["kind"], "invalid_argument");

    let resp = handle_json(&engine, "{");
    assert_eq!(resp.status, 400);
}

#[test]
fn test_health() {
    assert!(api::health().ok);

    let engine = engine();
    let resp = handle_json(&engine, r#"{ "op": "health" }"#);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["ok"], true);
}
