//! Tests for builder modules

use meter_service_engine::builders::{build_engine, EngineBuilder};
use meter_service_engine::config::EngineConfig;
use meter_service_engine::core::{AuditAction, EngineError, Unit, UnitKey};
use meter_service_engine::infra::{InMemoryEquipmentStore, InMemoryServiceHistory};

#[test]
fn test_engine_builder_defaults() {
    let builder = EngineBuilder::new(EngineConfig::default());
    assert_eq!(builder.config().audit_capacity, 1024);
    let engine = builder.build_in_memory().unwrap();
    assert_eq!(engine.policy().near_band.part, 50.0);
}

#[test]
fn test_build_engine_rejects_invalid_config() {
    let mut cfg = EngineConfig::default();
    cfg.urgent_within.compressor = 150.0;
    let result = build_engine(&cfg, InMemoryEquipmentStore::new(), InMemoryServiceHistory::new());
    assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
}

#[test]
fn test_engine_builder_with_in_memory_audit() {
    let mut cfg = EngineConfig::default();
    cfg.audit_capacity = 2;
    let (builder, sink) = EngineBuilder::new(cfg).with_in_memory_audit();
    let engine = builder.build_in_memory().unwrap();

    engine.register(Unit::new_vehicle("V1", "Truck", 0.0)).unwrap();
    let key = UnitKey::vehicle("V1");
    engine.advance_meter(&key, 10.0).unwrap();
    engine.advance_meter(&key, 20.0).unwrap();
    engine.set_threshold(&key, Some(300.0)).unwrap();

    let events = sink.lock().events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].action, AuditAction::MeterAdvanced);
    assert_eq!(events[1].action, AuditAction::ThresholdSet);
}
