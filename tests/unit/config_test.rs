//! Tests for configuration validation

use std::collections::HashMap;

use meter_service_engine::config::EngineConfig;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_default_config_is_valid() {
    let cfg = EngineConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.bands.vehicle, 100.0);
    assert_eq!(cfg.bands.compressor, 100.0);
    assert_eq!(cfg.bands.part, 50.0);
}

#[test]
fn test_urgency_must_be_inside_band() {
    let mut cfg = EngineConfig::default();
    cfg.urgent_within.vehicle = 100.0;
    assert!(cfg.validate().is_err());

    let mut cfg = EngineConfig::default();
    cfg.urgent_within.part = 0.0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_audit_capacity() {
    let mut cfg = EngineConfig::default();
    cfg.audit_capacity = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_poll_interval() {
    let mut cfg = EngineConfig::default();
    cfg.poll_interval_secs = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "bands": { "vehicle": 200, "compressor": 150, "part": 40 },
        "urgent_within": { "vehicle": 60, "compressor": 60, "part": 10 },
        "audit_capacity": 64
    }"#;

    let cfg = EngineConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.bands.vehicle, 200.0);
    assert_eq!(cfg.urgent_within.part, 10.0);
    assert_eq!(cfg.audit_capacity, 64);
    assert_eq!(cfg.poll_interval_secs, 30);
}

#[test]
fn test_config_from_json_partial_bands_keep_defaults() {
    let json = r#"{
        "bands": { "item": 40 },
        "urgent_within": { "vehicle": 60 }
    }"#;

    let cfg = EngineConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.bands.vehicle, 100.0);
    assert_eq!(cfg.bands.compressor, 100.0);
    assert_eq!(cfg.bands.part, 40.0);
    assert_eq!(cfg.urgent_within.vehicle, 60.0);
    assert_eq!(cfg.urgent_within.compressor, 50.0);
    assert_eq!(cfg.urgent_within.part, 20.0);
}

#[test]
fn test_config_serializes_part_bands_as_item() {
    let value = serde_json::to_value(EngineConfig::default()).unwrap();
    assert_eq!(value["bands"]["item"], 50.0);
    assert_eq!(value["urgent_within"]["item"], 20.0);
    assert!(value["bands"].get("part").is_none());

    let back = EngineConfig::from_json_str(&value.to_string()).unwrap();
    assert_eq!(back, EngineConfig::default());
}

#[test]
fn test_config_from_json_rejects_invalid_values() {
    let json = r#"{ "urgent_within": { "vehicle": 500, "compressor": 60, "part": 10 } }"#;
    assert!(EngineConfig::from_json_str(json).is_err());
    assert!(EngineConfig::from_json_str("not json").is_err());
    assert!(EngineConfig::from_json_str(r#"{ "bands": { "trailer": 10 } }"#).is_err());
}

#[test]
fn test_config_from_lookup_overrides_defaults() {
    let cfg = EngineConfig::from_lookup(lookup(&[
        ("METER_URGENT_VEHICLE", "60"),
        ("METER_BAND_PART", " 80 "),
        ("METER_POLL_INTERVAL_SECS", "5"),
    ]))
    .unwrap();
    assert_eq!(cfg.urgent_within.vehicle, 60.0);
    assert_eq!(cfg.bands.part, 80.0);
    assert_eq!(cfg.poll_interval_secs, 5);
    assert_eq!(cfg.bands.vehicle, 100.0);
}

#[test]
fn test_config_from_lookup_reports_parse_and_validation_errors() {
    let err = EngineConfig::from_lookup(lookup(&[("METER_BAND_VEHICLE", "lots")])).unwrap_err();
    assert!(err.to_string().contains("METER_BAND_VEHICLE"));

    let err = EngineConfig::from_lookup(lookup(&[("METER_URGENT_PART", "75")])).unwrap_err();
    assert!(err.to_string().contains("engine config invalid"));
}
