//! Tests for audit sink

use meter_service_engine::core::{
    build_audit_event, AuditAction, AuditSink, InMemoryAuditSink, UnitKey,
};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event(
        UnitKey::vehicle("V1"),
        AuditAction::ServiceCompleted,
        Some(serde_json::json!({ "service_meter": 150.0 })),
    );

    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].event_id, event.event_id);
    assert_eq!(events[0].unit, UnitKey::vehicle("V1"));
    assert_eq!(events[0].action, AuditAction::ServiceCompleted);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event(UnitKey::part("I1"), AuditAction::Fitted, None));
    sink.record(build_audit_event(UnitKey::part("I2"), AuditAction::Fitted, None));
    sink.record(build_audit_event(UnitKey::part("I3"), AuditAction::Fitted, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].unit.id, "I2"); // First one popped
    assert_eq!(events[1].unit.id, "I3");
}

#[test]
fn test_build_audit_event() {
    let a = build_audit_event(UnitKey::compressor("C1"), AuditAction::ThresholdSet, None);
    let b = build_audit_event(UnitKey::compressor("C1"), AuditAction::ThresholdSet, None);

    assert_ne!(a.event_id, b.event_id);
    assert_eq!(a.payload, None);
    assert!(a.created_at_ms > 0);
    let json = serde_json::to_value(&a).unwrap();
    assert_eq!(json["action"], "threshold_set");
    assert_eq!(json["unit"]["kind"], "compressor");
}
