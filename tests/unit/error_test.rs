//! Tests for error types

use meter_service_engine::core::{EngineError, ErrorKind};

#[test]
fn test_not_found_error() {
    let err = EngineError::NotFound("vehicle `V9` not found".to_string());
    assert_eq!(format!("{}", err), "not found: vehicle `V9` not found");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_invalid_argument_error() {
    let err = EngineError::InvalidArgument("meter reading -1 is negative".to_string());
    assert_eq!(format!("{}", err), "invalid argument: meter reading -1 is negative");
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_invalid_state_error() {
    let err = EngineError::InvalidState("already fitted".to_string());
    assert_eq!(format!("{}", err), "invalid state: already fitted");
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn test_conflict_error() {
    let err = EngineError::Conflict("changed concurrently".to_string());
    assert_eq!(format!("{}", err), "conflict: changed concurrently");
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_error_kind_wire_names() {
    assert_eq!(serde_json::to_value(ErrorKind::InvalidState).unwrap(), "invalid_state");
    assert_eq!(serde_json::to_value(ErrorKind::NotFound).unwrap(), "not_found");
}
