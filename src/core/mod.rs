//! Core domain: unit state, transactions, alert derivation and aggregation.

pub mod aggregator;
pub mod alert;
pub mod audit;
pub mod engine;
pub mod error;
pub mod fitment;
pub mod history;
pub mod service;
pub mod store;
pub mod unit;

pub use aggregator::{AlertFilter, AlertSummary, KindSummary};
pub use alert::{
    Alert, AlertPolicy, AlertPriority, AlertStatus, KindBands, ServiceAssessment, ServiceStatus,
};
pub use audit::{AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, build_audit_event};
pub use engine::MaintenanceEngine;
pub use error::{AppResult, EngineError, ErrorKind};
pub use history::{ServiceHistory, ServiceRecord};
pub use service::ServiceCompletion;
pub use store::EquipmentStore;
pub use unit::{
    Compressor, FitStatus, Meter, MeterState, PartInstance, Unit, UnitId, UnitKey, UnitKind,
    Vehicle, Versioned,
};
