//! Maintenance engine facade.
//!
//! Wires the equipment store, the service history, the alert policy and an
//! optional audit sink behind the operations consumers call.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use crate::core::aggregator::{self, AlertFilter, AlertSummary};
use crate::core::alert::{assess, Alert, AlertPolicy, ServiceAssessment};
use crate::core::audit::{build_audit_event, AuditAction, AuditSink};
use crate::core::fitment;
use crate::core::history::{ServiceHistory, ServiceRecord};
use crate::core::service::{self, ServiceCompletion};
use crate::core::store::EquipmentStore;
use crate::core::unit::{MeterState, PartInstance, Unit, UnitKey, UnitKind};
use crate::core::EngineError;

/// Usage-based maintenance engine.
///
/// All methods take `&self`; share the engine behind an `Arc` to call it from
/// several threads. Operations on different units never wait on each other.
pub struct MaintenanceEngine<S, H> {
    store: S,
    history: H,
    policy: AlertPolicy,
    audit: Option<Arc<Mutex<Box<dyn AuditSink>>>>,
}

impl<S, H> MaintenanceEngine<S, H>
where
    S: EquipmentStore,
    H: ServiceHistory,
{
    /// Create a new engine from components.
    pub const fn new(store: S, history: H, policy: AlertPolicy) -> Self {
        Self {
            store,
            history,
            policy,
            audit: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Arc::new(Mutex::new(audit)));
        self
    }

    /// Underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Underlying service history.
    pub const fn history(&self) -> &H {
        &self.history
    }

    /// Active alert policy.
    pub const fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    fn record_audit(&self, unit: &UnitKey, action: AuditAction, payload: serde_json::Value) {
        if let Some(audit_sink) = &self.audit {
            let mut sink = audit_sink.lock();
            sink.record(build_audit_event(unit.clone(), action, Some(payload)));
        }
    }

    fn rejected<T>(op: &str, unit: &UnitKey, result: Result<T, EngineError>) -> Result<T, EngineError> {
        if let Err(e) = &result {
            tracing::warn!(op, unit = %unit, kind = ?e.kind(), "rejected: {}", e);
        }
        result
    }

    /// Register a unit from the equipment registry.
    ///
    /// # Errors
    ///
    /// `Conflict` for a duplicate key, `InvalidArgument` for a malformed unit.
    pub fn register(&self, unit: Unit) -> Result<(), EngineError> {
        let key = unit.key();
        Self::rejected("register", &key, self.store.insert(unit))?;
        tracing::info!(kind = %key.kind, unit = %key, "unit registered");
        Ok(())
    }

    /// Meter fields of one unit.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown unit.
    pub fn get_meter_state(&self, unit: &UnitKey) -> Result<MeterState, EngineError> {
        self.store.meter_state(unit)
    }

    /// Move a unit's meter forward.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a negative or backward reading, `NotFound` for an unknown unit.
    pub fn advance_meter(&self, unit: &UnitKey, new_reading: f64) -> Result<MeterState, EngineError> {
        let state = Self::rejected(
            "advance_meter",
            unit,
            self.store.advance_meter(unit, new_reading),
        )?;
        tracing::info!(unit = %unit, meter = state.current_meter, "meter advanced");
        self.record_audit(unit, AuditAction::MeterAdvanced, json!({ "meter": new_reading }));
        Ok(state)
    }

    /// Replace or clear a unit's next service threshold.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a malformed threshold, `NotFound` for an unknown unit.
    pub fn set_threshold(
        &self,
        unit: &UnitKey,
        threshold: Option<f64>,
    ) -> Result<MeterState, EngineError> {
        let state = Self::rejected(
            "set_threshold",
            unit,
            self.store.set_threshold(unit, threshold),
        )?;
        tracing::info!(unit = %unit, threshold = ?threshold, "threshold set");
        self.record_audit(unit, AuditAction::ThresholdSet, json!({ "threshold": threshold }));
        Ok(state)
    }

    /// Replace the schedule milestones of a vehicle or compressor.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for part instances or malformed milestones, `NotFound`
    /// for an unknown unit.
    pub fn set_schedule_milestones(
        &self,
        unit: &UnitKey,
        milestones: &[f64],
    ) -> Result<MeterState, EngineError> {
        let state = Self::rejected(
            "set_schedule_milestones",
            unit,
            self.store.set_milestones(unit, milestones),
        )?;
        tracing::info!(unit = %unit, count = milestones.len(), "milestones set");
        self.record_audit(
            unit,
            AuditAction::MilestonesSet,
            json!({ "milestones": state.schedule_milestones }),
        );
        Ok(state)
    }

    /// Log a completed service and rebase the unit's meter and threshold.
    ///
    /// # Errors
    ///
    /// `InvalidArgument`, `NotFound`, or a history backend error; nothing changes on error.
    pub fn complete_service(&self, req: &ServiceCompletion) -> Result<ServiceRecord, EngineError> {
        let record = Self::rejected(
            "complete_service",
            &req.unit,
            service::complete_service(&self.store, &self.history, req),
        )?;
        tracing::info!(
            unit = %req.unit,
            record = %record.id,
            meter = record.service_meter,
            next_threshold = ?record.next_threshold,
            "service completed"
        );
        self.record_audit(
            &req.unit,
            AuditAction::ServiceCompleted,
            json!({
                "record_id": record.id,
                "service_meter": record.service_meter,
                "next_threshold": record.next_threshold,
            }),
        );
        Ok(record)
    }

    /// Attach an in-stock part instance to a vehicle.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidState` if already fitted, `Conflict` if a concurrent fit won.
    pub fn fit_item(&self, instance_id: &str, vehicle_id: &str) -> Result<PartInstance, EngineError> {
        let key = UnitKey::part(instance_id);
        let part = Self::rejected(
            "fit_item",
            &key,
            fitment::fit(&self.store, instance_id, vehicle_id),
        )?;
        tracing::info!(unit = %key, vehicle = vehicle_id, "part fitted");
        self.record_audit(&key, AuditAction::Fitted, json!({ "vehicle_id": vehicle_id }));
        Ok(part)
    }

    /// Return a fitted part instance to stock.
    ///
    /// # Errors
    ///
    /// `NotFound`, or `InvalidState` if the instance is not fitted.
    pub fn unfit_item(&self, instance_id: &str) -> Result<PartInstance, EngineError> {
        let key = UnitKey::part(instance_id);
        let part = Self::rejected("unfit_item", &key, fitment::unfit(&self.store, instance_id))?;
        tracing::info!(unit = %key, "part unfitted");
        self.record_audit(&key, AuditAction::Unfitted, json!({}));
        Ok(part)
    }

    /// In-stock part instances.
    pub fn list_available(&self) -> Vec<PartInstance> {
        fitment::list_available(&self.store)
    }

    /// Part instances fitted to `vehicle_id`.
    pub fn list_fitted_to(&self, vehicle_id: &str) -> Vec<PartInstance> {
        fitment::list_fitted_to(&self.store, vehicle_id)
    }

    /// Sorted alerts across the fleet.
    pub fn list_alerts(&self, filter: &AlertFilter) -> Vec<Alert> {
        let alerts = aggregator::list_alerts(&self.store, &self.policy, filter);
        tracing::debug!(count = alerts.len(), "alerts listed");
        alerts
    }

    /// Overdue alerts plus due-soon alerts inside the urgency threshold.
    pub fn list_urgent_alerts(&self) -> Vec<Alert> {
        let alerts = aggregator::list_urgent(&self.store, &self.policy);
        tracing::debug!(count = alerts.len(), "urgent alerts listed");
        alerts
    }

    /// Alert counts per kind.
    pub fn alert_summary(&self) -> AlertSummary {
        aggregator::summarize(&self.store, &self.policy)
    }

    /// Service status of one unit, alert-free states included.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown unit.
    pub fn service_status(&self, unit: &UnitKey) -> Result<ServiceAssessment, EngineError> {
        self.store
            .read(unit, |u| assess(u, &self.policy))
            .map(|v| v.value)
    }

    /// Service status of every unit, optionally of one kind.
    pub fn service_statuses(&self, kind: Option<UnitKind>) -> Vec<ServiceAssessment> {
        self.store
            .list(kind)
            .iter()
            .map(|u| assess(u, &self.policy))
            .collect()
    }

    /// Service records of one unit, oldest first.
    ///
    /// Read under the unit's lock, so the list always matches the unit's
    /// current rebase state.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown unit.
    pub fn service_history(&self, unit: &UnitKey) -> Result<Vec<ServiceRecord>, EngineError> {
        self.store
            .read(unit, |_| self.history.for_unit(unit))
            .map(|v| v.value)
    }

    /// Every service record, oldest first.
    pub fn all_service_records(&self) -> Vec<ServiceRecord> {
        self.history.all()
    }
}
