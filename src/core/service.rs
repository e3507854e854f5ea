//! Service completion transaction.
//!
//! Appends one [`ServiceRecord`] and rebases the unit's meter and threshold.
//! Both effects happen while the unit's lock is held: the record is appended
//! first, and the rebase is committed only if the append succeeded. A reader
//! that goes through the store never observes one effect without the other.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::history::{ServiceHistory, ServiceRecord};
use crate::core::store::EquipmentStore;
use crate::core::unit::UnitKey;
use crate::core::EngineError;
use crate::util::clock::now_ms;
use crate::util::validate::{check_meter, check_optional_meter, parse_service_date};

/// Input of a service completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCompletion {
    /// Unit being serviced.
    pub unit: UnitKey,
    /// Meter value at the time of service.
    pub service_meter: f64,
    /// Next threshold; `None` clears scheduling.
    #[serde(default)]
    pub next_threshold: Option<f64>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Who performed the service.
    pub performed_by: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub service_date: String,
}

impl ServiceCompletion {
    /// Validate every argument before any state is touched and return the
    /// parsed service date.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a negative or non-finite meter or threshold, an
    /// empty `performed_by`, or a malformed date.
    pub fn validate(&self) -> Result<NaiveDate, EngineError> {
        check_meter("service meter", self.service_meter)?;
        check_optional_meter("next threshold", self.next_threshold)?;
        if self.performed_by.trim().is_empty() {
            return Err(EngineError::InvalidArgument(
                "performed_by must not be empty".into(),
            ));
        }
        parse_service_date(&self.service_date)
    }
}

/// Log a completed service and rebase the unit, all-or-nothing.
///
/// # Errors
///
/// `InvalidArgument` from [`ServiceCompletion::validate`], `NotFound` for an
/// unknown unit, or the history backend's error. No state changes on error.
pub fn complete_service<S, H>(
    store: &S,
    history: &H,
    req: &ServiceCompletion,
) -> Result<ServiceRecord, EngineError>
where
    S: EquipmentStore,
    H: ServiceHistory,
{
    let service_date = req.validate()?;

    let committed = store.update(&req.unit, None, |unit| {
        let meter = unit.meter_mut();
        let record = ServiceRecord {
            id: uuid::Uuid::new_v4().to_string(),
            unit_kind: req.unit.kind,
            unit_id: req.unit.id.clone(),
            service_date,
            service_meter: req.service_meter,
            next_threshold: req.next_threshold,
            notes: req.notes.clone().filter(|n| !n.trim().is_empty()),
            performed_by: req.performed_by.trim().to_string(),
            previous_meter: meter.current_meter,
            previous_threshold: meter.next_service_threshold,
            recorded_at_ms: now_ms(),
        };

        history.append(record.clone())?;

        meter.current_meter = req.service_meter;
        meter.next_service_threshold = req.next_threshold;
        Ok(record)
    })?;

    Ok(committed.value)
}
