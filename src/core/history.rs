//! Append-only service history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::unit::{UnitId, UnitKey, UnitKind};
use crate::core::EngineError;

/// One completed service. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Record identifier (UUID v4).
    pub id: String,
    /// Kind of the serviced unit.
    pub unit_kind: UnitKind,
    /// Identifier of the serviced unit.
    pub unit_id: UnitId,
    /// Calendar date of the service; serialized as `YYYY-MM-DD`.
    pub service_date: NaiveDate,
    /// Meter value at the time of service; becomes the unit's current meter.
    pub service_meter: f64,
    /// Threshold set by the service; `None` clears scheduling.
    pub next_threshold: Option<f64>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Who performed the service.
    pub performed_by: String,
    /// Unit meter immediately before the rebase.
    pub previous_meter: f64,
    /// Unit threshold immediately before the rebase.
    pub previous_threshold: Option<f64>,
    /// Timestamp the record was written, ms since epoch.
    pub recorded_at_ms: u128,
}

impl ServiceRecord {
    /// Key of the serviced unit.
    pub fn unit_key(&self) -> UnitKey {
        UnitKey::new(self.unit_kind, self.unit_id.clone())
    }
}

/// Abstraction for service history backends.
pub trait ServiceHistory: Send + Sync {
    /// Append a record.
    ///
    /// # Errors
    ///
    /// `Conflict` for a duplicate record id, `Backend` for storage failures.
    fn append(&self, record: ServiceRecord) -> Result<(), EngineError>;

    /// Records of one unit, oldest first.
    fn for_unit(&self, key: &UnitKey) -> Vec<ServiceRecord>;

    /// Every record, oldest first.
    fn all(&self) -> Vec<ServiceRecord>;

    /// Number of stored records.
    fn len(&self) -> usize;

    /// True when no record is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
