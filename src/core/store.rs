//! Equipment store abstraction.
//!
//! The store owns the per-unit records. Every record carries a version that is
//! bumped on each committed update, so callers can run a compare-and-set by
//! passing the version they read. The meter contract (`meter_state`,
//! `advance_meter`, `set_threshold`) is provided on top of the three primitive
//! operations any backend implements.

use crate::core::unit::{MeterState, Unit, UnitKey, UnitKind, Versioned};
use crate::core::EngineError;
use crate::util::validate::{check_meter, check_optional_meter};

/// Abstraction for equipment storage backends.
pub trait EquipmentStore: Send + Sync {
    /// Register a unit created by the external registry.
    ///
    /// # Errors
    ///
    /// `Conflict` if the key exists, `InvalidArgument` if the unit is malformed.
    fn insert(&self, unit: Unit) -> Result<(), EngineError>;

    /// Run `f` against the unit while holding the unit's lock.
    ///
    /// Writers of the same unit are excluded for the duration of `f`, so any
    /// state read inside `f` is consistent with the returned version.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown key.
    fn read<R, F>(&self, key: &UnitKey, f: F) -> Result<Versioned<R>, EngineError>
    where
        F: FnOnce(&Unit) -> R;

    /// Apply `f` to the unit under the unit's lock and commit the result.
    ///
    /// `f` runs on a working copy; the copy replaces the stored unit only when
    /// `f` returns `Ok`, so a failing closure leaves no partial mutation.
    /// When `expected_version` is set and differs from the stored version the
    /// update is rejected with `Conflict` before `f` runs.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Conflict`, or whatever `f` returns.
    fn update<R, F>(
        &self,
        key: &UnitKey,
        expected_version: Option<u64>,
        f: F,
    ) -> Result<Versioned<R>, EngineError>
    where
        F: FnOnce(&mut Unit) -> Result<R, EngineError>;

    /// Snapshot every unit, optionally restricted to one kind.
    ///
    /// Each unit is read consistently; the list as a whole is not a single
    /// point-in-time view.
    fn list(&self, kind: Option<UnitKind>) -> Vec<Unit>;

    /// Read a consistent snapshot of one unit with its version.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown key.
    fn load(&self, key: &UnitKey) -> Result<Versioned<Unit>, EngineError> {
        self.read(key, Unit::clone)
    }

    /// Meter fields of one unit.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown key.
    fn meter_state(&self, key: &UnitKey) -> Result<MeterState, EngineError> {
        Ok(self.load(key)?.value.meter_state())
    }

    /// Move the meter forward to `new_reading`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the reading is negative, non-finite, or below the
    /// current meter; `NotFound` for an unknown key.
    fn advance_meter(&self, key: &UnitKey, new_reading: f64) -> Result<MeterState, EngineError> {
        let new_reading = check_meter("meter reading", new_reading)?;
        self.update(key, None, |unit| {
            let meter = unit.meter_mut();
            if new_reading < meter.current_meter {
                return Err(EngineError::InvalidArgument(format!(
                    "meter reading {new_reading} is below current meter {}",
                    meter.current_meter
                )));
            }
            meter.current_meter = new_reading;
            Ok(unit.meter_state())
        })
        .map(|v| v.value)
    }

    /// Replace or clear the next service threshold.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a malformed threshold; `NotFound` for an unknown key.
    fn set_threshold(
        &self,
        key: &UnitKey,
        threshold: Option<f64>,
    ) -> Result<MeterState, EngineError> {
        let threshold = check_optional_meter("next service threshold", threshold)?;
        self.update(key, None, |unit| {
            unit.meter_mut().next_service_threshold = threshold;
            Ok(unit.meter_state())
        })
        .map(|v| v.value)
    }

    /// Replace the schedule milestones of a vehicle or compressor.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for part instances or malformed milestones;
    /// `NotFound` for an unknown key.
    fn set_milestones(&self, key: &UnitKey, milestones: &[f64]) -> Result<MeterState, EngineError> {
        self.update(key, None, |unit| {
            unit.set_milestones(milestones)?;
            Ok(unit.meter_state())
        })
        .map(|v| v.value)
    }
}
