//! In-memory equipment store with per-unit locking.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::core::store::EquipmentStore;
use crate::core::unit::{Unit, UnitKey, UnitKind, Versioned};
use crate::core::EngineError;

/// A stored unit and its version.
struct Slot {
    version: u64,
    unit: Unit,
}

/// In-memory store for development and testing.
///
/// The key map sits behind a `parking_lot::RwLock` that is only written on
/// registration; each unit has its own `parking_lot::Mutex`, so operations on
/// different units never contend beyond the brief map read.
pub struct InMemoryEquipmentStore {
    units: RwLock<BTreeMap<UnitKey, Arc<Mutex<Slot>>>>,
}

impl InMemoryEquipmentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            units: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a store seeded with `units`.
    ///
    /// # Errors
    ///
    /// Fails on the first duplicate or malformed unit.
    pub fn with_units(units: impl IntoIterator<Item = Unit>) -> Result<Self, EngineError> {
        let store = Self::new();
        for unit in units {
            store.insert(unit)?;
        }
        Ok(store)
    }

    /// Number of stored units.
    pub fn len(&self) -> usize {
        self.units.read().len()
    }

    /// True when the store holds no unit.
    pub fn is_empty(&self) -> bool {
        self.units.read().is_empty()
    }

    fn slot(&self, key: &UnitKey) -> Result<Arc<Mutex<Slot>>, EngineError> {
        self.units
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("{} `{}` not found", key.kind, key.id)))
    }
}

impl Default for InMemoryEquipmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EquipmentStore for InMemoryEquipmentStore {
    fn insert(&self, unit: Unit) -> Result<(), EngineError> {
        unit.validate()?;
        let key = unit.key();
        let mut units = self.units.write();
        if units.contains_key(&key) {
            return Err(EngineError::Conflict(format!("{key} already registered")));
        }
        units.insert(key, Arc::new(Mutex::new(Slot { version: 1, unit })));
        Ok(())
    }

    fn read<R, F>(&self, key: &UnitKey, f: F) -> Result<Versioned<R>, EngineError>
    where
        F: FnOnce(&Unit) -> R,
    {
        let slot = self.slot(key)?;
        let guard = slot.lock();
        Ok(Versioned {
            version: guard.version,
            value: f(&guard.unit),
        })
    }

    fn update<R, F>(
        &self,
        key: &UnitKey,
        expected_version: Option<u64>,
        f: F,
    ) -> Result<Versioned<R>, EngineError>
    where
        F: FnOnce(&mut Unit) -> Result<R, EngineError>,
    {
        let slot = self.slot(key)?;
        let mut guard = slot.lock();
        if let Some(expected) = expected_version {
            if guard.version != expected {
                return Err(EngineError::Conflict(format!(
                    "{key} changed concurrently (expected version {expected}, found {})",
                    guard.version
                )));
            }
        }

        let mut working = guard.unit.clone();
        let value = f(&mut working)?;
        if working.key() != *key {
            return Err(EngineError::InvalidArgument(format!(
                "update must not change the identity of {key}"
            )));
        }
        working.validate()?;

        guard.unit = working;
        guard.version += 1;
        Ok(Versioned {
            version: guard.version,
            value,
        })
    }

    fn list(&self, kind: Option<UnitKind>) -> Vec<Unit> {
        let slots: Vec<Arc<Mutex<Slot>>> = self
            .units
            .read()
            .iter()
            .filter(|(key, _)| kind.is_none_or(|k| k == key.kind))
            .map(|(_, slot)| Arc::clone(slot))
            .collect();
        slots.iter().map(|slot| slot.lock().unit.clone()).collect()
    }
}
