//! In-memory service history.

use std::collections::HashSet;

use parking_lot::RwLock;

use crate::core::history::{ServiceHistory, ServiceRecord};
use crate::core::unit::UnitKey;
use crate::core::EngineError;

#[derive(Default)]
struct Log {
    records: Vec<ServiceRecord>,
    ids: HashSet<String>,
}

/// Append-only in-memory log for development and testing.
pub struct InMemoryServiceHistory {
    log: RwLock<Log>,
}

impl InMemoryServiceHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            log: RwLock::new(Log::default()),
        }
    }
}

impl Default for InMemoryServiceHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceHistory for InMemoryServiceHistory {
    fn append(&self, record: ServiceRecord) -> Result<(), EngineError> {
        let mut log = self.log.write();
        if !log.ids.insert(record.id.clone()) {
            return Err(EngineError::Conflict(format!(
                "service record `{}` already exists",
                record.id
            )));
        }
        log.records.push(record);
        Ok(())
    }

    fn for_unit(&self, key: &UnitKey) -> Vec<ServiceRecord> {
        self.log
            .read()
            .records
            .iter()
            .filter(|r| r.unit_kind == key.kind && r.unit_id == key.id)
            .cloned()
            .collect()
    }

    fn all(&self) -> Vec<ServiceRecord> {
        self.log.read().records.clone()
    }

    fn len(&self) -> usize {
        self.log.read().records.len()
    }
}
