//! Builders to construct a maintenance engine from configuration.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::core::audit::{AuditSink, InMemoryAuditSink};
use crate::core::{EngineError, EquipmentStore, MaintenanceEngine, ServiceHistory};
use crate::infra::{InMemoryEquipmentStore, InMemoryServiceHistory};

/// Build an engine over the given storage from validated configuration.
///
/// # Errors
///
/// `InvalidArgument` when the configuration does not validate.
pub fn build_engine<S, H>(
    cfg: &EngineConfig,
    store: S,
    history: H,
) -> Result<MaintenanceEngine<S, H>, EngineError>
where
    S: EquipmentStore,
    H: ServiceHistory,
{
    cfg.validate()
        .map_err(|e| EngineError::InvalidArgument(format!("config invalid: {e}")))?;
    Ok(MaintenanceEngine::new(store, history, cfg.policy()))
}

/// Step-wise engine construction.
pub struct EngineBuilder {
    config: EngineConfig,
    audit: Option<Box<dyn AuditSink>>,
}

impl EngineBuilder {
    /// Start from a configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            audit: None,
        }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Attach a bounded in-memory audit sink sized by `audit_capacity` and
    /// return a handle to read it.
    #[must_use]
    pub fn with_in_memory_audit(mut self) -> (Self, Arc<Mutex<InMemoryAuditSink>>) {
        let sink = Arc::new(Mutex::new(InMemoryAuditSink::new(self.config.audit_capacity)));
        self.audit = Some(Box::new(Arc::clone(&sink)));
        (self, sink)
    }

    /// Build over the given storage.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the configuration does not validate.
    pub fn build<S, H>(self, store: S, history: H) -> Result<MaintenanceEngine<S, H>, EngineError>
    where
        S: EquipmentStore,
        H: ServiceHistory,
    {
        let engine = build_engine(&self.config, store, history)?;
        Ok(match self.audit {
            Some(audit) => engine.with_audit(audit),
            None => engine,
        })
    }

    /// Build over fresh in-memory storage.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the configuration does not validate.
    pub fn build_in_memory(
        self,
    ) -> Result<MaintenanceEngine<InMemoryEquipmentStore, InMemoryServiceHistory>, EngineError> {
        self.build(InMemoryEquipmentStore::new(), InMemoryServiceHistory::new())
    }
}
