//! # Meter Service Engine
//!
//! Usage-based maintenance scheduling and alerting for a fleet of metered
//! equipment: vehicles, compressors, and individually numbered fittable parts.
//!
//! Each unit carries a cumulative meter reading (operating hours, rotations)
//! and an optional service threshold. The engine answers "is this unit
//! overdue, due soon, or fine?", drives the service-completion lifecycle, and
//! governs fitting part instances to vehicles.
//!
//! ## Key Features
//!
//! - **Equipment Store**: versioned per-unit records with per-unit locking
//! - **Service Completion**: appends a history record and rebases the meter, all-or-nothing
//! - **Fit/Unfit Lifecycle**: compare-and-set fitting; losers of a race get `Conflict`
//! - **Alert Derivation**: pure classification with kind-specific near-threshold bands
//! - **Alert Aggregation**: overdue first (most overdue first), then soonest due
//! - **Urgent Feed**: a tighter per-kind sub-band for interrupting notifications
//!
//! ## Example
//!
//! ```rust
//! use meter_service_engine::builders::EngineBuilder;
//! use meter_service_engine::config::EngineConfig;
//! use meter_service_engine::core::{AlertFilter, AlertStatus, ServiceCompletion, Unit, UnitKey};
//!
//! let engine = EngineBuilder::new(EngineConfig::default())
//!     .build_in_memory()
//!     .expect("default config is valid");
//!
//! engine
//!     .register(Unit::new_vehicle("V1", "Tipper 12", 950.0).with_threshold(1000.0))
//!     .expect("fresh key");
//!
//! let alerts = engine.list_alerts(&AlertFilter::default());
//! assert_eq!(alerts[0].status, AlertStatus::DueSoon);
//!
//! engine
//!     .complete_service(&ServiceCompletion {
//!         unit: UnitKey::vehicle("V1"),
//!         service_meter: 960.0,
//!         next_threshold: Some(1500.0),
//!         notes: None,
//!         performed_by: "workshop".into(),
//!         service_date: "2024-03-18".into(),
//!     })
//!     .expect("unit exists");
//!
//! assert!(engine.list_alerts(&AlertFilter::default()).is_empty());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core domain: unit state, transactions, alerts.
pub mod core;
/// Configuration models for bands, auditing and polling.
pub mod config;
/// Builders to construct engines from configuration.
pub mod builders;
/// Infrastructure adapters for equipment and history storage.
pub mod infra;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
