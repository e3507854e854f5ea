//! Configuration models for alert bands, auditing and polling.

pub mod engine;

pub use engine::EngineConfig;
