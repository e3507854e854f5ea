//! Equipment store backends.

pub mod memory;

pub use memory::InMemoryEquipmentStore;
