//! Infrastructure adapters for equipment and service-history storage.

pub mod history;
pub mod store;

pub use history::InMemoryServiceHistory;
pub use store::InMemoryEquipmentStore;
