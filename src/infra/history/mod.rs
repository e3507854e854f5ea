//! Service history backends.

pub mod memory;

pub use memory::InMemoryServiceHistory;
