//! Storage traits and implementations.
//!
//! Converted documents leave the gateway through the `SignalStore` trait. Every
//! operation is scoped to one organization, allowing different implementations
//! (in-memory, `ClickHouse`) to partition data per tenant.

pub mod clickhouse_store;
pub mod signal_store;

pub use clickhouse_store::ClickHouseSignalStore;
pub use signal_store::{InMemorySignalStore, SignalBatch, SignalStore, StorageError};
