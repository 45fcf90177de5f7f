//! Infrastructure layer: the inventory store of record, its backing tables,
//! and configuration.

pub mod config;
pub mod store;
pub mod table;

pub use config::{Backend, ConfigError, StoreConfig};
pub use store::{ApplyOutcome, InventoryStore, StoreError};
pub use table::{InMemoryInventoryTable, InventoryTable, SqliteInventoryTable, TableError};
