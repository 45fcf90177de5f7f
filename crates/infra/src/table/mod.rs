//! Backing tables for the inventory store.
//!
//! A table persists rows keyed by item id. The store decides what to write;
//! the table only has to make each [`WriteBatch`] land atomically.

pub mod in_memory;
pub mod sqlite;

use std::sync::Arc;

use thiserror::Error;

use stockroom_core::ItemId;
use stockroom_inventory::{InventoryItem, WriteBatch};

pub use in_memory::InMemoryInventoryTable;
pub use sqlite::SqliteInventoryTable;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("failed to open inventory table: {0}")]
    Open(String),

    #[error("failed to read inventory table: {0}")]
    Read(String),

    #[error("failed to write inventory table: {0}")]
    Write(String),

    #[error("inventory table holds an invalid row: {0}")]
    Corrupt(String),
}

/// Persistence primitives consumed by the store.
pub trait InventoryTable: Send + Sync {
    /// Create the table if needed. Returns `true` when it was just created.
    fn open(&self) -> Result<bool, TableError>;

    /// All rows in id order.
    fn read_all(&self) -> Result<Vec<InventoryItem>, TableError>;

    /// Highest id ever stored, including rows deleted since.
    fn last_assigned_id(&self) -> Result<Option<ItemId>, TableError>;

    /// Apply updates, inserts, then deletes. Either all of them land or none do.
    fn write(&self, batch: &WriteBatch) -> Result<(), TableError>;
}

impl<T> InventoryTable for Arc<T>
where
    T: InventoryTable + ?Sized,
{
    fn open(&self) -> Result<bool, TableError> {
        (**self).open()
    }

    fn read_all(&self) -> Result<Vec<InventoryItem>, TableError> {
        (**self).read_all()
    }

    fn last_assigned_id(&self) -> Result<Option<ItemId>, TableError> {
        (**self).last_assigned_id()
    }

    fn write(&self, batch: &WriteBatch) -> Result<(), TableError> {
        (**self).write(batch)
    }
}
