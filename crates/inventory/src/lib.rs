//! Inventory domain module.
//!
//! Business rules for the inventory table: item records, changesets and
//! how they apply to a snapshot, and reorder evaluation. Everything here is
//! deterministic domain logic (no IO, no storage).

pub mod changeset;
pub mod item;
pub mod reorder;
pub mod report;
pub mod seed;
pub mod snapshot;

pub use changeset::Changeset;
pub use item::{InventoryItem, ItemPatch, NewItem};
pub use reorder::{ReorderAlert, ReorderAnalyzer, best_sellers};
pub use report::{ApplyReport, RowRef, RowRejection};
pub use seed::sample_catalogue;
pub use snapshot::{Plan, Snapshot, WriteBatch};
