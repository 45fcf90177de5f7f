use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use stockroom_core::{Entity, ItemId};
use stockroom_inventory::{InventoryItem, WriteBatch};

use super::{InventoryTable, TableError};

#[derive(Debug, Clone, Default)]
struct TableState {
    created: bool,
    rows: BTreeMap<ItemId, InventoryItem>,
    last_assigned: Option<ItemId>,
}

/// In-memory inventory table.
///
/// Intended for tests/dev. Reads and writes can be made to fail on demand to
/// exercise the store's rollback path.
#[derive(Debug, Default)]
pub struct InMemoryInventoryTable {
    state: RwLock<TableState>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryInventoryTable {
    /// A table that does not exist yet; the first `open` reports it as fresh.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table that already exists and holds `items`.
    pub fn with_items(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        let rows: BTreeMap<_, _> = items.into_iter().map(|item| (item.id(), item)).collect();
        let last_assigned = rows.keys().next_back().copied();
        Self {
            state: RwLock::new(TableState {
                created: true,
                rows,
                last_assigned,
            }),
            ..Self::default()
        }
    }

    /// Make every subsequent `write` fail until switched off again.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `read_all` fail until switched off again.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

impl InventoryTable for InMemoryInventoryTable {
    fn open(&self) -> Result<bool, TableError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| TableError::Open("lock poisoned".to_string()))?;
        let fresh = !state.created;
        state.created = true;
        Ok(fresh)
    }

    fn read_all(&self) -> Result<Vec<InventoryItem>, TableError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TableError::Read("simulated read failure".to_string()));
        }
        let state = self
            .state
            .read()
            .map_err(|_| TableError::Read("lock poisoned".to_string()))?;
        Ok(state.rows.values().cloned().collect())
    }

    fn last_assigned_id(&self) -> Result<Option<ItemId>, TableError> {
        let state = self
            .state
            .read()
            .map_err(|_| TableError::Read("lock poisoned".to_string()))?;
        Ok(state.last_assigned)
    }

    fn write(&self, batch: &WriteBatch) -> Result<(), TableError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TableError::Write("simulated write failure".to_string()));
        }

        let mut state = self
            .state
            .write()
            .map_err(|_| TableError::Write("lock poisoned".to_string()))?;

        // Work on a copy so a failing row leaves the table untouched.
        let mut next = state.clone();

        for item in &batch.updates {
            let Some(row) = next.rows.get_mut(&item.id()) else {
                return Err(TableError::Write(format!("no row with id {}", item.id())));
            };
            *row = item.clone();
        }

        for item in &batch.inserts {
            if next.rows.contains_key(&item.id()) {
                return Err(TableError::Write(format!("duplicate id {}", item.id())));
            }
            next.rows.insert(item.id(), item.clone());
            next.last_assigned = next.last_assigned.max(Some(item.id()));
        }

        for id in &batch.deletes {
            if next.rows.remove(id).is_none() {
                return Err(TableError::Write(format!("no row with id {id}")));
            }
        }

        *state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_inventory::NewItem;

    fn item(id: u64, name: &str) -> InventoryItem {
        NewItem::named(name).into_item(ItemId::new(id)).unwrap()
    }

    #[test]
    fn open_reports_fresh_once() {
        let table = InMemoryInventoryTable::new();
        assert_eq!(table.open(), Ok(true));
        assert_eq!(table.open(), Ok(false));

        let existing = InMemoryInventoryTable::with_items([item(1, "a")]);
        assert_eq!(existing.open(), Ok(false));
    }

    #[test]
    fn failing_row_rolls_back_the_whole_batch() {
        let table = InMemoryInventoryTable::with_items([item(1, "a")]);
        let batch = WriteBatch {
            updates: vec![],
            inserts: vec![item(2, "b")],
            deletes: vec![ItemId::new(7)],
        };

        assert!(matches!(table.write(&batch), Err(TableError::Write(_))));
        assert_eq!(table.read_all().unwrap(), vec![item(1, "a")]);
        assert_eq!(table.last_assigned_id(), Ok(Some(ItemId::new(1))));
    }

    #[test]
    fn high_water_mark_survives_deletion() {
        let table = InMemoryInventoryTable::with_items([item(1, "a"), item(2, "b")]);
        let batch = WriteBatch {
            deletes: vec![ItemId::new(2)],
            ..WriteBatch::default()
        };
        table.write(&batch).unwrap();

        assert_eq!(table.read_all().unwrap().len(), 1);
        assert_eq!(table.last_assigned_id(), Ok(Some(ItemId::new(2))));
    }

    #[test]
    fn simulated_failures_can_be_toggled() {
        let table = InMemoryInventoryTable::with_items([item(1, "a")]);
        table.fail_writes(true);
        assert!(table.write(&WriteBatch::default()).is_err());
        table.fail_writes(false);
        assert!(table.write(&WriteBatch::default()).is_ok());

        table.fail_reads(true);
        assert!(matches!(table.read_all(), Err(TableError::Read(_))));
    }
}
