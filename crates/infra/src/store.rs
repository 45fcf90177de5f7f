//! The inventory store of record.
//!
//! Owns the authoritative snapshot and the backing table. Every call takes
//! one lock around load-modify-persist, so concurrent callers are serialized.
//! A changeset is planned against the in-memory snapshot, written to the
//! table as one atomic batch, and only then does the in-memory state advance.

use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use stockroom_core::{DomainError, ExpectedVersion, ItemId};
use stockroom_inventory::{ApplyReport, Changeset, Snapshot, sample_catalogue};

use crate::table::{InventoryTable, TableError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing table could not be opened, read or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The caller's snapshot is not the store's current one.
    #[error("stale snapshot (expected version {expected}, store is at {actual})")]
    StaleSnapshot { expected: u64, actual: u64 },

    /// A request could not be turned into a changeset.
    #[error(transparent)]
    Rejected(#[from] DomainError),
}

impl From<TableError> for StoreError {
    fn from(value: TableError) -> Self {
        Self::StorageUnavailable(value.to_string())
    }
}

/// Successful apply: the new snapshot plus what happened to each row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub snapshot: Snapshot,
    pub report: ApplyReport,
}

impl ApplyOutcome {
    /// Every row of the changeset was applied.
    pub fn is_success(&self) -> bool {
        self.report.is_clean()
    }
}

#[derive(Debug)]
struct StoreState {
    snapshot: Snapshot,
    next_id: ItemId,
}

pub struct InventoryStore<T> {
    table: T,
    seed_on_create: bool,
    state: Mutex<Option<StoreState>>,
}

impl<T> InventoryStore<T>
where
    T: InventoryTable,
{
    /// Store over `table`. A freshly created table is seeded with sample data.
    pub fn new(table: T) -> Self {
        Self {
            table,
            seed_on_create: true,
            state: Mutex::new(None),
        }
    }

    /// Toggle seeding of freshly created tables.
    pub fn seed_on_create(mut self, seed: bool) -> Self {
        self.seed_on_create = seed;
        self
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    /// Current snapshot. The first call opens the table and seeds it if it was just created.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        let mut guard = self.lock()?;
        let state = self.loaded(&mut guard)?;
        Ok(state.snapshot.clone())
    }

    /// Apply `changeset` to `base`, which must be the store's current snapshot.
    ///
    /// A `base` from an earlier version, or one not obtained from this store,
    /// is refused with `StaleSnapshot`.
    ///
    /// Rows naming unknown ids or carrying invalid values are skipped and
    /// listed in the report. If the backing table rejects the write, nothing
    /// changes and `StorageUnavailable` is returned.
    pub fn apply(&self, base: &Snapshot, changeset: Changeset) -> Result<ApplyOutcome, StoreError> {
        let mut guard = self.lock()?;
        let state = self.loaded(&mut guard)?;

        let actual = state.snapshot.version();
        let stale = || StoreError::StaleSnapshot {
            expected: base.version(),
            actual,
        };
        ExpectedVersion(base.version()).check(actual).map_err(|_| stale())?;
        if base != &state.snapshot {
            return Err(stale());
        }

        let plan = state.snapshot.plan(&changeset, state.next_id);

        for rejection in &plan.report.rejected {
            warn!(row = %rejection.row, error = %rejection.error, "changeset row skipped");
        }

        if plan.batch.is_empty() {
            debug!(rows = changeset.len(), "changeset produced no writes");
            return Ok(ApplyOutcome {
                snapshot: plan.snapshot,
                report: plan.report,
            });
        }

        if let Err(err) = self.table.write(&plan.batch) {
            error!(
                error = %err,
                version = actual,
                "failed to persist changeset; in-memory inventory left unchanged"
            );
            return Err(err.into());
        }

        state.snapshot = plan.snapshot.clone();
        state.next_id = plan.next_id;

        info!(
            version = plan.snapshot.version(),
            edited = plan.report.edited.len(),
            inserted = plan.report.inserted.len(),
            deleted = plan.report.deleted.len(),
            rejected = plan.report.rejected.len(),
            "changeset applied"
        );

        Ok(ApplyOutcome {
            snapshot: plan.snapshot,
            report: plan.report,
        })
    }

    /// Record the sale of `quantity` units of `id` against the current snapshot.
    pub fn record_sale(&self, id: ItemId, quantity: i64) -> Result<ApplyOutcome, StoreError> {
        let current = self.load()?;
        let changeset = current.sale(id, quantity)?;
        self.apply(&current, changeset)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<StoreState>>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::StorageUnavailable("inventory store lock poisoned".to_string()))
    }

    fn loaded<'a>(
        &self,
        guard: &'a mut MutexGuard<'_, Option<StoreState>>,
    ) -> Result<&'a mut StoreState, StoreError> {
        let state = match guard.take() {
            Some(state) => state,
            None => self.initialize()?,
        };
        Ok(guard.insert(state))
    }

    fn initialize(&self) -> Result<StoreState, StoreError> {
        let created = self.table.open()?;
        // A table that has never stored a row counts as new, so a seed write
        // that failed on an earlier load is retried.
        let fresh = created
            || (self.table.last_assigned_id()?.is_none() && self.table.read_all()?.is_empty());

        if fresh && self.seed_on_create {
            let mut seed = Changeset::new();
            seed.added = sample_catalogue();
            let plan = Snapshot::default().plan(&seed, ItemId::new(1));
            self.table.write(&plan.batch)?;
            info!(items = plan.report.inserted.len(), "inventory table created with sample data");
        } else if created {
            info!("inventory table created empty");
        }

        let items = self.table.read_all()?;
        let snapshot = Snapshot::from_items(items, 0).map_err(|e| {
            StoreError::StorageUnavailable(format!("inventory table is inconsistent: {e}"))
        })?;

        let next_id = self
            .table
            .last_assigned_id()?
            .max(snapshot.max_id())
            .map_or(ItemId::new(1), ItemId::next);

        debug!(items = snapshot.len(), next_id = %next_id, "inventory loaded");

        Ok(StoreState { snapshot, next_id })
    }
}

impl<T> core::fmt::Debug for InventoryStore<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InventoryStore")
            .field("seed_on_create", &self.seed_on_create)
            .finish_non_exhaustive()
    }
}
