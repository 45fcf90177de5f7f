//! SQLite-backed inventory table.
//!
//! Single `inventory` table declared `AUTOINCREMENT`, so `sqlite_sequence`
//! remembers the highest id ever stored even after the row is deleted.
//! Calls are synchronous: the table owns a current-thread tokio runtime and
//! blocks on each sqlx future.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tokio::runtime::Runtime;

use stockroom_core::{Entity, ItemId};
use stockroom_inventory::{InventoryItem, WriteBatch};

use super::{InventoryTable, TableError};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS inventory (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_name TEXT NOT NULL,
        units_sold INTEGER NOT NULL,
        units_on_hand INTEGER NOT NULL,
        reorder_point INTEGER NOT NULL,
        description TEXT NOT NULL DEFAULT ''
    )
"#;

pub struct SqliteInventoryTable {
    runtime: Runtime,
    pool: SqlitePool,
}

impl SqliteInventoryTable {
    /// Connect to `database_url` (e.g. `sqlite://inventory.db`), creating the file if missing.
    pub fn connect(database_url: &str) -> Result<Self, TableError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TableError::Open(format!("runtime: {e}")))?;

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| TableError::Open(format!("{database_url}: {e}")))?
            .create_if_missing(true);

        // One connection: a single logical writer, and `:memory:` databases
        // are per-connection.
        let pool = runtime
            .block_on(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect_with(options),
            )
            .map_err(|e| TableError::Open(format!("{database_url}: {e}")))?;

        Ok(Self { runtime, pool })
    }

    fn item_from_row(row: &SqliteRow) -> Result<InventoryItem, TableError> {
        let corrupt = |e: sqlx::Error| TableError::Corrupt(e.to_string());

        let id: i64 = row.try_get("id").map_err(corrupt)?;
        let id = ItemId::try_from(id).map_err(|e| TableError::Corrupt(e.to_string()))?;

        InventoryItem::restore(
            id,
            row.try_get::<String, _>("item_name").map_err(corrupt)?,
            row.try_get::<i64, _>("units_sold").map_err(corrupt)?,
            row.try_get::<i64, _>("units_on_hand").map_err(corrupt)?,
            row.try_get::<i64, _>("reorder_point").map_err(corrupt)?,
            row.try_get::<String, _>("description").map_err(corrupt)?,
        )
        .map_err(|e| TableError::Corrupt(format!("row {id}: {e}")))
    }
}

impl Drop for SqliteInventoryTable {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl core::fmt::Debug for SqliteInventoryTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SqliteInventoryTable").finish_non_exhaustive()
    }
}

impl InventoryTable for SqliteInventoryTable {
    fn open(&self) -> Result<bool, TableError> {
        self.runtime.block_on(async {
            let existing = sqlx::query(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'inventory'",
            )
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| TableError::Open(e.to_string()))?;

            sqlx::query(CREATE_TABLE)
                .execute(&self.pool)
                .await
                .map_err(|e| TableError::Open(e.to_string()))?;

            Ok::<_, TableError>(existing.is_none())
        })
    }

    fn read_all(&self) -> Result<Vec<InventoryItem>, TableError> {
        let rows = self
            .runtime
            .block_on(
                sqlx::query(
                    r#"
                    SELECT id, item_name, units_sold, units_on_hand, reorder_point, description
                    FROM inventory
                    ORDER BY id
                    "#,
                )
                .fetch_all(&self.pool),
            )
            .map_err(|e| TableError::Read(e.to_string()))?;

        rows.iter().map(Self::item_from_row).collect()
    }

    fn last_assigned_id(&self) -> Result<Option<ItemId>, TableError> {
        let row = self
            .runtime
            .block_on(
                sqlx::query("SELECT seq FROM sqlite_sequence WHERE name = 'inventory'")
                    .fetch_optional(&self.pool),
            )
            .map_err(|e| TableError::Read(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let seq: i64 = row
            .try_get("seq")
            .map_err(|e| TableError::Corrupt(e.to_string()))?;
        ItemId::try_from(seq)
            .map(Some)
            .map_err(|e| TableError::Corrupt(e.to_string()))
    }

    fn write(&self, batch: &WriteBatch) -> Result<(), TableError> {
        let write_err = |e: sqlx::Error| TableError::Write(e.to_string());

        self.runtime.block_on(async {
            // Dropping the transaction without commit rolls it back.
            let mut tx = self.pool.begin().await.map_err(write_err)?;

            for item in &batch.updates {
                let result = sqlx::query(
                    r#"
                    UPDATE inventory
                    SET
                        item_name = ?,
                        units_sold = ?,
                        units_on_hand = ?,
                        reorder_point = ?,
                        description = ?
                    WHERE id = ?
                    "#,
                )
                .bind(item.name())
                .bind(to_column(item.units_sold())?)
                .bind(to_column(item.units_on_hand())?)
                .bind(to_column(item.reorder_point())?)
                .bind(item.description())
                .bind(to_column(item.id().get())?)
                .execute(&mut *tx)
                .await
                .map_err(write_err)?;

                if result.rows_affected() != 1 {
                    return Err(TableError::Write(format!("no row with id {}", item.id())));
                }
            }

            for item in &batch.inserts {
                sqlx::query(
                    r#"
                    INSERT INTO inventory
                        (id, item_name, units_sold, units_on_hand, reorder_point, description)
                    VALUES
                        (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(to_column(item.id().get())?)
                .bind(item.name())
                .bind(to_column(item.units_sold())?)
                .bind(to_column(item.units_on_hand())?)
                .bind(to_column(item.reorder_point())?)
                .bind(item.description())
                .execute(&mut *tx)
                .await
                .map_err(write_err)?;
            }

            for id in &batch.deletes {
                let result = sqlx::query("DELETE FROM inventory WHERE id = ?")
                    .bind(to_column(id.get())?)
                    .execute(&mut *tx)
                    .await
                    .map_err(write_err)?;

                if result.rows_affected() != 1 {
                    return Err(TableError::Write(format!("no row with id {id}")));
                }
            }

            tx.commit().await.map_err(write_err)
        })
    }
}

fn to_column(value: u64) -> Result<i64, TableError> {
    i64::try_from(value).map_err(|_| TableError::Write(format!("value {value} out of range")))
}
