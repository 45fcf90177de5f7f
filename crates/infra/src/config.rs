//! Configuration loading and representation.
//!
//! Read from the environment:
//! - `STOCKROOM_BACKEND`: `sqlite` (default) or `memory`
//! - `STOCKROOM_DATABASE_URL`: SQLite URL, default `sqlite://inventory.db`
//! - `STOCKROOM_SEED`: seed a freshly created table with sample data (default `true`)

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{InventoryStore, StoreError};
use crate::table::{InMemoryInventoryTable, InventoryTable, SqliteInventoryTable, TableError};

pub const BACKEND_VAR: &str = "STOCKROOM_BACKEND";
pub const DATABASE_URL_VAR: &str = "STOCKROOM_DATABASE_URL";
pub const SEED_VAR: &str = "STOCKROOM_SEED";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://inventory.db";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown backend '{0}' (expected one of: sqlite, memory)")]
    UnknownBackend(String),

    #[error("{var} must be a boolean, got '{value}'")]
    InvalidBool { var: &'static str, value: String },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sqlite,
    Memory,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "memory" => Ok(Backend::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: Backend,
    pub database_url: String,
    pub seed_on_create: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Sqlite,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            seed_on_create: true,
        }
    }
}

impl StoreConfig {
    /// Build from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(backend) = lookup(BACKEND_VAR) {
            config.backend = backend.parse()?;
        }

        match lookup(DATABASE_URL_VAR) {
            Some(url) => config.database_url = url,
            None if config.backend == Backend::Sqlite => {
                tracing::warn!("{DATABASE_URL_VAR} not set; using {DEFAULT_DATABASE_URL}");
            }
            None => {}
        }

        if let Some(seed) = lookup(SEED_VAR) {
            config.seed_on_create = parse_bool(SEED_VAR, &seed)?;
        }

        Ok(config)
    }

    /// Open the configured backing table.
    pub fn open_table(&self) -> Result<Arc<dyn InventoryTable>, TableError> {
        let table: Arc<dyn InventoryTable> = match self.backend {
            Backend::Sqlite => Arc::new(SqliteInventoryTable::connect(&self.database_url)?),
            Backend::Memory => Arc::new(InMemoryInventoryTable::new()),
        };
        Ok(table)
    }

    /// Open the configured table and wrap it in a store.
    pub fn open_store(&self) -> Result<InventoryStore<Arc<dyn InventoryTable>>, StoreError> {
        let table = self.open_table()?;
        Ok(InventoryStore::new(table).seed_on_create(self.seed_on_create))
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = StoreConfig::from_lookup(lookup(&[
            (BACKEND_VAR, "Memory"),
            (DATABASE_URL_VAR, "sqlite://elsewhere.db"),
            (SEED_VAR, "no"),
        ]))
        .unwrap();

        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.database_url, "sqlite://elsewhere.db");
        assert!(!config.seed_on_create);
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            StoreConfig::from_lookup(lookup(&[(BACKEND_VAR, "postgres")])).unwrap_err(),
            ConfigError::UnknownBackend("postgres".to_string())
        );
        assert!(matches!(
            StoreConfig::from_lookup(lookup(&[(SEED_VAR, "maybe")])),
            Err(ConfigError::InvalidBool { .. })
        ));
    }

    #[test]
    fn memory_backend_opens_a_seeded_store() {
        let config = StoreConfig {
            backend: Backend::Memory,
            ..StoreConfig::default()
        };
        let store = config.open_store().unwrap();
        assert_eq!(store.load().unwrap().len(), 22);
    }

    #[test]
    fn sqlite_store_survives_reopen_without_reseeding() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            backend: Backend::Sqlite,
            database_url: format!("sqlite://{}", dir.path().join("inventory.db").display()),
            seed_on_create: true,
        };

        {
            let store = config.open_store().unwrap();
            let base = store.load().unwrap();
            assert_eq!(base.len(), 22);

            let last = stockroom_core::ItemId::new(22);
            let outcome = store
                .apply(&base, stockroom_inventory::Changeset::new().delete(last))
                .unwrap();
            assert_eq!(outcome.snapshot.len(), 21);
        }

        let store = config.open_store().unwrap();
        let base = store.load().unwrap();
        assert_eq!(base.len(), 21);

        let outcome = store
            .apply(
                &base,
                stockroom_inventory::Changeset::new()
                    .add(stockroom_inventory::NewItem::named("Ice (bag)").units_on_hand(4)),
            )
            .unwrap();
        assert_eq!(outcome.report.inserted, vec![stockroom_core::ItemId::new(23)]);
    }
}
