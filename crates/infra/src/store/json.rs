//! JSON-file store: one file for base stock, one per project BOM, one for
//! the activity log.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use cellstock_ledger::LogEntry;

use super::{LedgerSnapshot, LedgerStore, RawDemandRow, RawStockRow, StoreError};
use crate::config::StoreConfig;

/// File-backed store with the layout described by a `StoreConfig`.
///
/// The whole record set is rewritten on every persist: sessions load once
/// and flush per commit, so files on disk always hold the last committed
/// state. A missing log file on load counts as an empty journal (first run);
/// missing stock or BOM files are errors.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    config: StoreConfig,
}

impl JsonFileStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<LedgerSnapshot, StoreError> {
        let stock: Vec<RawStockRow> = read_json(&self.config.stock_file)?;

        let mut demand = BTreeMap::new();
        for (project, path) in &self.config.bom_files {
            let rows: Vec<RawDemandRow> = read_json(path)?;
            demand.insert(project.clone(), rows);
        }

        let log: Vec<LogEntry> = if self.config.log_file.exists() {
            read_json(&self.config.log_file)?
        } else {
            Vec::new()
        };

        Ok(LedgerSnapshot { stock, demand, log })
    }

    fn persist(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        for project in snapshot.demand.keys() {
            if !self.config.bom_files.contains_key(project) {
                return Err(StoreError::UnmappedProject(project.clone()));
            }
        }

        write_json(&self.config.stock_file, &snapshot.stock)?;
        for (project, path) in &self.config.bom_files {
            let rows = snapshot.demand.get(project).cloned().unwrap_or_default();
            write_json(path, &rows)?;
        }
        write_json(&self.config.log_file, &snapshot.log)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let bytes = fs::read(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}
