//! Data-file configuration for file-backed sessions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CELLSTOCK_CONFIG";

/// Where a `JsonFileStore` session reads and writes its record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// The base-stock table.
    pub stock_file: PathBuf,
    /// Project name → that project's BOM file.
    pub bom_files: BTreeMap<String, PathBuf>,
    /// The activity log. May not exist yet on first run.
    pub log_file: PathBuf,
}

impl StoreConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Resolve the config file from `CELLSTOCK_CONFIG`.
    pub fn from_env() -> anyhow::Result<Self> {
        let path =
            std::env::var(CONFIG_ENV).with_context(|| format!("{CONFIG_ENV} is not set"))?;
        Self::from_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parses_its_json_shape() {
        let text = r#"{
            "stock_file": "data/base_stock.json",
            "bom_files": {
                "LFP EV": "data/lfp_ev.json",
                "NMC Gen 2": "data/nmc_gen2.json"
            },
            "log_file": "data/activity_log.json"
        }"#;

        let config: StoreConfig = serde_json::from_str(text).unwrap();

        assert_eq!(config.stock_file, PathBuf::from("data/base_stock.json"));
        assert_eq!(config.bom_files.len(), 2);
        assert_eq!(
            config.bom_files["NMC Gen 2"],
            PathBuf::from("data/nmc_gen2.json")
        );
    }

    #[test]
    fn missing_config_file_reports_the_path() {
        let err = StoreConfig::from_file("/nonexistent/cellstock.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cellstock.json"));
    }
}
