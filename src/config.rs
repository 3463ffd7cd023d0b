//! Dashboard Configuration
//! Defaults for the dataset source and the metrics on display, optionally
//! overridden by a JSON file in the working directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE_NAME: &str = "energy_dashboard.json";

pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/owid/energy-data/master/owid-energy-data.csv";

/// Dashboard settings. Every field falls back to its default when absent
/// from the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub dataset_url: String,
    pub country: String,
    pub primary_metric: String,
    pub renewables_metric: String,
    pub request_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            country: "Turkey".to_string(),
            primary_metric: "primary_energy_consumption".to_string(),
            renewables_metric: "renewables_consumption".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl DashboardConfig {
    /// Read a config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` when it exists, otherwise use the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            log::info!("Loading configuration from {}", path.display());
            Self::from_file(path)
        } else {
            log::debug!("No {} found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Title shown at the top of the dashboard.
    pub fn title(&self) -> String {
        format!("{} Energy Data Dashboard", self.country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "country": "Germany" }}"#).unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.country, "Germany");
        assert_eq!(config.primary_metric, "primary_energy_consumption");
        assert_eq!(config.dataset_url, DEFAULT_DATASET_URL);
        assert_eq!(config.title(), "Germany Energy Data Dashboard");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_or_default(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "country = Germany").unwrap();

        assert!(DashboardConfig::load_or_default(file.path()).is_err());
    }
}
