//! Configuration model loaded from external sources.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::agency::Agency;
use crate::domain::types::AgencyId;

/// Where agency CSV exports are fetched from.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DataSourceConfig {
    /// Files read from a local directory, also served under `/data`.
    Directory { path: PathBuf },
    /// Files fetched from a static-file server.
    Http { base_url: String },
}

/// Loader tuning knobs.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoaderConfig {
    /// Total fetch attempts before a load is reported as failed.
    pub fetch_attempts: usize,
    pub retry_delay_ms: u64,
    /// Bodies shorter than this are treated as an error page.
    pub min_body_bytes: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fetch_attempts: 3,
            retry_delay_ms: 1000,
            min_body_bytes: 50,
        }
    }
}

impl LoaderConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_page_size() -> usize {
    500
}

fn default_export_max_rows() -> usize {
    700
}

fn default_filter_settle_ms() -> u64 {
    150
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub data_source: DataSourceConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    /// Rows per page; deployments use 500 or 700.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_export_max_rows")]
    pub export_max_rows: usize,
    /// How long the "filtering" flag stays raised after a computation ends.
    #[serde(default = "default_filter_settle_ms")]
    pub filter_settle_ms: u64,
    pub agencies: Vec<Agency>,
}

impl ServerConfig {
    pub fn agency(&self, id: &AgencyId) -> Option<&Agency> {
        self.agencies.iter().find(|agency| &agency.id == id)
    }
}
