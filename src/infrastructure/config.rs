//! Configuration infrastructure.
//!
//! A single JSON file drives the process: database location and pool size,
//! ingestion batching, and logging. Every section has defaults so the
//! pipeline runs out of the box; a missing config file is written with the
//! defaults on first start.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::parsing::DEFAULT_PRODUCT_SELECTOR;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub ingest: IngestConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database URL.
    pub url: String,
    /// Upper bound on pooled connections, which also caps concurrent
    /// ingestion transactions.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/salesfeed.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Number of records persisted concurrently per batch.
    pub batch_size: usize,
    /// Selector for the repeating product node in the feed.
    pub product_selector: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            product_selector: DEFAULT_PRODUCT_SELECTOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Also write daily-rolled log files under `directory`.
    pub file_output: bool,
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_output: false,
            directory: "logs".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `path`, creating the file with defaults when
    /// it does not exist yet.
    ///
    /// Runs before the tracing subscriber is installed, so it emits no
    /// events; the caller reports file creation after logging is up.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            let serialized = serde_json::to_string_pretty(&config)?;
            tokio::fs::write(path, serialized)
                .await
                .with_context(|| format!("writing default config to {}", path.display()))?;
            return Ok(config);
        }

        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config from {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config from {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.ingest.batch_size, 100);
        assert_eq!(config.ingest.product_selector, "//product");
        assert!(config.database.max_connections > 0);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"ingest": {"batch_size": 25}}"#).unwrap();
        assert_eq!(config.ingest.batch_size, 25);
        assert_eq!(config.ingest.product_selector, "//product");
        assert_eq!(config.database.max_connections, 10);
    }
}
