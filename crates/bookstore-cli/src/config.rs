//! bookstore.toml configuration handling
//!
//! Layers, lowest first: built-in defaults, the TOML file, environment
//! variables, then command-line flags.

use anyhow::{Context, Result};
use bookstore_mongodb::{BookstoreConfig, PoolConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Pool section of the config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolFileConfig {
    pub min_pool_size: Option<u32>,
    pub max_pool_size: Option<u32>,
    pub max_idle_time_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub server_selection_timeout_secs: Option<u64>,
    pub app_name: Option<String>,
}

impl PoolFileConfig {
    fn apply(self, pool: &mut PoolConfig) {
        if self.min_pool_size.is_some() {
            pool.min_pool_size = self.min_pool_size;
        }
        if self.max_pool_size.is_some() {
            pool.max_pool_size = self.max_pool_size;
        }
        if let Some(secs) = self.max_idle_time_secs {
            pool.max_idle_time = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = self.connect_timeout_secs {
            pool.connect_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = self.server_selection_timeout_secs {
            pool.server_selection_timeout = Some(Duration::from_secs(secs));
        }
        if self.app_name.is_some() {
            pool.app_name = self.app_name;
        }
    }
}

/// Contents of a bookstore.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub uri: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
    #[serde(default)]
    pub pool: PoolFileConfig,
}

impl FileConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply(self, config: &mut BookstoreConfig) {
        if let Some(uri) = self.uri {
            config.uri = uri;
        }
        if let Some(database) = self.database {
            config.database = database;
        }
        if let Some(collection) = self.collection {
            config.collection = collection;
        }
        self.pool.apply(&mut config.pool);
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    pub uri: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
}

/// Resolve the effective configuration.
pub fn resolve(
    file: Option<FileConfig>,
    lookup: impl Fn(&str) -> Option<String>,
    flags: FlagOverrides,
) -> BookstoreConfig {
    let mut config = BookstoreConfig::default();
    if let Some(file) = file {
        file.apply(&mut config);
    }
    let mut config = config.with_vars(lookup);

    if let Some(uri) = flags.uri {
        config.uri = uri;
    }
    if let Some(database) = flags.database {
        config.database = database;
    }
    if let Some(collection) = flags.collection {
        config.collection = collection;
    }
    config
}
