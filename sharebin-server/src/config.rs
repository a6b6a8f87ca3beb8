use serde::{Deserialize, Serialize};
use sharebin_core::{Result, ShareError, StorageLimits};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
        }
    }
}

fn default_base_path() -> String {
    "/api/v1".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub uploads_dir: PathBuf,

    /// Catalog database location. Must not live inside `uploads_dir`: the
    /// flat usage scan would count it against the quota.
    #[serde(default = "default_catalog_db")]
    pub catalog_db: PathBuf,

    #[serde(default = "default_storage_limit")]
    pub storage_limit: u64,
    #[serde(default = "default_file_limit")]
    pub file_limit: u64,
}

impl StorageConfig {
    pub fn limits(&self) -> StorageLimits {
        StorageLimits {
            storage_limit: self.storage_limit,
            file_limit: self.file_limit,
        }
    }
}

fn default_catalog_db() -> PathBuf {
    PathBuf::from("sharebin.db")
}

fn default_storage_limit() -> u64 {
    StorageLimits::default().storage_limit
}

fn default_file_limit() -> u64 {
    StorageLimits::default().file_limit
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(path))
            .add_source(::config::Environment::with_prefix("SHAREBIN"))
            .build()
            .map_err(|e| ShareError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| ShareError::Config(e.to_string()))?;

        Ok(config)
    }
}
