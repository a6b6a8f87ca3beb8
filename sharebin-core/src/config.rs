use serde::{Deserialize, Serialize};

/// Admission ceilings for the upload pipeline, in bytes.
///
/// `storage_limit` bounds the aggregate size of all stored files;
/// `file_limit` bounds a single upload. Both are checked on every
/// dedup miss.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StorageLimits {
    #[serde(default = "default_storage_limit")]
    pub storage_limit: u64,
    #[serde(default = "default_file_limit")]
    pub file_limit: u64,
}

impl Default for StorageLimits {
    fn default() -> Self {
        Self {
            storage_limit: default_storage_limit(),
            file_limit: default_file_limit(),
        }
    }
}

fn default_storage_limit() -> u64 {
    200_000
}

fn default_file_limit() -> u64 {
    50_000
}
