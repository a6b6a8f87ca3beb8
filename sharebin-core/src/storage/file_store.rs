use crate::error::{Result, ShareError};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Aggregate view of the regular files directly under the storage root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesInfo {
    pub total_files: u64,
    pub total_bytes: u64,
}

/// FileStore persists uploaded bytes in a flat, content-derived layout:
/// one regular file `{id}.{extension}` per distinct content hash.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Derived storage location for a content id. Pure, no I/O.
    pub fn file_path(&self, id: &str, extension: &str) -> PathBuf {
        if extension.is_empty() {
            self.root.join(id)
        } else {
            self.root.join(format!("{id}.{extension}"))
        }
    }

    /// Write `data` under the derived path.
    ///
    /// Writes to a temporary file first, then renames, so a torn write never
    /// leaves a partial file at the final location.
    pub async fn put(&self, id: &str, extension: &str, data: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(ShareError::StorageWrite)?;

        let path = self.file_path(id, extension);
        let temp_path = temp_path_for(&path);

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(ShareError::StorageWrite)?;
        file.write_all(data)
            .await
            .map_err(ShareError::StorageWrite)?;
        file.sync_all().await.map_err(ShareError::StorageWrite)?;
        drop(file);

        fs::rename(&temp_path, &path)
            .await
            .map_err(ShareError::StorageWrite)?;

        tracing::debug!("stored {} bytes at {:?}", data.len(), path);
        Ok(())
    }

    /// True iff a regular file exists at the derived path.
    pub fn exists(&self, id: &str, extension: &str) -> bool {
        self.file_path(id, extension).is_file()
    }

    /// Open a stored file for sequential reading.
    pub async fn open_for_read(&self, id: &str, extension: &str) -> Result<(u64, fs::File)> {
        let path = self.file_path(id, extension);

        if !path.is_file() {
            return Err(ShareError::NotFound(id.to_string()));
        }

        let file = fs::File::open(&path).await?;
        let size = file.metadata().await?.len();
        Ok((size, file))
    }

    /// Total bytes currently charged against the aggregate quota.
    pub async fn used_bytes(&self) -> Result<u64> {
        Ok(self.scan_root().await?.total_bytes)
    }

    /// Count and total size of stored files, from the filesystem alone.
    pub async fn stored_files_info(&self) -> Result<FilesInfo> {
        self.scan_root().await
    }

    // First level only: the layout is flat, and the quota accounting is
    // bounded to regular files directly under the root.
    async fn scan_root(&self) -> Result<FilesInfo> {
        let mut info = FilesInfo {
            total_files: 0,
            total_bytes: 0,
        };

        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                info.total_files += 1;
                info.total_bytes += metadata.len();
            }
        }

        Ok(info)
    }
}

// Appends ".tmp" to the whole file name, so the temp path is distinct from
// the final path even when the stored extension is itself "tmp".
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Content id for a byte payload: MD5 hex digest.
///
/// The digest is a dedup key and storage identifier, not a security
/// boundary.
pub fn compute_hash(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
