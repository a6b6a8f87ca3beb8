use crate::config::StorageLimits;
use crate::error::{Result, ShareError};
use crate::storage::{FileCatalog, FileRecord, FileStore, compute_hash};
use crate::validate;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Serializes admission per content hash, so concurrent uploads of
/// identical bytes cannot both pass the dedup-miss check or double-charge
/// the aggregate quota. Entries are never evicted; the map is bounded by
/// the number of distinct admitted hashes.
#[derive(Default)]
struct AdmissionLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AdmissionLocks {
    async fn acquire(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(id.to_string()).or_default().clone()
    }
}

/// Upload admission pipeline: filename cleanup, content hashing, dedup
/// short-circuit, quota admission, media-type validation, commit.
#[derive(Clone)]
pub struct UploadFileOperation {
    catalog: Arc<dyn FileCatalog>,
    file_store: Arc<FileStore>,
    limits: StorageLimits,
    admission: Arc<AdmissionLocks>,
}

#[derive(Debug, Clone)]
pub struct UploadFileOperationRequest {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct UploadFileOperationResult {
    pub record: FileRecord,
    pub deduplicated: bool,
}

impl UploadFileOperation {
    pub fn new(
        catalog: Arc<dyn FileCatalog>,
        file_store: Arc<FileStore>,
        limits: StorageLimits,
    ) -> Self {
        Self {
            catalog,
            file_store,
            limits,
            admission: Arc::new(AdmissionLocks::default()),
        }
    }

    pub async fn run(
        &self,
        request: UploadFileOperationRequest,
    ) -> Result<UploadFileOperationResult> {
        let UploadFileOperationRequest {
            file_name,
            content_type,
            body,
        } = request;

        let name = clean_file_name(&file_name)?;
        let extension = file_extension(&name);
        let id = compute_hash(&body);

        let lock = self.admission.acquire(&id).await;
        let _guard = lock.lock().await;

        // Known content: refresh the name and return. Quota and validation
        // are skipped entirely for a dedup hit.
        if let Some(mut existing) = self.catalog.find_by_id(&id)? {
            existing.name = name;
            self.catalog.save(&existing)?;
            tracing::debug!("dedup hit for {}: reusing stored content", id);
            return Ok(UploadFileOperationResult {
                record: existing,
                deduplicated: true,
            });
        }

        let size = body.len() as u64;
        let used = self.file_store.used_bytes().await?;
        let available = self
            .limits
            .storage_limit
            .saturating_sub(used)
            .min(self.limits.file_limit);
        if size > available {
            return Err(ShareError::InsufficientSpace {
                requested: size,
                available,
            });
        }

        if !validate::is_valid_content(&content_type, &body) {
            return Err(ShareError::UnsupportedMediaType(content_type));
        }

        let record = FileRecord {
            id,
            name,
            extension,
            content_type,
            created_at: chrono::Utc::now(),
        };

        // Record before bytes: a crash between the two leaves an orphan
        // catalog row, never unindexed bytes. Retrieval treats the orphan
        // as not-found and a later re-upload of the content repairs it.
        self.catalog.save(&record)?;
        self.file_store
            .put(&record.id, &record.extension, &body)
            .await?;

        tracing::debug!("admitted {} as {} ({} bytes)", record.name, record.id, size);
        Ok(UploadFileOperationResult {
            record,
            deduplicated: false,
        })
    }
}

/// Reduce a client-supplied filename to its final path segment.
fn clean_file_name(raw: &str) -> Result<String> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();

    if name.is_empty() || name == "." || name == ".." {
        return Err(ShareError::InvalidRequest(format!(
            "invalid file name: {raw:?}"
        )));
    }

    Ok(name.to_string())
}

/// Lowercase extension after the last dot; empty when there is none.
fn file_extension(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => name[idx + 1..].to_ascii_lowercase(),
        _ => String::new(),
    }
}
