use crate::error::{Result, ShareError};
use crate::storage::{FileCatalog, FileRecord, FileStore};
use std::sync::Arc;
use tokio::fs::File;

/// Resolves a content id to its record and backing bytes for download.
#[derive(Clone)]
pub struct DownloadFileOperation {
    catalog: Arc<dyn FileCatalog>,
    file_store: Arc<FileStore>,
}

#[derive(Debug)]
pub struct DownloadFileOperationResult {
    pub record: FileRecord,
    pub size: u64,
    pub body: File,
}

#[derive(Debug)]
pub enum DownloadFileOperationOutcome {
    Found(DownloadFileOperationResult),
    NotFound,
}

impl DownloadFileOperation {
    pub fn new(catalog: Arc<dyn FileCatalog>, file_store: Arc<FileStore>) -> Self {
        Self {
            catalog,
            file_store,
        }
    }

    /// Look up a record and confirm its backing bytes exist.
    ///
    /// A record whose bytes are missing is an integrity fault: it is logged
    /// and resolves to `None`, indistinguishable from never-uploaded.
    pub fn resolve(&self, file_id: &str) -> Result<Option<FileRecord>> {
        let Some(record) = self.catalog.find_by_id(file_id)? else {
            return Ok(None);
        };

        if !self.file_store.exists(&record.id, &record.extension) {
            tracing::warn!(
                "file metadata exists but stored bytes are missing: id={} path={:?}",
                record.id,
                self.file_store.file_path(&record.id, &record.extension)
            );
            return Ok(None);
        }

        Ok(Some(record))
    }

    pub async fn run(&self, file_id: &str) -> Result<DownloadFileOperationOutcome> {
        let Some(record) = self.resolve(file_id)? else {
            return Ok(DownloadFileOperationOutcome::NotFound);
        };

        match self
            .file_store
            .open_for_read(&record.id, &record.extension)
            .await
        {
            Ok((size, body)) => Ok(DownloadFileOperationOutcome::Found(
                DownloadFileOperationResult { record, size, body },
            )),
            Err(ShareError::NotFound(_)) => Ok(DownloadFileOperationOutcome::NotFound),
            Err(error) => Err(error),
        }
    }
}
