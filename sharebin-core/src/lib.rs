//! Sharebin Core - Core library for a content-addressed file sharing service
//!
//! A single-node file sharing service using:
//! - MD5 content hashes as stable file identifiers
//! - flat filesystem storage with two-tier quota enforcement
//! - magic-byte validation of declared media types
//! - SQLite for file metadata

pub mod config;
pub mod error;
pub mod operations;
pub mod storage;
pub mod validate;

pub use config::StorageLimits;
pub use error::{Result, ShareError};
pub use operations::{
    DownloadFileOperation, DownloadFileOperationOutcome, DownloadFileOperationResult,
    UploadFileOperation, UploadFileOperationRequest, UploadFileOperationResult,
};
pub use storage::{FileCatalog, FileRecord, FileStore, FilesInfo, SqliteCatalog, compute_hash};
