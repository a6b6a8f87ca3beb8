//! Storage modules for Sharebin
//!
//! Provides content-addressed file storage and metadata cataloging.

pub mod catalog;
pub mod file_store;

pub use catalog::{FileCatalog, FileRecord, SqliteCatalog};
pub use file_store::{FileStore, FilesInfo, compute_hash};
