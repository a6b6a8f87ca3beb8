use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One logically distinct stored file, keyed by content hash.
///
/// `name` tracks the most recently seen original filename and changes on
/// dedup re-uploads; every other field is fixed at first admission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub extension: String,
    pub content_type: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FileRecord {
    /// Derived download locator. Never stored.
    pub fn download_path(&self, base_path: &str) -> String {
        format!("{}/download/{}", base_path, self.id)
    }
}

/// Durable mapping from content id to file metadata.
pub trait FileCatalog: Send + Sync {
    fn find_by_id(&self, id: &str) -> Result<Option<FileRecord>>;

    /// Insert a new record, or replace the existing one with the same id.
    fn save(&self, record: &FileRecord) -> Result<()>;

    fn list_all(&self) -> Result<Vec<FileRecord>>;
}

/// SQLite-backed catalog. Connections are opened per call.
pub struct SqliteCatalog {
    db_path: PathBuf,
}

impl SqliteCatalog {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        let catalog = Self { db_path };
        catalog.init_schema()?;
        Ok(catalog)
    }

    fn get_conn(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        Ok(conn)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.get_conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS files (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                extension TEXT NOT NULL,
                content_type TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }
}

impl FileCatalog for SqliteCatalog {
    fn find_by_id(&self, id: &str) -> Result<Option<FileRecord>> {
        let conn = self.get_conn()?;

        let record = conn
            .query_row(
                "SELECT id, name, extension, content_type, created_at
                 FROM files WHERE id = ?1",
                [id],
                map_record,
            )
            .optional()?;

        Ok(record)
    }

    fn save(&self, record: &FileRecord) -> Result<()> {
        let conn = self.get_conn()?;

        conn.execute(
            "INSERT OR REPLACE INTO files (id, name, extension, content_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.name,
                record.extension,
                record.content_type,
                record.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn list_all(&self) -> Result<Vec<FileRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, name, extension, content_type, created_at
             FROM files ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map([], map_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        Ok(records)
    }
}

fn map_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecord> {
    let created_at: String = row.get(4)?;

    Ok(FileRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        extension: row.get(2)?,
        content_type: row.get(3)?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?
            .with_timezone(&chrono::Utc),
    })
}
