//! Blob repository contract with SQLite and in-memory implementations.
//!
//! # Responsibility
//! - Store and load whole serialized collections by key.
//! - Offer a multi-key write used when one logical change spans collections.
//!
//! # Invariants
//! - SQLite writes go through a migrated connection only.
//! - `SqliteBlobRepository::put_many` commits in a single transaction.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Blob storage failure.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection schema does not match what this binary expects.
    SchemaNotReady { found: u32, expected: u32 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::SchemaNotReady { found, expected } => write!(
                f,
                "blob storage schema version {found} does not match expected {expected}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::SchemaNotReady { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for whole-collection blobs.
pub trait BlobRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn put(&mut self, key: &str, value: &str) -> RepoResult<()>;
    fn remove(&mut self, key: &str) -> RepoResult<bool>;

    /// Writes several blobs as one logical change.
    fn put_many(&mut self, entries: &[(&str, &str)]) -> RepoResult<()> {
        for (key, value) in entries {
            self.put(key, value)?;
        }
        Ok(())
    }
}

/// SQLite-backed blob repository over the `blobs` table.
pub struct SqliteBlobRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteBlobRepository<'conn> {
    /// Wraps a connection opened by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    ///
    /// # Errors
    /// - `SchemaNotReady` when the connection has not been migrated.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        let found = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        let expected = latest_version();
        if found != expected {
            return Err(RepoError::SchemaNotReady { found, expected });
        }
        Ok(Self { conn })
    }
}

impl BlobRepository for SqliteBlobRepository<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM blobs WHERE key = ?1;", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &str) -> RepoResult<()> {
        upsert_blob(self.conn, key, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM blobs WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }

    fn put_many(&mut self, entries: &[(&str, &str)]) -> RepoResult<()> {
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            upsert_blob(&tx, key, value)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn upsert_blob(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO blobs (key, value)
         VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![key, value],
    )
}

/// Process-local blob repository. Contents vanish with the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobRepository {
    blobs: BTreeMap<String, String>,
}

impl MemoryBlobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobRepository for MemoryBlobRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> RepoResult<bool> {
        Ok(self.blobs.remove(key).is_some())
    }
}
