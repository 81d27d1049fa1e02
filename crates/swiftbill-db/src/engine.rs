//! # Relational Engine Adapter
//!
//! An in-memory SQLite connection that is rebuilt from, and exported back
//! to, a single byte blob.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   BlobStore::load()                                                    │
//! │        │ bytes                      (NotFound)                          │
//! │        ▼                                │                               │
//! │   Engine::open(Some(bytes))      Engine::open(None)                    │
//! │        │  sqlite3_deserialize           │  empty :memory: database     │
//! │        └───────────────┬────────────────┘                               │
//! │                        ▼                                                │
//! │              execute / query (bound parameters only)                   │
//! │                        │                                                │
//! │                        ▼                                                │
//! │              Engine::export()  ── sqlite3_serialize ──► BlobStore::save │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never touches storage itself. `Database` decides when to
//! export and where the bytes go.

use rusqlite::serialize::OwnedData;
use rusqlite::{Connection, DatabaseName, OptionalExtension, Params, Row};
use std::ptr::NonNull;

use crate::error::{DbError, DbResult};

/// In-memory SQLite database.
///
/// `Connection` is `Send` but not `Sync`; the engine is always reached
/// through the writer mutex in [`Database`](crate::Database).
#[derive(Debug)]
pub struct Engine {
    conn: Connection,
}

impl Engine {
    /// Opens an engine, optionally reconstructed from a serialized blob.
    ///
    /// ## Arguments
    /// * `blob` - Bytes from a previous [`export`](Self::export), or `None`
    ///   for an empty database with no tables
    ///
    /// ## Returns
    /// * `Err(DbError::CorruptBlob)` - The bytes are not an SQLite image
    pub fn open(blob: Option<&[u8]>) -> DbResult<Self> {
        let mut conn = Connection::open_in_memory()?;

        if let Some(bytes) = blob {
            let owned = owned_data_from_bytes(bytes)?;
            conn.deserialize(DatabaseName::Main, owned, false)
                .map_err(|e| DbError::CorruptBlob(e.to_string()))?;

            // deserialize() accepts any bytes; the header is only checked on
            // first read.
            conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
                row.get::<_, i64>(0)
            })
            .map_err(|e| DbError::CorruptBlob(e.to_string()))?;
        }

        // The bundled build enforces foreign keys by default. Invoices must
        // outlive the client they were billed to, so enforcement stays off.
        // The pragma is per connection and is not part of the blob.
        conn.pragma_update(None, "foreign_keys", false)?;

        Ok(Engine { conn })
    }

    /// Runs a mutating statement and returns the number of rows changed.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> DbResult<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    /// Runs several parameterless statements (DDL).
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        Ok(self.conn.execute_batch(sql)?)
    }

    /// Runs a query and maps every row.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let names: Vec<String> = engine.query(
    ///     "SELECT name FROM clients WHERE id > ?1",
    ///     [0],
    ///     |row| row.get("name"),
    /// )?;
    /// ```
    pub fn query<T, P, F>(&self, sql: &str, params: P, mapper: F) -> DbResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, mapper)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Runs a query expected to return at most one row.
    pub fn query_row<T, P, F>(&self, sql: &str, params: P, mapper: F) -> DbResult<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        Ok(self.conn.query_row(sql, params, mapper).optional()?)
    }

    /// Rowid of the most recent successful INSERT.
    pub fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Serializes the whole database to a byte blob.
    pub fn export(&self) -> DbResult<Vec<u8>> {
        let data = self.conn.serialize(DatabaseName::Main)?;
        Ok(data.as_ref().to_vec())
    }

    pub fn table_exists(&self, table: &str) -> DbResult<bool> {
        let found = self.query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |_| Ok(()),
        )?;
        Ok(found.is_some())
    }

    /// Column names of `table` in declaration order.
    pub fn column_names(&self, table: &str) -> DbResult<Vec<String>> {
        self.query(
            "SELECT name FROM pragma_table_info(?1) ORDER BY cid",
            [table],
            |row| row.get(0),
        )
    }
}

/// Copies `bytes` into a buffer SQLite owns, as `deserialize` requires.
fn owned_data_from_bytes(bytes: &[u8]) -> DbResult<OwnedData> {
    if bytes.is_empty() {
        return Err(DbError::CorruptBlob("database blob is empty".to_string()));
    }

    let size: i32 = bytes
        .len()
        .try_into()
        .map_err(|_| DbError::CorruptBlob("database blob is too large".to_string()))?;

    // SAFETY: sqlite3_malloc returns either null or a buffer of `size` bytes.
    // Null is handled below.
    let raw = unsafe { rusqlite::ffi::sqlite3_malloc(size) as *mut u8 };
    let ptr = NonNull::new(raw)
        .ok_or_else(|| DbError::Internal("SQLite allocation failed".to_string()))?;

    // SAFETY:
    // - `ptr` is writable for `bytes.len()` bytes (allocated with that size)
    // - the source slice is valid for reads of the same length
    // - the regions cannot overlap, `ptr` is freshly allocated
    // - OwnedData takes ownership and frees through sqlite3_free
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.as_ptr(), bytes.len());
        Ok(OwnedData::from_raw_nonnull(ptr, bytes.len()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
