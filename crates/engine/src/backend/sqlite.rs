//! Embedded SQLite backend.
//!
//! Default backend: one in-process connection over a database file (or
//! memory). SQLite has no table-level lock statement, so the write bracket
//! is a `BEGIN IMMEDIATE` transaction - the equivalent backend-side
//! exclusion for writers across processes.

use rusqlite::types::ValueRef;
use rusqlite::Connection;

use super::{Backend, BackendError, Dialect, ErrorKind, QueryResult};

/// One live SQLite connection.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open (or create) the database. `":memory:"` yields an ephemeral
    /// store private to this connection.
    pub fn open(database: &str) -> Result<Self, BackendError> {
        let conn = if database == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(database)
        }
        .map_err(classify)?;
        Ok(Self { conn })
    }
}

impl Backend for SqliteBackend {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn execute(&mut self, sql: &str) -> Result<QueryResult, BackendError> {
        let mut stmt = self.conn.prepare(sql).map_err(classify)?;
        if stmt.column_count() == 0 {
            let affected = stmt.execute([]).map_err(classify)?;
            return Ok(QueryResult::Affected(affected as u64));
        }

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();
        let mut out = Vec::new();
        let mut rows = stmt.query([]).map_err(classify)?;
        while let Some(row) = rows.next().map_err(classify)? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(cell_text(row.get_ref(i).map_err(classify)?));
            }
            out.push(values);
        }
        Ok(QueryResult::Rows { columns, rows: out })
    }

    fn lock_write(&mut self, _table: &str) -> Result<(), BackendError> {
        // IMMEDIATE takes the database write lock up front; SQLite has no
        // narrower per-table lock.
        self.conn.execute_batch("BEGIN IMMEDIATE").map_err(classify)
    }

    fn unlock(&mut self) -> Result<(), BackendError> {
        self.conn.execute_batch("COMMIT").map_err(classify)
    }
}

/// Text-normalize one cell; NULL stays `None`.
fn cell_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(v) => Some(v.to_string()),
        ValueRef::Real(v) => Some(v.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
    }
}

/// Map a rusqlite error into the shared classification.
fn classify(err: rusqlite::Error) -> BackendError {
    match &err {
        rusqlite::Error::SqliteFailure(code, message) => {
            let message = message.clone().unwrap_or_else(|| err.to_string());
            let kind = match code.code {
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                    ErrorKind::Transient
                }
                // SQLite's constraint message names the columns, not the
                // conflicting value, so there is no id to recover here.
                rusqlite::ErrorCode::ConstraintViolation if message.contains("UNIQUE") => {
                    ErrorKind::DuplicateKey { recovered: None }
                }
                _ if message.starts_with("no such table") => ErrorKind::MissingTable,
                _ => ErrorKind::Other,
            };
            BackendError::new(kind, code.extended_code, message)
        }
        _ => BackendError::other(err.to_string()),
    }
}
