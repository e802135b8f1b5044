//! Backend abstraction over one relational connection.
//!
//! The engine drives exactly one backend at a time and serializes every
//! statement through `&mut self`, so implementations need no internal
//! locking. Each backend supplies:
//!
//! - **SQLite** (default): embedded, in-process; the write bracket is a
//!   `BEGIN IMMEDIATE` transaction
//! - **MySQL** (`mysql` feature): one server connection; the write bracket
//!   is `LOCK TABLES ... WRITE`
//!
//! Backends translate their driver errors into a shared [`ErrorKind`]
//! classification so the engine's retry and recovery logic never inspects
//! driver types.

mod sqlite;

#[cfg(feature = "mysql")]
mod mysql;

pub use sqlite::SqliteBackend;

#[cfg(feature = "mysql")]
pub use mysql::MySqlBackend;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One associative result row from a raw query (column name -> value).
pub type RawRow = BTreeMap<String, Option<String>>;

/// SQL dialect spoken by a backend.
///
/// The dialect carries the backend's native escaping primitive; no value is
/// embedded into query text without passing through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    /// SQLite: single-quoted literals, quote doubling.
    Sqlite,
    /// MySQL: double-quoted literals, backslash escaping.
    MySql,
}

impl Dialect {
    /// Escape a string value for embedding into query text.
    pub fn escape(&self, value: &str) -> String {
        match self {
            Dialect::Sqlite => value.replace('\'', "''"),
            Dialect::MySql => {
                let mut out = String::with_capacity(value.len());
                for c in value.chars() {
                    match c {
                        '\0' => out.push_str("\\0"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\x1a' => out.push_str("\\Z"),
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        '"' => out.push_str("\\\""),
                        c => out.push(c),
                    }
                }
                out
            }
        }
    }

    /// Render a string value as a quoted, escaped SQL literal.
    pub fn literal(&self, value: &str) -> String {
        match self {
            Dialect::Sqlite => format!("'{}'", self.escape(value)),
            Dialect::MySql => format!("\"{}\"", self.escape(value)),
        }
    }

    /// Quote a physical table name.
    pub fn table(&self, name: &str) -> String {
        // Backtick quoting is accepted by both dialects.
        format!("`{}`", name)
    }

    /// Whether the dialect supports assignment-style `INSERT ... SET`.
    pub fn assignment_insert(&self) -> bool {
        matches!(self, Dialect::MySql)
    }
}

/// Raw result of executing one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Statement produced no result set; count of affected rows.
    Affected(u64),
    /// Result set: column names plus rows of text-normalized values.
    Rows {
        /// Column names, in select order.
        columns: Vec<String>,
        /// Row values; `None` for SQL NULL.
        rows: Vec<Vec<Option<String>>>,
    },
}

/// Failure classification shared by every backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection-level loss worth retrying (server gone away, database
    /// busy or locked).
    Transient,
    /// Unique-key conflict on insert. `recovered` carries the conflicting
    /// id when the driver's message exposes one (a version-fragile but
    /// deliberate recovery; callers fall back to the id they supplied).
    DuplicateKey {
        /// Conflicting id parsed out of the driver message, if any.
        recovered: Option<String>,
    },
    /// The target table does not exist.
    MissingTable,
    /// Everything else; terminal for the call.
    Other,
}

/// A classified backend failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct BackendError {
    /// Failure classification driving retry and recovery.
    pub kind: ErrorKind,
    /// Driver-native error code, 0 when the driver exposes none.
    pub code: i32,
    /// Driver error text.
    pub message: String,
}

impl BackendError {
    /// Build a classified error.
    pub fn new(kind: ErrorKind, code: i32, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
        }
    }

    /// An unclassified terminal error without a driver code.
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Other, 0, message)
    }
}

/// A live connection to one relational backend.
pub trait Backend: Send {
    /// Dialect used to render query text for this backend.
    fn dialect(&self) -> Dialect;

    /// Execute one statement and return its raw result.
    fn execute(&mut self, sql: &str) -> Result<QueryResult, BackendError>;

    /// Enter the table-level write bracket.
    ///
    /// Best-effort and non-reentrant: it serializes writers across
    /// processes but gives readers no isolation.
    fn lock_write(&mut self, table: &str) -> Result<(), BackendError>;

    /// Leave the write bracket. Called regardless of the outcome of the
    /// statements executed inside it.
    fn unlock(&mut self) -> Result<(), BackendError>;
}
