//! MySQL backend (behind the `mysql` cargo feature).
//!
//! One server connection over the configured host/port/user/password. The
//! write bracket maps to `LOCK TABLES ... WRITE` / `UNLOCK TABLES`, and the
//! classification covers the server's duplicate-entry (1062), missing-table
//! (1146) and gone-away (2006) codes.

use mysql::prelude::Queryable;
use mysql::Value;

use super::{Backend, BackendError, Dialect, ErrorKind, QueryResult};

/// Server error: duplicate entry for a unique key.
const ER_DUP_ENTRY: u16 = 1062;
/// Server error: table doesn't exist.
const ER_NO_SUCH_TABLE: u16 = 1146;
/// Client error: server has gone away.
const CR_SERVER_GONE_ERROR: u16 = 2006;

/// One live MySQL connection.
pub struct MySqlBackend {
    conn: mysql::Conn,
}

impl MySqlBackend {
    /// Connect to the server. A failed connection yields no backend.
    pub fn open(
        host: &str,
        port: u16,
        user: &str,
        password: &str,
        database: &str,
    ) -> Result<Self, BackendError> {
        let opts = mysql::OptsBuilder::new()
            .ip_or_hostname(Some(host))
            .tcp_port(port)
            .user(Some(user))
            .pass(Some(password))
            .db_name(Some(database));
        let conn = mysql::Conn::new(opts).map_err(classify)?;
        Ok(Self { conn })
    }
}

impl Backend for MySqlBackend {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn execute(&mut self, sql: &str) -> Result<QueryResult, BackendError> {
        let mut result = self.conn.query_iter(sql).map_err(classify)?;
        let columns: Vec<String> = result
            .columns()
            .as_ref()
            .iter()
            .map(|c| c.name_str().into_owned())
            .collect();
        if columns.is_empty() {
            return Ok(QueryResult::Affected(result.affected_rows()));
        }

        let mut rows = Vec::new();
        while let Some(row) = result.next() {
            let row = row.map_err(classify)?;
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(cell_text(&row[i]));
            }
            rows.push(values);
        }
        Ok(QueryResult::Rows { columns, rows })
    }

    fn lock_write(&mut self, table: &str) -> Result<(), BackendError> {
        self.conn
            .query_drop(format!("LOCK TABLES `{}` WRITE", table))
            .map_err(classify)
    }

    fn unlock(&mut self) -> Result<(), BackendError> {
        self.conn.query_drop("UNLOCK TABLES").map_err(classify)
    }
}

/// Text-normalize one cell; NULL stays `None`.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::NULL => None,
        Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
        Value::Int(v) => Some(v.to_string()),
        Value::UInt(v) => Some(v.to_string()),
        Value::Float(v) => Some(v.to_string()),
        Value::Double(v) => Some(v.to_string()),
        // Temporal values do not occur in the record schema.
        other => Some(other.as_sql(true)),
    }
}

/// Map a driver error into the shared classification.
fn classify(err: mysql::Error) -> BackendError {
    match &err {
        mysql::Error::MySqlError(server) => {
            let kind = match server.code {
                ER_DUP_ENTRY => ErrorKind::DuplicateKey {
                    recovered: recover_conflicting_id(&server.message),
                },
                ER_NO_SUCH_TABLE => ErrorKind::MissingTable,
                CR_SERVER_GONE_ERROR => ErrorKind::Transient,
                _ => ErrorKind::Other,
            };
            BackendError::new(kind, server.code as i32, server.message.clone())
        }
        mysql::Error::IoError(io) => {
            BackendError::new(ErrorKind::Transient, 0, io.to_string())
        }
        _ => BackendError::other(err.to_string()),
    }
}

/// Pull the conflicting key value out of a duplicate-entry message
/// (`Duplicate entry 'abc' for key 'PRIMARY'`).
///
/// The message format is server-version-fragile; callers treat a `None`
/// here (or a composite-key value) by falling back to the id they supplied.
fn recover_conflicting_id(message: &str) -> Option<String> {
    message.split('\'').nth(1).map(|s| s.to_string())
}
