//! The execution engine.
//!
//! Owns the one live backend connection and wraps every query execution in
//! the resilience layer: the write-lock bracket for mutating plans, a
//! bounded retry loop for transient failures, terminal-failure
//! classification and logging, and normalization of heterogeneous result
//! rows into the shape the plan declared.

use std::thread;
use std::time::Duration;

use tracing::{debug, error, warn};

use syncstore_core::document::ROOT_MARKER;

use crate::backend::{Backend, BackendError, Dialect, ErrorKind, QueryResult, RawRow, SqliteBackend};
use crate::config::{BackendKind, StoreConfig};
use crate::plan::{Fetched, Plan, ResultShape};
use crate::tables::TableMap;

/// The execution engine: one connection, one in-flight query at a time.
///
/// An engine is an explicitly constructed instance with an explicit
/// lifecycle - callers receive it by injection and tests build an isolated
/// instance per case. `&mut self` on every operation makes interleaved
/// calls on one engine structurally impossible; the table lock serializes
/// writers across *processes*, not threads.
pub struct Engine {
    backend: Box<dyn Backend>,
    tables: TableMap,
    retry_budget: u32,
    retry_backoff: Duration,
}

impl Engine {
    /// Connect to the configured backend.
    ///
    /// Fails fast: a failed connection yields no engine instance.
    pub fn open(config: &StoreConfig) -> Result<Self, BackendError> {
        let backend: Box<dyn Backend> = match config.backend {
            BackendKind::Sqlite => Box::new(SqliteBackend::open(&config.database)?),
            #[cfg(feature = "mysql")]
            BackendKind::Mysql => Box::new(crate::backend::MySqlBackend::open(
                &config.host,
                config.port,
                &config.user,
                &config.password,
                &config.database,
            )?),
            #[cfg(not(feature = "mysql"))]
            BackendKind::Mysql => {
                return Err(BackendError::other(
                    "mysql backend support is not compiled in (enable the `mysql` feature)",
                ))
            }
        };
        debug!(backend = ?config.backend, database = %config.database, "backend connected");
        Ok(Self::with_backend(
            backend,
            TableMap::new(&config.table_prefix),
            config.retry_budget,
            Duration::from_millis(config.retry_backoff_ms),
        ))
    }

    /// Assemble an engine from parts.
    ///
    /// Tests use this to inject a failure-wrapped backend; see
    /// [`crate::testing`].
    pub fn with_backend(
        backend: Box<dyn Backend>,
        tables: TableMap,
        retry_budget: u32,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            backend,
            tables,
            retry_budget,
            retry_backoff,
        }
    }

    /// The physical table mapping computed at open.
    pub fn tables(&self) -> &TableMap {
        &self.tables
    }

    /// Dialect of the connected backend.
    pub fn dialect(&self) -> Dialect {
        self.backend.dialect()
    }

    /// Tear the connection down. Dropping the engine has the same effect;
    /// this form makes the lifecycle explicit at call sites.
    pub fn close(self) {}

    /// Execute a translated plan and normalize the result.
    pub fn run(&mut self, plan: &Plan) -> Result<Fetched, BackendError> {
        match plan.lock.clone() {
            Some(table) => self.with_write_lock(&table, |eng| eng.run_unlocked(plan)),
            None => self.run_unlocked(plan),
        }
    }

    /// Run `f` inside the table-level write bracket.
    ///
    /// The bracket is best-effort and non-reentrant: a failed lock is
    /// logged, not fatal, and the unlock runs regardless of `f`'s outcome.
    /// It is not a transaction and gives readers no isolation.
    pub fn with_write_lock<T>(&mut self, table: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        if let Err(e) = self.retrying(|b| b.lock_write(table)) {
            warn!(table = %table, message = %e.message, "write lock not acquired");
        }
        let out = f(self);
        if let Err(e) = self.retrying(|b| b.unlock()) {
            warn!(table = %table, message = %e.message, "write lock not released");
        }
        out
    }

    /// Execute caller-supplied query text, bypassing translation.
    ///
    /// Returns associative rows on success (empty for statements without a
    /// result set) and `None` on failure. A query against a missing table
    /// is a neutral miss, not an error.
    pub fn run_raw(&mut self, sql: &str) -> Option<Vec<RawRow>> {
        match self.retrying(|b| b.execute(sql)) {
            Ok(QueryResult::Affected(_)) => Some(Vec::new()),
            Ok(QueryResult::Rows { columns, rows }) => Some(
                rows.into_iter()
                    .map(|row| columns.iter().cloned().zip(row).collect())
                    .collect(),
            ),
            Err(e) if matches!(e.kind, ErrorKind::MissingTable) => {
                debug!(message = %e.message, "raw query against missing table");
                None
            }
            Err(e) => {
                error!(code = e.code, message = %e.message, "raw query failed");
                debug!(backtrace = %std::backtrace::Backtrace::force_capture(), "failure context");
                None
            }
        }
    }

    fn run_unlocked(&mut self, plan: &Plan) -> Result<Fetched, BackendError> {
        match self.retrying(|b| b.execute(&plan.sql)) {
            Ok(result) => Ok(normalize(plan.shape, result)),
            Err(e) => {
                if plan.shape == ResultShape::Written {
                    if let ErrorKind::DuplicateKey { recovered } = &e.kind {
                        // A conflicting insert is a successful add; the id
                        // comes out of the conflict message when the backend
                        // exposes one.
                        debug!(recovered = ?recovered, "duplicate key treated as success");
                        return Ok(Fetched::Written {
                            affected: 1,
                            recovered_guid: recovered.clone(),
                        });
                    }
                }
                error!(code = e.code, message = %e.message, "query failed");
                debug!(backtrace = %std::backtrace::Backtrace::force_capture(), "failure context");
                Err(e)
            }
        }
    }

    /// Drive one backend operation through the bounded transient-retry
    /// loop: fixed backoff, decrementing budget, debug-level logging.
    fn retrying<T>(
        &mut self,
        mut op: impl FnMut(&mut dyn Backend) -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        let mut budget = self.retry_budget;
        loop {
            match op(self.backend.as_mut()) {
                Ok(value) => return Ok(value),
                Err(e) if matches!(e.kind, ErrorKind::Transient) && budget > 0 => {
                    budget -= 1;
                    debug!(message = %e.message, remaining = budget, "transient backend failure, retrying");
                    thread::sleep(self.retry_backoff);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Normalize a raw result into the plan's declared shape.
fn normalize(shape: ResultShape, result: QueryResult) -> Fetched {
    match shape {
        ResultShape::Written => {
            let affected = match result {
                QueryResult::Affected(n) => n,
                QueryResult::Rows { .. } => 0,
            };
            Fetched::Written {
                affected,
                recovered_guid: None,
            }
        }
        ResultShape::Document => Fetched::Document(collapse_document(flatten(result))),
        ResultShape::Pairs => Fetched::Pairs(pair_up(flatten(result))),
        ResultShape::Raw => match result {
            QueryResult::Affected(_) => Fetched::Rows(Vec::new()),
            QueryResult::Rows { columns, rows } => Fetched::Rows(
                rows.into_iter()
                    .map(|row| columns.iter().cloned().zip(row).collect())
                    .collect(),
            ),
        },
    }
}

/// Flatten multi-column rows into one interleaved value sequence (NULL
/// becomes the empty string).
fn flatten(result: QueryResult) -> Vec<String> {
    match result {
        QueryResult::Affected(_) => Vec::new(),
        QueryResult::Rows { rows, .. } => rows
            .into_iter()
            .flatten()
            .map(|v| v.unwrap_or_default())
            .collect(),
    }
}

/// A value opening with the document root marker is the whole result;
/// otherwise a scalar list collapses to its first value, and an empty
/// result is "not found".
fn collapse_document(values: Vec<String>) -> Option<String> {
    if let Some(doc) = values.iter().find(|v| v.starts_with(ROOT_MARKER)) {
        return Some(doc.clone());
    }
    values.into_iter().next()
}

/// Pair consecutive values into (id, type) tuples, preserving result
/// order; a dangling trailing value is dropped.
fn pair_up(values: Vec<String>) -> Vec<(String, String)> {
    let mut out = Vec::with_capacity(values.len() / 2);
    let mut iter = values.into_iter();
    while let (Some(guid), Some(kind)) = (iter.next(), iter.next()) {
        out.push((guid, kind));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FlakyBackend;

    fn sqlite_engine() -> Engine {
        let backend = SqliteBackend::open(":memory:").unwrap();
        Engine::with_backend(
            Box::new(backend),
            TableMap::new("sync"),
            3,
            Duration::from_millis(1),
        )
    }

    fn create_table(engine: &mut Engine) {
        engine
            .run_raw(
                "CREATE TABLE `sync_contact` (`Uid` INTEGER NOT NULL, `GUID` TEXT NOT NULL, \
                 `XML` TEXT, PRIMARY KEY (`Uid`, `GUID`))",
            )
            .unwrap();
    }

    #[test]
    fn open_in_memory_succeeds() {
        let config = StoreConfig::default();
        let engine = Engine::open(&config).unwrap();
        assert_eq!(engine.dialect(), Dialect::Sqlite);
        engine.close();
    }

    #[test]
    fn run_raw_returns_associative_rows() {
        let mut engine = sqlite_engine();
        create_table(&mut engine);
        engine
            .run_raw("INSERT INTO `sync_contact` (`Uid`, `GUID`, `XML`) VALUES (1, 'a', '<x/>')")
            .unwrap();
        let rows = engine
            .run_raw("SELECT `GUID`, `XML` FROM `sync_contact`")
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("GUID"), Some(&Some("a".to_string())));
        assert_eq!(rows[0].get("XML"), Some(&Some("<x/>".to_string())));
    }

    #[test]
    fn run_raw_missing_table_is_neutral() {
        let mut engine = sqlite_engine();
        assert!(engine.run_raw("SELECT * FROM `sync_contact`").is_none());
    }

    #[test]
    fn run_raw_statement_without_result_set_returns_empty() {
        let mut engine = sqlite_engine();
        let rows = engine.run_raw("CREATE TABLE x (`a` TEXT)").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn shaped_query_on_missing_table_is_an_error() {
        let mut engine = sqlite_engine();
        let plan = Plan {
            sql: "SELECT `XML` FROM `sync_contact`".into(),
            shape: ResultShape::Document,
            lock: None,
        };
        let err = engine.run(&plan).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingTable);
    }

    #[test]
    fn written_plan_reports_affected_rows() {
        let mut engine = sqlite_engine();
        create_table(&mut engine);
        let plan = Plan {
            sql: "DELETE FROM `sync_contact` WHERE `Uid` = 1".into(),
            shape: ResultShape::Written,
            lock: Some("sync_contact".into()),
        };
        match engine.run(&plan).unwrap() {
            Fetched::Written { affected, .. } => assert_eq!(affected, 0),
            other => panic!("expected written, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_insert_is_success() {
        let mut engine = sqlite_engine();
        create_table(&mut engine);
        let insert = Plan {
            sql: "INSERT INTO `sync_contact` (`Uid`, `GUID`) VALUES (1, 'a')".into(),
            shape: ResultShape::Written,
            lock: Some("sync_contact".into()),
        };
        engine.run(&insert).unwrap();
        match engine.run(&insert).unwrap() {
            Fetched::Written { affected, .. } => assert_eq!(affected, 1),
            other => panic!("expected written, got {:?}", other),
        }
    }

    #[test]
    fn transient_failures_within_budget_recover() {
        let backend = SqliteBackend::open(":memory:").unwrap();
        let (flaky, trigger) = FlakyBackend::new(backend);
        let mut engine = Engine::with_backend(
            Box::new(flaky),
            TableMap::new("sync"),
            3,
            Duration::from_millis(1),
        );
        create_table(&mut engine);

        trigger.fail_next(2);
        let rows = engine.run_raw("SELECT `GUID` FROM `sync_contact`").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn transient_failures_beyond_budget_are_terminal() {
        let backend = SqliteBackend::open(":memory:").unwrap();
        let (flaky, trigger) = FlakyBackend::new(backend);
        let mut engine = Engine::with_backend(
            Box::new(flaky),
            TableMap::new("sync"),
            3,
            Duration::from_millis(1),
        );
        create_table(&mut engine);

        trigger.fail_next(10);
        let plan = Plan {
            sql: "SELECT `XML` FROM `sync_contact`".into(),
            shape: ResultShape::Document,
            lock: None,
        };
        let err = engine.run(&plan).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Transient);

        // Disarm the trigger; later calls see a healthy backend again.
        trigger.fail_next(0);
        assert!(engine.run(&plan).is_ok());
    }

    #[test]
    fn collapse_document_prefers_marker_values() {
        let values = vec!["scalar".to_string(), "<doc/>".to_string()];
        assert_eq!(collapse_document(values), Some("<doc/>".to_string()));
    }

    #[test]
    fn collapse_document_single_scalar() {
        assert_eq!(
            collapse_document(vec!["only".to_string()]),
            Some("only".to_string())
        );
        assert_eq!(collapse_document(Vec::new()), None);
    }

    #[test]
    fn pair_up_interleaves_and_drops_dangling() {
        let values = vec![
            "g1".to_string(),
            "1".to_string(),
            "g2".to_string(),
            "2".to_string(),
            "dangling".to_string(),
        ];
        assert_eq!(
            pair_up(values),
            vec![
                ("g1".to_string(), "1".to_string()),
                ("g2".to_string(), "2".to_string())
            ]
        );
    }
}
