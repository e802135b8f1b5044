//! The store facade - single entry point to the adapter.
//!
//! `Store` ties the stateless translator to the execution engine: it
//! resolves the caller scope, builds the plan, runs it, and maps the
//! normalized result into the outcome variant the command promises.

use tracing::{debug, error};

use syncstore_core::{CallerIdentity, Document, Record, Scope};
use syncstore_engine::{Engine, Fetched, RawRow, StoreConfig, TableId};

use crate::translator;
use crate::{Command, Error, Outcome, Result};

/// Translator-and-engine facade over one backend connection.
///
/// A store is an explicitly constructed instance with an explicit
/// open/close lifecycle, injected into callers; tests build an isolated
/// instance per case. One store means one connection and one in-flight
/// query at a time (`&mut self` everywhere).
pub struct Store {
    engine: Engine,
    debug_identity: Option<u64>,
}

impl Store {
    /// Connect to the configured backend.
    ///
    /// Fails fast: a failed connection yields no store.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let engine = Engine::open(config)?;
        Ok(Self {
            engine,
            debug_identity: config.debug_identity,
        })
    }

    /// Assemble a store around an existing engine.
    ///
    /// Tests inject failure-wrapped backends this way.
    pub fn with_engine(engine: Engine, debug_identity: Option<u64>) -> Self {
        Self {
            engine,
            debug_identity,
        }
    }

    /// Tear the connection down.
    pub fn close(self) {
        self.engine.close();
    }

    /// The engine's table mapping prefix (used by provisioning).
    pub fn table_prefix(&self) -> &str {
        self.engine.tables().prefix()
    }

    /// Execute a single command for the given caller.
    pub fn execute(&mut self, caller: &CallerIdentity, cmd: Command) -> Result<Outcome> {
        let scope = translator::resolve_scope(caller, self.debug_identity)?;
        let plan = translator::translate(&cmd, scope, self.engine.tables(), self.engine.dialect())?;
        debug!(op = cmd.name(), table = %cmd.table(), uid = scope.uid(), "executing");
        let fetched = self.engine.run(&plan)?;
        self.outcome(&cmd, scope, fetched)
    }

    /// Execute caller-supplied query text, bypassing translation.
    ///
    /// Returns associative rows on success (empty for statements without a
    /// result set) and `None` on failure; a missing table is a neutral
    /// miss. Used by schema provisioning.
    pub fn run_raw(&mut self, sql: &str) -> Option<Vec<RawRow>> {
        self.engine.run_raw(sql)
    }

    /// Map the engine's normalized result into the command's outcome.
    fn outcome(&self, cmd: &Command, scope: Scope, fetched: Fetched) -> Result<Outcome> {
        match (cmd, fetched) {
            // The stored id is the caller's own guid: on a duplicate insert
            // the backend-recovered value may be a composite key rendering,
            // so it only informs the log.
            (Command::Add { record, .. }, Fetched::Written { recovered_guid, .. }) => {
                if let Some(recovered) = recovered_guid {
                    debug!(guid = %record.guid, recovered = %recovered, "add hit an existing record");
                }
                Ok(Outcome::Id(record.guid.clone()))
            }
            (Command::Update { .. }, Fetched::Written { .. }) => Ok(Outcome::Done(true)),
            (Command::Delete { .. }, Fetched::Written { affected, .. }) => {
                Ok(Outcome::Done(affected > 0))
            }
            (Command::ReadByGlobalId { table, guid }, Fetched::Document(body)) => {
                self.document(*table, scope, guid, body)
            }
            (Command::ReadByLocalId { table, luid }, Fetched::Document(body)) => {
                self.document(*table, scope, luid, body)
            }
            (
                Command::ListGroups { .. }
                | Command::ListChildren { .. }
                | Command::ListUnsynced { .. },
                Fetched::Pairs(pairs),
            ) => Ok(Outcome::Listing(pairs)),
            (cmd, fetched) => Err(Error::Internal {
                reason: format!(
                    "{} produced a result shape it never declared: {:?}",
                    cmd.name(),
                    fetched
                ),
            }),
        }
    }

    /// Validate a fetched body; an unparsable document is surfaced as a
    /// failure with the offending identifiers, never as garbled content.
    fn document(
        &self,
        table: TableId,
        scope: Scope,
        id: &str,
        body: Option<String>,
    ) -> Result<Outcome> {
        match body {
            None => Ok(Outcome::Document(None)),
            Some(raw) => match Document::parse(raw) {
                Ok(doc) => Ok(Outcome::Document(Some(doc))),
                Err(e) => {
                    error!(
                        table = %table,
                        uid = scope.uid(),
                        id = %id,
                        error = %e,
                        "invalid document data in record"
                    );
                    Err(Error::MalformedDocument {
                        table: table.to_string(),
                        uid: scope.uid(),
                        guid: id.to_string(),
                    })
                }
            },
        }
    }

    // ==================== Typed convenience wrappers ====================

    /// Add a record; returns the stored global id.
    pub fn add(
        &mut self,
        caller: &CallerIdentity,
        table: TableId,
        record: Record,
    ) -> Result<String> {
        match self.execute(caller, Command::Add { table, record })? {
            Outcome::Id(id) => Ok(id),
            other => Err(unexpected("Add", &other)),
        }
    }

    /// Update a record in place, keyed on its global id.
    pub fn update(
        &mut self,
        caller: &CallerIdentity,
        table: TableId,
        record: Record,
    ) -> Result<bool> {
        match self.execute(caller, Command::Update { table, record })? {
            Outcome::Done(ok) => Ok(ok),
            other => Err(unexpected("Update", &other)),
        }
    }

    /// Delete one record by global id; `false` when nothing matched.
    pub fn delete(
        &mut self,
        caller: &CallerIdentity,
        table: TableId,
        guid: impl Into<String>,
    ) -> Result<bool> {
        match self.execute(
            caller,
            Command::Delete {
                table,
                guid: guid.into(),
            },
        )? {
            Outcome::Done(ok) => Ok(ok),
            other => Err(unexpected("Delete", &other)),
        }
    }

    /// Read one record's document by global id.
    pub fn read_by_guid(
        &mut self,
        caller: &CallerIdentity,
        table: TableId,
        guid: impl Into<String>,
    ) -> Result<Option<Document>> {
        match self.execute(
            caller,
            Command::ReadByGlobalId {
                table,
                guid: guid.into(),
            },
        )? {
            Outcome::Document(doc) => Ok(doc),
            other => Err(unexpected("ReadByGlobalId", &other)),
        }
    }

    /// Read one record's document by local id.
    pub fn read_by_luid(
        &mut self,
        caller: &CallerIdentity,
        table: TableId,
        luid: impl Into<String>,
    ) -> Result<Option<Document>> {
        match self.execute(
            caller,
            Command::ReadByLocalId {
                table,
                luid: luid.into(),
            },
        )? {
            Outcome::Document(doc) => Ok(doc),
            other => Err(unexpected("ReadByLocalId", &other)),
        }
    }

    /// List all group records as ordered (guid, type) pairs.
    pub fn list_groups(
        &mut self,
        caller: &CallerIdentity,
        table: TableId,
    ) -> Result<Vec<(String, String)>> {
        match self.execute(caller, Command::ListGroups { table })? {
            Outcome::Listing(pairs) => Ok(pairs),
            other => Err(unexpected("ListGroups", &other)),
        }
    }

    /// List the records inside a group (empty id = base group).
    pub fn list_children(
        &mut self,
        caller: &CallerIdentity,
        table: TableId,
        group: impl Into<String>,
    ) -> Result<Vec<(String, String)>> {
        match self.execute(
            caller,
            Command::ListChildren {
                table,
                group: group.into(),
            },
        )? {
            Outcome::Listing(pairs) => Ok(pairs),
            other => Err(unexpected("ListChildren", &other)),
        }
    }

    /// List the records inside a group whose last sync did not complete
    /// cleanly.
    pub fn list_unsynced(
        &mut self,
        caller: &CallerIdentity,
        table: TableId,
        group: impl Into<String>,
    ) -> Result<Vec<(String, String)>> {
        match self.execute(
            caller,
            Command::ListUnsynced {
                table,
                group: group.into(),
            },
        )? {
            Outcome::Listing(pairs) => Ok(pairs),
            other => Err(unexpected("ListUnsynced", &other)),
        }
    }
}

fn unexpected(op: &str, outcome: &Outcome) -> Error {
    Error::Internal {
        reason: format!("{op} returned an unexpected outcome: {outcome:?}"),
    }
}
