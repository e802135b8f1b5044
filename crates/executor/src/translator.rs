//! Command translation.
//!
//! Stateless mapping from (command, caller scope) to a ready-to-execute
//! query with a declared result shape. The translator never touches the
//! connection: it receives the backend's dialect for its escaping
//! primitives and hands the finished [`Plan`] to the engine.
//!
//! Two rules hold for every query built here:
//! - every string value passes through the dialect's escaping primitive;
//!   no field is ever treated as already-safe
//! - the resolved caller uid is part of every scoped predicate and
//!   assignment, so cross-identity access is structurally impossible

use tracing::{error, warn};

use syncstore_core::{kind, sync, CallerIdentity, Document, Record, Scope};
use syncstore_engine::{Dialect, Plan, ResultShape, TableMap};

use crate::{Command, Error, Result};

/// Resolve the caller to a concrete query scope.
///
/// `Unresolved` callers fail closed - no query is built - unless the
/// configuration supplies a diagnostic fallback identity for scripts
/// running without a session.
pub(crate) fn resolve_scope(
    caller: &CallerIdentity,
    debug_identity: Option<u64>,
) -> Result<Scope> {
    match caller {
        CallerIdentity::System => Ok(Scope::system()),
        CallerIdentity::User(uid) => Ok(Scope::user(*uid)),
        CallerIdentity::Unresolved { user } => match debug_identity {
            Some(uid) => {
                warn!(user = %user, uid, "caller unresolved, using configured debug identity");
                Ok(Scope::user(uid))
            }
            None => {
                error!(user = %user, "user id not set");
                Err(Error::IdentityUnresolved { user: user.clone() })
            }
        },
    }
}

/// Build the plan for one command.
pub(crate) fn translate(
    cmd: &Command,
    scope: Scope,
    tables: &TableMap,
    dialect: Dialect,
) -> Result<Plan> {
    let physical = tables.physical(cmd.table());
    let table = dialect.table(physical);
    let uid = scope.uid();

    let (sql, shape) = match cmd {
        Command::Add { record, .. } => {
            check_record("Add", record, &table)?;
            (insert_sql(dialect, &table, uid, record), ResultShape::Written)
        }
        Command::Update { record, .. } => {
            check_record("Update", record, &table)?;
            (update_sql(dialect, &table, uid, record), ResultShape::Written)
        }
        Command::Delete { guid, .. } => {
            check_id("Delete", "GUID", guid, &table)?;
            (
                format!(
                    "DELETE FROM {table} WHERE `Uid` = {uid} AND `GUID` = {}",
                    dialect.literal(guid)
                ),
                ResultShape::Written,
            )
        }
        Command::ReadByGlobalId { guid, .. } => {
            check_id("ReadByGlobalId", "GUID", guid, &table)?;
            (
                format!(
                    "SELECT `XML` FROM {table} WHERE `Uid` = {uid} AND `GUID` = {}",
                    dialect.literal(guid)
                ),
                ResultShape::Document,
            )
        }
        Command::ReadByLocalId { luid, .. } => {
            check_id("ReadByLocalId", "LUID", luid, &table)?;
            (
                format!(
                    "SELECT `XML` FROM {table} WHERE `Uid` = {uid} AND `LUID` = {}",
                    dialect.literal(luid)
                ),
                ResultShape::Document,
            )
        }
        Command::ListGroups { .. } => (
            format!(
                "SELECT `GUID`, `Type` FROM {table} WHERE `Uid` = {uid} AND `Type` = {}",
                dialect.literal(kind::GROUP)
            ),
            ResultShape::Pairs,
        ),
        Command::ListChildren { group, .. } => (
            format!(
                "SELECT `GUID`, `Type` FROM {table} WHERE `Uid` = {uid} AND `Group` = {}",
                dialect.literal(group)
            ),
            ResultShape::Pairs,
        ),
        Command::ListUnsynced { group, .. } => (
            format!(
                "SELECT `GUID`, `Type` FROM {table} WHERE `Uid` = {uid} AND `SyncStat` <> {} AND `Group` = {}",
                dialect.literal(sync::OK),
                dialect.literal(group)
            ),
            ResultShape::Pairs,
        ),
    };

    let lock = cmd.is_write().then(|| physical.to_string());
    Ok(Plan { sql, shape, lock })
}

/// Typed validation for write payloads.
///
/// A missing global id cannot address a row and is rejected. A body that
/// does not open with the document root marker is stored anyway - one
/// malformed field never drops the whole operation - but leaves a
/// diagnostic behind.
fn check_record(op: &str, record: &Record, table: &str) -> Result<()> {
    check_id(op, "GUID", &record.guid, table)?;
    if !Document::is_document(record.body.as_str()) {
        warn!(
            op = %op,
            table = %table,
            guid = %record.guid,
            "record body does not start with the document root marker"
        );
    }
    Ok(())
}

/// An id used in a query predicate must be present.
fn check_id(op: &str, field: &str, value: &str, table: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidInput {
            reason: format!("{op}: field \"{field}\" in \"{table}\" is empty"),
        });
    }
    Ok(())
}

/// Render the insert for a full record.
///
/// MySQL keeps the assignment-style `INSERT ... SET`; dialects without it
/// get an equivalent column-list insert. Column order matches across both.
fn insert_sql(dialect: Dialect, table: &str, uid: u64, r: &Record) -> String {
    if dialect.assignment_insert() {
        format!(
            "INSERT {table} SET `Uid` = {uid}, `GUID` = {}, `LUID` = {}, `Group` = {}, \
             `Type` = {}, `SyncStat` = {}, `XML` = {}",
            dialect.literal(&r.guid),
            dialect.literal(&r.luid),
            dialect.literal(&r.group),
            dialect.literal(&r.kind),
            dialect.literal(&r.sync_stat),
            dialect.literal(r.body.as_str()),
        )
    } else {
        format!(
            "INSERT INTO {table} (`Uid`, `GUID`, `LUID`, `Group`, `Type`, `SyncStat`, `XML`) \
             VALUES ({uid}, {}, {}, {}, {}, {}, {})",
            dialect.literal(&r.guid),
            dialect.literal(&r.luid),
            dialect.literal(&r.group),
            dialect.literal(&r.kind),
            dialect.literal(&r.sync_stat),
            dialect.literal(r.body.as_str()),
        )
    }
}

/// Render the in-place update for a full record, keyed on (uid, guid).
fn update_sql(dialect: Dialect, table: &str, uid: u64, r: &Record) -> String {
    format!(
        "UPDATE {table} SET `LUID` = {}, `Type` = {}, `SyncStat` = {}, `Group` = {}, `XML` = {} \
         WHERE `Uid` = {uid} AND `GUID` = {}",
        dialect.literal(&r.luid),
        dialect.literal(&r.kind),
        dialect.literal(&r.sync_stat),
        dialect.literal(&r.group),
        dialect.literal(r.body.as_str()),
        dialect.literal(&r.guid),
    )
}
