//! Resilience behavior: transient retry, missing tables, raw passthrough.

use std::time::Duration;

use syncstore_core::{CallerIdentity, Document, Record};
use syncstore_engine::testing::{FailureTrigger, FlakyBackend};
use syncstore_engine::{Engine, SqliteBackend, TableId, TableMap};

use super::SCHEMA;
use crate::{parse_script, Error, Provisioner, Store};

const CALLER: CallerIdentity = CallerIdentity::User(11);

/// A provisioned store over a failure-injectable backend with the given
/// retry budget (backoff shortened for tests).
fn flaky_store(retry_budget: u32) -> (Store, FailureTrigger) {
    let backend = SqliteBackend::open(":memory:").expect("open in-memory backend");
    let (flaky, trigger) = FlakyBackend::new(backend);
    let engine = Engine::with_backend(
        Box::new(flaky),
        TableMap::new("sync"),
        retry_budget,
        Duration::from_millis(1),
    );
    let mut store = Store::with_engine(engine, None);
    Provisioner::new(&mut store)
        .create_tables(&parse_script(SCHEMA))
        .expect("provision record tables");
    (store, trigger)
}

#[test]
fn transient_loss_within_budget_is_invisible_to_the_caller() {
    let (mut store, trigger) = flaky_store(3);
    store
        .add(&CALLER, TableId::Contact, Record::new("abc", Document::new("<r/>")))
        .unwrap();

    trigger.fail_next(2);
    let doc = store
        .read_by_guid(&CALLER, TableId::Contact, "abc")
        .unwrap()
        .expect("retry should recover the read");
    assert_eq!(doc.as_str(), "<r/>");
}

#[test]
fn transient_loss_beyond_budget_fails_the_call() {
    let (mut store, trigger) = flaky_store(2);

    trigger.fail_next(10);
    let err = store
        .read_by_guid(&CALLER, TableId::Contact, "abc")
        .unwrap_err();
    assert!(matches!(err, Error::Backend { .. }));

    // A later call against the recovered backend succeeds again.
    trigger.fail_next(0);
    assert!(store
        .read_by_guid(&CALLER, TableId::Contact, "abc")
        .unwrap()
        .is_none());
}

#[test]
fn write_retries_keep_the_lock_bracket_intact() {
    let (mut store, trigger) = flaky_store(3);

    trigger.fail_next(1);
    let id = store
        .add(&CALLER, TableId::Contact, Record::new("w", Document::new("<w/>")))
        .unwrap();
    assert_eq!(id, "w");

    // The bracket released cleanly: further writes proceed.
    assert!(store.delete(&CALLER, TableId::Contact, "w").unwrap());
}

#[test]
fn raw_query_against_missing_table_is_a_neutral_miss() {
    let (mut store, _trigger) = flaky_store(3);
    assert!(store.run_raw("SELECT * FROM `sync_missing`").is_none());
}

#[test]
fn shaped_read_against_missing_table_is_a_failure() {
    let (mut store, _trigger) = flaky_store(3);
    store.run_raw("DROP TABLE `sync_contact`").unwrap();

    let err = store
        .read_by_guid(&CALLER, TableId::Contact, "abc")
        .unwrap_err();
    assert!(matches!(err, Error::Backend { .. }));
}

#[test]
fn raw_passthrough_returns_associative_rows() {
    let (mut store, _trigger) = flaky_store(3);
    store
        .run_raw("INSERT INTO `sync_contact` (`Uid`, `GUID`, `XML`) VALUES (1, 'a', '<x/>')")
        .unwrap();

    let rows = store
        .run_raw("SELECT `GUID`, `SyncStat` FROM `sync_contact`")
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("GUID"), Some(&Some("a".to_string())));
    assert_eq!(rows[0].get("SyncStat"), Some(&Some("".to_string())));
}
