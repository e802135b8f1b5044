//! Schema-script parsing and table provisioning/teardown.

use std::io::Write;

use syncstore_core::{CallerIdentity, Document, Record};
use syncstore_engine::{BackendKind, StoreConfig, TableId};

use super::SCHEMA;
use crate::{load_script, parse_script, Error, Provisioner, Store};

fn bare_store() -> Store {
    let config = StoreConfig {
        backend: BackendKind::Sqlite,
        database: ":memory:".into(),
        ..StoreConfig::default()
    };
    Store::open(&config).unwrap()
}

#[test]
fn parse_script_strips_comments_and_splits_statements() {
    let text = "-- header comment\nCREATE TABLE a (x TEXT);\n\n-- another\nDROP TABLE a;\n";
    let statements = parse_script(text);
    assert_eq!(statements, vec!["CREATE TABLE a (x TEXT)", "DROP TABLE a"]);
}

#[test]
fn parse_script_joins_multiline_statements() {
    let text = "CREATE TABLE a (\n  x TEXT,\n  y TEXT\n);\n";
    let statements = parse_script(text);
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0], "CREATE TABLE a ( x TEXT, y TEXT )");
}

#[test]
fn bundled_schema_parses_into_paired_statements() {
    let statements = parse_script(SCHEMA);
    // One DROP and one CREATE per record table.
    assert_eq!(statements.len(), 10);
    assert!(statements.iter().all(|s| s.contains("{prefix}")));
}

#[test]
fn load_script_reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "-- comment\nCREATE TABLE b (x TEXT);\n").unwrap();

    let statements = load_script(file.path()).unwrap();
    assert_eq!(statements, vec!["CREATE TABLE b (x TEXT)"]);
}

#[test]
fn load_script_missing_file_is_a_script_error() {
    let err = load_script(std::path::Path::new("/nonexistent/tables.sql")).unwrap_err();
    assert!(matches!(err, Error::Script { .. }));
}

#[test]
fn create_tables_substitutes_the_prefix() {
    let mut store = bare_store();
    Provisioner::new(&mut store)
        .create_tables(&parse_script(SCHEMA))
        .unwrap();

    for table in TableId::ALL {
        let rows = store
            .run_raw(&format!("SELECT `GUID` FROM `sync_{}`", table.suffix()))
            .expect("provisioned table should exist");
        assert!(rows.is_empty());
    }
}

#[test]
fn provisioned_store_accepts_operations() {
    let mut store = bare_store();
    Provisioner::new(&mut store)
        .create_tables(&parse_script(SCHEMA))
        .unwrap();

    let caller = CallerIdentity::User(1);
    store
        .add(&caller, TableId::Contact, Record::new("abc", Document::new("<r/>")))
        .unwrap();
}

#[test]
fn drop_tables_runs_only_drop_statements() {
    let mut store = bare_store();
    let statements = parse_script(SCHEMA);

    let mut provisioner = Provisioner::new(&mut store);
    provisioner.create_tables(&statements).unwrap();
    provisioner.drop_tables(&statements).unwrap();

    // Tables are gone again; the CREATE statements were not re-run.
    assert!(store.run_raw("SELECT * FROM `sync_contact`").is_none());
}

#[test]
fn failing_statement_aborts_with_the_statement_text() {
    let mut store = bare_store();
    let statements = vec!["CREATE BROKEN {prefix}".to_string()];

    let err = Provisioner::new(&mut store)
        .create_tables(&statements)
        .unwrap_err();
    match err {
        Error::Provisioning { statement } => assert_eq!(statement, "CREATE BROKEN sync"),
        other => panic!("expected Provisioning, got {:?}", other),
    }
}

#[test]
fn teardown_on_a_bare_database_succeeds() {
    // DROP TABLE IF EXISTS against absent tables is a clean no-op.
    let mut store = bare_store();
    Provisioner::new(&mut store)
        .drop_tables(&parse_script(SCHEMA))
        .unwrap();
}
