//! Test modules for the executor crate.

mod provisioning;
mod resilience;
mod serialization;

use syncstore_engine::{BackendKind, StoreConfig};

use crate::{parse_script, Provisioner, Store};

/// The workspace schema script, compiled into the tests.
pub(crate) const SCHEMA: &str = include_str!("../../../../assets/tables.sql");

/// Create an isolated in-memory store with all record tables provisioned.
pub(crate) fn open_store() -> Store {
    let config = StoreConfig {
        backend: BackendKind::Sqlite,
        database: ":memory:".into(),
        ..StoreConfig::default()
    };
    let mut store = Store::open(&config).expect("open in-memory store");
    let statements = parse_script(SCHEMA);
    Provisioner::new(&mut store)
        .create_tables(&statements)
        .expect("provision record tables");
    store
}
