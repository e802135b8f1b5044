//! # syncstore executor
//!
//! The public API for syncstore - a record-store adapter over a single
//! relational connection. This is the only crate embedding applications
//! need to import. It provides:
//! - [`Store`] - the translator-and-engine facade
//! - [`Command`]/[`Outcome`] - the serializable operation surface
//! - schema provisioning helpers ([`Provisioner`], [`load_script`])
//!
//! ## Quick Start
//!
//! ```ignore
//! use syncstore_executor::{CallerIdentity, Document, Record, Store, StoreConfig, TableId};
//!
//! let mut store = Store::open(&StoreConfig::default())?;
//! let caller = CallerIdentity::User(11);
//!
//! store.add(&caller, TableId::Contact, Record::new("abc", Document::new("<contact/>")))?;
//! let body = store.read_by_guid(&caller, TableId::Contact, "abc")?;
//! ```
//!
//! ## Operations
//!
//! | Operation | Result |
//! |-----------|--------|
//! | **Add** | stored global id |
//! | **Update** / **Delete** | success flag |
//! | **ReadByGlobalId** / **ReadByLocalId** | document or not-found |
//! | **ListGroups** / **ListChildren** / **ListUnsynced** | ordered id/type listing |
//!
//! Every scoped operation is qualified by a [`CallerIdentity`]; the
//! identity is part of each query predicate, so one caller can never see
//! another's records.

#![warn(missing_docs)]

mod admin;
mod command;
mod error;
mod executor;
mod outcome;
mod translator;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use admin::{load_script, parse_script, Provisioner};
pub use command::Command;
pub use error::{Error, Result};
pub use executor::Store;
pub use outcome::Outcome;

// Re-export the supporting types so users don't need the member crates
pub use syncstore_core::{
    kind, sync, CallerIdentity, Document, DocumentError, Record, Scope, ROOT_MARKER, SYSTEM_UID,
};
pub use syncstore_engine::{
    BackendKind, Dialect, Engine, RawRow, StoreConfig, TableId, TableMap, CONFIG_FILE_NAME,
};
