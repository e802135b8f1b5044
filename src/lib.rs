//! syncstore - record-store adapter over a single relational connection.
//!
//! syncstore translates a small set of abstract record operations (add,
//! update, delete, reads by global or local id, group listings) into
//! concrete queries against one relational backend and normalizes the
//! results into a backend-neutral shape.
//!
//! # Quick Start
//!
//! ```ignore
//! use syncstore::{CallerIdentity, Document, Record, Store, StoreConfig, TableId};
//!
//! let mut store = Store::open(&StoreConfig::default())?;
//! let caller = CallerIdentity::User(11);
//!
//! let record = Record::new("abc", Document::new("<contact/>"));
//! store.add(&caller, TableId::Contact, record)?;
//!
//! let body = store.read_by_guid(&caller, TableId::Contact, "abc")?;
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Store`] facade: a stateless translator
//! builds the query text and declares the expected result shape, and the
//! execution engine runs it with write locking, transient-failure retry and
//! row normalization. Internal implementation details (backends, plans,
//! retry machinery) live in the member crates - only the executor API is
//! re-exported here.

// Re-export the public API from syncstore-executor
pub use syncstore_executor::*;
