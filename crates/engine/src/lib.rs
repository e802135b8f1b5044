//! Execution engine for syncstore
//!
//! This crate owns the single live backend connection and everything wrapped
//! around query execution:
//! - [`Backend`]: the connection abstraction (SQLite by default, MySQL
//!   behind the `mysql` feature), with per-dialect escaping primitives
//! - [`Engine`]: lock/retry/classify/normalize around every execution
//! - [`Plan`] / [`ResultShape`] / [`Fetched`]: the contract between the
//!   command translator and the engine
//! - [`TableId`] / [`TableMap`]: logical tables and their physical names
//! - [`StoreConfig`]: connection and resilience settings
//!
//! The engine never branches on what the caller wanted: the translator
//! declares the result shape up front and the engine normalizes rows to it.

#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod engine;
pub mod plan;
pub mod tables;
pub mod testing;

pub use backend::{Backend, BackendError, Dialect, ErrorKind, QueryResult, RawRow, SqliteBackend};
#[cfg(feature = "mysql")]
pub use backend::MySqlBackend;
pub use config::{BackendKind, ConfigError, StoreConfig, CONFIG_FILE_NAME};
pub use engine::Engine;
pub use plan::{Fetched, Plan, ResultShape};
pub use tables::{TableId, TableMap};

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, BackendError>;
