//! Core types for syncstore
//!
//! This crate defines the foundational types used throughout the system:
//! - Record: the typed unit of storage (ids, grouping, type tag, sync status, body)
//! - Document: serialized document body with root-marker detection
//! - CallerIdentity / Scope: who an operation runs for, and its resolved form
//! - Type-tag and sync-status constants shared by the translator and callers

#![warn(missing_docs)]

pub mod document;
pub mod identity;
pub mod record;

// Re-export commonly used types
pub use document::{Document, DocumentError, ROOT_MARKER};
pub use identity::{CallerIdentity, Scope, SYSTEM_UID};
pub use record::{kind, sync, Record};
