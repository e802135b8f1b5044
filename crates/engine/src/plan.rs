//! The contract between the command translator and the engine.
//!
//! A translated command arrives as a [`Plan`]: final query text, the result
//! shape the caller expects, and the table to write-lock if the operation
//! mutates. Execution returns a [`Fetched`] value already normalized to the
//! declared shape, so nothing downstream re-inspects raw rows.

use serde::{Deserialize, Serialize};

use crate::backend::RawRow;

/// Result shape a translated command declares up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultShape {
    /// Mutating statement; the outcome is the affected-row count.
    Written,
    /// Single serialized document, or nothing.
    Document,
    /// Ordered (global id, type tag) pairs flattened from two-column rows.
    Pairs,
    /// Associative passthrough rows.
    Raw,
}

/// A ready-to-execute query plus everything the engine needs to run it.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Final query text; every embedded value is already escaped.
    pub sql: String,
    /// Shape the result rows are normalized into.
    pub shape: ResultShape,
    /// Physical table to write-lock for the duration (mutating operations
    /// only).
    pub lock: Option<String>,
}

/// Normalized execution result, matching the plan's declared shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// A mutating statement completed.
    Written {
        /// Rows the backend reports as affected.
        affected: u64,
        /// Conflicting id recovered from a duplicate-key condition, when
        /// the backend exposed one.
        recovered_guid: Option<String>,
    },
    /// A single-document read; `None` means not found.
    Document(Option<String>),
    /// An ordered listing of (global id, type tag) pairs.
    Pairs(Vec<(String, String)>),
    /// Associative passthrough rows.
    Rows(Vec<RawRow>),
}
