//! Outcome enum for command execution results.
//!
//! Every command produces exactly one outcome variant. The mapping is
//! deterministic: the translator declares the result shape up front and the
//! engine normalizes rows into it, so a given command always yields the
//! same variant (the values depend on store state).

use serde::{Deserialize, Serialize};

use syncstore_core::Document;
use syncstore_engine::RawRow;

/// Successful command execution results.
///
/// | Command | Outcome |
/// |---------|---------|
/// | `Add` | `Id` |
/// | `Update`, `Delete` | `Done` |
/// | `ReadByGlobalId`, `ReadByLocalId` | `Document` |
/// | `ListGroups`, `ListChildren`, `ListUnsynced` | `Listing` |
/// | raw passthrough | `Rows` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// Global id stored by an add. On a duplicate insert this is the
    /// existing id, not an error.
    Id(String),

    /// Update/delete status. Deleting a record that does not exist yields
    /// `Done(false)`.
    Done(bool),

    /// Single document; `None` means not found (distinct from a
    /// connection-level error, which is an `Err`).
    Document(Option<Document>),

    /// Ordered (global id, type tag) pairs, in backend result order.
    Listing(Vec<(String, String)>),

    /// Associative passthrough rows.
    Rows(Vec<RawRow>),
}
