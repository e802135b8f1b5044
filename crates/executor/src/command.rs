//! Command enum defining the store's operations.
//!
//! Commands are the instruction set of the adapter. They are:
//! - **Self-contained**: all parameters needed for translation are in the
//!   variant (the caller identity travels separately, as execution context)
//! - **Serializable**: can be converted to/from JSON for cross-language use
//! - **Typed**: no generic payload, every operation has explicit fields

use serde::{Deserialize, Serialize};

use syncstore_core::Record;
use syncstore_engine::TableId;

/// A self-contained, serializable store operation.
///
/// Every variant names the logical table it targets; the caller identity is
/// supplied at execution time. Each variant maps to exactly one
/// [`Outcome`](crate::Outcome) variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    /// Add a record.
    /// Returns: `Outcome::Id` (the stored global id, also on a duplicate).
    Add {
        /// Target logical table.
        table: TableId,
        /// Record to store.
        record: Record,
    },

    /// Update a record in place, keyed on its global id.
    /// Returns: `Outcome::Done`.
    Update {
        /// Target logical table.
        table: TableId,
        /// Replacement field values; `record.guid` selects the row.
        record: Record,
    },

    /// Delete one record by global id.
    /// Returns: `Outcome::Done` (`false` when nothing matched).
    Delete {
        /// Target logical table.
        table: TableId,
        /// Global id of the record to remove.
        guid: String,
    },

    /// Read one record's document by global id.
    /// Returns: `Outcome::Document` (`None` when not found).
    ReadByGlobalId {
        /// Target logical table.
        table: TableId,
        /// Global id to look up.
        guid: String,
    },

    /// Read one record's document by local id.
    /// Returns: `Outcome::Document` (`None` when not found).
    ReadByLocalId {
        /// Target logical table.
        table: TableId,
        /// Local id to look up.
        luid: String,
    },

    /// List all group records.
    /// Returns: `Outcome::Listing`.
    ListGroups {
        /// Target logical table.
        table: TableId,
    },

    /// List the records inside a group (empty id = base group).
    /// Returns: `Outcome::Listing`.
    ListChildren {
        /// Target logical table.
        table: TableId,
        /// Global id of the parent group.
        group: String,
    },

    /// List the records inside a group whose last synchronization did not
    /// complete cleanly.
    /// Returns: `Outcome::Listing`.
    ListUnsynced {
        /// Target logical table.
        table: TableId,
        /// Global id of the parent group.
        group: String,
    },
}

impl Command {
    /// Returns `true` if this command mutates the table.
    ///
    /// Mutating commands run inside the table-level write bracket.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Command::Add { .. } | Command::Update { .. } | Command::Delete { .. }
        )
    }

    /// The logical table this command targets.
    pub fn table(&self) -> TableId {
        match self {
            Command::Add { table, .. }
            | Command::Update { table, .. }
            | Command::Delete { table, .. }
            | Command::ReadByGlobalId { table, .. }
            | Command::ReadByLocalId { table, .. }
            | Command::ListGroups { table }
            | Command::ListChildren { table, .. }
            | Command::ListUnsynced { table, .. } => *table,
        }
    }

    /// Returns the variant name as a static string.
    ///
    /// The exhaustive match ensures the compiler flags any new `Command`
    /// variant that is added without a corresponding name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add { .. } => "Add",
            Command::Update { .. } => "Update",
            Command::Delete { .. } => "Delete",
            Command::ReadByGlobalId { .. } => "ReadByGlobalId",
            Command::ReadByLocalId { .. } => "ReadByLocalId",
            Command::ListGroups { .. } => "ListGroups",
            Command::ListChildren { .. } => "ListChildren",
            Command::ListUnsynced { .. } => "ListUnsynced",
        }
    }
}
