//! Logical tables and their physical names.
//!
//! Each logical table maps 1:1 to a physical table named
//! `{prefix}_{suffix}`. The mapping is computed once when the engine opens
//! and is stable for the engine's lifetime.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the parallel record tables, distinguished by data-store kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableId {
    /// Contact records.
    Contact,
    /// Calendar / event records.
    Calendar,
    /// Task records.
    Task,
    /// Note records.
    Note,
    /// System records (outside any user data store).
    System,
}

impl TableId {
    /// Every logical table, in provisioning order.
    pub const ALL: [TableId; 5] = [
        TableId::Contact,
        TableId::Calendar,
        TableId::Task,
        TableId::Note,
        TableId::System,
    ];

    /// Fixed suffix appended to the configured prefix.
    pub fn suffix(&self) -> &'static str {
        match self {
            TableId::Contact => "contact",
            TableId::Calendar => "calendar",
            TableId::Task => "task",
            TableId::Note => "note",
            TableId::System => "system",
        }
    }

    fn index(&self) -> usize {
        match self {
            TableId::Contact => 0,
            TableId::Calendar => 1,
            TableId::Task => 2,
            TableId::Note => 3,
            TableId::System => 4,
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Physical table names, computed once at engine open.
#[derive(Debug, Clone)]
pub struct TableMap {
    prefix: String,
    names: [String; 5],
}

impl TableMap {
    /// Build the physical name for every logical table.
    pub fn new(prefix: &str) -> Self {
        let names = TableId::ALL.map(|id| format!("{}_{}", prefix, id.suffix()));
        Self {
            prefix: prefix.to_string(),
            names,
        }
    }

    /// The configured table-name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Physical (unquoted) name of a logical table.
    pub fn physical(&self, id: TableId) -> &str {
        &self.names[id.index()]
    }
}
