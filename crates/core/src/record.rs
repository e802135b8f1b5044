//! The typed unit of storage.
//!
//! A record is a tuple of (owner uid, global id, local id, parent group,
//! type tag, sync status, document body). The owner uid is not part of the
//! struct - it comes from the resolved [`Scope`](crate::Scope) at
//! translation time. All other columns are projections of fields the caller
//! controls; the body is the canonical representation.

use serde::{Deserialize, Serialize};

use crate::document::Document;

/// Type-tag values stored in the `Type` column.
pub mod kind {
    /// A record acting as a container for other records.
    pub const GROUP: &str = "1";
    /// A plain data record.
    pub const ITEM: &str = "2";
}

/// Sync-status tags stored in the `SyncStat` column.
///
/// Only [`OK`](sync::OK) is load-bearing: the unsynced listing selects
/// records whose status differs from it. The remaining tags are the
/// conventional pending-change markers callers store.
pub mod sync {
    /// Last synchronization completed cleanly.
    pub const OK: &str = "0";
    /// Record added since the last synchronization.
    pub const ADD: &str = "1";
    /// Record changed since the last synchronization.
    pub const UPDATE: &str = "2";
    /// Record deleted since the last synchronization.
    pub const DELETE: &str = "3";
}

/// The unit of storage.
///
/// Invariant: (owner uid, `guid`) is unique per logical table; the schema
/// enforces it with a composite primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Caller-visible, backend-independent record identifier.
    pub guid: String,
    /// Backend- or session-scoped alternate identifier.
    pub luid: String,
    /// Global id of the parent group; empty for the base group.
    pub group: String,
    /// Type tag (see [`kind`]).
    pub kind: String,
    /// Sync-status tag (see [`sync`]).
    pub sync_stat: String,
    /// Canonical serialized content.
    pub body: Document,
}

impl Record {
    /// A plain item in the base group with a pending-add status.
    pub fn new(guid: impl Into<String>, body: Document) -> Self {
        Self {
            guid: guid.into(),
            luid: String::new(),
            group: String::new(),
            kind: kind::ITEM.into(),
            sync_stat: sync::ADD.into(),
            body,
        }
    }

    /// Set the local id.
    pub fn with_luid(mut self, luid: impl Into<String>) -> Self {
        self.luid = luid.into();
        self
    }

    /// Set the parent group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Set the type tag.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the sync-status tag.
    pub fn with_sync_stat(mut self, sync_stat: impl Into<String>) -> Self {
        self.sync_stat = sync_stat.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_defaults() {
        let rec = Record::new("abc", Document::new("<root/>"));
        assert_eq!(rec.guid, "abc");
        assert_eq!(rec.kind, kind::ITEM);
        assert_eq!(rec.sync_stat, sync::ADD);
        assert!(rec.luid.is_empty());
        assert!(rec.group.is_empty());
    }

    #[test]
    fn builder_chain() {
        let rec = Record::new("g", Document::new("<root/>"))
            .with_luid("l")
            .with_group("parent")
            .with_kind(kind::GROUP)
            .with_sync_stat(sync::OK);
        assert_eq!(rec.luid, "l");
        assert_eq!(rec.group, "parent");
        assert_eq!(rec.kind, kind::GROUP);
        assert_eq!(rec.sync_stat, sync::OK);
    }
}
