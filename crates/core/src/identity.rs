//! Caller identity and query scope.
//!
//! Every scoped operation is qualified by the identity it runs for; the
//! identity becomes part of each query predicate, so cross-identity access
//! is structurally impossible. Operations outside any user scope run as
//! [`CallerIdentity::System`] with a fixed literal uid.

use serde::{Deserialize, Serialize};

/// Fixed literal uid used for system-scoped operations.
pub const SYSTEM_UID: u64 = 0;

/// The identity an operation is invoked under.
///
/// `Unresolved` models a session whose numeric id could not be looked up;
/// the translator refuses to build queries for it (fail closed) unless the
/// configuration supplies a diagnostic fallback identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallerIdentity {
    /// Operations outside any user scope.
    System,
    /// A resolved numeric user identity.
    User(u64),
    /// A session without a resolved numeric id; `user` is the display
    /// handle used in diagnostics.
    Unresolved {
        /// Display handle for log messages.
        user: String,
    },
}

/// A fully resolved query scope.
///
/// Existence of a `Scope` means identity resolution already succeeded;
/// every query predicate and assignment carries its uid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    uid: u64,
}

impl Scope {
    /// The system scope.
    pub fn system() -> Self {
        Self { uid: SYSTEM_UID }
    }

    /// A user scope.
    pub fn user(uid: u64) -> Self {
        Self { uid }
    }

    /// The uid embedded into query predicates.
    pub fn uid(&self) -> u64 {
        self.uid
    }
}
