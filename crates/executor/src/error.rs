//! Error types for command execution.
//!
//! All errors from the store surface are represented by the [`Error`] enum.
//! They are:
//! - **Structured**: each variant has typed fields for error details
//! - **Serializable**: can be converted to/from JSON
//! - **Shape-stable**: the engine never panics past its boundary; every
//!   failure path arrives here as a typed value

use serde::{Deserialize, Serialize};

use syncstore_engine::BackendError;

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Store execution errors.
///
/// # Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Validation | `InvalidInput` | Bad operation payload |
/// | Identity | `IdentityUnresolved` | No uid for the caller; fails closed |
/// | Read | `MalformedDocument` | Stored body failed deserialization |
/// | Backend | `Backend` | Terminal query failure (after retries) |
/// | Provisioning | `Script`, `Provisioning` | Schema script problems |
/// | System | `Internal` | Bug or invariant violation |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Validation ====================
    /// The operation payload fails typed validation.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the payload.
        reason: String,
    },

    // ==================== Identity ====================
    /// The caller identity could not be resolved; no query was issued.
    #[error("user id for user ({user}) not set")]
    IdentityUnresolved {
        /// Display handle of the unresolved caller.
        user: String,
    },

    // ==================== Read ====================
    /// A stored document failed deserialization on read.
    #[error("invalid document data in record '{guid}' in {table} data store for user ({uid})")]
    MalformedDocument {
        /// Logical table the record lives in.
        table: String,
        /// Owner uid.
        uid: u64,
        /// Offending record id.
        guid: String,
    },

    // ==================== Backend ====================
    /// Terminal backend failure, after any transient retries.
    #[error("backend error [{code}]: {message}")]
    Backend {
        /// Driver-native error code (0 when unknown).
        code: i32,
        /// Driver error text.
        message: String,
    },

    // ==================== Provisioning ====================
    /// A schema script could not be loaded.
    #[error("error loading schema script '{path}': {reason}")]
    Script {
        /// Offending path.
        path: String,
        /// Underlying error text.
        reason: String,
    },

    /// A schema statement failed to execute.
    #[error("error executing schema statement: {statement}")]
    Provisioning {
        /// The statement that failed (after substitution).
        statement: String,
    },

    // ==================== System ====================
    /// Internal error (bug or invariant violation).
    #[error("internal error: {reason}")]
    Internal {
        /// What went wrong.
        reason: String,
    },
}

impl From<BackendError> for Error {
    fn from(e: BackendError) -> Self {
        Error::Backend {
            code: e.code,
            message: e.message,
        }
    }
}
