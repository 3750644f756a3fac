//! # Store Error Types
//!
//! Error types for entity store and snapshot operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError / CoreError (folio-core)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds entity/id context                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError (folio-service) ← Classified for callers                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use folio_core::{CoreError, EntityId, ValidationError};
use thiserror::Error;

/// Entity store and persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found in its store.
    ///
    /// ## When This Occurs
    /// - `get`, `update` or `delete` with an id that was never assigned
    /// - The entity was deleted earlier
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: EntityId },

    /// Entity failed a field rule on create.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A domain rule refused an in-place modification.
    ///
    /// ## When This Occurs
    /// - A stock adjustment would leave a book below zero
    #[error("{0}")]
    Rule(CoreError),

    /// Operation blocked by a referencing entity.
    ///
    /// ## When This Occurs
    /// - Deleting a book that an order line still references
    /// - Deleting a customer that still has orders
    #[error("{entity} {id} cannot be deleted: {reason}")]
    Conflict {
        entity: String,
        id: EntityId,
        reason: String,
    },

    /// A snapshot file exists but does not parse.
    ///
    /// ## When This Occurs
    /// - Hand-edited JSON with a syntax error
    /// - A file written by an incompatible version
    #[error("Snapshot {path} is unreadable: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// File system failure while reading or writing snapshots.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding a snapshot failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Creates a NotFound error for a given entity kind and id.
    pub fn not_found(entity: impl Into<String>, id: EntityId) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id,
        }
    }

    /// Creates a Conflict error.
    pub fn conflict(entity: impl Into<String>, id: EntityId, reason: impl Into<String>) -> Self {
        StoreError::Conflict {
            entity: entity.into(),
            id,
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Flattens wrapped validation errors so callers match a single variant.
impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => StoreError::Validation(v),
            other => StoreError::Rule(other),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
