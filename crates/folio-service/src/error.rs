//! # Service Error Types
//!
//! What callers of the back-office see when an operation fails.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     ServiceError → ErrorKind                            │
//! │                                                                         │
//! │  ServiceError variant            ErrorKind     status                  │
//! │  ─────────────────────           ─────────     ──────                  │
//! │  Store(NotFound)                 NotFound      404                     │
//! │  Store(Validation), Validation   Validation    400                     │
//! │  Store(Rule)                     Validation    400                     │
//! │  Store(Conflict)                 Conflict      409                     │
//! │  Canceled                        Canceled      499                     │
//! │  Store(Io/Corrupt/...),          Internal      500                     │
//! │  InvalidConfig, Config*, ...                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use folio_core::{CoreError, ValidationError};
use folio_store::StoreError;
use thiserror::Error;

/// Result type alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error type covering every back-office failure.
#[derive(Debug, Error)]
pub enum ServiceError {
    // =========================================================================
    // Store & Policy Errors
    // =========================================================================
    /// An entity store or the snapshot directory refused the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Input rejected by a policy rule.
    ///
    /// ## When This Occurs
    /// - Every line of an order was dropped
    /// - The order's customer cannot be resolved
    /// - A customer email is already taken
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Report Errors
    // =========================================================================
    /// A report run was cancelled before it could be persisted.
    #[error("Report generation was canceled")]
    Canceled,

    /// The report scheduler is no longer running.
    #[error("Report scheduler is shutting down")]
    ShuttingDown,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Internal error (e.g. a panicked background task).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Stable failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Canceled,
    Internal,
}

impl ErrorKind {
    /// HTTP-style status code for this kind. 499 is "client closed request".
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Validation => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::Canceled => 499,
            ErrorKind::Internal => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Conflict => write!(f, "conflict"),
            ErrorKind::Canceled => write!(f, "canceled"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}

impl ServiceError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Store(StoreError::NotFound { .. }) => ErrorKind::NotFound,
            ServiceError::Store(StoreError::Validation(_) | StoreError::Rule(_)) => {
                ErrorKind::Validation
            }
            ServiceError::Store(StoreError::Conflict { .. }) => ErrorKind::Conflict,
            ServiceError::Store(_) => ErrorKind::Internal,
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::Canceled => ErrorKind::Canceled,
            ServiceError::ShuttingDown
            | ServiceError::InvalidConfig(_)
            | ServiceError::ConfigLoadFailed(_)
            | ServiceError::ConfigSaveFailed(_)
            | ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, ServiceError::Canceled)
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        ServiceError::Store(err.into())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ServiceError {
    fn from(err: toml::de::Error) -> Self {
        ServiceError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ServiceError {
    fn from(err: toml::ser::Error) -> Self {
        ServiceError::ConfigSaveFailed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}
