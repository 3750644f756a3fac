//! # Error Types
//!
//! Domain-specific error types for folio-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  folio-core errors (this file)                                         │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  folio-store errors (separate crate)                                   │
//! │  └── StoreError       - NotFound / Conflict / persistence              │
//! │                                                                         │
//! │  folio-service errors                                                  │
//! │  └── ServiceError     - What callers see (classified by ErrorKind)     │
//! │                                                                         │
//! │  Flow: ValidationError → StoreError → ServiceError → caller            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations that are not tied to a single input field.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested quantity exceeds what is on the shelf.
    ///
    /// ## When This Occurs
    /// - An order line asks for more copies than the book's current stock
    /// - The book's stock is zero
    #[error("Insufficient stock for book {book_id}: available {available}, requested {requested}")]
    InsufficientStock {
        book_id: u64,
        available: i64,
        requested: i64,
    },

    /// A stock adjustment would leave the book below zero.
    #[error("Stock for book {book_id} would become negative ({resulting})")]
    NegativeStock { book_id: u64, resulting: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be at least `min`.
    #[error("{field} must be at least {min}")]
    TooSmall { field: String, min: i64 },

    /// A computed value does not fit in its integer type.
    ///
    /// ## When This Occurs
    /// - An order total exceeds the largest representable amount
    /// - A restock would push a book's stock past `i64::MAX`
    #[error("{field} is too large")]
    Overflow { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// A search range has its lower bound above its upper bound.
    #[error("{field}: minimum {min} is greater than maximum {max}")]
    InvalidRange {
        field: String,
        min: String,
        max: String,
    },

    /// Invalid format (e.g., an email without `@`).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., a customer email already in use).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Every submitted order line was dropped.
    ///
    /// ## When This Occurs
    /// - All referenced books are missing
    /// - All quantities exceed stock or are non-positive
    #[error("No valid books available to {action} the order")]
    NoValidItems { action: String },

    /// Neither the customer id nor the email matched a stored customer.
    #[error("Customer does not exist")]
    CustomerUnresolved,
}

impl ValidationError {
    /// Creates a Required error for `field`.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates a Duplicate error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        ValidationError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            book_id: 7,
            available: 2,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for book 7: available 2, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("email").to_string(), "email is required");

        let err = ValidationError::TooSmall {
            field: "stock".to_string(),
            min: 1,
        };
        assert_eq!(err.to_string(), "stock must be at least 1");

        let err = ValidationError::NoValidItems {
            action: "create".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No valid books available to create the order"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::CustomerUnresolved.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
