//! # Validation Module
//!
//! Field-level rules applied before an entity reaches a store.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Backoffice service                                           │
//! │  ├── Customer name/email required, email unique                        │
//! │  └── Book stock >= 1 on create and update                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: EntityStore::create                                          │
//! │  └── Book stock >= 1 (the store refuses on its own as well)            │
//! │                                                                         │
//! │  The direct-insert path used at startup skips BOTH layers so that      │
//! │  previously accepted data always loads.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt::Display;

use crate::error::ValidationError;
use crate::types::{Book, Customer};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Smallest stock a book may be created or updated with.
pub const MIN_BOOK_STOCK: i64 = 1;

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a book before create or update.
///
/// ## Rules
/// - Stock must be at least [`MIN_BOOK_STOCK`]
/// - Price must not be negative
///
/// ```rust
/// use folio_core::validation::validate_stock;
///
/// assert!(validate_stock(1).is_ok());
/// assert!(validate_stock(0).is_err());
/// ```
pub fn validate_book(book: &Book) -> ValidationResult<()> {
    validate_stock(book.stock)?;

    if book.price.is_negative() {
        return Err(ValidationError::TooSmall {
            field: "price".to_string(),
            min: 0,
        });
    }

    Ok(())
}

pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < MIN_BOOK_STOCK {
        return Err(ValidationError::TooSmall {
            field: "stock".to_string(),
            min: MIN_BOOK_STOCK,
        });
    }
    Ok(())
}

/// Validates a customer's required fields.
///
/// Uniqueness of the email needs the full customer list and is checked by
/// the service layer.
pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    if customer.name.trim().is_empty() {
        return Err(ValidationError::required("name"));
    }
    if customer.email.trim().is_empty() {
        return Err(ValidationError::required("email"));
    }
    Ok(())
}

/// Validates an order line quantity.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Range Validators
// =============================================================================

/// Checks that a search range is not inverted.
///
/// Either bound may be absent; a range is only rejected when both are
/// present and `min > max`.
pub fn validate_range<T: PartialOrd + Display>(
    field: &str,
    min: Option<&T>,
    max: Option<&T>,
) -> ValidationResult<()> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::InvalidRange {
            field: field.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
