//! # folio-core: Pure Domain Logic for the Folio Back-Office
//!
//! This crate holds the bookstore domain model with zero I/O dependencies:
//! entity types, money, validation rules and search predicates.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Folio Back-Office Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  folio-daemon (apps/daemon)                     │   │
//! │  │        config, logging, report scheduler, shutdown              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              folio-service (policy + reports)                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              folio-store (EntityStore<T> × 4)                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ folio-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  search   │  │ validation│  │   │
//! │  │   │  Book     │  │   Money   │  │ Criteria  │  │   rules   │  │   │
//! │  │   │  Order    │  │           │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Author, Book, Customer, Order, SalesReport
//! - [`money`] - Integer-cent money
//! - [`search`] - Optional-field search criteria per entity
//! - [`validation`] - Field rules (stock, required fields, ranges)
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use folio_core::search::{BookCriteria, Criteria};
//! use folio_core::Money;
//!
//! let criteria = BookCriteria {
//!     genres: vec!["sf".to_string()],
//!     min_price: Some(Money::from_cents(500)),
//!     ..Default::default()
//! };
//! assert!(criteria.validate().is_ok());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod search;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use search::Criteria;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of books kept in a sales report's top-seller list.
pub const TOP_SELLERS_LIMIT: usize = 5;

/// Length of a sales report window, in hours.
pub const REPORT_WINDOW_HOURS: i64 = 24;
