//! # folio-store: Entity Store Layer for the Folio Back-Office
//!
//! In-memory stores for authors, books, customers and orders, plus the JSON
//! snapshot files that make them durable.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Folio Data Flow                                  │
//! │                                                                         │
//! │  Backoffice::create_order (folio-service)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   folio-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Catalog     │    │ EntityStore<T>│    │ JsonDirectory│  │   │
//! │  │   │ (catalog.rs)  │    │  (memory.rs)  │    │(persistence) │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ authors       │───►│ RwLock<Map>   │    │ books.json   │  │   │
//! │  │   │ books         │    │ next_id       │    │ orders.json  │  │   │
//! │  │   │ customers     │    │ CRUD + search │    │ ...          │  │   │
//! │  │   │ orders        │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`memory`] - `EntityStore<T>` and the four per-kind aliases
//! - [`entity`] - Per-kind create/update hooks
//! - [`catalog`] - The four stores together, plus startup replay
//! - [`persistence`] - Snapshot sink and report archive
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_store::{Catalog, JsonDirectory};
//!
//! let dir = JsonDirectory::open("/var/lib/folio")?;
//! let (catalog, summary) = Catalog::load_from(&dir)?;
//! let books = catalog.books.get_all();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod entity;
pub mod error;
pub mod memory;
pub mod persistence;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::{Catalog, LoadSummary};
pub use entity::Entity;
pub use error::{StoreError, StoreResult};
pub use memory::{AuthorStore, BookStore, CustomerStore, EntityStore, OrderStore};
pub use persistence::{JsonDirectory, MemoryArchive, NullSink, ReportArchive, SnapshotSink};
