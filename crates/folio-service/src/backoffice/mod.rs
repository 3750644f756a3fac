//! # Back-Office Policy
//!
//! Cross-entity rules layered above the raw entity stores.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Backoffice Mutation Flow                            │
//! │                                                                         │
//! │  caller ──► Backoffice::create_order(draft)                            │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │           ┌────────────────────┐                                       │
//! │           │ inventory lock     │  one writer across ALL stores         │
//! │           └─────────┬──────────┘                                       │
//! │                     ▼                                                   │
//! │           plan on simulated stock ──► reject? return, nothing touched  │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │           apply net stock deltas ──► write order                       │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │           SnapshotSink::save_books / save_orders                       │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │           release lock, return OrderOutcome                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads (`get_*`, `list_*`, `search_*`) go straight to the stores and never
//! take the inventory lock.

mod author;
mod book;
mod customer;
mod order;

pub use author::AuthorRemoval;
pub use order::{OrderOutcome, RejectReason, RejectedItem};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::error;

use folio_store::{Catalog, SnapshotSink, StoreResult};

use crate::error::ServiceResult;

// =============================================================================
// Backoffice
// =============================================================================

/// Entry point for every back-office mutation.
///
/// Cloning shares the catalog, the sink and the inventory lock.
#[derive(Clone)]
pub struct Backoffice {
    catalog: Catalog,
    sink: Arc<dyn SnapshotSink>,
    // Serializes every mutation across the four stores, including the
    // snapshot write that follows it.
    inventory: Arc<Mutex<()>>,
}

impl std::fmt::Debug for Backoffice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backoffice")
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl Backoffice {
    pub fn new(catalog: Catalog, sink: Arc<dyn SnapshotSink>) -> Self {
        Backoffice {
            catalog,
            sink,
            inventory: Arc::new(Mutex::new(())),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // Every guarded section either completes its store writes or returns
    // before the first one, so a poisoned lock carries no torn state.
    fn lock_inventory(&self) -> MutexGuard<'_, ()> {
        self.inventory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Snapshot Helpers
    // =========================================================================

    fn persist_authors(&self) -> ServiceResult<()> {
        log_failure("authors", self.sink.save_authors(&self.catalog.authors.get_all()))
    }

    fn persist_books(&self) -> ServiceResult<()> {
        log_failure("books", self.sink.save_books(&self.catalog.books.get_all()))
    }

    fn persist_customers(&self) -> ServiceResult<()> {
        log_failure(
            "customers",
            self.sink.save_customers(&self.catalog.customers.get_all()),
        )
    }

    fn persist_orders(&self) -> ServiceResult<()> {
        log_failure("orders", self.sink.save_orders(&self.catalog.orders.get_all()))
    }
}

// The in-memory change is already committed when a snapshot write fails;
// the caller still gets the error.
fn log_failure(what: &str, result: StoreResult<()>) -> ServiceResult<()> {
    if let Err(ref e) = result {
        error!(snapshot = what, error = %e, "Failed to persist snapshot");
    }
    Ok(result?)
}

// =============================================================================
// Test Fixtures
// =============================================================================
