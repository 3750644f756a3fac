//! # Snapshot Persistence
//!
//! Durable copies of the entity stores and the sales report archive.
//!
//! ## File Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Data Directory                                       │
//! │                                                                         │
//! │  <data_dir>/                                                           │
//! │  ├── authors.json         ← full AuthorStore snapshot                  │
//! │  ├── books.json           ← full BookStore snapshot                    │
//! │  ├── customers.json       ← full CustomerStore snapshot                │
//! │  ├── orders.json          ← full OrderStore snapshot                   │
//! │  ├── failed_orders.json   ← orders rejected during startup replay      │
//! │  └── sales_reports.json   ← every report ever generated (append-only   │
//! │                             list, rewritten wholesale on each save)    │
//! │                                                                         │
//! │  WRITE PATH:                                                           │
//! │  serialize ──► <file>.<uuid>.tmp ──► rename over <file>                │
//! │  A reader never observes a half-written file.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use folio_core::{Author, Book, Customer, Order, SalesReport};

use crate::error::{StoreError, StoreResult};

pub const AUTHORS_FILE: &str = "authors.json";
pub const BOOKS_FILE: &str = "books.json";
pub const CUSTOMERS_FILE: &str = "customers.json";
pub const ORDERS_FILE: &str = "orders.json";
pub const FAILED_ORDERS_FILE: &str = "failed_orders.json";
pub const SALES_REPORTS_FILE: &str = "sales_reports.json";

// =============================================================================
// Sink Traits
// =============================================================================

/// Receives full store snapshots after each committed mutation.
pub trait SnapshotSink: Send + Sync {
    fn save_authors(&self, authors: &[Author]) -> StoreResult<()>;

    fn save_books(&self, books: &[Book]) -> StoreResult<()>;

    fn save_customers(&self, customers: &[Customer]) -> StoreResult<()>;

    fn save_orders(&self, orders: &[Order]) -> StoreResult<()>;

    /// Orders that could not be replayed at startup, kept for inspection.
    fn save_failed_orders(&self, orders: &[Order]) -> StoreResult<()>;
}

/// Durable list of generated sales reports.
///
/// Saving is read-all, append, write-all; implementations only need to
/// replace the whole list atomically.
pub trait ReportArchive: Send + Sync {
    fn load_reports(&self) -> StoreResult<Vec<SalesReport>>;

    fn store_reports(&self, reports: &[SalesReport]) -> StoreResult<()>;
}

// =============================================================================
// JSON Directory
// =============================================================================

/// Snapshot files in one directory, pretty-printed JSON.
#[derive(Debug)]
pub struct JsonDirectory {
    root: PathBuf,
    // Serializes rename-over so two saves of the same file cannot interleave.
    write_lock: Mutex<()>,
}

impl JsonDirectory {
    /// Opens (creating if needed) a snapshot directory.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        info!(path = %root.display(), "Opened snapshot directory");
        Ok(JsonDirectory {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Reads a snapshot list, creating the file as `[]` when absent.
    ///
    /// ## Errors
    /// - `Corrupt` when the file exists but is not a JSON list of `T`
    /// - `Io` for any other read failure
    pub fn read_or_init<T: DeserializeOwned>(&self, file: &str) -> StoreResult<Vec<T>> {
        match self.read_list(file)? {
            Some(records) => Ok(records),
            None => {
                debug!(file, "Snapshot missing, creating empty list");
                self.write_list::<serde_json::Value>(file, &[])?;
                Ok(Vec::new())
            }
        }
    }

    /// Reads a snapshot list; `None` if the file does not exist.
    pub fn read_list<T: DeserializeOwned>(&self, file: &str) -> StoreResult<Option<Vec<T>>> {
        let path = self.path_of(file);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: path.display().to_string(),
                source,
            })
    }

    /// Atomically replaces `file` with `records`.
    pub fn write_list<T: Serialize>(&self, file: &str, records: &[T]) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(records)?;
        let target = self.path_of(file);
        let tmp = self.path_of(&format!("{file}.{}.tmp", Uuid::new_v4()));

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        fs::write(&tmp, bytes)?;
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!(file, count = records.len(), "Wrote snapshot");
        Ok(())
    }
}

impl SnapshotSink for JsonDirectory {
    fn save_authors(&self, authors: &[Author]) -> StoreResult<()> {
        self.write_list(AUTHORS_FILE, authors)
    }

    fn save_books(&self, books: &[Book]) -> StoreResult<()> {
        self.write_list(BOOKS_FILE, books)
    }

    fn save_customers(&self, customers: &[Customer]) -> StoreResult<()> {
        self.write_list(CUSTOMERS_FILE, customers)
    }

    fn save_orders(&self, orders: &[Order]) -> StoreResult<()> {
        self.write_list(ORDERS_FILE, orders)
    }

    fn save_failed_orders(&self, orders: &[Order]) -> StoreResult<()> {
        self.write_list(FAILED_ORDERS_FILE, orders)
    }
}

impl ReportArchive for JsonDirectory {
    fn load_reports(&self) -> StoreResult<Vec<SalesReport>> {
        Ok(self.read_list(SALES_REPORTS_FILE)?.unwrap_or_default())
    }

    fn store_reports(&self, reports: &[SalesReport]) -> StoreResult<()> {
        self.write_list(SALES_REPORTS_FILE, reports)
    }
}

// =============================================================================
// In-Memory Implementations
// =============================================================================

/// Discards every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn save_authors(&self, _authors: &[Author]) -> StoreResult<()> {
        Ok(())
    }

    fn save_books(&self, _books: &[Book]) -> StoreResult<()> {
        Ok(())
    }

    fn save_customers(&self, _customers: &[Customer]) -> StoreResult<()> {
        Ok(())
    }

    fn save_orders(&self, _orders: &[Order]) -> StoreResult<()> {
        Ok(())
    }

    fn save_failed_orders(&self, _orders: &[Order]) -> StoreResult<()> {
        Ok(())
    }
}

/// Report archive held in memory, counting how often it was written.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    reports: Mutex<Vec<SalesReport>>,
    writes: Mutex<usize>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<SalesReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `store_reports` calls so far.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReportArchive for MemoryArchive {
    fn load_reports(&self) -> StoreResult<Vec<SalesReport>> {
        Ok(self.reports())
    }

    fn store_reports(&self, reports: &[SalesReport]) -> StoreResult<()> {
        *self.reports.lock().unwrap_or_else(PoisonError::into_inner) = reports.to_vec();
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
