//! # folio-service: Back-Office Policy & Reports
//!
//! Rules that span entity stores, and the sales report job.
//!
//! ## Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     folio-service                                       │
//! │                                                                         │
//! │   Backoffice ─────────────┐        ReportScheduler (tokio task)        │
//! │   • orders (stock plan)   │             │  interval / generate_now     │
//! │   • books  (author link)  │             ▼                              │
//! │   • authors (cascade)     │        SalesReportGenerator                │
//! │   • customers (unique)    │        • [end - 24h, end) scan             │
//! │            │              │        • top 5 by revenue                  │
//! │            ▼              ▼             │                              │
//! │        Catalog (folio-store)  ◄─────────┘                              │
//! │            │                                                            │
//! │            ▼                                                            │
//! │   SnapshotSink / ReportArchive (JSON files)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use folio_service::{Backoffice, FolioConfig};
//! use folio_store::{Catalog, JsonDirectory};
//!
//! let config = FolioConfig::load(None)?;
//! let dir = Arc::new(JsonDirectory::open(&config.storage.data_dir)?);
//! let (catalog, _) = Catalog::load_from(&dir)?;
//! let office = Backoffice::new(catalog, dir.clone());
//! ```

pub mod backoffice;
pub mod config;
pub mod error;
pub mod reports;

pub use backoffice::{AuthorRemoval, Backoffice, OrderOutcome, RejectReason, RejectedItem};
pub use config::FolioConfig;
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use reports::{
    CancelSignal, NeverCancel, ReportScheduler, ReportSchedulerHandle, SalesReportGenerator,
    SalesReportQuery,
};
