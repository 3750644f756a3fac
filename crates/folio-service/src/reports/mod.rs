//! # Sales Reports
//!
//! - [`generator`] - Window scan, top-seller ranking, archive append
//! - [`scheduler`] - Interval/on-demand background task
//! - [`cancel`] - Cancellation checks polled by the scan

pub mod cancel;
pub mod generator;
pub mod scheduler;

pub use cancel::{CancelSignal, NeverCancel};
pub use generator::{SalesReportGenerator, SalesReportQuery};
pub use scheduler::{ReportScheduler, ReportSchedulerHandle};
