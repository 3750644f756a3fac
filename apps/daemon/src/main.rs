//! # Folio Daemon
//!
//! Back-office process: owns the catalog and runs the sales report job.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Folio Daemon                                     │
//! │                                                                         │
//! │  1. FolioConfig::load        (FOLIO_CONFIG or platform config dir)     │
//! │  2. tracing subscriber       (RUST_LOG, else [logging] filter)         │
//! │  3. JsonDirectory::open      (data_dir)                                │
//! │  4. Catalog::load_from       any unreadable snapshot aborts startup    │
//! │  5. Backoffice + SalesReportGenerator                                  │
//! │  6. spawn ReportScheduler                                              │
//! │  7. wait for Ctrl+C / SIGTERM                                          │
//! │  8. shutdown: cancel in-flight report, join scheduler                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use folio_service::{Backoffice, FolioConfig, ReportScheduler, SalesReportGenerator};
use folio_store::{Catalog, JsonDirectory};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var_os("FOLIO_CONFIG").map(PathBuf::from);
    let config = FolioConfig::load(config_path)?;

    init_tracing(&config.logging.filter);
    info!(
        data_dir = %config.storage.data_dir.display(),
        interval_secs = config.reports.interval_secs,
        window_hours = config.reports.window_hours,
        "Starting Folio back-office"
    );

    let dir = Arc::new(JsonDirectory::open(&config.storage.data_dir)?);
    let (catalog, summary) = Catalog::load_from(&dir).map_err(|e| {
        error!(error = %e, "Failed to load catalog, refusing to start");
        e
    })?;
    info!(
        books = summary.books,
        orders = summary.orders,
        failed_orders = summary.failed_orders,
        "Catalog ready"
    );

    let backoffice = Backoffice::new(catalog, dir.clone());
    let generator = SalesReportGenerator::new(backoffice.catalog(), dir.clone())
        .with_window(config.reports.window())
        .with_top_sellers(config.reports.top_sellers);

    let shutdown = CancellationToken::new();
    let (scheduler, reports) =
        ReportScheduler::new(Arc::new(generator), &config.reports, shutdown.clone());
    let scheduler_task = tokio::spawn(scheduler.run());

    shutdown_signal().await;

    reports.shutdown().await;
    if let Err(e) = scheduler_task.await {
        error!(error = %e, "Report scheduler task failed");
    }

    info!("Folio back-office stopped");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over the configured filter.
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping...");
}
