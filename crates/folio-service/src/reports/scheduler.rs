//! # Report Scheduler
//!
//! Background task that runs the [`SalesReportGenerator`] on an interval
//! and on request.
//!
//! ## Task Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ReportScheduler::run                               │
//! │                                                                         │
//! │  loop select! {                                                        │
//! │      interval.tick()          ──► run report (end = now)               │
//! │      command_rx.recv()        ──► GenerateNow: run, reply on oneshot   │
//! │      shutdown_rx.recv()       ──► break                                │
//! │  }                                                                     │
//! │                                                                         │
//! │  Each run gets a child of the shutdown token and executes on the       │
//! │  blocking pool. ReportSchedulerHandle::shutdown cancels the parent     │
//! │  first, so an in-flight scan stops at its next step and archives      │
//! │  nothing.                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use folio_core::SalesReport;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::generator::SalesReportGenerator;
use crate::config::ReportSettings;
use crate::error::{ServiceError, ServiceResult};

enum SchedulerCommand {
    GenerateNow {
        reply: oneshot::Sender<ServiceResult<SalesReport>>,
    },
}

/// Periodic sales report task.
pub struct ReportScheduler {
    generator: Arc<SalesReportGenerator>,
    interval: Duration,
    run_on_startup: bool,
    command_rx: mpsc::Receiver<SchedulerCommand>,
    shutdown_rx: mpsc::Receiver<()>,
    shutdown: CancellationToken,
    latest_tx: watch::Sender<Option<SalesReport>>,
}

/// Handle for controlling the report scheduler.
#[derive(Clone)]
pub struct ReportSchedulerHandle {
    command_tx: mpsc::Sender<SchedulerCommand>,
    shutdown_tx: mpsc::Sender<()>,
    shutdown: CancellationToken,
    latest_rx: watch::Receiver<Option<SalesReport>>,
}

impl ReportSchedulerHandle {
    /// Generates and archives a report for the window ending now.
    pub async fn generate_now(&self) -> ServiceResult<SalesReport> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(SchedulerCommand::GenerateNow { reply })
            .await
            .map_err(|_| ServiceError::ShuttingDown)?;
        rx.await.map_err(|_| ServiceError::ShuttingDown)?
    }

    /// Watches the most recent successful report.
    pub fn subscribe(&self) -> watch::Receiver<Option<SalesReport>> {
        self.latest_rx.clone()
    }

    /// Cancels any in-flight run and stops the loop.
    ///
    /// Calling this on a scheduler that already stopped is a no-op.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        if self.shutdown_tx.send(()).await.is_err() {
            debug!("Report scheduler already stopped");
        }
    }
}

impl ReportScheduler {
    /// Creates a scheduler and returns a handle.
    ///
    /// `shutdown` is the parent of every run's cancellation token.
    pub fn new(
        generator: Arc<SalesReportGenerator>,
        settings: &ReportSettings,
        shutdown: CancellationToken,
    ) -> (Self, ReportSchedulerHandle) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (latest_tx, latest_rx) = watch::channel(None);

        let scheduler = ReportScheduler {
            generator,
            interval: settings.interval(),
            run_on_startup: settings.run_on_startup,
            command_rx,
            shutdown_rx,
            shutdown: shutdown.clone(),
            latest_tx,
        };

        let handle = ReportSchedulerHandle {
            command_tx,
            shutdown_tx,
            shutdown,
            latest_rx,
        };

        (scheduler, handle)
    }

    /// Runs the scheduler loop.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(
            interval_secs = self.interval.as_secs(),
            run_on_startup = self.run_on_startup,
            "Report scheduler starting"
        );

        let first_tick = if self.run_on_startup {
            Instant::now()
        } else {
            Instant::now() + self.interval
        };
        let mut interval = tokio::time::interval_at(first_tick, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.run_once().await {
                        if !e.is_canceled() {
                            error!(error = %e, "Scheduled sales report failed");
                        }
                    }
                }

                Some(command) = self.command_rx.recv() => match command {
                    SchedulerCommand::GenerateNow { reply } => {
                        let result = self.run_once().await;
                        if reply.send(result).is_err() {
                            debug!("Report requester went away before the reply");
                        }
                    }
                },

                _ = self.shutdown_rx.recv() => {
                    info!("Report scheduler shutting down");
                    break;
                }

                _ = self.shutdown.cancelled() => {
                    info!("Report scheduler cancelled");
                    break;
                }
            }
        }

        info!("Report scheduler stopped");
    }

    async fn run_once(&self) -> ServiceResult<SalesReport> {
        let run_id = Uuid::new_v4();
        let token = self.shutdown.child_token();
        let generator = Arc::clone(&self.generator);
        debug!(%run_id, "Starting sales report run");

        let report = tokio::task::spawn_blocking(move || generator.run(Utc::now(), &token))
            .await??;

        debug!(%run_id, orders = report.total_orders, "Sales report run finished");
        self.latest_tx.send_replace(Some(report.clone()));
        Ok(report)
    }
}
