//! Abandoned checkout sweep.
//!
//! A pending row whose order was never paid is cancelled once it has been
//! idle longer than the configured window. A payment that arrives later
//! still activates it through reconciliation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::EnrollmentRepository;

pub struct ExpireAbandonedEnrollmentsHandler {
    enrollments: Arc<dyn EnrollmentRepository>,
    abandoned_after_mins: i64,
}

impl ExpireAbandonedEnrollmentsHandler {
    pub fn new(enrollments: Arc<dyn EnrollmentRepository>, abandoned_after_mins: i64) -> Self {
        Self {
            enrollments,
            abandoned_after_mins,
        }
    }

    /// Cancels pending rows untouched since before `now - window`.
    pub async fn handle(&self, now: Timestamp) -> Result<u64, DomainError> {
        let cutoff = now.minus_minutes(self.abandoned_after_mins);
        let cancelled = self.enrollments.cancel_abandoned(cutoff).await?;
        if cancelled > 0 {
            tracing::info!(cancelled, cutoff = ?cutoff.as_datetime(), "Cancelled abandoned enrollments");
        }
        Ok(cancelled)
    }
}

/// Runs [`ExpireAbandonedEnrollmentsHandler`] on a fixed interval.
pub struct AbandonedEnrollmentSweeper {
    handler: ExpireAbandonedEnrollmentsHandler,
    interval: Duration,
}

impl AbandonedEnrollmentSweeper {
    pub fn new(handler: ExpireAbandonedEnrollmentsHandler, interval: Duration) -> Self {
        Self { handler, interval }
    }

    /// Sweeps until the shutdown channel flips to `true`.
    ///
    /// A failed sweep is logged and retried on the next tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = time::interval(self.interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("Abandoned enrollment sweeper stopped");
                        return;
                    }
                }

                _ = ticker.tick() => {
                    if let Err(e) = self.handler.handle(Timestamp::now()).await {
                        tracing::warn!(error = %e, "Abandoned enrollment sweep failed");
                    }
                }
            }
        }
    }
}
