//! Daily shift auto-close
//!
//! Force-closes every open interval at `SHIFT_AUTO_CLOSE_AT` in the business
//! time zone.

use chrono::NaiveTime;
use shared::util::now_millis;
use tokio_util::sync::CancellationToken;

use super::{ShiftTracker, close_all_open_sessions};
use crate::utils::time::duration_until_next;

/// Only started when a close time is configured
pub struct ShiftAutoCloseScheduler {
    tracker: ShiftTracker,
    close_at: NaiveTime,
    shutdown: CancellationToken,
}

impl ShiftAutoCloseScheduler {
    pub fn new(tracker: ShiftTracker, close_at: NaiveTime, shutdown: CancellationToken) -> Self {
        Self {
            tracker,
            close_at,
            shutdown,
        }
    }

    pub async fn run(self) {
        tracing::info!(close_at = %self.close_at.format("%H:%M"), "Shift auto-close scheduler started");

        loop {
            let sleep_duration = duration_until_next(self.close_at, self.tracker.timezone());
            tracing::info!(
                "Next shift auto-close in {} minutes",
                sleep_duration.as_secs() / 60
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {
                    self.close_open_shifts().await;
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Shift auto-close scheduler received shutdown signal");
                    return;
                }
            }
        }
    }

    async fn close_open_shifts(&self) {
        match close_all_open_sessions(&self.tracker, now_millis()).await {
            Ok(outcome) if outcome.is_partial_failure() => {
                tracing::error!(
                    closed = outcome.closed.len(),
                    failed = outcome.failed.len(),
                    "Shift auto-close finished with failures"
                );
            }
            Ok(outcome) => {
                tracing::info!(closed = outcome.closed.len(), "Shift auto-close finished");
            }
            Err(e) => {
                tracing::error!("Shift auto-close failed: {}", e);
            }
        }
    }
}
