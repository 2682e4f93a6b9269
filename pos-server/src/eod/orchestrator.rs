//! Day-close orchestrator
//!
//! ```text
//! idle ──claim──▶ collecting ──report tx──▶ reported ──archive tx──▶ idle
//!                     │ (tx rolled back)        │ (retries exhausted)
//!                     └──────▶ idle             └──▶ stays reported, resumable
//! ```
//!
//! The report transaction starts by advancing the ledger epoch, so checkouts
//! that race the close land in the next business day. The archive transaction
//! is idempotent and can be retried or resumed after a crash.

use std::time::Duration;

use shared::error::ErrorCode;
use shared::models::EodReport;
use shared::util::now_millis;
use sqlx::SqlitePool;
use thiserror::Error;

use super::aggregator;
use crate::auth::CurrentUser;
use crate::db::repository::day_close::{self, DayCloseState, DayCloseStatus};
use crate::db::repository::eod_report::{self, GeneratedBy};
use crate::db::repository::{RepoError, RepoResult, archived_receipt, order, receipt};
use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum DayCloseError {
    #[error("A day close is already in progress")]
    InProgress,

    #[error("Day close for report {report_id} did not finish archiving: {reason}")]
    Incomplete { report_id: i64, reason: String },

    #[error("No day close is waiting to be resumed")]
    NothingToResume,

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<sqlx::Error> for DayCloseError {
    fn from(err: sqlx::Error) -> Self {
        DayCloseError::Repo(err.into())
    }
}

impl From<DayCloseError> for AppError {
    fn from(err: DayCloseError) -> Self {
        match err {
            DayCloseError::InProgress => {
                AppError::conflict(ErrorCode::DayCloseInProgress, err.to_string())
            }
            DayCloseError::Incomplete { report_id, .. } => {
                AppError::incomplete_close(report_id, err.to_string())
            }
            DayCloseError::NothingToResume => {
                AppError::with_message(ErrorCode::NoPendingDayClose, err.to_string())
            }
            DayCloseError::Repo(e) => e.into(),
        }
    }
}

/// Exponential backoff for the archive step
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, at least 1
    pub attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Runs day closes against the live store
#[derive(Debug, Clone)]
pub struct DayCloseOrchestrator {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl DayCloseOrchestrator {
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    /// Close the current business day and return its report
    ///
    /// # Errors
    ///
    /// - `InProgress` when another close holds the marker
    /// - `Incomplete` when a previous close is waiting to be resumed, or when
    ///   this close persisted its report but could not archive
    pub async fn generate(&self, actor: Option<&CurrentUser>) -> Result<EodReport, DayCloseError> {
        let started_at = now_millis();
        if !day_close::claim(&self.pool, started_at).await? {
            let state = day_close::get(&self.pool).await?;
            return Err(match (state.status, state.report_id) {
                (DayCloseStatus::Reported, Some(report_id)) => DayCloseError::Incomplete {
                    report_id,
                    reason: "a previous day close must be resumed first".into(),
                },
                _ => DayCloseError::InProgress,
            });
        }
        tracing::info!(
            target: "day_close",
            actor = actor.map(|u| u.id.as_str()),
            "Day close claimed"
        );

        let (report_id, epoch) = match self.collect_and_report(actor, started_at).await {
            Ok(done) => done,
            Err(e) => {
                tracing::error!(target: "day_close", error = %e, "Day close collection failed");
                if let Err(release) = day_close::release_collecting(&self.pool, now_millis()).await
                {
                    tracing::error!(
                        target: "day_close",
                        error = %release,
                        "Failed to release day close marker"
                    );
                }
                return Err(e.into());
            }
        };

        self.archive_with_retry(report_id, epoch).await?;
        self.load_report(report_id).await
    }

    /// Finish the archive step of a close stuck in `reported`
    pub async fn resume(&self) -> Result<EodReport, DayCloseError> {
        let state = day_close::get(&self.pool).await?;
        let (report_id, epoch) = match (state.status, state.report_id, state.closing_epoch) {
            (DayCloseStatus::Reported, Some(report_id), Some(epoch)) => (report_id, epoch),
            _ => return Err(DayCloseError::NothingToResume),
        };
        tracing::info!(target: "day_close", report_id, epoch, "Resuming day close");
        self.archive_with_retry(report_id, epoch).await?;
        self.load_report(report_id).await
    }

    /// Startup recovery: a `collecting` marker means the process died before
    /// the report transaction committed, so nothing was persisted.
    pub async fn recover(&self) -> RepoResult<()> {
        if day_close::release_collecting(&self.pool, now_millis()).await? {
            tracing::warn!(target: "day_close", "Released day close marker left in collecting state");
        }
        let state = day_close::get(&self.pool).await?;
        if let (DayCloseStatus::Reported, Some(report_id)) = (state.status, state.report_id) {
            tracing::error!(
                target: "day_close",
                report_id,
                "Day close is waiting to be resumed"
            );
        }
        Ok(())
    }

    pub async fn state(&self) -> RepoResult<DayCloseState> {
        day_close::get(&self.pool).await
    }

    /// Advance the epoch, aggregate the closed epoch and persist the report
    async fn collect_and_report(
        &self,
        actor: Option<&CurrentUser>,
        now: i64,
    ) -> RepoResult<(i64, i64)> {
        let mut tx = self.pool.begin().await?;

        let epoch = day_close::advance_epoch(&mut tx, now).await?;
        let receipts = receipt::find_by_epoch(&mut tx, epoch).await?;
        let metrics = aggregator::aggregate(&receipts);
        let generated_by = GeneratedBy {
            id: actor.map(|u| u.id.as_str()),
            name: actor.map(|u| u.username.as_str()),
        };
        let report_id = eod_report::insert(&mut tx, epoch, now, &metrics, generated_by).await?;
        day_close::mark_reported(&mut tx, report_id, now).await?;

        tx.commit().await?;

        tracing::info!(
            target: "day_close",
            report_id,
            epoch,
            total_orders = metrics.total_orders,
            not_paid = metrics.total_orders_not_paid,
            cash = metrics.cash_revenue,
            card = metrics.card_revenue,
            other = metrics.other_revenue,
            loss = metrics.total_loss,
            "EoD report persisted"
        );
        Ok((report_id, epoch))
    }

    /// Archive the closed epoch's receipts and clear the live store
    async fn archive_and_reset(&self, report_id: i64, epoch: i64) -> RepoResult<(u64, u64, u64)> {
        let now = now_millis();
        let mut tx = self.pool.begin().await?;

        let archived = archived_receipt::archive_epoch(&mut tx, epoch, report_id, now).await?;
        let receipts = receipt::delete_by_epoch(&mut tx, epoch).await?;
        let orders = order::delete_by_epoch(&mut tx, epoch).await?;
        day_close::mark_idle(&mut tx, now).await?;

        tx.commit().await?;
        Ok((archived, receipts, orders))
    }

    async fn archive_with_retry(&self, report_id: i64, epoch: i64) -> Result<(), DayCloseError> {
        let mut attempt = 1;
        loop {
            match self.archive_and_reset(report_id, epoch).await {
                Ok((archived, receipts, orders)) => {
                    tracing::info!(
                        target: "day_close",
                        report_id,
                        epoch,
                        archived,
                        receipts_removed = receipts,
                        orders_removed = orders,
                        "Day close completed"
                    );
                    return Ok(());
                }
                Err(e) if attempt < self.retry.attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        target: "day_close",
                        report_id,
                        attempt,
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "Archive step failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        target: "day_close",
                        report_id,
                        epoch,
                        attempts = attempt,
                        error = %e,
                        "Archive step failed, day close left in reported state"
                    );
                    return Err(DayCloseError::Incomplete {
                        report_id,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    async fn load_report(&self, report_id: i64) -> Result<EodReport, DayCloseError> {
        eod_report::find_by_id(&self.pool, report_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("EoD report {report_id}")).into())
    }
}
