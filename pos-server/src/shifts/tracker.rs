//! Shift interval bookkeeping
//!
//! Every open/close is one SQLite transaction. Operations on the same
//! employee are serialized in-process by a per-employee async lock, and the
//! partial unique index on `shift_interval` allows at most one open interval
//! per employee.

use std::sync::Arc;

use chrono_tz::Tz;
use dashmap::DashMap;
use shared::error::ErrorCode;
use shared::models::{ClosedSession, ShiftInterval};
use shared::util::now_millis;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use super::ledger;
use crate::db::repository::{RepoError, time_ledger};
use crate::utils::time::month_key_of;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

fn shift_already_open(employee_id: &str, interval_id: Option<i64>) -> AppError {
    let err = AppError::conflict(
        ErrorCode::ShiftAlreadyOpen,
        format!("Employee {employee_id} already has an open shift"),
    )
    .with_detail("employee_id", employee_id);
    match interval_id {
        Some(id) => err.with_detail("interval_id", id),
        None => err,
    }
}

fn shift_not_open(employee_id: &str) -> AppError {
    AppError::conflict(
        ErrorCode::ShiftNotOpen,
        format!("Employee {employee_id} has no open shift"),
    )
    .with_detail("employee_id", employee_id)
}

pub(super) fn ledger_not_found(employee_id: &str) -> AppError {
    AppError::with_message(
        ErrorCode::TimeLedgerNotFound,
        format!("No time ledger for employee {employee_id}"),
    )
    .with_detail("employee_id", employee_id)
}

/// Login/logout bookkeeping per employee
#[derive(Debug, Clone)]
pub struct ShiftTracker {
    pool: SqlitePool,
    tz: Tz,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ShiftTracker {
    pub fn new(pool: SqlitePool, tz: Tz) -> Self {
        Self {
            pool,
            tz,
            locks: Arc::new(DashMap::new()),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    fn lock_for(&self, employee_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(employee_id.to_string())
            .or_default()
            .clone()
    }

    /// Open an interval at `at`
    ///
    /// The interval is filed under the calendar month of `at` in the business
    /// time zone. Ledger and month entries are created on demand.
    pub async fn open_interval(&self, employee_id: &str, at: i64) -> AppResult<ShiftInterval> {
        validate_required_text(employee_id, "employee_id", MAX_SHORT_TEXT_LEN)?;
        let month = month_key_of(at, self.tz)?;

        let lock = self.lock_for(employee_id);
        let _guard = lock.lock().await;

        let now = now_millis();
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;

        time_ledger::upsert_ledger(&mut tx, employee_id, now).await?;
        if let Some(open_id) = time_ledger::open_interval_id(&mut tx, employee_id).await? {
            return Err(shift_already_open(employee_id, Some(open_id)));
        }
        time_ledger::ensure_month(&mut tx, employee_id, month.year(), month.month()).await?;

        let interval =
            match time_ledger::insert_interval(&mut tx, employee_id, month.year(), month.month(), at)
                .await
            {
                Ok(interval) => interval,
                Err(RepoError::Duplicate(_)) => return Err(shift_already_open(employee_id, None)),
                Err(e) => return Err(e.into()),
            };
        time_ledger::set_open_interval(&mut tx, employee_id, Some(interval.id), now).await?;

        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            employee_id = %employee_id,
            interval_id = interval.id,
            month = %month,
            logged_in_at = at,
            "Shift opened"
        );
        Ok(interval)
    }

    /// Close the open interval and recompute the total of its month
    ///
    /// The interval is found through the ledger's open-interval pointer, so
    /// one that started last month still closes into that month.
    pub async fn close_interval(&self, employee_id: &str, at: i64) -> AppResult<ClosedSession> {
        let lock = self.lock_for(employee_id);
        let _guard = lock.lock().await;

        let now = now_millis();
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;

        if !time_ledger::touch_ledger(&mut tx, employee_id, now).await? {
            return Err(ledger_not_found(employee_id));
        }
        let open_id = time_ledger::open_interval_id(&mut tx, employee_id)
            .await?
            .ok_or_else(|| shift_not_open(employee_id))?;
        let open = time_ledger::find_interval(&mut tx, open_id)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!(
                    "Ledger of {employee_id} points at missing interval {open_id}"
                ))
            })?;
        if at < open.logged_in_at {
            return Err(AppError::validation(format!(
                "Logout time {at} is before login time {}",
                open.logged_in_at
            ))
            .with_detail("employee_id", employee_id));
        }

        let interval = time_ledger::close_interval(&mut tx, open_id, at).await?;
        time_ledger::set_open_interval(&mut tx, employee_id, None, now).await?;
        let monthly_total =
            ledger::recompute_month_total(&mut tx, employee_id, interval.year, interval.month).await?;

        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            employee_id = %employee_id,
            interval_id = interval.id,
            logged_out_at = at,
            hours = monthly_total.hours,
            minutes = monthly_total.minutes,
            "Shift closed"
        );
        Ok(ClosedSession {
            employee_id: employee_id.to_string(),
            interval,
            monthly_total,
        })
    }
}
