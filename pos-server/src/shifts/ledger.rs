//! Monthly time ledger access
//!
//! Totals are always recomputed from the closed intervals of the month,
//! never patched incrementally.

use shared::error::ErrorCode;
use shared::models::{MonthKey, MonthSummary, RecentTotal, WorkedTime};
use sqlx::{SqliteConnection, SqlitePool};

use super::tracker::ledger_not_found;
use crate::db::repository::{RepoResult, time_ledger};
use crate::utils::{AppError, AppResult};

/// Recompute and store the total of one month
pub async fn recompute_month_total(
    conn: &mut SqliteConnection,
    employee_id: &str,
    year: i32,
    month: i32,
) -> RepoResult<WorkedTime> {
    let millis = time_ledger::closed_millis_in_month(&mut *conn, employee_id, year, month).await?;
    let total = WorkedTime::from_millis(millis);
    time_ledger::set_month_total(&mut *conn, employee_id, year, month, total).await?;
    Ok(total)
}

/// Month entry of an employee's ledger
pub async fn get_month(
    pool: &SqlitePool,
    employee_id: &str,
    year: i32,
    month: u32,
) -> AppResult<MonthSummary> {
    let key = MonthKey::new(year, month).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("month must be within 1..=12, got {month}"),
        )
        .with_detail("month", month)
    })?;

    if !time_ledger::ledger_exists(pool, employee_id).await? {
        return Err(ledger_not_found(employee_id));
    }
    let monthly_total = time_ledger::find_month_total(pool, employee_id, year, month)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::LedgerMonthNotFound,
                format!("No shifts recorded for {employee_id} in {key}"),
            )
            .with_detail("month", key.to_string())
        })?;
    let shifts = time_ledger::find_month_shifts(pool, employee_id, year, month).await?;

    Ok(MonthSummary {
        employee_id: employee_id.to_string(),
        month: key,
        monthly_total,
        shifts,
    })
}

pub const DEFAULT_RECENT_DAYS: u32 = 30;
pub const MAX_RECENT_DAYS: u32 = 366;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Worked time over the `days` days ending at `now`
///
/// Only closed intervals count, same as the monthly totals.
pub async fn recent_total(
    pool: &SqlitePool,
    employee_id: &str,
    days: u32,
    now: i64,
) -> AppResult<RecentTotal> {
    if !(1..=MAX_RECENT_DAYS).contains(&days) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("days must be within 1..={MAX_RECENT_DAYS}, got {days}"),
        )
        .with_detail("days", days));
    }
    if !time_ledger::ledger_exists(pool, employee_id).await? {
        return Err(ledger_not_found(employee_id));
    }

    let since = now - i64::from(days) * DAY_MILLIS;
    let millis = time_ledger::closed_millis_between(pool, employee_id, since, now).await?;
    Ok(RecentTotal {
        employee_id: employee_id.to_string(),
        days,
        since,
        until: now,
        total: WorkedTime::from_millis(millis),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::shifts::ShiftTracker;

    #[tokio::test]
    async fn test_get_month_lists_shifts_in_order() {
        let db = DbService::in_memory().await.unwrap();
        let tracker = ShiftTracker::new(db.pool.clone(), chrono_tz::UTC);
        // 2024-05-03T08:00:00Z
        let start = 1_714_723_200_000;
        tracker.open_interval("emp-1", start).await.unwrap();
        tracker.close_interval("emp-1", start + 3_600_000).await.unwrap();
        tracker.open_interval("emp-1", start + 7_200_000).await.unwrap();

        let summary = get_month(&db.pool, "emp-1", 2024, 5).await.unwrap();
        assert_eq!(summary.month.to_string(), "2024-05");
        assert_eq!(summary.shifts.len(), 2);
        assert!(!summary.shifts[0].is_open());
        assert!(summary.shifts[1].is_open());
        assert_eq!(
            summary.shifts[0].total,
            Some(WorkedTime {
                hours: 1,
                minutes: 0
            })
        );
        assert_eq!(summary.shifts[1].total, None);
        // open shift does not count
        assert_eq!(
            summary.monthly_total,
            WorkedTime {
                hours: 1,
                minutes: 0
            }
        );
    }

    #[tokio::test]
    async fn test_get_month_errors() {
        let db = DbService::in_memory().await.unwrap();
        let tracker = ShiftTracker::new(db.pool.clone(), chrono_tz::UTC);
        tracker.open_interval("emp-1", 1_714_723_200_000).await.unwrap();

        let err = get_month(&db.pool, "emp-1", 2024, 13).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);

        let err = get_month(&db.pool, "nobody", 2024, 5).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TimeLedgerNotFound);

        let err = get_month(&db.pool, "emp-1", 2024, 4).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LedgerMonthNotFound);
    }

    #[tokio::test]
    async fn test_recent_total_clips_to_window() {
        let db = DbService::in_memory().await.unwrap();
        let tracker = ShiftTracker::new(db.pool.clone(), chrono_tz::UTC);
        let now = 1_714_723_200_000;
        let hour = 3_600_000;

        let window_start = now - 30 * DAY_MILLIS;
        // fully outside
        tracker.open_interval("emp-1", window_start - 10 * hour).await.unwrap();
        tracker.close_interval("emp-1", window_start - 8 * hour).await.unwrap();
        // ends 2h inside the window
        tracker.open_interval("emp-1", window_start - hour).await.unwrap();
        tracker.close_interval("emp-1", window_start + 2 * hour).await.unwrap();
        // 3h30 yesterday
        tracker.open_interval("emp-1", now - DAY_MILLIS).await.unwrap();
        tracker
            .close_interval("emp-1", now - DAY_MILLIS + 3 * hour + 30 * 60_000)
            .await
            .unwrap();
        // still open, not counted
        tracker.open_interval("emp-1", now - hour).await.unwrap();

        let recent = recent_total(&db.pool, "emp-1", DEFAULT_RECENT_DAYS, now)
            .await
            .unwrap();
        assert_eq!(recent.since, window_start);
        assert_eq!(
            recent.total,
            WorkedTime {
                hours: 5,
                minutes: 30
            }
        );

        let last_day = recent_total(&db.pool, "emp-1", 1, now).await.unwrap();
        assert_eq!(last_day.total.hours, 3);
    }

    #[tokio::test]
    async fn test_recent_total_errors() {
        let db = DbService::in_memory().await.unwrap();

        let err = recent_total(&db.pool, "emp-1", 0, 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        let err = recent_total(&db.pool, "emp-1", MAX_RECENT_DAYS + 1, 0)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert_eq!(err.detail("days").unwrap(), MAX_RECENT_DAYS + 1);

        let err = recent_total(&db.pool, "nobody", 30, 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TimeLedgerNotFound);
    }
}
