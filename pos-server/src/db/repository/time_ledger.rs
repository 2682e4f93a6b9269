//! Time Ledger Repository
//!
//! `employee_ledger` holds the open-interval pointer, `time_ledger_month`
//! the derived monthly totals and `shift_interval` the raw intervals.

use super::RepoResult;
use shared::models::{ShiftInterval, WorkedTime};
use sqlx::{SqliteConnection, SqlitePool};

const INTERVAL_COLUMNS: &str = "id, employee_id, year, month, logged_in_at, logged_out_at";

/// Create the ledger if absent and bump `updated_at`
///
/// Writes unconditionally so the enclosing transaction holds the write lock
/// before it reads anything.
pub async fn upsert_ledger(conn: &mut SqliteConnection, employee_id: &str, now: i64) -> RepoResult<()> {
    sqlx::query(
        r#"
        INSERT INTO employee_ledger (employee_id, open_interval_id, created_at, updated_at)
        VALUES (?, NULL, ?, ?)
        ON CONFLICT (employee_id) DO UPDATE SET updated_at = excluded.updated_at
        "#,
    )
    .bind(employee_id)
    .bind(now)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Bump `updated_at` of an existing ledger; `false` when there is none
pub async fn touch_ledger(conn: &mut SqliteConnection, employee_id: &str, now: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE employee_ledger SET updated_at = ? WHERE employee_id = ?")
        .bind(now)
        .bind(employee_id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() == 1)
}

pub async fn open_interval_id(conn: &mut SqliteConnection, employee_id: &str) -> RepoResult<Option<i64>> {
    let id: Option<Option<i64>> =
        sqlx::query_scalar("SELECT open_interval_id FROM employee_ledger WHERE employee_id = ?")
            .bind(employee_id)
            .fetch_optional(conn)
            .await?;
    Ok(id.flatten())
}

pub async fn set_open_interval(
    conn: &mut SqliteConnection,
    employee_id: &str,
    interval_id: Option<i64>,
    now: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE employee_ledger SET open_interval_id = ?, updated_at = ? WHERE employee_id = ?")
        .bind(interval_id)
        .bind(now)
        .bind(employee_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Create the month entry lazily
pub async fn ensure_month(conn: &mut SqliteConnection, employee_id: &str, year: i32, month: u32) -> RepoResult<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO time_ledger_month (employee_id, year, month) VALUES (?, ?, ?)",
    )
    .bind(employee_id)
    .bind(year)
    .bind(month)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_interval(
    conn: &mut SqliteConnection,
    employee_id: &str,
    year: i32,
    month: u32,
    logged_in_at: i64,
) -> RepoResult<ShiftInterval> {
    let interval = sqlx::query_as::<_, ShiftInterval>(&format!(
        "INSERT INTO shift_interval (employee_id, year, month, logged_in_at) VALUES (?, ?, ?, ?) \
         RETURNING {INTERVAL_COLUMNS}"
    ))
    .bind(employee_id)
    .bind(year)
    .bind(month)
    .bind(logged_in_at)
    .fetch_one(conn)
    .await?;
    Ok(interval.with_total())
}

pub async fn find_interval(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<ShiftInterval>> {
    let interval = sqlx::query_as::<_, ShiftInterval>(&format!(
        "SELECT {INTERVAL_COLUMNS} FROM shift_interval WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(interval.map(ShiftInterval::with_total))
}

pub async fn close_interval(conn: &mut SqliteConnection, id: i64, logged_out_at: i64) -> RepoResult<ShiftInterval> {
    let interval = sqlx::query_as::<_, ShiftInterval>(&format!(
        "UPDATE shift_interval SET logged_out_at = ? WHERE id = ? RETURNING {INTERVAL_COLUMNS}"
    ))
    .bind(logged_out_at)
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(interval.with_total())
}

/// Sum of `logged_out_at - logged_in_at` over the closed intervals of a month
pub async fn closed_millis_in_month(
    conn: &mut SqliteConnection,
    employee_id: &str,
    year: i32,
    month: i32,
) -> RepoResult<i64> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(logged_out_at - logged_in_at), 0) FROM shift_interval \
         WHERE employee_id = ? AND year = ? AND month = ? AND logged_out_at IS NOT NULL",
    )
    .bind(employee_id)
    .bind(year)
    .bind(month)
    .fetch_one(conn)
    .await?;
    Ok(total)
}

pub async fn set_month_total(
    conn: &mut SqliteConnection,
    employee_id: &str,
    year: i32,
    month: i32,
    total: WorkedTime,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE time_ledger_month SET total_hours = ?, total_minutes = ? \
         WHERE employee_id = ? AND year = ? AND month = ?",
    )
    .bind(total.hours)
    .bind(total.minutes)
    .bind(employee_id)
    .bind(year)
    .bind(month)
    .execute(conn)
    .await?;
    Ok(())
}

// ── Reads ──

pub async fn ledger_exists(pool: &SqlitePool, employee_id: &str) -> RepoResult<bool> {
    let found: Option<String> =
        sqlx::query_scalar("SELECT employee_id FROM employee_ledger WHERE employee_id = ?")
            .bind(employee_id)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

pub async fn find_month_total(
    pool: &SqlitePool,
    employee_id: &str,
    year: i32,
    month: u32,
) -> RepoResult<Option<WorkedTime>> {
    let row: Option<(i64, i64)> = sqlx::query_as(
        "SELECT total_hours, total_minutes FROM time_ledger_month \
         WHERE employee_id = ? AND year = ? AND month = ?",
    )
    .bind(employee_id)
    .bind(year)
    .bind(month)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(hours, minutes)| WorkedTime { hours, minutes }))
}

/// Intervals filed under a month, in login order
pub async fn find_month_shifts(
    pool: &SqlitePool,
    employee_id: &str,
    year: i32,
    month: u32,
) -> RepoResult<Vec<ShiftInterval>> {
    let shifts = sqlx::query_as::<_, ShiftInterval>(&format!(
        "SELECT {INTERVAL_COLUMNS} FROM shift_interval \
         WHERE employee_id = ? AND year = ? AND month = ? ORDER BY logged_in_at, id"
    ))
    .bind(employee_id)
    .bind(year)
    .bind(month)
    .fetch_all(pool)
    .await?;
    Ok(shifts.into_iter().map(ShiftInterval::with_total).collect())
}

/// Closed worked millis inside `[since, until]`
///
/// Intervals straddling a bound only count their part inside the window.
pub async fn closed_millis_between(
    pool: &SqlitePool,
    employee_id: &str,
    since: i64,
    until: i64,
) -> RepoResult<i64> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(MIN(logged_out_at, ?) - MAX(logged_in_at, ?)), 0) \
         FROM shift_interval \
         WHERE employee_id = ? AND logged_out_at IS NOT NULL \
           AND logged_out_at > ? AND logged_in_at < ?",
    )
    .bind(until)
    .bind(since)
    .bind(employee_id)
    .bind(since)
    .bind(until)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

/// Employees whose ledger points at an open interval
pub async fn employees_with_open_interval(pool: &SqlitePool) -> RepoResult<Vec<String>> {
    let ids = sqlx::query_scalar(
        "SELECT employee_id FROM employee_ledger WHERE open_interval_id IS NOT NULL ORDER BY employee_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(ids)
}
