//! Day Close State Repository
//!
//! Singleton row (`id = 1`) holding the ledger epoch and the close marker:
//! `idle → collecting → reported → idle`.

use super::{RepoError, RepoResult};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DayCloseStatus {
    Idle,
    Collecting,
    Reported,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DayCloseState {
    pub status: DayCloseStatus,
    /// Epoch stamped on new orders and receipts
    pub current_epoch: i64,
    /// Epoch being closed (collecting / reported)
    pub closing_epoch: Option<i64>,
    /// Report persisted for `closing_epoch` (reported)
    pub report_id: Option<i64>,
    pub started_at: Option<i64>,
    pub updated_at: i64,
}

pub async fn get(pool: &SqlitePool) -> RepoResult<DayCloseState> {
    let state = sqlx::query_as::<_, DayCloseState>(
        "SELECT status, current_epoch, closing_epoch, report_id, started_at, updated_at \
         FROM day_close_state WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?;
    state.ok_or_else(|| RepoError::Database("day_close_state row is missing".into()))
}

/// `idle → collecting`; `false` if the marker was not idle
pub async fn claim(pool: &SqlitePool, now: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE day_close_state SET status = 'collecting', started_at = ?, updated_at = ? \
         WHERE id = 1 AND status = 'idle'",
    )
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// Close the current epoch and open the next one, returning the closed epoch
///
/// Must be the first statement of the collection transaction: it takes the
/// write lock, so later checkouts land in the new epoch.
pub async fn advance_epoch(conn: &mut SqliteConnection, now: i64) -> RepoResult<i64> {
    let closing: Option<i64> = sqlx::query_scalar(
        "UPDATE day_close_state \
         SET closing_epoch = current_epoch, current_epoch = current_epoch + 1, updated_at = ? \
         WHERE id = 1 AND status = 'collecting' \
         RETURNING closing_epoch",
    )
    .bind(now)
    .fetch_optional(conn)
    .await?;
    closing.ok_or_else(|| RepoError::Validation("Day close was not claimed".into()))
}

/// `collecting → reported(report_id)`
pub async fn mark_reported(conn: &mut SqliteConnection, report_id: i64, now: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE day_close_state SET status = 'reported', report_id = ?, updated_at = ? \
         WHERE id = 1 AND status = 'collecting'",
    )
    .bind(report_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// `reported → idle` once the archive step committed
pub async fn mark_idle(conn: &mut SqliteConnection, now: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE day_close_state \
         SET status = 'idle', closing_epoch = NULL, report_id = NULL, started_at = NULL, updated_at = ? \
         WHERE id = 1 AND status = 'reported'",
    )
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// `collecting → idle` (failed collection, or a crash before it committed)
///
/// The collection transaction rolled back, so the epoch is still the one
/// that was being closed.
pub async fn release_collecting(pool: &SqlitePool, now: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE day_close_state \
         SET status = 'idle', closing_epoch = NULL, started_at = NULL, updated_at = ? \
         WHERE id = 1 AND status = 'collecting'",
    )
    .bind(now)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}
