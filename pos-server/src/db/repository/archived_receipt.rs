//! Archived Receipt Repository (append-only)

use super::receipt::{COLUMNS, ORDER_SNAPSHOT, ReceiptRow, parse_order_snapshot};
use super::{RepoError, RepoResult};
use shared::models::ArchivedReceipt;
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Debug, sqlx::FromRow)]
struct ArchivedRow {
    #[sqlx(flatten)]
    receipt: ReceiptRow,
    order_snapshot: Option<String>,
    report_id: i64,
    archived_at: i64,
}

impl TryFrom<ArchivedRow> for ArchivedReceipt {
    type Error = RepoError;

    fn try_from(row: ArchivedRow) -> Result<Self, Self::Error> {
        Ok(ArchivedReceipt {
            receipt: row.receipt.try_into()?,
            order: parse_order_snapshot(row.order_snapshot)?,
            report_id: row.report_id,
            archived_at: row.archived_at,
        })
    }
}

/// Copy every receipt of `epoch` (with its order) into the archive
///
/// `INSERT OR IGNORE` keyed by receipt id, so re-running after a partial
/// failure does not duplicate rows.
pub async fn archive_epoch(
    conn: &mut SqliteConnection,
    epoch: i64,
    report_id: i64,
    archived_at: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(&format!(
        r#"
        INSERT OR IGNORE INTO archived_receipt
            (id, order_id, epoch, items, total_amount, payment_method, notes, tip_amount,
             is_paid, created_at, updated_at, order_snapshot, report_id, archived_at)
        SELECT {COLUMNS}, {ORDER_SNAPSHOT}, ?, ?
        FROM receipt r LEFT JOIN orders o ON o.id = r.order_id
        WHERE r.epoch = ?
        "#
    ))
    .bind(report_id)
    .bind(archived_at)
    .bind(epoch)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected())
}

const SELECT: &str = "SELECT r.id, r.order_id, r.epoch, r.items, r.total_amount, \
     r.payment_method, r.notes, r.tip_amount, r.is_paid, r.created_at, r.updated_at, \
     r.order_snapshot, r.report_id, r.archived_at FROM archived_receipt r";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ArchivedReceipt>> {
    let row: Option<ArchivedRow> = sqlx::query_as(&format!("{SELECT} WHERE r.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(ArchivedReceipt::try_from).transpose()
}

/// Archived receipts with `created_at` in `[start, end]`
pub async fn find_in_range(pool: &SqlitePool, start: i64, end: i64) -> RepoResult<Vec<ArchivedReceipt>> {
    let rows: Vec<ArchivedRow> = sqlx::query_as(&format!(
        "{SELECT} WHERE r.created_at >= ? AND r.created_at <= ? ORDER BY r.created_at, r.id"
    ))
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(ArchivedReceipt::try_from).collect()
}

pub async fn find_by_report(pool: &SqlitePool, report_id: i64) -> RepoResult<Vec<ArchivedReceipt>> {
    let rows: Vec<ArchivedRow> =
        sqlx::query_as(&format!("{SELECT} WHERE r.report_id = ? ORDER BY r.id"))
            .bind(report_id)
            .fetch_all(pool)
            .await?;
    rows.into_iter().map(ArchivedReceipt::try_from).collect()
}
