//! Receipt Repository (live receipts)
//!
//! Receipts carry the epoch of the business day they belong to. Every
//! mutation checks the epoch in the same statement, so a receipt of a closed
//! day can never change after its report was computed.

use super::{RepoError, RepoResult};
use shared::models::{Order, PaymentMethod, Receipt, ReceiptItem, ReceiptWithOrder};
use sqlx::{SqliteConnection, SqlitePool};

pub(super) const COLUMNS: &str = "r.id, r.order_id, r.epoch, r.items, r.total_amount, \
     r.payment_method, r.notes, r.tip_amount, r.is_paid, r.created_at, r.updated_at";

/// The receipt's order rendered as an `Order` JSON document (NULL when gone)
pub(super) const ORDER_SNAPSHOT: &str = "CASE WHEN o.id IS NULL THEN NULL ELSE json_object(\
     'id', o.id, 'table_number', o.table_number, 'employee_id', o.employee_id, \
     'items', json(o.items), 'epoch', o.epoch, \
     'created_at', o.created_at, 'updated_at', o.updated_at) END";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ReceiptRow {
    id: i64,
    order_id: i64,
    epoch: i64,
    items: String,
    total_amount: f64,
    payment_method: String,
    notes: Option<String>,
    tip_amount: f64,
    is_paid: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<ReceiptRow> for Receipt {
    type Error = RepoError;

    fn try_from(row: ReceiptRow) -> Result<Self, Self::Error> {
        Ok(Receipt {
            id: row.id,
            order_id: row.order_id,
            epoch: row.epoch,
            items: serde_json::from_str(&row.items)?,
            total_amount: row.total_amount,
            payment_method: PaymentMethod::from(row.payment_method),
            notes: row.notes,
            tip_amount: row.tip_amount,
            is_paid: row.is_paid,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReceiptWithOrderRow {
    #[sqlx(flatten)]
    receipt: ReceiptRow,
    order_snapshot: Option<String>,
}

impl TryFrom<ReceiptWithOrderRow> for ReceiptWithOrder {
    type Error = RepoError;

    fn try_from(row: ReceiptWithOrderRow) -> Result<Self, Self::Error> {
        Ok(ReceiptWithOrder {
            receipt: row.receipt.try_into()?,
            order: parse_order_snapshot(row.order_snapshot)?,
            archived_at: None,
        })
    }
}

pub(super) fn parse_order_snapshot(raw: Option<String>) -> RepoResult<Option<Order>> {
    raw.map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(RepoError::from)
}

/// Fields of a receipt computed at checkout
#[derive(Debug, Clone)]
pub struct NewReceipt<'a> {
    pub order_id: i64,
    pub items: &'a [ReceiptItem],
    pub total_amount: f64,
    pub payment_method: &'a PaymentMethod,
    pub notes: Option<&'a str>,
    pub tip_amount: f64,
    pub is_paid: bool,
}

/// Insert a receipt for an order of the current epoch
///
/// Returns `None` when the order is missing or belongs to a closed epoch.
/// A second receipt for the same order fails with `Duplicate`.
pub async fn insert(pool: &SqlitePool, data: &NewReceipt<'_>, now: i64) -> RepoResult<Option<Receipt>> {
    let items_json = serde_json::to_string(data.items)?;
    let row: Option<ReceiptRow> = sqlx::query_as(
        r#"
        INSERT INTO receipt (order_id, epoch, items, total_amount, payment_method, notes,
                             tip_amount, is_paid, created_at, updated_at)
        SELECT o.id, s.current_epoch, ?, ?, ?, ?, ?, ?, ?, ?
        FROM orders o JOIN day_close_state s ON s.id = 1
        WHERE o.id = ? AND o.epoch = s.current_epoch
        RETURNING id, order_id, epoch, items, total_amount, payment_method, notes,
                  tip_amount, is_paid, created_at, updated_at
        "#,
    )
    .bind(items_json)
    .bind(data.total_amount)
    .bind(data.payment_method.as_str())
    .bind(data.notes)
    .bind(data.tip_amount)
    .bind(data.is_paid)
    .bind(now)
    .bind(now)
    .bind(data.order_id)
    .fetch_optional(pool)
    .await?;
    row.map(Receipt::try_from).transpose()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ReceiptWithOrder>> {
    let row: Option<ReceiptWithOrderRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS}, {ORDER_SNAPSHOT} AS order_snapshot \
         FROM receipt r LEFT JOIN orders o ON o.id = r.order_id WHERE r.id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(ReceiptWithOrder::try_from).transpose()
}

pub async fn exists_for_order(pool: &SqlitePool, order_id: i64) -> RepoResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM receipt WHERE order_id = ?")
        .bind(order_id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

/// Every live receipt with its order, oldest first
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<ReceiptWithOrder>> {
    let rows: Vec<ReceiptWithOrderRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS}, {ORDER_SNAPSHOT} AS order_snapshot \
         FROM receipt r LEFT JOIN orders o ON o.id = r.order_id \
         ORDER BY r.created_at, r.id"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(ReceiptWithOrder::try_from).collect()
}

/// Live receipts with `created_at` in `[start, end]`
pub async fn find_in_range(pool: &SqlitePool, start: i64, end: i64) -> RepoResult<Vec<ReceiptWithOrder>> {
    let rows: Vec<ReceiptWithOrderRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS}, {ORDER_SNAPSHOT} AS order_snapshot \
         FROM receipt r LEFT JOIN orders o ON o.id = r.order_id \
         WHERE r.created_at >= ? AND r.created_at <= ? \
         ORDER BY r.created_at, r.id"
    ))
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(ReceiptWithOrder::try_from).collect()
}

/// Receipts of one epoch (day-close collection step)
pub async fn find_by_epoch(conn: &mut SqliteConnection, epoch: i64) -> RepoResult<Vec<Receipt>> {
    let rows: Vec<ReceiptRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM receipt r WHERE r.epoch = ? ORDER BY r.id"
    ))
    .bind(epoch)
    .fetch_all(conn)
    .await?;
    rows.into_iter().map(Receipt::try_from).collect()
}

/// Payment-side fields that stay editable until day close
#[derive(Debug, Clone, Default)]
pub struct ReceiptPatch<'a> {
    pub payment_method: Option<&'a PaymentMethod>,
    pub notes: Option<&'a str>,
    pub tip_amount: Option<f64>,
    pub is_paid: Option<bool>,
}

/// Patch a receipt of the current epoch
///
/// Returns `false` when no row qualified (missing or closed).
pub async fn update_open(pool: &SqlitePool, id: i64, patch: &ReceiptPatch<'_>, now: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        r#"
        UPDATE receipt
        SET payment_method = COALESCE(?, payment_method),
            notes = COALESCE(?, notes),
            tip_amount = COALESCE(?, tip_amount),
            is_paid = COALESCE(?, is_paid),
            updated_at = ?
        WHERE id = ?
          AND epoch = (SELECT current_epoch FROM day_close_state WHERE id = 1)
        "#,
    )
    .bind(patch.payment_method.map(PaymentMethod::as_str))
    .bind(patch.notes)
    .bind(patch.tip_amount)
    .bind(patch.is_paid)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

pub async fn delete_by_epoch(conn: &mut SqliteConnection, epoch: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM receipt WHERE epoch = ?")
        .bind(epoch)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected())
}
