//! Order Repository
//!
//! Item lines are stored as one JSON document per order.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderItems};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, table_number, employee_id, items, epoch, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    table_number: i32,
    employee_id: String,
    items: String,
    epoch: i64,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            table_number: row.table_number,
            employee_id: row.employee_id,
            items: serde_json::from_str(&row.items)?,
            epoch: row.epoch,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insert an order stamped with the current ledger epoch
pub async fn create(
    pool: &SqlitePool,
    table_number: i32,
    employee_id: &str,
    items: &OrderItems,
    now: i64,
) -> RepoResult<Order> {
    let items_json = serde_json::to_string(items)?;
    let row: OrderRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO orders (table_number, employee_id, items, epoch, created_at, updated_at)
        SELECT ?, ?, ?, current_epoch, ?, ? FROM day_close_state WHERE id = 1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(table_number)
    .bind(employee_id)
    .bind(items_json)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    row.try_into()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let row: Option<OrderRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    row.map(Order::try_from).transpose()
}

/// All live orders, oldest first
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let rows: Vec<OrderRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM orders ORDER BY created_at, id"))
            .fetch_all(pool)
            .await?;
    rows.into_iter().map(Order::try_from).collect()
}

/// Patch an order that is still open in the current epoch and not checked out
///
/// Returns `false` when no row qualified; the caller decides why.
pub async fn update_open(
    pool: &SqlitePool,
    id: i64,
    table_number: Option<i32>,
    items: Option<&OrderItems>,
    now: i64,
) -> RepoResult<bool> {
    let items_json = items.map(serde_json::to_string).transpose()?;
    let rows = sqlx::query(
        r#"
        UPDATE orders
        SET table_number = COALESCE(?, table_number),
            items = COALESCE(?, items),
            updated_at = ?
        WHERE id = ?
          AND epoch = (SELECT current_epoch FROM day_close_state WHERE id = 1)
          AND NOT EXISTS (SELECT 1 FROM receipt WHERE receipt.order_id = orders.id)
        "#,
    )
    .bind(table_number)
    .bind(items_json)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// Drop every order of a closed epoch (their receipts must be gone first)
pub async fn delete_by_epoch(conn: &mut SqliteConnection, epoch: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM orders WHERE epoch = ?")
        .bind(epoch)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected())
}
