//! Live orders
//!
//! Orders are taken by staff during the business day and deleted by the day
//! close that consumes their receipts. Once checked out an order is frozen:
//! the receipt holds the snapshot that counts.

use shared::error::ErrorCode;
use shared::models::{Order, OrderCreate, OrderUpdate};
use sqlx::SqlitePool;

use crate::auth::CurrentUser;
use crate::db::repository::{order, receipt};
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_order_items, validate_required_text};
use crate::utils::{AppError, AppResult};

fn order_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
        .with_detail("order_id", id)
}

fn validate_table_number(table_number: i32) -> AppResult<()> {
    if table_number < 0 {
        return Err(AppError::validation(format!(
            "table_number must not be negative, got {table_number}"
        )));
    }
    Ok(())
}

/// Create an order in the current business day
///
/// The owning employee defaults to the caller.
pub async fn create(
    pool: &SqlitePool,
    user: &CurrentUser,
    data: OrderCreate,
    now: i64,
) -> AppResult<Order> {
    validate_table_number(data.table_number)?;
    validate_order_items(&data.items)?;
    let employee_id = data.employee_id.unwrap_or_else(|| user.id.clone());
    validate_required_text(&employee_id, "employee_id", MAX_SHORT_TEXT_LEN)?;

    let order = order::create(pool, data.table_number, &employee_id, &data.items, now).await?;
    tracing::info!(order_id = order.id, table = order.table_number, epoch = order.epoch, "Order created");
    Ok(order)
}

/// Patch table number and/or items of an order that is still open
pub async fn update(pool: &SqlitePool, id: i64, data: OrderUpdate, now: i64) -> AppResult<Order> {
    if let Some(table_number) = data.table_number {
        validate_table_number(table_number)?;
    }
    if let Some(items) = &data.items {
        validate_order_items(items)?;
    }

    let updated = order::update_open(pool, id, data.table_number, data.items.as_ref(), now).await?;
    if !updated {
        let existing = order::find_by_id(pool, id)
            .await?
            .ok_or_else(|| order_not_found(id))?;
        if receipt::exists_for_order(pool, existing.id).await? {
            return Err(AppError::conflict(
                ErrorCode::OrderAlreadyCheckedOut,
                format!("Order {id} has already been checked out"),
            ));
        }
        return Err(AppError::conflict(
            ErrorCode::OrderClosed,
            format!("Order {id} belongs to a closed business day"),
        ));
    }

    get(pool, id).await
}

pub async fn get(pool: &SqlitePool, id: i64) -> AppResult<Order> {
    order::find_by_id(pool, id)
        .await?
        .ok_or_else(|| order_not_found(id))
}

pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Order>> {
    Ok(order::find_all(pool).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{OrderItems, OrderLine};

    fn waiter() -> CurrentUser {
        CurrentUser {
            id: "emp-1".into(),
            username: "ana".into(),
            role: "waiter".into(),
            permissions: vec![],
        }
    }

    fn items(item_ref: &str, quantity: i32) -> OrderItems {
        OrderItems {
            mains: vec![OrderLine {
                item_ref: item_ref.into(),
                quantity,
                size: None,
                extras: vec![],
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_defaults_employee_to_caller() {
        let db = DbService::in_memory().await.unwrap();
        let order = create(
            &db.pool,
            &waiter(),
            OrderCreate {
                table_number: 4,
                employee_id: None,
                items: items("burger", 2),
            },
            1_000,
        )
        .await
        .unwrap();

        assert_eq!(order.employee_id, "emp-1");
        assert_eq!(order.epoch, 1);
        assert_eq!(get(&db.pool, order.id).await.unwrap(), order);
    }

    #[tokio::test]
    async fn test_invalid_quantity_rejected_before_insert() {
        let db = DbService::in_memory().await.unwrap();
        let err = create(
            &db.pool,
            &waiter(),
            OrderCreate {
                table_number: 4,
                employee_id: None,
                items: items("burger", 0),
            },
            1_000,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(list(&db.pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_missing_order() {
        let db = DbService::in_memory().await.unwrap();
        let order = create(
            &db.pool,
            &waiter(),
            OrderCreate {
                table_number: 4,
                employee_id: None,
                items: items("burger", 1),
            },
            1_000,
        )
        .await
        .unwrap();

        let updated = update(
            &db.pool,
            order.id,
            OrderUpdate {
                table_number: Some(9),
                items: None,
            },
            2_000,
        )
        .await
        .unwrap();
        assert_eq!(updated.table_number, 9);
        assert_eq!(updated.items, order.items);
        assert_eq!(updated.updated_at, 2_000);

        let err = update(&db.pool, 999, OrderUpdate::default(), 3_000)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }
}
