//! Receipt lifecycle
//!
//! A receipt is created once per order at checkout. The item snapshot and
//! `total_amount` are fixed at that moment; the payment side (method, notes,
//! tip, paid flag) stays editable until the day is closed. After the close
//! the receipt lives on in the archive.

use rust_decimal::Decimal;
use shared::error::ErrorCode;
use shared::models::{
    OrderItems, PaymentMethod, Receipt, ReceiptCreate, ReceiptExtra, ReceiptItem, ReceiptUpdate,
    ReceiptWithOrder,
};
use sqlx::SqlitePool;

use crate::db::repository::receipt::{NewReceipt, ReceiptPatch};
use crate::db::repository::{RepoError, archived_receipt, order, receipt};
use crate::services::Catalog;
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_PAYMENT_METHOD_LEN, validate_amount, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, money};

fn receipt_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ReceiptNotFound, format!("Receipt {id} not found"))
        .with_detail("receipt_id", id)
}

fn already_checked_out(order_id: i64) -> AppError {
    AppError::conflict(
        ErrorCode::OrderAlreadyCheckedOut,
        format!("Order {order_id} has already been checked out"),
    )
    .with_detail("order_id", order_id)
}

/// Resolve every order line against the catalog
///
/// Returns the snapshot lines and the exact total. Each line keeps the
/// catalog's category, whatever group it was ordered under.
pub async fn snapshot_items(
    catalog: &dyn Catalog,
    items: &OrderItems,
) -> AppResult<(Vec<ReceiptItem>, Decimal)> {
    let mut snapshot = Vec::new();
    let mut total = Decimal::ZERO;

    for (group, line) in items.lines() {
        let item = catalog.resolve(&line.item_ref).await?;
        if item.category != group {
            tracing::debug!(
                item_ref = %item.item_ref,
                ?group,
                category = ?item.category,
                "Order line grouped outside its catalog category"
            );
        }
        let mut extras = Vec::with_capacity(line.extras.len());
        for extra_ref in &line.extras {
            let extra = catalog.resolve(extra_ref).await?;
            extras.push(ReceiptExtra {
                item_ref: extra.item_ref,
                name: extra.name,
                price: extra.price,
            });
        }

        let line_total = money::line_total(
            item.price,
            extras.iter().map(|e| e.price),
            line.quantity,
        );
        total += line_total;

        snapshot.push(ReceiptItem {
            item_ref: item.item_ref,
            name: item.name,
            category: item.category,
            unit_price: item.price,
            quantity: line.quantity,
            size: line.size.clone(),
            extras,
            line_total: money::to_f64(line_total),
        });
    }

    Ok((snapshot, total))
}

/// Check an order out into a receipt
pub async fn checkout(
    pool: &SqlitePool,
    catalog: &dyn Catalog,
    data: ReceiptCreate,
    now: i64,
) -> AppResult<Receipt> {
    validate_required_text(&data.payment_method, "payment_method", MAX_PAYMENT_METHOD_LEN)?;
    validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
    let tip_amount = data.tip_amount.unwrap_or(0.0);
    validate_amount(tip_amount, "tip_amount")?;

    let order = order::find_by_id(pool, data.order_id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::OrderNotFound,
            format!("Order {} not found", data.order_id),
        )
        .with_detail("order_id", data.order_id)
    })?;
    if receipt::exists_for_order(pool, order.id).await? {
        return Err(already_checked_out(order.id));
    }

    let (items, total) = snapshot_items(catalog, &order.items).await?;
    let payment_method = PaymentMethod::parse(&data.payment_method);
    let new_receipt = NewReceipt {
        order_id: order.id,
        items: &items,
        total_amount: money::to_f64(total),
        payment_method: &payment_method,
        notes: data.notes.as_deref(),
        tip_amount: money::to_f64(money::to_decimal(tip_amount)),
        is_paid: data.is_paid.unwrap_or(false),
    };

    match receipt::insert(pool, &new_receipt, now).await {
        Ok(Some(receipt)) => {
            tracing::info!(
                receipt_id = receipt.id,
                order_id = receipt.order_id,
                total = receipt.total_amount,
                method = %receipt.payment_method,
                "Order checked out"
            );
            Ok(receipt)
        }
        Ok(None) => Err(AppError::conflict(
            ErrorCode::OrderClosed,
            format!("Order {} belongs to a closed business day", order.id),
        )),
        Err(RepoError::Duplicate(_)) => Err(already_checked_out(order.id)),
        Err(e) => Err(e.into()),
    }
}

/// Update the payment side of a receipt of the current business day
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: ReceiptUpdate,
    now: i64,
) -> AppResult<ReceiptWithOrder> {
    if let Some(method) = &data.payment_method {
        validate_required_text(method, "payment_method", MAX_PAYMENT_METHOD_LEN)?;
    }
    validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
    if let Some(tip) = data.tip_amount {
        validate_amount(tip, "tip_amount")?;
    }

    let payment_method = data.payment_method.as_deref().map(PaymentMethod::parse);
    let patch = ReceiptPatch {
        payment_method: payment_method.as_ref(),
        notes: data.notes.as_deref(),
        tip_amount: data.tip_amount.map(|t| money::to_f64(money::to_decimal(t))),
        is_paid: data.is_paid,
    };

    if !receipt::update_open(pool, id, &patch, now).await? {
        let exists = receipt::find_by_id(pool, id).await?.is_some()
            || archived_receipt::find_by_id(pool, id).await?.is_some();
        if exists {
            return Err(AppError::conflict(
                ErrorCode::ReceiptClosed,
                format!("Receipt {id} belongs to a closed business day"),
            )
            .with_detail("receipt_id", id));
        }
        return Err(receipt_not_found(id));
    }

    get(pool, id).await
}

/// Live receipt, or its archived copy once the day was closed
pub async fn get(pool: &SqlitePool, id: i64) -> AppResult<ReceiptWithOrder> {
    if let Some(live) = receipt::find_by_id(pool, id).await? {
        return Ok(live);
    }
    archived_receipt::find_by_id(pool, id)
        .await?
        .map(ReceiptWithOrder::from)
        .ok_or_else(|| receipt_not_found(id))
}

/// Receipts not yet consumed by a day close
pub async fn list_live(pool: &SqlitePool) -> AppResult<Vec<ReceiptWithOrder>> {
    Ok(receipt::find_all(pool).await?)
}

/// Live and archived receipts with `created_at` in `[start, end]`, oldest first
///
/// A range without receipts is an empty list, not an error.
pub async fn find_in_range(pool: &SqlitePool, start: i64, end: i64) -> AppResult<Vec<ReceiptWithOrder>> {
    if start > end {
        return Err(AppError::validation(
            "startDate must not be after endDate",
        ));
    }

    let mut receipts = receipt::find_in_range(pool, start, end).await?;
    receipts.extend(
        archived_receipt::find_in_range(pool, start, end)
            .await?
            .into_iter()
            .map(ReceiptWithOrder::from),
    );
    receipts.sort_by_key(|r| (r.receipt.created_at, r.receipt.id));
    Ok(receipts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::catalog;
    use crate::services::SqliteCatalog;
    use shared::models::{CatalogItem, ItemCategory, OrderLine};

    async fn seeded() -> (DbService, SqliteCatalog) {
        let db = DbService::in_memory().await.unwrap();
        for (item_ref, category, price) in [
            ("cola", ItemCategory::Drink, 2.5),
            ("burger", ItemCategory::Main, 9.9),
            ("cheese", ItemCategory::Extra, 0.7),
        ] {
            catalog::upsert(
                &db.pool,
                &CatalogItem {
                    item_ref: item_ref.into(),
                    name: item_ref.to_uppercase(),
                    category,
                    price,
                },
            )
            .await
            .unwrap();
        }
        let catalog = SqliteCatalog::new(db.pool.clone());
        (db, catalog)
    }

    fn line(item_ref: &str, quantity: i32, extras: &[&str]) -> OrderLine {
        OrderLine {
            item_ref: item_ref.into(),
            quantity,
            size: None,
            extras: extras.iter().map(|e| e.to_string()).collect(),
        }
    }

    async fn new_order(db: &DbService, items: OrderItems) -> i64 {
        order::create(&db.pool, 3, "emp-1", &items, 1_000)
            .await
            .unwrap()
            .id
    }

    fn create(order_id: i64, method: &str) -> ReceiptCreate {
        ReceiptCreate {
            order_id,
            payment_method: method.into(),
            notes: None,
            tip_amount: None,
            is_paid: None,
        }
    }

    #[tokio::test]
    async fn test_checkout_snapshots_prices() {
        let (db, catalog) = seeded().await;
        let order_id = new_order(
            &db,
            OrderItems {
                drinks: vec![line("cola", 3, &[])],
                mains: vec![line("burger", 2, &["cheese"])],
                ..Default::default()
            },
        )
        .await;

        let receipt = checkout(&db.pool, &catalog, create(order_id, "credit card"), 2_000)
            .await
            .unwrap();

        // 3 × 2.5 + 2 × (9.9 + 0.7)
        assert_eq!(receipt.total_amount, 28.7);
        assert_eq!(receipt.payment_method, PaymentMethod::Card);
        assert!(!receipt.is_paid);
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.items[1].extras[0].name, "CHEESE");
        assert_eq!(receipt.items[1].line_total, 21.2);

        // later price changes do not touch the snapshot
        catalog::upsert(
            &db.pool,
            &CatalogItem {
                item_ref: "burger".into(),
                name: "BURGER".into(),
                category: ItemCategory::Main,
                price: 12.0,
            },
        )
        .await
        .unwrap();
        let stored = get(&db.pool, receipt.id).await.unwrap();
        assert_eq!(stored.receipt.total_amount, 28.7);
        assert_eq!(stored.order.unwrap().id, order_id);
    }

    #[tokio::test]
    async fn test_snapshot_keeps_catalog_category() {
        let (_db, catalog) = seeded().await;
        let items = OrderItems {
            mains: vec![line("cola", 2, &[]), line("cheese", 1, &[])],
            ..Default::default()
        };

        let (snapshot, total) = snapshot_items(&catalog, &items).await.unwrap();
        assert_eq!(snapshot[0].category, ItemCategory::Drink);
        assert_eq!(snapshot[1].category, ItemCategory::Extra);
        assert_eq!(total, Decimal::new(57, 1));
    }

    #[tokio::test]
    async fn test_checkout_after_epoch_advance_is_fenced() {
        use crate::db::repository::day_close;

        let (db, catalog) = seeded().await;
        let items = OrderItems {
            drinks: vec![line("cola", 1, &[])],
            ..Default::default()
        };
        let stale = new_order(&db, items.clone()).await;

        // a close claims and commits its report transaction first
        assert!(day_close::claim(&db.pool, 1_500).await.unwrap());
        let mut tx = db.pool.begin().await.unwrap();
        let closed_epoch = day_close::advance_epoch(&mut tx, 1_500).await.unwrap();
        tx.commit().await.unwrap();

        let err = checkout(&db.pool, &catalog, create(stale, "cash"), 2_000)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderClosed);

        let fresh = new_order(&db, items).await;
        let accepted = checkout(&db.pool, &catalog, create(fresh, "cash"), 2_000)
            .await
            .unwrap();
        assert_eq!(accepted.epoch, closed_epoch + 1);
        assert!(
            receipt::find_by_epoch(&mut *db.pool.acquire().await.unwrap(), closed_epoch)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_second_checkout_conflicts() {
        let (db, catalog) = seeded().await;
        let order_id = new_order(&db, OrderItems::default()).await;

        let receipt = checkout(&db.pool, &catalog, create(order_id, "Cash"), 2_000)
            .await
            .unwrap();
        assert_eq!(receipt.total_amount, 0.0);

        let err = checkout(&db.pool, &catalog, create(order_id, "Cash"), 2_100)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderAlreadyCheckedOut);
    }

    #[tokio::test]
    async fn test_unknown_catalog_item_leaves_no_receipt() {
        let (db, catalog) = seeded().await;
        let order_id = new_order(
            &db,
            OrderItems {
                desserts: vec![line("tiramisu", 1, &[])],
                ..Default::default()
            },
        )
        .await;

        let err = checkout(&db.pool, &catalog, create(order_id, "Cash"), 2_000)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CatalogItemNotFound);
        assert!(list_live(&db.pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_payment_fields() {
        let (db, catalog) = seeded().await;
        let order_id = new_order(
            &db,
            OrderItems {
                drinks: vec![line("cola", 1, &[])],
                ..Default::default()
            },
        )
        .await;
        let receipt = checkout(&db.pool, &catalog, create(order_id, "Cash"), 2_000)
            .await
            .unwrap();

        let updated = update(
            &db.pool,
            receipt.id,
            ReceiptUpdate {
                payment_method: Some("Bizum".into()),
                notes: Some("table by the window".into()),
                tip_amount: Some(1.5),
                is_paid: Some(true),
            },
            3_000,
        )
        .await
        .unwrap();

        assert_eq!(updated.receipt.payment_method, PaymentMethod::Other("Bizum".into()));
        assert_eq!(updated.receipt.tip_amount, 1.5);
        assert!(updated.receipt.is_paid);
        assert_eq!(updated.receipt.total_amount, 2.5);
        assert_eq!(updated.receipt.updated_at, 3_000);

        let err = update(&db.pool, 404, ReceiptUpdate::default(), 3_000)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ReceiptNotFound);

        let err = update(
            &db.pool,
            receipt.id,
            ReceiptUpdate {
                tip_amount: Some(-1.0),
                ..Default::default()
            },
            3_000,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_range_is_inclusive() {
        let (db, catalog) = seeded().await;
        for (i, at) in [1_000_i64, 2_000, 3_000].into_iter().enumerate() {
            let order_id = new_order(&db, OrderItems::default()).await;
            let receipt = checkout(&db.pool, &catalog, create(order_id, "Cash"), at)
                .await
                .unwrap();
            assert_eq!(receipt.order_id, order_id, "receipt {i}");
        }

        let found = find_in_range(&db.pool, 1_000, 2_000).await.unwrap();
        let times: Vec<_> = found.iter().map(|r| r.receipt.created_at).collect();
        assert_eq!(times, vec![1_000, 2_000]);

        assert!(find_in_range(&db.pool, 5_000, 6_000).await.unwrap().is_empty());
        assert!(find_in_range(&db.pool, 3_000, 1_000).await.is_err());
    }
}
