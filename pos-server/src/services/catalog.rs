//! Catalog lookup
//!
//! The menu is maintained by the menu back office; checkout only needs to
//! resolve the item references found on an order.

use async_trait::async_trait;
use shared::error::ErrorCode;
use shared::models::CatalogItem;
use sqlx::SqlitePool;

use crate::db::repository::catalog;
use crate::utils::{AppError, AppResult};

/// Resolves item references to name, category and price
#[async_trait]
pub trait Catalog: Send + Sync + std::fmt::Debug {
    /// `CatalogItemNotFound` when the reference is unknown
    async fn resolve(&self, item_ref: &str) -> AppResult<CatalogItem>;
}

/// Catalog backed by the `catalog_item` table
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn resolve(&self, item_ref: &str) -> AppResult<CatalogItem> {
        catalog::find_by_ref(&self.pool, item_ref)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::CatalogItemNotFound,
                    format!("Catalog item '{item_ref}' not found"),
                )
                .with_detail("item_ref", item_ref)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::ItemCategory;

    #[tokio::test]
    async fn test_resolve_known_and_unknown_items() {
        let db = DbService::in_memory().await.unwrap();
        catalog::upsert(
            &db.pool,
            &CatalogItem {
                item_ref: "cola".into(),
                name: "Cola".into(),
                category: ItemCategory::Drink,
                price: 2.5,
            },
        )
        .await
        .unwrap();

        let catalog = SqliteCatalog::new(db.pool.clone());
        let item = catalog.resolve("cola").await.unwrap();
        assert_eq!(item.name, "Cola");
        assert_eq!(item.category, ItemCategory::Drink);

        let err = catalog.resolve("ghost").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CatalogItemNotFound);
    }
}
