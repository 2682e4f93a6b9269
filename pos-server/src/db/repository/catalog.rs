//! Catalog Repository

use super::RepoResult;
use shared::models::CatalogItem;
use sqlx::SqlitePool;

pub async fn find_by_ref(pool: &SqlitePool, item_ref: &str) -> RepoResult<Option<CatalogItem>> {
    let item = sqlx::query_as::<_, CatalogItem>(
        "SELECT item_ref, name, category, price FROM catalog_item WHERE item_ref = ?",
    )
    .bind(item_ref)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

/// Insert or replace an item (menu sync / seeding)
pub async fn upsert(pool: &SqlitePool, item: &CatalogItem) -> RepoResult<()> {
    sqlx::query(
        r#"
        INSERT INTO catalog_item (item_ref, name, category, price)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (item_ref)
        DO UPDATE SET name = excluded.name, category = excluded.category, price = excluded.price
        "#,
    )
    .bind(&item.item_ref)
    .bind(&item.name)
    .bind(item.category)
    .bind(item.price)
    .execute(pool)
    .await?;
    Ok(())
}
