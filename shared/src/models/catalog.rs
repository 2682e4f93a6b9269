//! Catalog Model (菜单条目)
//!
//! Catalog items are maintained by the menu back office. The day-close core
//! only resolves references against them.

use serde::{Deserialize, Serialize};

/// Menu category an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum ItemCategory {
    Drink,
    Starter,
    Main,
    Side,
    Dessert,
    /// Add-ons referenced from an order line's extras
    Extra,
}

impl ItemCategory {
    /// Beverage items feed `total_beverage_items`
    pub fn is_beverage(&self) -> bool {
        matches!(self, Self::Drink)
    }

    /// Dish items feed `total_food_items`
    pub fn is_food(&self) -> bool {
        matches!(
            self,
            Self::Starter | Self::Main | Self::Side | Self::Dessert
        )
    }
}

/// Resolved catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CatalogItem {
    pub item_ref: String,
    pub name: String,
    pub category: ItemCategory,
    /// Unit price in currency unit
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_classification() {
        assert!(ItemCategory::Drink.is_beverage());
        assert!(!ItemCategory::Drink.is_food());
        for category in [
            ItemCategory::Starter,
            ItemCategory::Main,
            ItemCategory::Side,
            ItemCategory::Dessert,
        ] {
            assert!(category.is_food());
            assert!(!category.is_beverage());
        }
        assert!(!ItemCategory::Extra.is_food());
        assert!(!ItemCategory::Extra.is_beverage());
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ItemCategory::Dessert).unwrap();
        assert_eq!(json, "\"dessert\"");
    }
}
