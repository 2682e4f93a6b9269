//! Order Model (点单)

use super::catalog::ItemCategory;
use serde::{Deserialize, Serialize};

/// One requested item within an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Catalog item reference
    pub item_ref: String,
    pub quantity: i32,
    /// Size label (drinks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Catalog references of added extras
    #[serde(default)]
    pub extras: Vec<String>,
}

/// Order lines grouped per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderItems {
    #[serde(default)]
    pub drinks: Vec<OrderLine>,
    #[serde(default)]
    pub starters: Vec<OrderLine>,
    #[serde(default)]
    pub mains: Vec<OrderLine>,
    #[serde(default)]
    pub sides: Vec<OrderLine>,
    #[serde(default)]
    pub desserts: Vec<OrderLine>,
}

impl OrderItems {
    /// Iterate every line together with the category it was ordered under
    pub fn lines(&self) -> impl Iterator<Item = (ItemCategory, &OrderLine)> {
        let groups = [
            (ItemCategory::Drink, &self.drinks),
            (ItemCategory::Starter, &self.starters),
            (ItemCategory::Main, &self.mains),
            (ItemCategory::Side, &self.sides),
            (ItemCategory::Dessert, &self.desserts),
        ];
        groups
            .into_iter()
            .flat_map(|(category, lines)| lines.iter().map(move |line| (category, line)))
    }

    pub fn is_empty(&self) -> bool {
        self.lines().next().is_none()
    }
}

/// Live order for a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub table_number: i32,
    /// Owning employee
    pub employee_id: String,
    pub items: OrderItems,
    /// Business-day epoch the order was created in
    pub epoch: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_number: i32,
    /// Defaults to the authenticated employee
    pub employee_id: Option<String>,
    #[serde(default)]
    pub items: OrderItems,
}

/// Update order payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub table_number: Option<i32>,
    pub items: Option<OrderItems>,
}
