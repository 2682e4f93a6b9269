//! Receipt Model (小票)

use super::catalog::ItemCategory;
use super::order::Order;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment method recorded on a receipt
///
/// Known spellings collapse onto `Cash` / `Card`; anything else is kept
/// verbatim so its revenue still shows up in the report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    Cash,
    Card,
    Other(String),
}

impl PaymentMethod {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "cash" => Self::Cash,
            "card" | "credit card" | "debit card" => Self::Card,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved extra on a receipt line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptExtra {
    pub item_ref: String,
    pub name: String,
    pub price: f64,
}

/// Item snapshot taken at checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub item_ref: String,
    pub name: String,
    pub category: ItemCategory,
    pub unit_price: f64,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default)]
    pub extras: Vec<ReceiptExtra>,
    /// (unit_price + Σ extras) × quantity
    pub line_total: f64,
}

/// Live receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: i64,
    /// Set once at checkout
    pub order_id: i64,
    pub epoch: i64,
    pub items: Vec<ReceiptItem>,
    /// Computed once at checkout from `items`
    pub total_amount: f64,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    #[serde(default)]
    pub tip_amount: f64,
    #[serde(default)]
    pub is_paid: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Checkout payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptCreate {
    pub order_id: i64,
    pub payment_method: String,
    pub notes: Option<String>,
    pub tip_amount: Option<f64>,
    pub is_paid: Option<bool>,
}

/// Payment update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptUpdate {
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub tip_amount: Option<f64>,
    pub is_paid: Option<bool>,
}

/// Receipt consumed by a day close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedReceipt {
    #[serde(flatten)]
    pub receipt: Receipt,
    /// Order as it was when the day closed
    pub order: Option<Order>,
    pub report_id: i64,
    pub archived_at: i64,
}

/// Receipt with its order resolved, live or archived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptWithOrder {
    #[serde(flatten)]
    pub receipt: Receipt,
    pub order: Option<Order>,
    /// Present when the receipt has been archived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<i64>,
}

impl From<ArchivedReceipt> for ReceiptWithOrder {
    fn from(archived: ArchivedReceipt) -> Self {
        Self {
            receipt: archived.receipt,
            order: archived.order,
            archived_at: Some(archived.archived_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_aliases() {
        assert_eq!(PaymentMethod::parse("Cash"), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::parse(" cash "), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::parse("Card"), PaymentMethod::Card);
        assert_eq!(PaymentMethod::parse("Credit Card"), PaymentMethod::Card);
        assert_eq!(PaymentMethod::parse("debit card"), PaymentMethod::Card);
        assert_eq!(
            PaymentMethod::parse("Voucher"),
            PaymentMethod::Other("Voucher".into())
        );
    }

    #[test]
    fn test_payment_method_serde_as_string() {
        let json = serde_json::to_string(&PaymentMethod::Card).unwrap();
        assert_eq!(json, "\"Card\"");
        let method: PaymentMethod = serde_json::from_str("\"Credit Card\"").unwrap();
        assert_eq!(method, PaymentMethod::Card);
        let method: PaymentMethod = serde_json::from_str("\"Bizum\"").unwrap();
        assert_eq!(method.to_string(), "Bizum");
    }
}
