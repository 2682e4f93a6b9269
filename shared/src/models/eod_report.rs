//! End-of-Day Report Model (日结报告)

use serde::{Deserialize, Serialize};

/// Payment method breakdown (independent table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaymentMethodBreakdown {
    pub id: i64,
    pub report_id: i64,
    /// Payment method name
    pub method: String,
    /// Total amount over paid receipts
    pub amount: f64,
    /// Number of paid receipts
    pub count: i64,
}

/// EoD Report - one per day close, immutable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EodReport {
    pub id: i64,
    /// Ledger epoch the report closed
    pub epoch: i64,
    /// When the report was generated (Unix millis)
    pub generated_at: i64,
    pub total_orders: i64,
    pub total_orders_not_paid: i64,
    pub cash_revenue: f64,
    pub card_revenue: f64,
    /// Paid revenue under unrecognized payment methods
    pub other_revenue: f64,
    /// Unpaid receipts' totals
    pub total_loss: f64,
    pub total_tips: f64,
    pub total_food_items: i64,
    pub total_beverage_items: i64,
    pub generated_by_id: Option<String>,
    pub generated_by_name: Option<String>,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub payment_breakdowns: Vec<PaymentMethodBreakdown>,
}

/// Totals across a range of reports (back-office dashboard)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EodSummary {
    pub start_date: String,
    pub end_date: String,
    pub report_count: i64,
    pub total_orders: i64,
    pub total_orders_not_paid: i64,
    pub total_paid_orders: i64,
    pub cash_revenue: f64,
    pub card_revenue: f64,
    pub other_revenue: f64,
    /// cash + card + other
    pub total_revenue: f64,
    pub total_loss: f64,
    pub total_tips: f64,
    pub total_food_items: i64,
    pub total_beverage_items: i64,
}
