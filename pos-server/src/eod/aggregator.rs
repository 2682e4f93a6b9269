//! EoD aggregation
//!
//! Single pass over the closed day's receipts. All sums are accumulated as
//! `Decimal` and rounded to cents only when the metrics are produced.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{PaymentMethod, Receipt};

use crate::utils::money::{to_decimal, to_f64};

/// Paid revenue of one payment method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodTotal {
    pub method: String,
    pub amount: f64,
    pub count: i64,
}

/// Metrics of one business day
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EodMetrics {
    pub total_orders: i64,
    pub total_orders_not_paid: i64,
    pub cash_revenue: f64,
    pub card_revenue: f64,
    /// Paid receipts whose method is neither cash nor card
    pub other_revenue: f64,
    /// Unpaid receipts, whatever their method
    pub total_loss: f64,
    pub total_tips: f64,
    pub total_food_items: i64,
    pub total_beverage_items: i64,
    /// Ordered by method name
    pub payment_breakdowns: Vec<MethodTotal>,
}

impl EodMetrics {
    pub fn total_paid_orders(&self) -> i64 {
        self.total_orders - self.total_orders_not_paid
    }
}

#[derive(Default)]
struct Accumulator {
    total_orders: i64,
    not_paid: i64,
    cash: Decimal,
    card: Decimal,
    other: Decimal,
    loss: Decimal,
    tips: Decimal,
    food_items: i64,
    beverage_items: i64,
    by_method: BTreeMap<String, (Decimal, i64)>,
}

impl Accumulator {
    fn add(&mut self, receipt: &Receipt) {
        self.total_orders += 1;

        for item in &receipt.items {
            let quantity = i64::from(item.quantity);
            if item.category.is_beverage() {
                self.beverage_items += quantity;
            } else if item.category.is_food() {
                self.food_items += quantity;
            }
        }

        let amount = to_decimal(receipt.total_amount);
        if !receipt.is_paid {
            self.not_paid += 1;
            self.loss += amount;
            return;
        }

        match &receipt.payment_method {
            PaymentMethod::Cash => self.cash += amount,
            PaymentMethod::Card => self.card += amount,
            PaymentMethod::Other(_) => self.other += amount,
        }
        self.tips += to_decimal(receipt.tip_amount);

        let entry = self
            .by_method
            .entry(receipt.payment_method.as_str().to_string())
            .or_default();
        entry.0 += amount;
        entry.1 += 1;
    }

    fn finish(self) -> EodMetrics {
        EodMetrics {
            total_orders: self.total_orders,
            total_orders_not_paid: self.not_paid,
            cash_revenue: to_f64(self.cash),
            card_revenue: to_f64(self.card),
            other_revenue: to_f64(self.other),
            total_loss: to_f64(self.loss),
            total_tips: to_f64(self.tips),
            total_food_items: self.food_items,
            total_beverage_items: self.beverage_items,
            payment_breakdowns: self
                .by_method
                .into_iter()
                .map(|(method, (amount, count))| MethodTotal {
                    method,
                    amount: to_f64(amount),
                    count,
                })
                .collect(),
        }
    }
}

/// Compute the day metrics from the receipts being closed
pub fn aggregate<'a>(receipts: impl IntoIterator<Item = &'a Receipt>) -> EodMetrics {
    let mut acc = Accumulator::default();
    for receipt in receipts {
        acc.add(receipt);
    }
    acc.finish()
}
