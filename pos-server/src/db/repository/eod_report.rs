//! EoD Report Repository
//!
//! Reports are written once, inside the day-close transaction, and never
//! updated afterwards.

use std::collections::HashMap;

use super::RepoResult;
use crate::eod::EodMetrics;
use shared::models::{EodReport, PaymentMethodBreakdown};
use sqlx::{SqliteConnection, SqlitePool};

const SELECT: &str = "SELECT id, epoch, generated_at, total_orders, total_orders_not_paid, \
     cash_revenue, card_revenue, other_revenue, total_loss, total_tips, \
     total_food_items, total_beverage_items, generated_by_id, generated_by_name \
     FROM eod_report";

/// Who triggered the close
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratedBy<'a> {
    pub id: Option<&'a str>,
    pub name: Option<&'a str>,
}

/// Insert a report and its payment breakdowns, returning the new id
pub async fn insert(
    conn: &mut SqliteConnection,
    epoch: i64,
    generated_at: i64,
    metrics: &EodMetrics,
    generated_by: GeneratedBy<'_>,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO eod_report (epoch, generated_at, total_orders, total_orders_not_paid,
                                cash_revenue, card_revenue, other_revenue, total_loss, total_tips,
                                total_food_items, total_beverage_items,
                                generated_by_id, generated_by_name)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(epoch)
    .bind(generated_at)
    .bind(metrics.total_orders)
    .bind(metrics.total_orders_not_paid)
    .bind(metrics.cash_revenue)
    .bind(metrics.card_revenue)
    .bind(metrics.other_revenue)
    .bind(metrics.total_loss)
    .bind(metrics.total_tips)
    .bind(metrics.total_food_items)
    .bind(metrics.total_beverage_items)
    .bind(generated_by.id)
    .bind(generated_by.name)
    .fetch_one(&mut *conn)
    .await?;

    for breakdown in &metrics.payment_breakdowns {
        sqlx::query(
            "INSERT INTO eod_payment_breakdown (report_id, method, amount, count) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&breakdown.method)
        .bind(breakdown.amount)
        .bind(breakdown.count)
        .execute(&mut *conn)
        .await?;
    }

    Ok(id)
}

/// Attach payment breakdowns to a batch of reports (one query)
async fn with_breakdowns(pool: &SqlitePool, mut reports: Vec<EodReport>) -> RepoResult<Vec<EodReport>> {
    if reports.is_empty() {
        return Ok(reports);
    }
    let placeholders = vec!["?"; reports.len()].join(", ");
    let sql = format!(
        "SELECT id, report_id, method, amount, count FROM eod_payment_breakdown \
         WHERE report_id IN ({placeholders}) ORDER BY id"
    );
    let mut query = sqlx::query_as::<_, PaymentMethodBreakdown>(&sql);
    for report in &reports {
        query = query.bind(report.id);
    }
    let rows = query.fetch_all(pool).await?;

    let mut by_report: HashMap<i64, Vec<PaymentMethodBreakdown>> = HashMap::new();
    for row in rows {
        by_report.entry(row.report_id).or_default().push(row);
    }
    for report in &mut reports {
        report.payment_breakdowns = by_report.remove(&report.id).unwrap_or_default();
    }
    Ok(reports)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<EodReport>> {
    let report: Option<EodReport> = sqlx::query_as(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match report {
        Some(report) => Ok(with_breakdowns(pool, vec![report]).await?.pop()),
        None => Ok(None),
    }
}

/// All reports, newest first
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<EodReport>> {
    let reports: Vec<EodReport> =
        sqlx::query_as(&format!("{SELECT} ORDER BY generated_at DESC, id DESC"))
            .fetch_all(pool)
            .await?;
    with_breakdowns(pool, reports).await
}

/// Reports generated within `[start, end]`, oldest first
pub async fn find_between(pool: &SqlitePool, start: i64, end: i64) -> RepoResult<Vec<EodReport>> {
    let reports: Vec<EodReport> = sqlx::query_as(&format!(
        "{SELECT} WHERE generated_at >= ? AND generated_at <= ? ORDER BY generated_at, id"
    ))
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    with_breakdowns(pool, reports).await
}

/// Latest report generated within `[start, end]`
pub async fn find_latest_between(pool: &SqlitePool, start: i64, end: i64) -> RepoResult<Option<EodReport>> {
    let report: Option<EodReport> = sqlx::query_as(&format!(
        "{SELECT} WHERE generated_at >= ? AND generated_at <= ? \
         ORDER BY generated_at DESC, id DESC LIMIT 1"
    ))
    .bind(start)
    .bind(end)
    .fetch_optional(pool)
    .await?;
    match report {
        Some(report) => Ok(with_breakdowns(pool, vec![report]).await?.pop()),
        None => Ok(None),
    }
}
