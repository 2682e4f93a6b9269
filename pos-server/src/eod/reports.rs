//! EoD report queries
//!
//! Date arguments are interpreted in the business time zone.

use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::error::ErrorCode;
use shared::models::{EodReport, EodSummary};
use sqlx::SqlitePool;

use crate::db::repository::eod_report;
use crate::utils::money::{to_decimal, to_f64};
use crate::utils::time::{day_end_millis, day_start_millis};
use crate::utils::{AppError, AppResult};

/// All reports, newest first
pub async fn list(pool: &SqlitePool) -> AppResult<Vec<EodReport>> {
    Ok(eod_report::find_all(pool).await?)
}

pub async fn get(pool: &SqlitePool, id: i64) -> AppResult<EodReport> {
    eod_report::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::EodReportNotFound, format!("EoD report {id} not found"))
            .with_detail("report_id", id)
    })
}

/// Latest report generated during `date` (00:00:00.000 to 23:59:59.999 local)
pub async fn for_date(pool: &SqlitePool, date: NaiveDate, tz: Tz) -> AppResult<EodReport> {
    let start = day_start_millis(date, tz);
    let end = day_end_millis(date, tz);
    eod_report::find_latest_between(pool, start, end)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::EodReportNotFound,
                format!("No EoD report generated on {date}"),
            )
            .with_detail("date", date.to_string())
        })
}

/// Totals across the reports generated between two dates (inclusive)
pub async fn summary(
    pool: &SqlitePool,
    start_date: NaiveDate,
    end_date: NaiveDate,
    tz: Tz,
) -> AppResult<EodSummary> {
    if start_date > end_date {
        return Err(AppError::validation(format!(
            "start_date {start_date} is after end_date {end_date}"
        )));
    }
    let reports = eod_report::find_between(
        pool,
        day_start_millis(start_date, tz),
        day_end_millis(end_date, tz),
    )
    .await?;

    Ok(summarize(&reports, start_date, end_date))
}

fn summarize(reports: &[EodReport], start_date: NaiveDate, end_date: NaiveDate) -> EodSummary {
    let mut cash = Decimal::ZERO;
    let mut card = Decimal::ZERO;
    let mut other = Decimal::ZERO;
    let mut loss = Decimal::ZERO;
    let mut tips = Decimal::ZERO;
    let mut summary = EodSummary {
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
        report_count: reports.len() as i64,
        ..Default::default()
    };

    for report in reports {
        summary.total_orders += report.total_orders;
        summary.total_orders_not_paid += report.total_orders_not_paid;
        summary.total_food_items += report.total_food_items;
        summary.total_beverage_items += report.total_beverage_items;
        cash += to_decimal(report.cash_revenue);
        card += to_decimal(report.card_revenue);
        other += to_decimal(report.other_revenue);
        loss += to_decimal(report.total_loss);
        tips += to_decimal(report.total_tips);
    }

    summary.total_paid_orders = summary.total_orders - summary.total_orders_not_paid;
    summary.cash_revenue = to_f64(cash);
    summary.card_revenue = to_f64(card);
    summary.other_revenue = to_f64(other);
    summary.total_revenue = to_f64(cash + card + other);
    summary.total_loss = to_f64(loss);
    summary.total_tips = to_f64(tips);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(id: i64, cash: f64, card: f64, other: f64, orders: i64, not_paid: i64) -> EodReport {
        EodReport {
            id,
            epoch: id,
            generated_at: id * 1_000,
            total_orders: orders,
            total_orders_not_paid: not_paid,
            cash_revenue: cash,
            card_revenue: card,
            other_revenue: other,
            total_loss: 1.5,
            total_tips: 0.25,
            total_food_items: 3,
            total_beverage_items: 2,
            generated_by_id: None,
            generated_by_name: None,
            payment_breakdowns: vec![],
        }
    }

    #[test]
    fn test_summarize_adds_up_reports() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let reports = vec![report(1, 10.1, 20.2, 0.0, 4, 1), report(2, 0.2, 5.0, 3.3, 3, 0)];

        let summary = summarize(&reports, start, end);

        assert_eq!(summary.report_count, 2);
        assert_eq!(summary.total_orders, 7);
        assert_eq!(summary.total_paid_orders, 6);
        assert_eq!(summary.cash_revenue, 10.3);
        assert_eq!(summary.card_revenue, 25.2);
        assert_eq!(summary.other_revenue, 3.3);
        assert_eq!(summary.total_revenue, 38.8);
        assert_eq!(summary.total_loss, 3.0);
        assert_eq!(summary.total_tips, 0.5);
        assert_eq!(summary.total_food_items, 6);
        assert_eq!(summary.start_date, "2024-06-01");
    }

    #[test]
    fn test_summarize_empty_range() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let summary = summarize(&[], day, day);
        assert_eq!(summary.report_count, 0);
        assert_eq!(summary.total_revenue, 0.0);
    }
}
