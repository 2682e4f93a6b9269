//! 时间工具函数 (业务时区转换)
//!
//! 所有日期→时间戳转换统一在 API handler / service 层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use shared::models::MonthKey;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 年月日 → NaiveDate
pub fn date_from_ymd(year: i32, month: u32, day: u32) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        AppError::validation(format!("Invalid date: {year:04}-{month:02}-{day:02}"))
    })
}

/// 日期 + 时间 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn date_time_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期开始 (00:00:00.000) → Unix millis (业务时区)
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_time_to_millis(date, NaiveTime::MIN, tz)
}

/// 日期结束 (23:59:59.999) → Unix millis (业务时区)，闭区间
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    match date.succ_opt() {
        Some(next) => day_start_millis(next, tz) - 1,
        None => day_start_millis(date, tz) + 86_400_000 - 1,
    }
}

/// Range bound given as `YYYY-MM-DD` or RFC 3339
///
/// A bare date expands to the start of the day for a lower bound and to
/// 23:59:59.999 for an upper bound.
pub fn parse_range_bound(raw: &str, field: &str, upper: bool, tz: Tz) -> AppResult<i64> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(if upper {
            day_end_millis(date, tz)
        } else {
            day_start_millis(date, tz)
        });
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| {
            AppError::with_message(
                shared::error::ErrorCode::InvalidFormat,
                format!("{field} must be YYYY-MM-DD or RFC 3339, got '{raw}'"),
            )
            .with_detail("field", field)
        })
}

/// 时间戳所在的自然月 (业务时区)
pub fn month_key_of(millis: i64, tz: Tz) -> AppResult<MonthKey> {
    let local = tz
        .timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| AppError::validation(format!("Timestamp out of range: {millis}")))?;
    MonthKey::new(local.year(), local.month())
        .ok_or_else(|| AppError::internal(format!("No month key for {millis}")))
}

/// 解析时刻字符串 (HH:MM)
pub fn parse_hh_mm(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time '{value}', expected HH:MM")))
}

/// 距离下一次本地时刻 `at` 的时长 (业务时区)
pub fn duration_until_next(at: NaiveTime, tz: Tz) -> std::time::Duration {
    let now = chrono::Utc::now().with_timezone(&tz);
    let today = now.date_naive();
    let target_date = if now.time() >= at {
        today + chrono::Duration::days(1)
    } else {
        today
    };
    let target = date_time_to_millis(target_date, at, tz);
    let millis = target - now.timestamp_millis();
    if millis <= 0 {
        std::time::Duration::from_secs(60)
    } else {
        std::time::Duration::from_millis(millis as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MADRID: Tz = chrono_tz::Europe::Madrid;

    #[test]
    fn test_day_bounds_are_inclusive() {
        let date = parse_date("2024-06-01").unwrap();
        let start = day_start_millis(date, chrono_tz::UTC);
        let end = day_end_millis(date, chrono_tz::UTC);
        assert_eq!(start, 1_717_200_000_000);
        assert_eq!(end - start, 86_400_000 - 1);
    }

    #[test]
    fn test_day_bounds_in_business_timezone() {
        // Madrid is UTC+2 in June
        let date = parse_date("2024-06-01").unwrap();
        assert_eq!(day_start_millis(date, MADRID), 1_717_200_000_000 - 2 * 3_600_000);
    }

    #[test]
    fn test_parse_range_bound() {
        let lower = parse_range_bound("2024-06-01", "startDate", false, chrono_tz::UTC).unwrap();
        let upper = parse_range_bound("2024-06-01", "endDate", true, chrono_tz::UTC).unwrap();
        assert_eq!(upper - lower, 86_399_999);

        let exact =
            parse_range_bound("2024-06-01T10:00:00Z", "startDate", false, MADRID).unwrap();
        assert_eq!(exact, 1_717_236_000_000);

        let err = parse_range_bound("yesterday", "startDate", false, MADRID).unwrap_err();
        assert_eq!(err.code, shared::error::ErrorCode::InvalidFormat);
    }

    #[test]
    fn test_month_key_uses_local_month() {
        // 2024-05-31T23:30:00Z is already June in Madrid
        let millis = 1_717_198_200_000;
        assert_eq!(month_key_of(millis, chrono_tz::UTC).unwrap().to_string(), "2024-05");
        assert_eq!(month_key_of(millis, MADRID).unwrap().to_string(), "2024-06");
    }

    #[test]
    fn test_invalid_ymd() {
        assert!(date_from_ymd(2024, 2, 30).is_err());
        assert!(date_from_ymd(2024, 13, 1).is_err());
        assert!(date_from_ymd(2024, 2, 29).is_ok());
    }

    #[test]
    fn test_parse_hh_mm() {
        assert_eq!(
            parse_hh_mm("04:30").unwrap(),
            NaiveTime::from_hms_opt(4, 30, 0).unwrap()
        );
        assert!(parse_hh_mm("4h").is_err());
    }
}
