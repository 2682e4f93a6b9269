//! Time Ledger Model (员工工时)
//!
//! Per-employee shift intervals filed by calendar month, plus the monthly
//! worked-time totals derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar month key, rendered as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Returns `None` unless `month` is in `1..=12`
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid month key '{s}', expected YYYY-MM"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in month key '{s}'"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month in month key '{s}'"))?;
        Self::new(year, month).ok_or_else(|| format!("Month out of range in '{s}'"))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// Whole hours and minutes, leftover seconds truncated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkedTime {
    pub hours: i64,
    pub minutes: i64,
}

impl WorkedTime {
    /// Convert a millisecond total: millis → whole seconds → hours + minutes
    pub fn from_millis(total_millis: i64) -> Self {
        let seconds = total_millis.max(0) / 1000;
        Self {
            hours: seconds / 3600,
            minutes: (seconds % 3600) / 60,
        }
    }
}

/// One logged-in period of an employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShiftInterval {
    pub id: i64,
    pub employee_id: String,
    /// Month the interval is filed under (month of `logged_in_at`)
    pub year: i32,
    pub month: i32,
    pub logged_in_at: i64,
    /// Absent while the interval is open
    pub logged_out_at: Option<i64>,

    /// Worked time of a closed interval (populated by `with_total`)
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub total: Option<WorkedTime>,
}

impl ShiftInterval {
    pub fn is_open(&self) -> bool {
        self.logged_out_at.is_none()
    }

    /// Elapsed millis for a closed interval
    pub fn duration_millis(&self) -> Option<i64> {
        self.logged_out_at.map(|end| end - self.logged_in_at)
    }

    pub fn with_total(mut self) -> Self {
        self.total = self.duration_millis().map(WorkedTime::from_millis);
        self
    }
}

/// Month entry of an employee's ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub employee_id: String,
    pub month: MonthKey,
    pub monthly_total: WorkedTime,
    pub shifts: Vec<ShiftInterval>,
}

/// Worked time over a trailing window of days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTotal {
    pub employee_id: String,
    pub days: u32,
    /// Window start, unix millis
    pub since: i64,
    pub until: i64,
    pub total: WorkedTime,
}

/// Query of the trailing-window total; `days` defaults to 30
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentQuery {
    pub days: Option<u32>,
}

/// Login/logout event body; `at` defaults to now
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftEvent {
    /// Unix millis
    pub at: Option<i64>,
}

/// Interval closed by a close or force-close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedSession {
    pub employee_id: String,
    pub interval: ShiftInterval,
    /// Recomputed total of the month owning the interval
    pub monthly_total: WorkedTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceCloseFailure {
    pub employee_id: String,
    pub error: String,
}

/// Aggregate result of closing every open interval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceCloseOutcome {
    pub at: i64,
    pub closed: Vec<ClosedSession>,
    pub failed: Vec<ForceCloseFailure>,
}

impl ForceCloseOutcome {
    pub fn is_partial_failure(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_key_format() {
        let key = MonthKey::new(2024, 5).unwrap();
        assert_eq!(key.to_string(), "2024-05");
        assert_eq!("2024-05".parse::<MonthKey>().unwrap(), key);
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-05\"");
    }

    #[test]
    fn test_month_key_rejects_out_of_range() {
        assert!(MonthKey::new(2024, 0).is_none());
        assert!(MonthKey::new(2024, 13).is_none());
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("202405".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_worked_time_truncates_seconds() {
        // 02:00:30 -> 10:30:45 is 8h 30m 15s
        let millis = (8 * 3600 + 30 * 60 + 15) * 1000;
        assert_eq!(
            WorkedTime::from_millis(millis),
            WorkedTime {
                hours: 8,
                minutes: 30
            }
        );
        assert_eq!(WorkedTime::from_millis(59_999), WorkedTime::default());
    }

    #[test]
    fn test_interval_duration() {
        let mut interval = ShiftInterval {
            id: 1,
            employee_id: "e1".into(),
            year: 2024,
            month: 5,
            logged_in_at: 1_000,
            logged_out_at: None,
            total: None,
        };
        assert!(interval.is_open());
        assert_eq!(interval.duration_millis(), None);
        assert_eq!(interval.clone().with_total().total, None);

        interval.logged_out_at = Some(1_000 + (2 * 3600 + 15 * 60 + 59) * 1000);
        let interval = interval.with_total();
        assert_eq!(
            interval.total,
            Some(WorkedTime {
                hours: 2,
                minutes: 15
            })
        );
        let json = serde_json::to_value(&interval).unwrap();
        assert_eq!(json["total"], serde_json::json!({ "hours": 2, "minutes": 15 }));
    }
}
