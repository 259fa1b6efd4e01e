//! Dashboard summaries computed from slim visit rows.
//!
//! Aggregation happens in the service rather than SQL so the same
//! code serves the global and per-department views and can be tested
//! without a database. Day boundaries are UTC.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;

use gatehouse_core::VisitStatus;

use crate::models::StatRow;

/// Days of history shown in the trend chart, including today.
pub const TREND_DAYS: u64 = 7;

/// One day of the visit trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: usize,
}

/// Counts shown on the dashboards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitSummary {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub checked_in: usize,
    pub checked_out: usize,
    pub rejected: usize,
    /// Requests created today (UTC).
    pub today_visitors: usize,
    /// Requests per department; omitted on department-scoped summaries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_department: Option<BTreeMap<String, usize>>,
    /// Daily counts for the trailing week, oldest day first.
    pub weekly_trend: Vec<TrendPoint>,
}

/// Summarize visit rows as of `now`.
///
/// `with_departments` adds the per-department breakdown (the super
/// admin's view); department admins already see a single department.
#[must_use]
pub fn summarize(rows: &[StatRow], now: DateTime<Utc>, with_departments: bool) -> VisitSummary {
    let today = now.date_naive();

    let mut summary = VisitSummary {
        total: rows.len(),
        pending: 0,
        approved: 0,
        checked_in: 0,
        checked_out: 0,
        rejected: 0,
        today_visitors: 0,
        by_department: with_departments.then(BTreeMap::new),
        weekly_trend: Vec::new(),
    };

    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for row in rows {
        match row.status {
            VisitStatus::Pending => summary.pending += 1,
            VisitStatus::Approved => summary.approved += 1,
            VisitStatus::Rejected => summary.rejected += 1,
            VisitStatus::CheckedIn => summary.checked_in += 1,
            VisitStatus::CheckedOut => summary.checked_out += 1,
        }

        let day = row.created_at.date_naive();
        if day == today {
            summary.today_visitors += 1;
        }
        *per_day.entry(day).or_insert(0) += 1;

        if let Some(by_department) = summary.by_department.as_mut() {
            *by_department
                .entry(row.department.as_str().to_owned())
                .or_insert(0) += 1;
        }
    }

    // Trailing week, oldest day first
    for offset in (0..TREND_DAYS).rev() {
        let date = today.checked_sub_days(Days::new(offset)).unwrap_or(today);
        summary.weekly_trend.push(TrendPoint {
            date,
            count: per_day.get(&date).copied().unwrap_or(0),
        });
    }

    summary
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use gatehouse_core::Department;

    use super::*;

    fn at(now: DateTime<Utc>, days_ago: u64, status: VisitStatus, dept: &str) -> StatRow {
        StatRow {
            status,
            department: Department::parse(dept).unwrap(),
            created_at: now - chrono::Duration::days(i64::try_from(days_ago).unwrap()),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 5, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_status_totals() {
        let now = fixed_now();
        let rows = vec![
            at(now, 0, VisitStatus::Pending, "CSE"),
            at(now, 0, VisitStatus::Pending, "ECE"),
            at(now, 1, VisitStatus::Approved, "CSE"),
            at(now, 2, VisitStatus::CheckedIn, "IT"),
            at(now, 3, VisitStatus::CheckedOut, "CSE"),
            at(now, 4, VisitStatus::Rejected, "HOSTEL"),
        ];

        let summary = summarize(&rows, now, false);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.approved, 1);
        assert_eq!(summary.checked_in, 1);
        assert_eq!(summary.checked_out, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.today_visitors, 2);
        assert!(summary.by_department.is_none());
    }

    #[test]
    fn test_department_breakdown() {
        let now = fixed_now();
        let rows = vec![
            at(now, 0, VisitStatus::Pending, "CSE"),
            at(now, 1, VisitStatus::Approved, "CSE"),
            at(now, 2, VisitStatus::Pending, "IT"),
        ];

        let summary = summarize(&rows, now, true);
        let by_department = summary.by_department.unwrap();
        assert_eq!(by_department.get("CSE"), Some(&2));
        assert_eq!(by_department.get("IT"), Some(&1));
        assert_eq!(by_department.len(), 2);
    }

    #[test]
    fn test_weekly_trend_covers_trailing_week_oldest_first() {
        let now = fixed_now();
        let rows = vec![
            at(now, 0, VisitStatus::Pending, "CSE"),
            at(now, 0, VisitStatus::Pending, "CSE"),
            at(now, 6, VisitStatus::Approved, "CSE"),
            // Outside the window: must not appear
            at(now, 7, VisitStatus::Approved, "CSE"),
        ];

        let summary = summarize(&rows, now, false);
        assert_eq!(summary.weekly_trend.len(), 7);

        let first = summary.weekly_trend.first().unwrap();
        let last = summary.weekly_trend.last().unwrap();
        assert_eq!(first.date, now.date_naive() - chrono::Duration::days(6));
        assert_eq!(first.count, 1);
        assert_eq!(last.date, now.date_naive());
        assert_eq!(last.count, 2);

        let total_in_trend: usize = summary.weekly_trend.iter().map(|p| p.count).sum();
        assert_eq!(total_in_trend, 3);
    }

    #[test]
    fn test_empty_rows() {
        let summary = summarize(&[], fixed_now(), true);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.weekly_trend.len(), 7);
        assert!(summary.weekly_trend.iter().all(|p| p.count == 0));
    }

    #[test]
    fn test_serializes_camel_case() {
        let summary = summarize(&[], fixed_now(), false);
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("todayVisitors").is_some());
        assert!(json.get("weeklyTrend").is_some());
        assert!(json.get("byDepartment").is_none());
    }
}
