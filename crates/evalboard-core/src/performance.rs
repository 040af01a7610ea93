use crate::category::{CategoryAggregator, CategoryBreakdown, CategoryRules};
use crate::model::EvaluationStatus;
use crate::storage::Store;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DAYS: u32 = 30;
pub const RECENT_TRENDS_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub total_evaluations: u64,
    pub avg_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    pub completed_tests: u64,
    pub active_tests: u64,
    pub excellent_tests: u64,
    pub good_tests: u64,
    pub poor_tests: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTrend {
    pub id: i64,
    pub name: String,
    pub score: f64,
    pub status: EvaluationStatus,
    pub updated_at: DateTime<Utc>,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub days_analyzed: u32,
    pub total_data_points: usize,
    pub categories: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub performance_over_time: Vec<PerformancePoint>,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub recent_trends: Vec<RecentTrend>,
    pub summary: PerformanceSummary,
}

/// Window size from the raw `days` parameter. Anything that is not a plain
/// positive integer yields the default; there is no upper bound.
pub fn parse_days(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|d| *d >= 1)
        .unwrap_or(DEFAULT_DAYS)
}

/// Windows reaching past the representable range start at the earliest instant.
pub fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub fn build_report(
    store: &Store,
    rules: &CategoryRules,
    now: DateTime<Utc>,
    days: u32,
) -> anyhow::Result<PerformanceReport> {
    let since = window_start(now, days);

    let performance_over_time = store.daily_rollup(since)?;

    let mut agg = CategoryAggregator::new(rules);
    for s in store.category_samples(since)? {
        agg.push(&s.name, s.score, &s.status);
    }
    let category_breakdown = agg.finish();

    // independent of the window
    let recent_trends = store.recent_completed(RECENT_TRENDS_LIMIT)?;

    let summary = PerformanceSummary {
        days_analyzed: days,
        total_data_points: performance_over_time.len(),
        categories: category_breakdown.len(),
    };

    Ok(PerformanceReport {
        performance_over_time,
        category_breakdown,
        recent_trends,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn days_must_be_a_plain_positive_integer() {
        assert_eq!(parse_days(None), DEFAULT_DAYS);
        assert_eq!(parse_days(Some("7")), 7);
        assert_eq!(parse_days(Some("0")), DEFAULT_DAYS);
        assert_eq!(parse_days(Some("7 days'; --")), DEFAULT_DAYS);
        assert_eq!(parse_days(Some("-3")), DEFAULT_DAYS);
        assert_eq!(parse_days(Some("500")), 500);
        assert_eq!(parse_days(Some("100000")), 100_000);
    }

    #[test]
    fn window_starts_days_before_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let since = window_start(now, 7);
        assert_eq!(since, Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap());
    }

    #[test]
    fn huge_window_saturates() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        assert_eq!(window_start(now, u32::MAX), DateTime::<Utc>::MIN_UTC);
    }
}
