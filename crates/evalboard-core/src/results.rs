//! Synthetic results for a single evaluation.
//!
//! Nothing here is measured. Every figure is derived from the stored score
//! and test-case count. Scores are handled in integer hundredths of a percent
//! so the four outcome counts always sum to `test_cases` exactly.

use crate::model::{EvaluationRow, EvaluationStatus};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;

pub const AMBIGUOUS_LABELS_WARNING: &str = "Some test cases had ambiguous ground truth labels";
pub const CONFIDENCE_THRESHOLD_WARNING: &str = "Model confidence threshold may need adjustment";

/// Scores below this attach the advisory warnings.
pub const WARNING_BELOW_SCORE: f64 = 90.0;

pub const EXECUTION_SECONDS: Range<u32> = 60..360;

// Metric scale factors in thousandths.
const PRECISION_FACTOR: i64 = 950;
const RECALL_FACTOR: i64 = 980;
const F1_FACTOR: i64 = 965;
const AUC_FACTOR: i64 = 990;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsSummary {
    pub total_tests: i64,
    pub passed: Option<i64>,
    pub failed: Option<i64>,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeBucket {
    pub category: String,
    pub count: i64,
    pub percentage: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetrics {
    pub precision: String,
    pub recall: String,
    pub f1_score: String,
    pub auc: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsReport {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: EvaluationStatus,
    pub score: Option<f64>,
    pub test_cases: i64,
    pub last_run: Option<String>,
    pub summary: ResultsSummary,
    pub test_results: Option<Vec<OutcomeBucket>>,
    pub metrics: Option<ResultMetrics>,
    pub execution_time: Option<String>,
    pub errors: Vec<String>,
}

impl ResultsReport {
    pub fn has_details(&self) -> bool {
        self.test_results.is_some()
    }
}

/// Builds the report for `row`. Detail fields are only filled for a
/// completed evaluation that has a score; `rng` only feeds `executionTime`.
pub fn generate<R: Rng + ?Sized>(row: &EvaluationRow, rng: &mut R) -> ResultsReport {
    let record = row.to_record();
    let mut report = ResultsReport {
        id: record.id,
        name: record.name,
        description: record.description,
        status: record.status,
        score: record.score,
        test_cases: record.test_cases,
        last_run: record.last_run,
        summary: ResultsSummary {
            total_tests: row.test_cases,
            passed: None,
            failed: None,
            accuracy: row.score,
        },
        test_results: None,
        metrics: None,
        execution_time: None,
        errors: Vec::new(),
    };

    let score = match (row.status == EvaluationStatus::Completed, row.score) {
        (true, Some(s)) => s,
        _ => return report,
    };

    let centi = score_centi(score);
    let passed = (row.test_cases * centi).div_euclid(10_000);
    report.summary.passed = Some(passed);
    report.summary.failed = Some(row.test_cases - passed);
    report.test_results = Some(outcome_buckets(row.test_cases, centi));
    report.metrics = Some(metrics(centi));
    report.execution_time = Some(format!("{}s", rng.gen_range(EXECUTION_SECONDS)));

    if score < WARNING_BELOW_SCORE {
        report.errors = vec![
            AMBIGUOUS_LABELS_WARNING.to_string(),
            CONFIDENCE_THRESHOLD_WARNING.to_string(),
        ];
    }

    report
}

fn score_centi(score: f64) -> i64 {
    (score * 100.0).round() as i64
}

/// True/false positive/negative split.
///
/// Percentages are rounded independently and need not sum to 100.
/// Counts can go negative at extreme scores (below 60 or above 95); the
/// remainder bucket absorbs it so the total is preserved.
pub fn outcome_buckets(test_cases: i64, centi: i64) -> Vec<OutcomeBucket> {
    let true_pos = (test_cases * 60).div_euclid(100);
    let true_neg = (test_cases * (centi - 6_000)).div_euclid(10_000);
    let false_pos = (test_cases * 5).div_euclid(100);
    let false_neg = test_cases - true_pos - true_neg - false_pos;

    vec![
        bucket("True Positives", true_pos, 60),
        bucket("True Negatives", true_neg, round_half_up_centi(centi - 6_000)),
        bucket("False Positives", false_pos, 5),
        bucket("False Negatives", false_neg, round_half_up_centi(9_500 - centi)),
    ]
}

fn bucket(category: &str, count: i64, percentage: i64) -> OutcomeBucket {
    OutcomeBucket {
        category: category.to_string(),
        count,
        percentage,
    }
}

/// Hundredths to a whole percent, halves toward positive infinity.
fn round_half_up_centi(centi: i64) -> i64 {
    (centi + 50).div_euclid(100)
}

pub fn metrics(centi: i64) -> ResultMetrics {
    ResultMetrics {
        precision: scaled(centi, PRECISION_FACTOR),
        recall: scaled(centi, RECALL_FACTOR),
        f1_score: scaled(centi, F1_FACTOR),
        auc: scaled(centi, AUC_FACTOR),
    }
}

/// `score/100 * factor/1000` to three decimals, exact half-up. Float `toFixed`
/// clients can differ in the last digit: score 85 gives precision "0.808" here
/// (float: "0.807") and f1Score "0.820" (sometimes quoted as "0.821").
fn scaled(centi: i64, factor_milli: i64) -> String {
    let thousandths = (centi * factor_milli + 5_000).div_euclid(10_000);
    let sign = if thousandths < 0 { "-" } else { "" };
    let v = thousandths.abs();
    format!("{sign}{}.{:03}", v / 1000, v % 1000)
}
