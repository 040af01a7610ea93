use crate::view::{ChartMode, ChartPanel, LoadState};
use evalboard_core::performance::{PerformancePoint, PerformanceReport};
use evalboard_core::query::{EvaluationPage, Summary};
use evalboard_core::results::ResultsReport;
use evalboard_core::Evaluation;
use std::fmt::Write;

const BAR_WIDTH: usize = 30;

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let n = ((value / max) * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64) as usize;
    "#".repeat(n)
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('~');
    out
}

pub fn summary_cards(s: &Summary) -> String {
    format!(
        "Total Evaluations: {}   Average Score: {:.1}%   Active Tests: {}\n",
        s.total_evaluations, s.average_score, s.active_tests
    )
}

pub fn evaluations_table(page: &EvaluationPage) -> String {
    let mut s = String::new();
    s.push_str(&summary_cards(&page.summary));
    s.push('\n');
    let _ = writeln!(
        s,
        "{:>5}  {:<36}  {:<10}  {:>6}  {:>6}  {}",
        "ID", "NAME", "STATUS", "SCORE", "TESTS", "LAST RUN"
    );
    if page.evaluations.is_empty() {
        s.push_str("  (no evaluations)\n");
    }
    for e in &page.evaluations {
        let score = e.score.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".into());
        let _ = writeln!(
            s,
            "{:>5}  {:<36}  {:<10}  {:>6}  {:>6}  {}",
            e.id,
            truncate(&e.name, 36),
            e.status,
            score,
            e.test_cases,
            e.last_run.as_deref().unwrap_or("never"),
        );
    }
    let p = &page.pagination;
    let _ = writeln!(
        s,
        "\nPage {} of {} ({} total)",
        p.page,
        p.total_pages.max(1),
        p.total
    );
    s
}

pub fn results_detail(r: &ResultsReport) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "{} (#{})", r.name, r.id);
    if !r.description.is_empty() {
        let _ = writeln!(s, "{}", r.description);
    }
    let score = r.score.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".into());
    let _ = writeln!(
        s,
        "Status: {}   Score: {}   Tests: {}   Last run: {}",
        r.status,
        score,
        r.summary.total_tests,
        r.last_run.as_deref().unwrap_or("never")
    );

    match (&r.test_results, &r.metrics) {
        (Some(buckets), Some(m)) => {
            let _ = writeln!(
                s,
                "Passed: {}   Failed: {}   Accuracy: {}%",
                r.summary.passed.unwrap_or_default(),
                r.summary.failed.unwrap_or_default(),
                r.summary.accuracy.unwrap_or_default()
            );
            s.push('\n');
            for b in buckets {
                let _ = writeln!(s, "  {:<16} {:>6}  {:>3}%", b.category, b.count, b.percentage);
            }
            let _ = writeln!(
                s,
                "\nPrecision {}  Recall {}  F1 {}  AUC {}",
                m.precision, m.recall, m.f1_score, m.auc
            );
            if let Some(t) = &r.execution_time {
                let _ = writeln!(s, "Execution time: {t}");
            }
        }
        _ => s.push_str("Detailed results are available once the evaluation completes.\n"),
    }

    for w in &r.errors {
        let _ = writeln!(s, "! {w}");
    }
    s
}

pub fn timestamps(e: &Evaluation) -> String {
    format!(
        "Created: {}   Updated: {}\n",
        e.created_at.format("%b %d, %Y %H:%M"),
        e.updated_at.format("%b %d, %Y %H:%M")
    )
}

pub fn chart_panel(panel: &ChartPanel) -> String {
    let report = match &panel.data {
        LoadState::Loading => return "Loading performance data...\n".to_string(),
        LoadState::Error(e) => {
            return format!("Failed to load performance chart: {e}\nRetry with `evalboard chart`.\n")
        }
        LoadState::Ready(r) => r,
    };

    if report.performance_over_time.is_empty() {
        return "No performance data available\nRun some evaluations to see performance trends\n"
            .to_string();
    }

    let mut s = String::new();
    let _ = writeln!(
        s,
        "Performance Overview  (last {} days, {} data points)",
        report.summary.days_analyzed, report.summary.total_data_points
    );
    if panel.shows_selector() {
        let tabs: Vec<String> = ChartMode::ALL
            .iter()
            .map(|m| {
                if *m == panel.visible_mode() {
                    format!("[{}]", m.label())
                } else {
                    format!(" {} ", m.label())
                }
            })
            .collect();
        let _ = writeln!(s, "{}", tabs.join(" "));
    }
    s.push('\n');

    match panel.visible_mode() {
        ChartMode::Trends => trends(&mut s, &report.performance_over_time),
        ChartMode::Categories => categories(&mut s, report),
        ChartMode::Overview => overview(&mut s, report),
    }
    s
}

fn trends(s: &mut String, points: &[PerformancePoint]) {
    let _ = writeln!(
        s,
        "{:<12}  {:>5}  {:<w$}  {:>3}  {:>3}/{:>3}/{:>3}",
        "DATE",
        "AVG",
        "",
        "N",
        "EXC",
        "GD",
        "PR",
        w = BAR_WIDTH
    );
    for p in points {
        let _ = writeln!(
            s,
            "{:<12}  {:>5.1}  {:<w$}  {:>3}  {:>3}/{:>3}/{:>3}",
            p.date.format("%b %d, %Y").to_string(),
            p.avg_score,
            bar(p.avg_score, 100.0),
            p.total_evaluations,
            p.excellent_tests,
            p.good_tests,
            p.poor_tests,
            w = BAR_WIDTH
        );
    }
}

fn categories(s: &mut String, report: &PerformanceReport) {
    let max = report
        .category_breakdown
        .iter()
        .map(|c| c.count)
        .max()
        .unwrap_or(0) as f64;
    for c in &report.category_breakdown {
        let _ = writeln!(
            s,
            "{:<22}  {:<w$}  {:>3} total  {:>3} completed  avg {:.1}%",
            c.category,
            bar(c.count as f64, max),
            c.count,
            c.completed,
            c.avg_score,
            w = BAR_WIDTH
        );
    }
}

fn overview(s: &mut String, report: &PerformanceReport) {
    let total: u64 = report.category_breakdown.iter().map(|c| c.count).sum();
    s.push_str("Test Distribution by Category\n");
    for c in &report.category_breakdown {
        let share = if total == 0 {
            0.0
        } else {
            c.count as f64 * 100.0 / total as f64
        };
        let _ = writeln!(s, "  {:<22} {:>3.0}%", c.category, share);
    }

    s.push_str("\nRecent Evaluation Scores\n");
    if report.recent_trends.is_empty() {
        s.push_str("  (none)\n");
    }
    for t in &report.recent_trends {
        let _ = writeln!(
            s,
            "  {:>2}. {:<36} {:>5.1}%  {}",
            t.rank,
            truncate(&t.name, 36),
            t.score,
            t.updated_at.format("%b %d, %Y")
        );
    }
}
