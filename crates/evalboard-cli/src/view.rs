//! View models for the terminal dashboard. Each view owns its own load state
//! so a failure in one never blocks another.

use crate::api::{DashboardApi, ListParams};
use evalboard_core::performance::PerformanceReport;
use evalboard_core::query::EvaluationPage;
use evalboard_core::results::ResultsReport;
use evalboard_core::EvaluationStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Error(String),
    Ready(T),
}

impl<T> LoadState<T> {
    pub fn from_result(r: anyhow::Result<T>) -> Self {
        match r {
            Ok(v) => LoadState::Ready(v),
            Err(e) => LoadState::Error(format!("{e:#}")),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Identifies one in-flight fetch. A completion carrying an old ticket is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

pub struct EvaluationsView {
    pub params: ListParams,
    pub list: LoadState<EvaluationPage>,
    pub selected: Option<i64>,
    pub results: Option<LoadState<ResultsReport>>,
    list_ticket: u64,
    results_ticket: u64,
}

impl EvaluationsView {
    pub fn new(params: ListParams) -> Self {
        Self {
            params,
            list: LoadState::Loading,
            selected: None,
            results: None,
            list_ticket: 0,
            results_ticket: 0,
        }
    }

    pub fn begin_list(&mut self) -> Ticket {
        self.list_ticket += 1;
        self.list = LoadState::Loading;
        Ticket(self.list_ticket)
    }

    /// Returns false when the fetch was superseded.
    pub fn finish_list(&mut self, ticket: Ticket, r: anyhow::Result<EvaluationPage>) -> bool {
        if ticket.0 != self.list_ticket {
            return false;
        }
        self.list = LoadState::from_result(r);
        true
    }

    /// Opens the detail for `id`; results load lazily.
    pub fn select(&mut self, id: i64) -> Ticket {
        self.results_ticket += 1;
        self.selected = Some(id);
        self.results = Some(LoadState::Loading);
        Ticket(self.results_ticket)
    }

    pub fn finish_results(&mut self, ticket: Ticket, r: anyhow::Result<ResultsReport>) -> bool {
        if ticket.0 != self.results_ticket || self.selected.is_none() {
            return false;
        }
        self.results = Some(LoadState::from_result(r));
        true
    }

    pub fn close(&mut self) {
        self.results_ticket += 1;
        self.selected = None;
        self.results = None;
    }

    pub async fn load(&mut self, api: &dyn DashboardApi) {
        let ticket = self.begin_list();
        let r = api.list(&self.params).await;
        self.finish_list(ticket, r);
    }

    pub async fn open(&mut self, api: &dyn DashboardApi, id: i64) {
        let ticket = self.select(id);
        let r = api.results(id).await;
        self.finish_results(ticket, r);
    }

    /// Target for "run next": first pending row, else first completed, else first row.
    pub fn next_to_run(&self) -> Option<i64> {
        let page = self.list.ready()?;
        let rows = &page.evaluations;
        rows.iter()
            .find(|e| e.status == EvaluationStatus::Pending)
            .or_else(|| rows.iter().find(|e| e.status == EvaluationStatus::Completed))
            .or_else(|| rows.first())
            .map(|e| e.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ChartMode {
    Trends,
    Categories,
    Overview,
}

impl ChartMode {
    pub const ALL: [ChartMode; 3] = [ChartMode::Trends, ChartMode::Categories, ChartMode::Overview];

    pub fn label(self) -> &'static str {
        match self {
            ChartMode::Trends => "Score Trends",
            ChartMode::Categories => "Categories",
            ChartMode::Overview => "Overview",
        }
    }
}

pub struct ChartPanel {
    pub mode: ChartMode,
    pub compact: bool,
    pub days: u32,
    pub data: LoadState<PerformanceReport>,
}

impl ChartPanel {
    pub fn new(mode: ChartMode, compact: bool, days: u32) -> Self {
        Self {
            mode,
            compact,
            days,
            data: LoadState::Loading,
        }
    }

    /// Compact panels always show trends.
    pub fn visible_mode(&self) -> ChartMode {
        if self.compact {
            ChartMode::Trends
        } else {
            self.mode
        }
    }

    pub fn shows_selector(&self) -> bool {
        !self.compact
    }

    pub fn set_mode(&mut self, mode: ChartMode) {
        self.mode = mode;
    }

    pub fn apply(&mut self, r: anyhow::Result<PerformanceReport>) {
        self.data = LoadState::from_result(r);
    }

    pub fn retry(&mut self) {
        self.data = LoadState::Loading;
    }

    pub async fn load(&mut self, api: &dyn DashboardApi) {
        self.retry();
        let r = api.performance(self.days).await;
        self.apply(r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use evalboard_core::query::{Pagination, Summary};
    use evalboard_core::Evaluation;

    fn evaluation(id: i64, status: EvaluationStatus) -> Evaluation {
        Evaluation {
            id,
            name: format!("Eval {id}"),
            description: String::new(),
            status,
            score: None,
            test_cases: 10,
            last_run: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn page(rows: Vec<Evaluation>) -> EvaluationPage {
        let total = rows.len() as u64;
        EvaluationPage {
            evaluations: rows,
            pagination: Pagination {
                page: 1,
                limit: 10,
                total,
                total_pages: 1,
            },
            summary: Summary::default(),
        }
    }

    fn report(id: i64) -> ResultsReport {
        ResultsReport {
            id,
            name: format!("Eval {id}"),
            description: String::new(),
            status: EvaluationStatus::Running,
            score: None,
            test_cases: 10,
            last_run: None,
            summary: evalboard_core::results::ResultsSummary {
                total_tests: 10,
                passed: None,
                failed: None,
                accuracy: None,
            },
            test_results: None,
            metrics: None,
            execution_time: None,
            errors: vec![],
        }
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut view = EvaluationsView::new(ListParams::default());
        let first = view.select(1);
        let second = view.select(2);
        assert!(!view.finish_results(first, Ok(report(1))));
        assert_eq!(view.results, Some(LoadState::Loading));
        assert!(view.finish_results(second, Ok(report(2))));
        assert_eq!(view.results.as_ref().and_then(|s| s.ready()).map(|r| r.id), Some(2));
    }

    #[test]
    fn results_after_close_are_ignored() {
        let mut view = EvaluationsView::new(ListParams::default());
        let t = view.select(5);
        view.close();
        assert!(!view.finish_results(t, Ok(report(5))));
        assert!(view.results.is_none());
        assert!(view.selected.is_none());
    }

    #[test]
    fn stale_list_is_dropped() {
        let mut view = EvaluationsView::new(ListParams::default());
        let old = view.begin_list();
        let new = view.begin_list();
        assert!(!view.finish_list(old, Err(anyhow::anyhow!("boom"))));
        assert!(view.list.is_loading());
        assert!(view.finish_list(new, Ok(page(vec![]))));
        assert!(view.list.ready().is_some());
    }

    #[test]
    fn run_next_prefers_pending_then_completed() {
        let mut view = EvaluationsView::new(ListParams::default());
        let t = view.begin_list();
        view.finish_list(
            t,
            Ok(page(vec![
                evaluation(1, EvaluationStatus::Running),
                evaluation(2, EvaluationStatus::Completed),
                evaluation(3, EvaluationStatus::Pending),
            ])),
        );
        assert_eq!(view.next_to_run(), Some(3));

        let t = view.begin_list();
        view.finish_list(
            t,
            Ok(page(vec![
                evaluation(1, EvaluationStatus::Running),
                evaluation(2, EvaluationStatus::Completed),
            ])),
        );
        assert_eq!(view.next_to_run(), Some(2));

        let t = view.begin_list();
        view.finish_list(t, Ok(page(vec![evaluation(9, EvaluationStatus::Running)])));
        assert_eq!(view.next_to_run(), Some(9));

        let t = view.begin_list();
        view.finish_list(t, Ok(page(vec![])));
        assert_eq!(view.next_to_run(), None);
    }

    #[test]
    fn compact_panel_pins_trends() {
        let mut panel = ChartPanel::new(ChartMode::Categories, true, 30);
        assert_eq!(panel.visible_mode(), ChartMode::Trends);
        assert!(!panel.shows_selector());

        panel.compact = false;
        panel.set_mode(ChartMode::Overview);
        assert_eq!(panel.visible_mode(), ChartMode::Overview);
        assert!(panel.shows_selector());
    }

    #[test]
    fn failed_panel_can_retry() {
        let mut panel = ChartPanel::new(ChartMode::Trends, false, 7);
        panel.apply(Err(anyhow::anyhow!("Failed to fetch performance data")));
        assert!(matches!(panel.data, LoadState::Error(ref m) if m.contains("performance")));
        panel.retry();
        assert!(panel.data.is_loading());
    }
}
