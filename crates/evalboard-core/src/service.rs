use crate::category::CategoryRules;
use crate::model::Evaluation;
use crate::performance::{build_report, PerformanceReport};
use crate::query::{EvaluationPage, ListQuery, Pagination};
use crate::results::{generate, ResultsReport};
use crate::storage::Store;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::{Arc, Mutex};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Read queries, the run trigger and synthetic results over one store.
///
/// Holds no per-request state; clones share the store, rule table, clock
/// and randomness source.
#[derive(Clone)]
pub struct EvaluationService {
    store: Store,
    rules: Arc<CategoryRules>,
    clock: Clock,
    rng: Arc<Mutex<Box<dyn RngCore + Send>>>,
}

impl EvaluationService {
    pub fn new(store: Store, rules: CategoryRules) -> Self {
        Self {
            store,
            rules: Arc::new(rules),
            clock: Arc::new(Utc::now),
            rng: Arc::new(Mutex::new(Box::new(StdRng::from_entropy()))),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.rng = Arc::new(Mutex::new(rng));
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn rules(&self) -> &CategoryRules {
        &self.rules
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn list(&self, query: &ListQuery) -> anyhow::Result<EvaluationPage> {
        let (rows, total) = self.store.list_evaluations(query)?;
        let summary = self.store.summary()?;
        Ok(EvaluationPage {
            evaluations: rows.iter().map(|r| r.to_record()).collect(),
            pagination: Pagination::new(query, total),
            summary,
        })
    }

    pub fn performance(&self, days: u32) -> anyhow::Result<PerformanceReport> {
        build_report(&self.store, &self.rules, self.now(), days)
    }

    pub fn get(&self, id: i64) -> anyhow::Result<Option<Evaluation>> {
        Ok(self.store.get_evaluation(id)?.map(|r| r.to_record()))
    }

    /// Run trigger. `None` when the id does not exist.
    pub fn run(&self, id: i64) -> anyhow::Result<Option<Evaluation>> {
        Ok(self.store.mark_running(id, self.now())?.map(|r| r.to_record()))
    }

    pub fn results(&self, id: i64) -> anyhow::Result<Option<ResultsReport>> {
        let Some(row) = self.store.get_evaluation(id)? else {
            return Ok(None);
        };
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| anyhow::anyhow!("rng mutex poisoned"))?;
        Ok(Some(generate(&row, &mut **rng)))
    }
}
