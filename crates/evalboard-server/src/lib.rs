pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod seed;

use config::ServerConfig;
use evalboard_core::category::CategoryRules;
use evalboard_core::storage::Store;
use evalboard_core::EvaluationService;
use std::sync::Arc;
use std::time::Instant;

pub use routes::build_router;

#[derive(Clone)]
pub struct AppState {
    pub service: EvaluationService,
    pub api_key: Arc<str>,
    pub max_page_size: u32,
    pub cors_origin: Option<String>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: EvaluationService, cfg: &ServerConfig) -> Self {
        Self {
            service,
            api_key: Arc::from(cfg.api_key.as_str()),
            max_page_size: cfg.max_page_size,
            cors_origin: cfg.cors_origin.clone(),
            started_at: Instant::now(),
        }
    }

    /// In-memory store with schema applied and default category rules.
    pub fn new_memory(cfg: &ServerConfig) -> anyhow::Result<Self> {
        let store = Store::memory()?;
        store.init_schema()?;
        Ok(Self::new(
            EvaluationService::new(store, CategoryRules::default()),
            cfg,
        ))
    }
}
