use anyhow::{Context, Result};
use clap::Parser;
use evalboard_core::category::CategoryRules;
use evalboard_core::storage::Store;
use evalboard_core::EvaluationService;
use evalboard_server::config::ServerConfig;
use evalboard_server::logging::init_logging;
use evalboard_server::{build_router, seed, AppState};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Evalboard API and dashboard server", long_about = None)]
struct Args {
    /// SQLite database file (`:memory:` for a throwaway store)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:3003
    #[arg(long)]
    bind: Option<String>,

    /// YAML file with the category rule table
    #[arg(long)]
    categories: Option<PathBuf>,

    /// Insert demo evaluations when the table is empty
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut cfg = ServerConfig::from_env();
    if let Some(db) = args.db {
        cfg.db_path = db;
    }
    if let Some(bind) = args.bind {
        cfg.bind = bind;
    }
    if let Some(path) = args.categories {
        cfg.categories_path = Some(path);
    }

    init_logging(&cfg.log_level);

    tracing::info!(event = "server_start", config = ?cfg);
    if cfg.uses_default_key() {
        tracing::warn!(
            event = "default_api_key",
            "EVALBOARD_API_KEY is not set; using the development key"
        );
    }

    let store = open_store(&cfg.db_path)?;
    store.init_schema()?;

    let rules = match &cfg.categories_path {
        Some(path) => CategoryRules::load(path)?,
        None => CategoryRules::default(),
    };

    if args.seed_demo {
        seed::seed_demo(&store, chrono::Utc::now())?;
    }

    let state = AppState::new(EvaluationService::new(store, rules), &cfg);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind))?;
    tracing::info!(event = "listening", addr = %cfg.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(event = "server_stop");
    Ok(())
}

fn open_store(path: &PathBuf) -> Result<Store> {
    if path.as_os_str() == ":memory:" {
        return Store::memory();
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Store::open(path)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(event = "signal_error", error = %e);
    }
}
