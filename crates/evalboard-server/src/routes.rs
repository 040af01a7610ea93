use crate::auth::require_api_key;
use crate::error::ApiError;
use crate::AppState;
use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::http::HeaderValue;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use evalboard_core::performance::{parse_days, PerformanceReport};
use evalboard_core::query::{first_param, EvaluationPage, ListQuery, RawListParams};
use evalboard_core::results::ResultsReport;
use evalboard_core::{Evaluation, EvaluationService, RunAccepted};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const API_PREFIX: &str = "/api/v1/evaluations";

const DASHBOARD_HTML: &str = include_str!("dashboard.html");

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(list_evaluations))
        .route("/performance", get(performance))
        .route("/{id}", get(get_evaluation))
        .route("/{id}/run", post(run_evaluation))
        .route("/{id}/results", get(evaluation_results))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    let cors = cors_layer(state.cors_origin.as_deref());

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow = match origin.map(str::parse::<HeaderValue>) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(e)) => {
            tracing::warn!(event = "cors_origin_invalid", error = %e, "allowing any origin");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };
    CorsLayer::new()
        .allow_origin(allow)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Runs a blocking store call off the async workers.
async fn blocking<T, F>(state: &AppState, f: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce(&EvaluationService) -> anyhow::Result<T> + Send + 'static,
{
    let svc = state.service.clone();
    tokio::task::spawn_blocking(move || f(&svc))
        .await
        .context("store task panicked")?
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::NotFound(raw.to_string()))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

async fn index_handler() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

async fn list_evaluations(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<EvaluationPage>, ApiError> {
    let raw = RawListParams::from_pairs(&pairs);
    let query = ListQuery::from_raw(&raw, state.max_page_size);
    tracing::info!(
        event = "evaluations_fetch",
        page = query.page,
        limit = query.limit,
        status = ?query.status,
        sort = query.sort.column(),
        order = query.order.sql(),
    );

    let page = blocking(&state, move |svc| svc.list(&query))
        .await
        .context("failed to fetch evaluations")?;

    tracing::info!(
        event = "evaluations_fetched",
        count = page.evaluations.len(),
        total = page.pagination.total,
    );
    Ok(Json(page))
}

async fn performance(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<PerformanceReport>, ApiError> {
    let days = parse_days(first_param(&pairs, "days"));
    tracing::info!(event = "performance_fetch", days = days);

    let report = blocking(&state, move |svc| svc.performance(days))
        .await
        .context("failed to fetch performance metrics")?;

    tracing::info!(
        event = "performance_fetched",
        data_points = report.summary.total_data_points,
        categories = report.summary.categories,
    );
    Ok(Json(report))
}

async fn get_evaluation(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Evaluation>, ApiError> {
    let id = parse_id(&raw_id)?;
    tracing::info!(event = "evaluation_fetch", id = id);

    let found = blocking(&state, move |svc| svc.get(id))
        .await
        .with_context(|| format!("failed to fetch evaluation {id}"))?;

    match found {
        Some(evaluation) => Ok(Json(evaluation)),
        None => Err(ApiError::NotFound(id.to_string())),
    }
}

async fn run_evaluation(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<RunAccepted>, ApiError> {
    let id = parse_id(&raw_id)?;
    tracing::info!(event = "evaluation_run_trigger", id = id);

    let updated = blocking(&state, move |svc| svc.run(id))
        .await
        .with_context(|| format!("failed to trigger evaluation run {id}"))?;

    let evaluation = updated.ok_or_else(|| ApiError::NotFound(id.to_string()))?;
    tracing::info!(event = "evaluation_run_triggered", id = id);

    Ok(Json(RunAccepted {
        message: "Evaluation run started successfully".to_string(),
        evaluation,
    }))
}

async fn evaluation_results(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ResultsReport>, ApiError> {
    let id = parse_id(&raw_id)?;
    tracing::info!(event = "evaluation_results_fetch", id = id);

    let report = blocking(&state, move |svc| svc.results(id))
        .await
        .with_context(|| format!("failed to fetch evaluation results {id}"))?
        .ok_or_else(|| ApiError::NotFound(id.to_string()))?;

    tracing::info!(
        event = "evaluation_results_fetched",
        id = id,
        detailed = report.has_details(),
    );
    Ok(Json(report))
}
