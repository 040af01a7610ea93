use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use evalboard_core::{EvaluationStatus, NewEvaluation};
use evalboard_server::config::ServerConfig;
use evalboard_server::{build_router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

const KEY: &str = "test-key";

fn state() -> anyhow::Result<AppState> {
    let cfg = ServerConfig {
        api_key: KEY.to_string(),
        ..Default::default()
    };
    AppState::new_memory(&cfg)
}

fn seed(state: &AppState) -> anyhow::Result<Vec<i64>> {
    let now = Utc::now();
    let rows = [
        ("Fraud Detection Accuracy", EvaluationStatus::Completed, Some(92.0)),
        ("AML Compliance Check", EvaluationStatus::Completed, Some(80.0)),
        ("Transaction Risk Scoring", EvaluationStatus::Running, None),
        ("OTP Delivery", EvaluationStatus::Pending, None),
    ];
    let mut ids = Vec::new();
    for (i, (name, status, score)) in rows.into_iter().enumerate() {
        let at = now - Duration::hours(i as i64 + 1);
        let mut e = NewEvaluation::new(name, status, at).test_cases(100);
        e.score = score;
        ids.push(state.service.store().insert_evaluation(&e)?);
    }
    Ok(ids)
}

async fn call(app: Router, method: Method, uri: &str, key: Option<&str>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(k) = key {
        req = req.header("x-api-key", k);
    }
    let resp = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn api_requires_key() -> anyhow::Result<()> {
    let app = build_router(state()?);

    let (status, body) = call(app.clone(), Method::GET, "/api/v1/evaluations", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = call(app, Method::GET, "/api/v1/evaluations", Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn health_and_index_are_public() -> anyhow::Result<()> {
    let app = build_router(state()?);

    let (status, body) = call(app.clone(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let resp = app
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await?.to_bytes();
    assert!(String::from_utf8_lossy(&bytes).contains("Evalboard"));
    Ok(())
}

#[tokio::test]
async fn list_paginates_and_summarizes_whole_table() -> anyhow::Result<()> {
    let state = state()?;
    seed(&state)?;
    let app = build_router(state);

    let (status, body) = call(
        app.clone(),
        Method::GET,
        "/api/v1/evaluations?page=2&limit=3",
        Some(KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["evaluations"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["limit"], 3);
    assert_eq!(body["pagination"]["total"], 4);
    assert_eq!(body["pagination"]["totalPages"], 2);

    let (_, body) = call(
        app,
        Method::GET,
        "/api/v1/evaluations?status=completed",
        Some(KEY),
    )
    .await;
    assert_eq!(body["pagination"]["total"], 2);
    // summary ignores the filter
    assert_eq!(body["summary"]["totalEvaluations"], 4);
    assert_eq!(body["summary"]["averageScore"], 86.0);
    assert_eq!(body["summary"]["activeTests"], 1);
    Ok(())
}

#[tokio::test]
async fn unknown_sort_field_falls_back() -> anyhow::Result<()> {
    let state = state()?;
    seed(&state)?;
    let app = build_router(state);

    let (status, body) = call(
        app,
        Method::GET,
        "/api/v1/evaluations?sort=name;DROP%20TABLE%20evaluations&order=asc",
        Some(KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 4);
    Ok(())
}

#[tokio::test]
async fn missing_and_malformed_ids_are_404() -> anyhow::Result<()> {
    let app = build_router(state()?);

    let (status, body) = call(app.clone(), Method::GET, "/api/v1/evaluations/999", Some(KEY)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Evaluation not found");
    assert!(body["message"].as_str().unwrap_or("").contains("999"));

    let (status, _) = call(app.clone(), Method::GET, "/api/v1/evaluations/abc", Some(KEY)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        app.clone(),
        Method::POST,
        "/api/v1/evaluations/999/run",
        Some(KEY),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(app, Method::GET, "/api/v1/evaluations/999/results", Some(KEY)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn run_then_results_has_no_details() -> anyhow::Result<()> {
    let state = state()?;
    let ids = seed(&state)?;
    let app = build_router(state);
    let id = ids[0];

    let (status, body) = call(
        app.clone(),
        Method::POST,
        &format!("/api/v1/evaluations/{id}/run"),
        Some(KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Evaluation run started successfully");
    assert_eq!(body["evaluation"]["status"], "running");
    assert!(body["evaluation"]["lastRun"].is_string());

    let (status, body) = call(
        app,
        Method::GET,
        &format!("/api/v1/evaluations/{id}/results"),
        Some(KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert!(body["testResults"].is_null());
    assert!(body["metrics"].is_null());
    assert!(body["summary"]["passed"].is_null());
    Ok(())
}

#[tokio::test]
async fn completed_results_carry_details() -> anyhow::Result<()> {
    let state = state()?;
    let ids = seed(&state)?;
    let app = build_router(state);

    let (status, body) = call(
        app,
        Method::GET,
        &format!("/api/v1/evaluations/{}/results", ids[0]),
        Some(KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["passed"], 92);
    assert_eq!(body["summary"]["failed"], 8);
    let counts: Vec<i64> = body["testResults"]
        .as_array()
        .map(|a| a.iter().filter_map(|b| b["count"].as_i64()).collect())
        .unwrap_or_default();
    assert_eq!(counts, [60, 32, 5, 3]);
    Ok(())
}

#[tokio::test]
async fn performance_report_shape() -> anyhow::Result<()> {
    let state = state()?;
    seed(&state)?;
    let app = build_router(state);

    let (status, body) = call(
        app.clone(),
        Method::GET,
        "/api/v1/evaluations/performance?days=7",
        Some(KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["daysAnalyzed"], 7);
    assert!(body["performanceOverTime"].is_array());
    assert_eq!(body["recentTrends"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["recentTrends"][0]["rank"], 1);

    let (_, body) = call(
        app,
        Method::GET,
        "/api/v1/evaluations/performance?days=oops",
        Some(KEY),
    )
    .await;
    assert_eq!(body["summary"]["daysAnalyzed"], 30);
    Ok(())
}

#[tokio::test]
async fn repeated_query_keys_use_the_first_value() -> anyhow::Result<()> {
    let state = state()?;
    seed(&state)?;
    let app = build_router(state);

    let (status, body) = call(
        app.clone(),
        Method::GET,
        "/api/v1/evaluations?page=1&page=2&limit=3",
        Some(KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["evaluations"].as_array().map(Vec::len), Some(3));

    let (status, body) = call(
        app,
        Method::GET,
        "/api/v1/evaluations/performance?days=7&days=8",
        Some(KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["daysAnalyzed"], 7);
    Ok(())
}

#[tokio::test]
async fn windows_longer_than_a_year_are_honoured() -> anyhow::Result<()> {
    let state = state()?;
    let at = Utc::now() - Duration::days(400);
    let mut e = NewEvaluation::new("Fraud Sweep", EvaluationStatus::Completed, at).test_cases(50);
    e.score = Some(91.0);
    state.service.store().insert_evaluation(&e)?;
    let app = build_router(state);

    let (status, body) = call(
        app,
        Method::GET,
        "/api/v1/evaluations/performance?days=500",
        Some(KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["daysAnalyzed"], 500);
    assert_eq!(body["performanceOverTime"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["summary"]["categories"], 1);
    Ok(())
}

#[tokio::test]
async fn limit_is_capped_at_the_page_size_ceiling() -> anyhow::Result<()> {
    let state = state()?;
    seed(&state)?;
    let app = build_router(state);

    let (status, body) = call(
        app,
        Method::GET,
        "/api/v1/evaluations?limit=500",
        Some(KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["limit"], 100);
    Ok(())
}
