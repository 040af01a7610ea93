use anyhow::Context;
use async_trait::async_trait;
use evalboard_core::performance::PerformanceReport;
use evalboard_core::query::EvaluationPage;
use evalboard_core::results::ResultsReport;
use evalboard_core::{ErrorBody, Evaluation, RunAccepted};
use serde::de::DeserializeOwned;
use serde::Serialize;

const API_PREFIX: &str = "/api/v1/evaluations";
const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ListParams {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub sort: String,
    pub order: String,
}

impl From<&crate::cli::args::ListArgs> for ListParams {
    fn from(a: &crate::cli::args::ListArgs) -> Self {
        Self {
            page: a.page,
            limit: a.limit,
            status: a.status.clone(),
            sort: a.sort.clone(),
            order: a.order.clone(),
        }
    }
}

/// Everything the dashboard views need from the evaluations API.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn list(&self, params: &ListParams) -> anyhow::Result<EvaluationPage>;
    async fn performance(&self, days: u32) -> anyhow::Result<PerformanceReport>;
    async fn get(&self, id: i64) -> anyhow::Result<Evaluation>;
    async fn run(&self, id: i64) -> anyhow::Result<RunAccepted>;
    async fn results(&self, id: i64) -> anyhow::Result<ResultsReport>;
}

pub struct HttpApi {
    pub base_url: String,
    pub api_key: String,
    pub client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> anyhow::Result<T> {
        let resp = req
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .with_context(|| format!("cannot reach {}", self.base_url))?;

        let status = resp.status();
        tracing::debug!(event = "api_response", url = %resp.url(), status = status.as_u16());
        if !status.is_success() {
            let message = match resp.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            };
            anyhow::bail!("{} ({})", message, status.as_u16());
        }

        resp.json::<T>()
            .await
            .context("unexpected response body")
    }
}

#[async_trait]
impl DashboardApi for HttpApi {
    async fn list(&self, params: &ListParams) -> anyhow::Result<EvaluationPage> {
        self.send(self.client.get(self.url("")).query(params)).await
    }

    async fn performance(&self, days: u32) -> anyhow::Result<PerformanceReport> {
        self.send(
            self.client
                .get(self.url("/performance"))
                .query(&[("days", days)]),
        )
        .await
    }

    async fn get(&self, id: i64) -> anyhow::Result<Evaluation> {
        self.send(self.client.get(self.url(&format!("/{id}")))).await
    }

    async fn run(&self, id: i64) -> anyhow::Result<RunAccepted> {
        self.send(self.client.post(self.url(&format!("/{id}/run")))).await
    }

    async fn results(&self, id: i64) -> anyhow::Result<ResultsReport> {
        self.send(self.client.get(self.url(&format!("/{id}/results"))))
            .await
    }
}
