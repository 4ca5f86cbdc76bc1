// Upstream reporting API repository implementation
use crate::application::analytics_repository::AnalyticsRepository;
use crate::domain::analytics::{
    AgentPerformance, Alert, CallRecord, ColumnInfo, DataPoint, KeyPhrase, MobileBankingMetric,
    QueryParams, SentimentSummary, TableInfo,
};
use crate::domain::error::FetchError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct HttpRepository {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpRepository {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    fn build_url(&self, path: &str, params: &QueryParams, extra: &[(&str, &str)]) -> String {
        let owned = params.to_pairs();
        let query: Vec<String> = owned
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .chain(extra.iter().copied())
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();

        format!("{}{}?{}", self.base_url, path, query.join("&"))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Upstream {} failed with status {}: {}", url, status, body);
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AnalyticsRepository for HttpRepository {
    async fn agent_performance(&self, params: &QueryParams) -> Result<Vec<AgentPerformance>, FetchError> {
        self.get_json(&self.build_url("/api/agents/performance", params, &[])).await
    }

    async fn alerts(&self, params: &QueryParams) -> Result<Vec<Alert>, FetchError> {
        self.get_json(&self.build_url("/api/alerts", params, &[])).await
    }

    async fn calls(&self, params: &QueryParams) -> Result<Vec<CallRecord>, FetchError> {
        self.get_json(&self.build_url("/api/calls", params, &[])).await
    }

    async fn call_sentiment(&self, params: &QueryParams) -> Result<SentimentSummary, FetchError> {
        self.get_json(&self.build_url("/api/calls/sentiment", params, &[])).await
    }

    async fn key_phrases(&self, params: &QueryParams) -> Result<Vec<KeyPhrase>, FetchError> {
        self.get_json(&self.build_url("/api/key-phrases", params, &[])).await
    }

    async fn mobile_banking_metrics(&self, params: &QueryParams) -> Result<Vec<MobileBankingMetric>, FetchError> {
        self.get_json(&self.build_url("/api/mobile-banking/metrics", params, &[])).await
    }

    async fn list_tables(&self, params: &QueryParams) -> Result<Vec<TableInfo>, FetchError> {
        self.get_json(&self.build_url("/api/database/tables", params, &[])).await
    }

    async fn table_structure(&self, table: &str, params: &QueryParams) -> Result<Vec<ColumnInfo>, FetchError> {
        let path = format!("/api/database/table-structure/{}", urlencoding::encode(table));
        match self.get_json(&self.build_url(&path, params, &[])).await {
            Err(FetchError::Status(404)) => Err(FetchError::NotFound(table.to_string())),
            other => other,
        }
    }

    async fn kpi_series(&self, kpi_id: &str, query: &str, params: &QueryParams) -> Result<Vec<DataPoint>, FetchError> {
        let path = format!("/api/kpi-series/{}", urlencoding::encode(kpi_id));
        self.get_json(&self.build_url(&path, params, &[("query", query)])).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_encodes_params() {
        let repo = HttpRepository::new("http://reporting:3001/".to_string(), None);
        let mut params = QueryParams::for_tenant(4);
        params.shift = Some("late night".to_string());

        let url = repo.build_url("/api/kpi-series/aht", &params, &[("query", "a = 'b'")]);
        assert_eq!(
            url,
            "http://reporting:3001/api/kpi-series/aht?tenantId=4&shift=late%20night&query=a%20%3D%20%27b%27"
        );
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_transport_error() {
        let repo = HttpRepository::new("http://127.0.0.1:9".to_string(), None);
        let err = repo.alerts(&QueryParams::for_tenant(1)).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
