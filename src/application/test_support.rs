// In-memory doubles for service tests
use crate::application::analytics_repository::AnalyticsRepository;
use crate::application::theme_service::PreferenceStore;
use crate::domain::analytics::{
    AgentPerformance, Alert, CallRecord, ColumnInfo, DataPoint, KeyPhrase, MobileBankingMetric,
    QueryParams, SentimentSummary, TableInfo,
};
use crate::domain::error::{DashboardError, FetchError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct StubRepository {
    /// Status to fail sentiment fetches with, per tenant
    pub sentiment_failures: HashMap<i64, u16>,
    /// Delay applied to KPI series fetches
    pub series_delay: Option<Duration>,
    pub series_calls: Mutex<Vec<(String, String, i64)>>,
}

#[async_trait]
impl AnalyticsRepository for StubRepository {
    async fn agent_performance(&self, params: &QueryParams) -> Result<Vec<AgentPerformance>, FetchError> {
        Ok(vec![AgentPerformance {
            agent_id: "a1".to_string(),
            agent_name: format!("Agent of tenant {}", params.tenant_id),
            shift: "day".to_string(),
            calls_handled: 40,
            avg_handle_time_secs: 300.0,
            first_call_resolution: 75.0,
            satisfaction: 4.5,
        }])
    }

    async fn alerts(&self, _params: &QueryParams) -> Result<Vec<Alert>, FetchError> {
        Ok(Vec::new())
    }

    async fn calls(&self, _params: &QueryParams) -> Result<Vec<CallRecord>, FetchError> {
        Ok(Vec::new())
    }

    async fn call_sentiment(&self, params: &QueryParams) -> Result<SentimentSummary, FetchError> {
        if let Some(status) = self.sentiment_failures.get(&params.tenant_id) {
            return Err(FetchError::Status(*status));
        }
        Ok(SentimentSummary {
            positive: 60,
            neutral: 30,
            negative: 10,
            average_score: 0.42,
        })
    }

    async fn key_phrases(&self, _params: &QueryParams) -> Result<Vec<KeyPhrase>, FetchError> {
        Ok(vec![KeyPhrase {
            phrase: "card blocked".to_string(),
            count: 12,
            sentiment: "negative".to_string(),
        }])
    }

    async fn mobile_banking_metrics(&self, _params: &QueryParams) -> Result<Vec<MobileBankingMetric>, FetchError> {
        Ok(Vec::new())
    }

    async fn list_tables(&self, _params: &QueryParams) -> Result<Vec<TableInfo>, FetchError> {
        Ok(Vec::new())
    }

    async fn table_structure(&self, table: &str, _params: &QueryParams) -> Result<Vec<ColumnInfo>, FetchError> {
        Err(FetchError::NotFound(table.to_string()))
    }

    async fn kpi_series(&self, kpi_id: &str, query: &str, params: &QueryParams) -> Result<Vec<DataPoint>, FetchError> {
        self.series_calls
            .lock()
            .unwrap()
            .push((kpi_id.to_string(), query.to_string(), params.tenant_id));
        if let Some(delay) = self.series_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(vec![DataPoint::new("09:00", 10.0), DataPoint::new("10:00", params.tenant_id as f64)])
    }
}

#[derive(Default)]
pub struct MemoryPreferences(Mutex<HashMap<String, String>>);

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    async fn load(&self, key: &str) -> Result<Option<String>, DashboardError> {
        Ok(self.0.lock().unwrap().get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), DashboardError> {
        self.0.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
