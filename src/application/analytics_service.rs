// Analytics service - Use cases behind the read-only data endpoints
use crate::application::analytics_repository::AnalyticsRepository;
use crate::domain::analytics::{
    AgentPerformance, Alert, CallRecord, ColumnInfo, KeyPhrase, MobileBankingMetric, QueryParams,
    SentimentSummary, TableInfo,
};
use crate::domain::error::FetchError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AnalyticsService {
    repository: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsService {
    pub fn new(repository: Arc<dyn AnalyticsRepository>) -> Self {
        Self { repository }
    }

    pub async fn agent_performance(&self, params: &QueryParams) -> Result<Vec<AgentPerformance>, FetchError> {
        let rows = self.repository.agent_performance(params).await?;
        Ok(apply_limit(rows, params))
    }

    pub async fn alerts(&self, params: &QueryParams) -> Result<Vec<Alert>, FetchError> {
        let rows = self.repository.alerts(params).await?;
        Ok(apply_limit(rows, params))
    }

    pub async fn calls(&self, params: &QueryParams) -> Result<Vec<CallRecord>, FetchError> {
        let rows = self.repository.calls(params).await?;
        Ok(apply_limit(rows, params))
    }

    pub async fn call_sentiment(&self, params: &QueryParams) -> Result<SentimentSummary, FetchError> {
        self.repository.call_sentiment(params).await
    }

    pub async fn key_phrases(&self, params: &QueryParams) -> Result<Vec<KeyPhrase>, FetchError> {
        let rows = self.repository.key_phrases(params).await?;
        Ok(apply_limit(rows, params))
    }

    pub async fn mobile_banking_metrics(&self, params: &QueryParams) -> Result<Vec<MobileBankingMetric>, FetchError> {
        self.repository.mobile_banking_metrics(params).await
    }

    pub async fn list_tables(&self, params: &QueryParams) -> Result<Vec<TableInfo>, FetchError> {
        self.repository.list_tables(params).await
    }

    pub async fn table_structure(&self, table: &str, params: &QueryParams) -> Result<Vec<ColumnInfo>, FetchError> {
        if !is_valid_table_name(table) {
            tracing::warn!("Rejecting table-structure lookup for '{}'", table);
            return Err(FetchError::NotFound(table.to_string()));
        }
        self.repository.table_structure(table, params).await
    }
}

/// Upstreams may ignore `limit`, so it is enforced here as well.
fn apply_limit<T>(mut rows: Vec<T>, params: &QueryParams) -> Vec<T> {
    if let Some(limit) = params.limit {
        rows.truncate(limit);
    }
    rows
}

/// `schema.table` or `table`, identifier characters only.
fn is_valid_table_name(table: &str) -> bool {
    let parts: Vec<&str> = table.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|p| {
            !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
