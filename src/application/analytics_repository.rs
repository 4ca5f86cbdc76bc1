// Repository trait for tenant-scoped analytics data access
use crate::domain::analytics::{
    AgentPerformance, Alert, CallRecord, ColumnInfo, DataPoint, KeyPhrase, MobileBankingMetric,
    QueryParams, SentimentSummary, TableInfo,
};
use crate::domain::error::FetchError;
use async_trait::async_trait;

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn agent_performance(&self, params: &QueryParams) -> Result<Vec<AgentPerformance>, FetchError>;

    async fn alerts(&self, params: &QueryParams) -> Result<Vec<Alert>, FetchError>;

    async fn calls(&self, params: &QueryParams) -> Result<Vec<CallRecord>, FetchError>;

    async fn call_sentiment(&self, params: &QueryParams) -> Result<SentimentSummary, FetchError>;

    async fn key_phrases(&self, params: &QueryParams) -> Result<Vec<KeyPhrase>, FetchError>;

    async fn mobile_banking_metrics(&self, params: &QueryParams) -> Result<Vec<MobileBankingMetric>, FetchError>;

    /// Table introspection for the tenant's reporting database
    async fn list_tables(&self, params: &QueryParams) -> Result<Vec<TableInfo>, FetchError>;

    async fn table_structure(&self, table: &str, params: &QueryParams) -> Result<Vec<ColumnInfo>, FetchError>;

    /// Time series for a single KPI. `query` is the widget's prepared query text.
    async fn kpi_series(
        &self,
        kpi_id: &str,
        query: &str,
        params: &QueryParams,
    ) -> Result<Vec<DataPoint>, FetchError>;
}
