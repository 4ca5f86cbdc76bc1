// Call-center and mobile-banking analytics records served by the data endpoints
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filters shared by every data endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    pub tenant_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl QueryParams {
    pub fn for_tenant(tenant_id: i64) -> Self {
        Self {
            tenant_id,
            ..Default::default()
        }
    }

    /// Query-string pairs in wire naming, optional filters omitted.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("tenantId", self.tenant_id.to_string())];
        if let Some(start) = self.start_date {
            pairs.push(("startDate", start.to_rfc3339()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate", end.to_rfc3339()));
        }
        if let Some(shift) = &self.shift {
            pairs.push(("shift", shift.clone()));
        }
        if let Some(source) = &self.source {
            pairs.push(("source", source.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformance {
    pub agent_id: String,
    pub agent_name: String,
    pub shift: String,
    pub calls_handled: u32,
    pub avg_handle_time_secs: f64,
    pub first_call_resolution: f64,
    pub satisfaction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub call_id: String,
    pub agent_id: String,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub duration_secs: u32,
    pub outcome: String,
    pub sentiment_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentSummary {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
    pub average_score: f64,
}

impl SentimentSummary {
    pub fn sample_size(&self) -> u32 {
        self.positive + self.neutral + self.negative
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPhrase {
    pub phrase: String,
    pub count: u32,
    pub sentiment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileBankingMetric {
    pub metric: String,
    pub value: f64,
    pub unit: String,
    pub change_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    pub schema: String,
    pub name: String,
    pub row_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

/// A single labelled point of a widget series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Tenant-scoped data resolved for one widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum WidgetData {
    Scalar { value: f64, unit: String },
    Series { unit: String, points: Vec<DataPoint> },
    Rows { columns: Vec<String>, rows: Vec<Vec<String>> },
}
