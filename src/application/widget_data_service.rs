// Widget data service - resolves the tenant-scoped data a widget is bound to
use crate::application::analytics_repository::AnalyticsRepository;
use crate::application::fetch_tracker::{with_timeout, FetchKey};
use crate::domain::analytics::{DataPoint, QueryParams, WidgetData};
use crate::domain::error::FetchError;
use crate::domain::kpi::KpiCatalog;
use crate::domain::widget::Widget;
use crate::infrastructure::config::prepare_query;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Where a widget's data comes from, keyed on its KPI id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WidgetSource {
    Sentiment,
    AgentPerformance,
    KeyPhrases,
    Alerts,
    Calls,
    MobileBanking,
    KpiSeries,
}

impl WidgetSource {
    fn for_kpi(kpi_id: &str) -> Self {
        match kpi_id {
            "sentiment-score" => Self::Sentiment,
            "agent-performance" => Self::AgentPerformance,
            "key-phrases" => Self::KeyPhrases,
            "alerts" => Self::Alerts,
            "recent-calls" => Self::Calls,
            "mobile-banking-overview" => Self::MobileBanking,
            _ => Self::KpiSeries,
        }
    }

    fn endpoint(&self, kpi_id: &str) -> String {
        match self {
            Self::Sentiment => "/api/calls/sentiment".to_string(),
            Self::AgentPerformance => "/api/agents/performance".to_string(),
            Self::KeyPhrases => "/api/key-phrases".to_string(),
            Self::Alerts => "/api/alerts".to_string(),
            Self::Calls => "/api/calls".to_string(),
            Self::MobileBanking => "/api/mobile-banking/metrics".to_string(),
            Self::KpiSeries => format!("/api/kpi-series/{}", kpi_id),
        }
    }
}

#[derive(Clone)]
pub struct WidgetDataService {
    repository: Arc<dyn AnalyticsRepository>,
    catalog: Arc<KpiCatalog>,
    timeout: Duration,
}

impl WidgetDataService {
    pub fn new(repository: Arc<dyn AnalyticsRepository>, catalog: Arc<KpiCatalog>, timeout: Duration) -> Self {
        Self {
            repository,
            catalog,
            timeout,
        }
    }

    pub fn fetch_key(&self, widget: &Widget, params: &QueryParams) -> FetchKey {
        let source = WidgetSource::for_kpi(&widget.kpi_id);
        let filter = match source {
            WidgetSource::KpiSeries => Some(widget.kpi_id.clone()),
            _ => params.shift.clone().or_else(|| params.source.clone()),
        };

        FetchKey {
            endpoint: source.endpoint(&widget.kpi_id),
            tenant_id: params.tenant_id,
            start_date: params.start_date.map(|d| d.to_rfc3339()),
            end_date: params.end_date.map(|d| d.to_rfc3339()),
            filter,
        }
    }

    /// Fetches a widget's data, failing with `Timeout` once the configured
    /// limit passes.
    pub async fn fetch(&self, widget: &Widget, params: &QueryParams) -> Result<WidgetData, FetchError> {
        with_timeout(self.timeout, self.fetch_unbounded(widget, params)).await
    }

    async fn fetch_unbounded(&self, widget: &Widget, params: &QueryParams) -> Result<WidgetData, FetchError> {
        match WidgetSource::for_kpi(&widget.kpi_id) {
            WidgetSource::Sentiment => {
                let summary = self.repository.call_sentiment(params).await?;
                tracing::debug!("Sentiment for tenant {} over {} calls", params.tenant_id, summary.sample_size());
                Ok(WidgetData::Series {
                    unit: "calls".to_string(),
                    points: vec![
                        DataPoint::new("Positive", summary.positive as f64),
                        DataPoint::new("Neutral", summary.neutral as f64),
                        DataPoint::new("Negative", summary.negative as f64),
                    ],
                })
            }
            WidgetSource::AgentPerformance => {
                let agents = self.repository.agent_performance(params).await?;
                Ok(WidgetData::Rows {
                    columns: columns(&["Agent", "Calls", "AHT (s)", "FCR %", "CSAT"]),
                    rows: agents
                        .into_iter()
                        .map(|a| {
                            vec![
                                a.agent_name,
                                a.calls_handled.to_string(),
                                format!("{:.0}", a.avg_handle_time_secs),
                                format!("{:.1}", a.first_call_resolution),
                                format!("{:.1}", a.satisfaction),
                            ]
                        })
                        .collect(),
                })
            }
            WidgetSource::KeyPhrases => {
                let phrases = self.repository.key_phrases(params).await?;
                Ok(WidgetData::Rows {
                    columns: columns(&["Phrase", "Mentions", "Sentiment"]),
                    rows: phrases
                        .into_iter()
                        .map(|p| vec![p.phrase, p.count.to_string(), p.sentiment])
                        .collect(),
                })
            }
            WidgetSource::Alerts => {
                let alerts = self.repository.alerts(params).await?;
                Ok(WidgetData::Rows {
                    columns: columns(&["Title", "Severity", "Message"]),
                    rows: alerts
                        .into_iter()
                        .map(|a| vec![a.title, format!("{:?}", a.severity).to_lowercase(), a.message])
                        .collect(),
                })
            }
            WidgetSource::Calls => {
                let calls = self.repository.calls(params).await?;
                Ok(WidgetData::Rows {
                    columns: columns(&["Call", "Duration (s)", "Source", "Outcome"]),
                    rows: calls
                        .into_iter()
                        .map(|c| vec![c.call_id, c.duration_secs.to_string(), c.source, c.outcome])
                        .collect(),
                })
            }
            WidgetSource::MobileBanking => {
                let metrics = self.repository.mobile_banking_metrics(params).await?;
                Ok(WidgetData::Rows {
                    columns: columns(&["Metric", "Value", "Change %"]),
                    rows: metrics
                        .into_iter()
                        .map(|m| vec![m.metric, format!("{:.2}", m.value), format!("{:+.1}", m.change_pct)])
                        .collect(),
                })
            }
            WidgetSource::KpiSeries => {
                let query = prepare_query(&widget.sql_query, &query_vars(params));
                let points = self.repository.kpi_series(&widget.kpi_id, &query, params).await?;
                let unit = self
                    .catalog
                    .get(&widget.kpi_id)
                    .map(|k| k.unit.clone())
                    .unwrap_or_default();
                Ok(WidgetData::Series { unit, points })
            }
        }
    }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn query_vars(params: &QueryParams) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("tenantId".to_string(), params.tenant_id.to_string());
    vars.insert(
        "startDate".to_string(),
        params.start_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
    );
    vars.insert(
        "endDate".to_string(),
        params.end_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
    );
    vars
}
