// Sample-data repository: deterministic per-tenant analytics without a database
use crate::application::analytics_repository::AnalyticsRepository;
use crate::domain::analytics::{
    AgentPerformance, Alert, AlertSeverity, CallRecord, ColumnInfo, DataPoint, KeyPhrase,
    MobileBankingMetric, QueryParams, SentimentSummary, TableInfo,
};
use crate::domain::error::FetchError;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

const AGENTS: [(&str, &str); 8] = [
    ("A-101", "Maria Lopez"),
    ("A-102", "James Carter"),
    ("A-103", "Aisha Khan"),
    ("A-104", "Tom Becker"),
    ("A-105", "Yuki Tanaka"),
    ("A-106", "Omar Haddad"),
    ("A-107", "Grace Obi"),
    ("A-108", "Lena Novak"),
];

const SHIFTS: [&str; 3] = ["morning", "evening", "night"];
const SOURCES: [&str; 4] = ["phone", "ivr", "mobile", "chat"];
const OUTCOMES: [&str; 4] = ["resolved", "escalated", "callback", "abandoned"];

const PHRASES: [(&str, &str); 8] = [
    ("card blocked", "negative"),
    ("reset password", "neutral"),
    ("thank you", "positive"),
    ("wire transfer", "neutral"),
    ("long wait", "negative"),
    ("mobile app login", "negative"),
    ("great service", "positive"),
    ("loan application", "neutral"),
];

const SERIES_POINTS: i64 = 12;

/// Serves generated data that stays stable for a given tenant and filter set.
#[derive(Debug, Clone, Default)]
pub struct SampleRepository;

impl SampleRepository {
    pub fn new() -> Self {
        Self
    }

    fn anchor(params: &QueryParams) -> DateTime<Utc> {
        params.end_date.unwrap_or_else(Utc::now)
    }
}

/// splitmix64 step
fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

fn seed(tenant_id: i64, salt: &str, i: u64) -> u64 {
    let salt_hash = salt
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |h, b| (h ^ b as u64).wrapping_mul(0x0100_0000_01b3));
    mix(mix(tenant_id as u64 ^ salt_hash).wrapping_add(i))
}

/// Uniform value in [lo, hi)
fn sample(tenant_id: i64, salt: &str, i: u64, lo: f64, hi: f64) -> f64 {
    let unit = (seed(tenant_id, salt, i) >> 11) as f64 / (1u64 << 53) as f64;
    lo + unit * (hi - lo)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[async_trait]
impl AnalyticsRepository for SampleRepository {
    async fn agent_performance(&self, params: &QueryParams) -> Result<Vec<AgentPerformance>, FetchError> {
        let t = params.tenant_id;
        let agents = AGENTS
            .iter()
            .enumerate()
            .map(|(i, (id, name))| {
                let i = i as u64;
                AgentPerformance {
                    agent_id: id.to_string(),
                    agent_name: name.to_string(),
                    shift: SHIFTS[i as usize % SHIFTS.len()].to_string(),
                    calls_handled: sample(t, "calls", i, 25.0, 90.0) as u32,
                    avg_handle_time_secs: round1(sample(t, "aht", i, 180.0, 480.0)),
                    first_call_resolution: round1(sample(t, "fcr", i, 60.0, 95.0)),
                    satisfaction: round1(sample(t, "csat", i, 3.2, 5.0)),
                }
            })
            .filter(|a| params.shift.as_deref().is_none_or(|s| a.shift.eq_ignore_ascii_case(s)))
            .collect();
        Ok(agents)
    }

    async fn alerts(&self, params: &QueryParams) -> Result<Vec<Alert>, FetchError> {
        let t = params.tenant_id;
        let anchor = Self::anchor(params);
        let queue_wait = sample(t, "wait", 0, 90.0, 240.0) as u32;

        Ok(vec![
            Alert {
                id: format!("ALT-{}-1", t),
                severity: AlertSeverity::Critical,
                title: "Service level below target".to_string(),
                message: format!("Service level dropped to {:.1}%", sample(t, "sl", 0, 62.0, 78.0)),
                created_at: anchor - TimeDelta::minutes(12),
            },
            Alert {
                id: format!("ALT-{}-2", t),
                severity: AlertSeverity::Warning,
                title: "Queue wait rising".to_string(),
                message: format!("Longest queue wait is {} s", queue_wait),
                created_at: anchor - TimeDelta::minutes(35),
            },
            Alert {
                id: format!("ALT-{}-3", t),
                severity: AlertSeverity::Info,
                title: "IVR flow updated".to_string(),
                message: "Card services menu was republished".to_string(),
                created_at: anchor - TimeDelta::hours(3),
            },
        ])
    }

    async fn calls(&self, params: &QueryParams) -> Result<Vec<CallRecord>, FetchError> {
        let t = params.tenant_id;
        let anchor = Self::anchor(params);

        let calls = (0..40u64)
            .map(|i| CallRecord {
                call_id: format!("C{}-{:04}", t, i + 1),
                agent_id: AGENTS[(seed(t, "agent", i) % AGENTS.len() as u64) as usize].0.to_string(),
                source: SOURCES[(seed(t, "source", i) % SOURCES.len() as u64) as usize].to_string(),
                started_at: anchor - TimeDelta::minutes(7 * i as i64),
                duration_secs: sample(t, "duration", i, 45.0, 900.0) as u32,
                outcome: OUTCOMES[(seed(t, "outcome", i) % OUTCOMES.len() as u64) as usize].to_string(),
                sentiment_score: (sample(t, "sentiment", i, -1.0, 1.0) * 100.0).round() / 100.0,
            })
            .filter(|c| params.source.as_deref().is_none_or(|s| c.source.eq_ignore_ascii_case(s)))
            .collect();
        Ok(calls)
    }

    async fn call_sentiment(&self, params: &QueryParams) -> Result<SentimentSummary, FetchError> {
        let t = params.tenant_id;
        let positive = sample(t, "pos", 0, 400.0, 900.0) as u32;
        let neutral = sample(t, "neu", 0, 200.0, 500.0) as u32;
        let negative = sample(t, "neg", 0, 50.0, 300.0) as u32;
        let total = (positive + neutral + negative) as f64;

        Ok(SentimentSummary {
            positive,
            neutral,
            negative,
            average_score: ((positive as f64 - negative as f64) / total * 100.0).round() / 100.0,
        })
    }

    async fn key_phrases(&self, params: &QueryParams) -> Result<Vec<KeyPhrase>, FetchError> {
        let t = params.tenant_id;
        let mut phrases: Vec<KeyPhrase> = PHRASES
            .iter()
            .enumerate()
            .map(|(i, (phrase, sentiment))| KeyPhrase {
                phrase: phrase.to_string(),
                count: sample(t, "phrase", i as u64, 5.0, 180.0) as u32,
                sentiment: sentiment.to_string(),
            })
            .collect();
        phrases.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(phrases)
    }

    async fn mobile_banking_metrics(&self, params: &QueryParams) -> Result<Vec<MobileBankingMetric>, FetchError> {
        let t = params.tenant_id;
        let metric = |i: u64, name: &str, unit: &str, lo: f64, hi: f64| MobileBankingMetric {
            metric: name.to_string(),
            value: round1(sample(t, "mobile", i, lo, hi)),
            unit: unit.to_string(),
            change_pct: round1(sample(t, "mobile-change", i, -8.0, 12.0)),
        };

        Ok(vec![
            metric(0, "Daily Active Users", "users", 12_000.0, 85_000.0),
            metric(1, "Login Success", "%", 94.0, 99.8),
            metric(2, "App Crash Rate", "%", 0.1, 1.5),
            metric(3, "API Response Time", "milliseconds", 120.0, 480.0),
            metric(4, "Average Session Duration", "seconds", 95.0, 310.0),
        ])
    }

    async fn list_tables(&self, params: &QueryParams) -> Result<Vec<TableInfo>, FetchError> {
        let t = params.tenant_id;
        Ok(TABLES
            .iter()
            .enumerate()
            .map(|(i, (name, _))| TableInfo {
                schema: "dbo".to_string(),
                name: name.to_string(),
                row_count: sample(t, "rows", i as u64, 50.0, 250_000.0) as u64,
            })
            .collect())
    }

    async fn table_structure(&self, table: &str, _params: &QueryParams) -> Result<Vec<ColumnInfo>, FetchError> {
        let bare = table.strip_prefix("dbo.").unwrap_or(table);
        let (_, columns) = TABLES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(bare))
            .ok_or_else(|| FetchError::NotFound(table.to_string()))?;

        Ok(columns
            .iter()
            .map(|(name, data_type, is_nullable, max_length)| ColumnInfo {
                name: name.to_string(),
                data_type: data_type.to_string(),
                is_nullable: *is_nullable,
                max_length: *max_length,
            })
            .collect())
    }

    async fn kpi_series(&self, kpi_id: &str, _query: &str, params: &QueryParams) -> Result<Vec<DataPoint>, FetchError> {
        let t = params.tenant_id;
        let end = Self::anchor(params);
        let start = params.start_date.unwrap_or(end - TimeDelta::hours(SERIES_POINTS));
        let step = (end - start) / SERIES_POINTS as i32;

        let baseline = sample(t, kpi_id, u64::MAX, 40.0, 900.0);
        Ok((0..SERIES_POINTS)
            .map(|i| {
                let at = start + step * (i as i32 + 1);
                let jitter = sample(t, kpi_id, i as u64, 0.85, 1.15);
                DataPoint::new(at.format("%m-%d %H:%M").to_string(), round1(baseline * jitter))
            })
            .collect())
    }
}

type ColumnSpec = (&'static str, &'static str, bool, Option<u32>);

const TABLES: [(&str, &[ColumnSpec]); 6] = [
    (
        "Calls",
        &[
            ("CallId", "nvarchar", false, Some(32)),
            ("TenantId", "int", false, None),
            ("AgentId", "nvarchar", true, Some(16)),
            ("Source", "nvarchar", false, Some(16)),
            ("StartedAt", "datetime2", false, None),
            ("DurationSecs", "int", false, None),
            ("Outcome", "nvarchar", true, Some(32)),
            ("SentimentScore", "decimal", true, None),
        ],
    ),
    (
        "Agents",
        &[
            ("AgentId", "nvarchar", false, Some(16)),
            ("TenantId", "int", false, None),
            ("Name", "nvarchar", false, Some(128)),
            ("Shift", "nvarchar", true, Some(16)),
        ],
    ),
    (
        "Alerts",
        &[
            ("AlertId", "nvarchar", false, Some(32)),
            ("TenantId", "int", false, None),
            ("Severity", "nvarchar", false, Some(16)),
            ("Title", "nvarchar", false, Some(256)),
            ("Message", "nvarchar", true, Some(1024)),
            ("CreatedAt", "datetime2", false, None),
        ],
    ),
    (
        "KeyPhrases",
        &[
            ("TenantId", "int", false, None),
            ("Phrase", "nvarchar", false, Some(256)),
            ("Mentions", "int", false, None),
            ("Sentiment", "nvarchar", true, Some(16)),
        ],
    ),
    (
        "MobileBankingMetrics",
        &[
            ("TenantId", "int", false, None),
            ("Metric", "nvarchar", false, Some(64)),
            ("Value", "decimal", false, None),
            ("RecordedAt", "datetime2", false, None),
        ],
    ),
    (
        "KpiMetrics",
        &[
            ("TenantId", "int", false, None),
            ("KpiId", "nvarchar", false, Some(64)),
            ("MetricValue", "decimal", false, None),
            ("RecordedAt", "datetime2", false, None),
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn params(tenant_id: i64) -> QueryParams {
        QueryParams {
            tenant_id,
            start_date: Some(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_same_tenant_and_range_give_same_data() {
        let repo = SampleRepository::new();
        let a = repo.kpi_series("call-volume", "", &params(1)).await.unwrap();
        let b = repo.kpi_series("call-volume", "", &params(1)).await.unwrap();
        let other = repo.kpi_series("call-volume", "", &params(2)).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), SERIES_POINTS as usize);
        assert_ne!(a, other);
        assert_eq!(a.last().unwrap().label, "04-01 12:00");
    }

    #[tokio::test]
    async fn test_filters_apply() {
        let repo = SampleRepository::new();
        let mut p = params(1);
        p.shift = Some("night".to_string());
        let agents = repo.agent_performance(&p).await.unwrap();
        assert!(!agents.is_empty());
        assert!(agents.iter().all(|a| a.shift == "night"));

        let mut p = params(1);
        p.source = Some("IVR".to_string());
        assert!(repo.calls(&p).await.unwrap().iter().all(|c| c.source == "ivr"));
    }

    #[tokio::test]
    async fn test_table_structure_lookup() {
        let repo = SampleRepository::new();
        let columns = repo.table_structure("dbo.calls", &params(1)).await.unwrap();
        assert_eq!(columns[0].name, "CallId");

        let err = repo.table_structure("Nope", &params(1)).await.unwrap_err();
        assert_eq!(err, FetchError::NotFound("Nope".to_string()));
    }

    #[tokio::test]
    async fn test_sentiment_counts_are_consistent() {
        let summary = SampleRepository::new().call_sentiment(&params(3)).await.unwrap();
        assert!(summary.sample_size() > 0);
        assert!(summary.average_score >= -1.0 && summary.average_score <= 1.0);
    }
}
