// Widget descriptors and the KPI -> widget kind derivation
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DashboardError;
use super::kpi::KpiDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Donut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Value,
    Chart(ChartKind),
    Table,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetSize {
    Small,
    Medium,
    Large,
}

/// Which rule of the derivation chain produced a widget kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationRule {
    Percent,
    TimeUnit,
    TrendName,
    CountUnit,
    Unmatched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDerivation {
    pub kind: WidgetKind,
    pub rule: DerivationRule,
}

/// Derives the widget kind for a KPI from its unit and name.
///
/// Rules are checked in order and the first match wins:
/// percent unit, time unit, rate/trend name, user/count unit, then value.
pub fn derive_kind(unit: &str, name: &str) -> KindDerivation {
    let unit = unit.trim().to_lowercase();
    let name = name.to_lowercase();

    let (kind, rule) = if unit.contains('%') {
        (WidgetKind::Chart(ChartKind::Pie), DerivationRule::Percent)
    } else if is_time_unit(&unit) {
        (WidgetKind::Chart(ChartKind::Line), DerivationRule::TimeUnit)
    } else if name.contains("rate") || name.contains("trend") {
        (WidgetKind::Chart(ChartKind::Line), DerivationRule::TrendName)
    } else if unit.contains("user") || unit.contains("count") {
        (WidgetKind::Chart(ChartKind::Bar), DerivationRule::CountUnit)
    } else {
        (WidgetKind::Value, DerivationRule::Unmatched)
    };

    KindDerivation { kind, rule }
}

fn is_time_unit(unit: &str) -> bool {
    unit.contains("second") || unit.contains("millisecond") || matches!(unit, "s" | "ms" | "sec")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WidgetRecord", try_from = "WidgetRecord")]
pub struct Widget {
    pub id: String,
    pub title: String,
    pub kind: WidgetKind,
    pub size: WidgetSize,
    pub kpi_id: String,
    pub sql_query: String,
}

impl Widget {
    /// Builds the widget a KPI gets when dropped onto the dashboard.
    pub fn from_kpi(id: String, kpi: &KpiDefinition) -> Self {
        let derivation = derive_kind(&kpi.unit, &kpi.name);
        tracing::debug!("KPI {} -> {:?} ({:?})", kpi.id, derivation.kind, derivation.rule);
        Self {
            id,
            title: kpi.name.clone(),
            kind: derivation.kind,
            size: WidgetSize::Medium,
            kpi_id: kpi.id.clone(),
            sql_query: kpi_query(&kpi.id),
        }
    }
}

/// Query template for a KPI; placeholders are filled per fetch.
pub fn kpi_query(kpi_id: &str) -> String {
    format!(
        "SELECT recorded_at, metric_value FROM kpi_metrics WHERE kpi_id = '{}' AND tenant_id = ${{tenantId}} AND recorded_at BETWEEN '${{startDate}}' AND '${{endDate}}' ORDER BY recorded_at",
        kpi_id
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WidgetType {
    Chart,
    Value,
    Table,
    List,
}

/// Wire shape of a widget: the `type`/`chartType` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WidgetRecord {
    id: String,
    title: String,
    #[serde(rename = "type")]
    widget_type: WidgetType,
    size: WidgetSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chart_type: Option<ChartKind>,
    kpi_id: String,
    #[serde(default)]
    sql_query: String,
}

impl From<Widget> for WidgetRecord {
    fn from(widget: Widget) -> Self {
        let (widget_type, chart_type) = match widget.kind {
            WidgetKind::Value => (WidgetType::Value, None),
            WidgetKind::Chart(kind) => (WidgetType::Chart, Some(kind)),
            WidgetKind::Table => (WidgetType::Table, None),
            WidgetKind::List => (WidgetType::List, None),
        };

        Self {
            id: widget.id,
            title: widget.title,
            widget_type,
            size: widget.size,
            chart_type,
            kpi_id: widget.kpi_id,
            sql_query: widget.sql_query,
        }
    }
}

impl TryFrom<WidgetRecord> for Widget {
    type Error = DashboardError;

    fn try_from(record: WidgetRecord) -> Result<Self, Self::Error> {
        let kind = match (record.widget_type, record.chart_type) {
            (WidgetType::Chart, Some(kind)) => WidgetKind::Chart(kind),
            (WidgetType::Chart, None) => {
                return Err(DashboardError::InvalidWidget(format!(
                    "chart widget {} has no chartType",
                    record.id
                )));
            }
            (_, Some(_)) => {
                return Err(DashboardError::InvalidWidget(format!(
                    "widget {} carries a chartType but is not a chart",
                    record.id
                )));
            }
            (WidgetType::Value, None) => WidgetKind::Value,
            (WidgetType::Table, None) => WidgetKind::Table,
            (WidgetType::List, None) => WidgetKind::List,
        };

        if record.id.trim().is_empty() {
            return Err(DashboardError::InvalidWidget("widget id is empty".to_string()));
        }

        Ok(Self {
            id: record.id,
            title: record.title,
            kind,
            size: record.size,
            kpi_id: record.kpi_id,
            sql_query: record.sql_query,
        })
    }
}

/// Issues `widget-<kpiId>-<timestamp>` ids.
///
/// The timestamp part never repeats: a clock reading at or before the last
/// issued one is bumped to last + 1 ms.
#[derive(Debug, Default)]
pub struct WidgetIdGenerator {
    last_ms: i64,
}

impl WidgetIdGenerator {
    pub fn next_id(&mut self, kpi_id: &str, now: DateTime<Utc>) -> String {
        let mut ms = now.timestamp_millis();
        if ms <= self.last_ms {
            ms = self.last_ms + 1;
        }
        self.last_ms = ms;
        format!("widget-{}-{}", kpi_id, ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_percent_unit_wins_over_everything() {
        for name in ["Abandonment Rate", "Handle time trend", "Users", "Plain"] {
            let d = derive_kind("%", name);
            assert_eq!(d.kind, WidgetKind::Chart(ChartKind::Pie));
            assert_eq!(d.rule, DerivationRule::Percent);
        }
    }

    #[test]
    fn test_derivation_precedence() {
        assert_eq!(derive_kind("seconds", "Call rate").rule, DerivationRule::TimeUnit);
        assert_eq!(derive_kind("milliseconds", "Latency").kind, WidgetKind::Chart(ChartKind::Line));
        assert_eq!(derive_kind("users", "Login Trend").rule, DerivationRule::TrendName);
        assert_eq!(derive_kind("users", "Daily Active Users").kind, WidgetKind::Chart(ChartKind::Bar));
        assert_eq!(derive_kind("count", "Calls").rule, DerivationRule::CountUnit);
        assert_eq!(derive_kind("USD", "Transfer Volume").kind, WidgetKind::Value);
        assert_eq!(derive_kind("", "").rule, DerivationRule::Unmatched);
    }

    #[test]
    fn test_derivation_never_yields_table_list_or_donut() {
        let units = ["%", "seconds", "ms", "users", "count", "score", "", "USD"];
        let names = ["Rate", "trend", "Volume", "", "Agents"];
        for unit in units {
            for name in names {
                let kind = derive_kind(unit, name).kind;
                assert!(matches!(
                    kind,
                    WidgetKind::Value
                        | WidgetKind::Chart(ChartKind::Bar)
                        | WidgetKind::Chart(ChartKind::Line)
                        | WidgetKind::Chart(ChartKind::Pie)
                ));
            }
        }
    }

    #[test]
    fn test_wire_shape_uses_type_and_chart_type() {
        let widget = Widget {
            id: "w1".to_string(),
            title: "Service Level".to_string(),
            kind: WidgetKind::Chart(ChartKind::Donut),
            size: WidgetSize::Large,
            kpi_id: "service-level".to_string(),
            sql_query: String::new(),
        };
        let json = serde_json::to_value(&widget).unwrap();
        assert_eq!(json["type"], "chart");
        assert_eq!(json["chartType"], "donut");
        assert_eq!(json["kpiId"], "service-level");
    }

    #[test]
    fn test_chart_without_chart_type_is_rejected() {
        let json = r#"{"id":"w","title":"t","type":"chart","size":"small","kpiId":"k"}"#;
        assert!(serde_json::from_str::<Widget>(json).is_err());

        let json = r#"{"id":"w","title":"t","type":"value","chartType":"bar","size":"small","kpiId":"k"}"#;
        assert!(serde_json::from_str::<Widget>(json).is_err());
    }

    #[test]
    fn test_id_generator_never_repeats() {
        let mut ids = WidgetIdGenerator::default();
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let a = ids.next_id("k1", now);
        let b = ids.next_id("k1", now);
        assert_eq!(a, "widget-k1-1700000000000");
        assert_eq!(b, "widget-k1-1700000000001");
    }
}
