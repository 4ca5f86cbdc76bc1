// Dashboard domain model: default layout and rendered widget views
use serde::Serialize;

use super::analytics::DataPoint;
use super::tenant::Tenant;
use super::time_range::DateRangeParams;
use super::widget::{kpi_query, ChartKind, Widget, WidgetKind, WidgetSize};

/// What a widget shows right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum WidgetView {
    Skeleton,
    Error {
        message: String,
    },
    Value {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Chart {
        chart_type: ChartKind,
        unit: String,
        points: Vec<DataPoint>,
    },
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    List {
        items: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedWidget {
    pub widget: Widget,
    pub view: WidgetView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub title: String,
    pub tenant: Tenant,
    pub theme: &'static str,
    pub date_range: DateRangeParams,
    pub widgets: Vec<RenderedWidget>,
}

impl Dashboard {
    pub fn new(
        tenant: Tenant,
        theme: &'static str,
        date_range: DateRangeParams,
        widgets: Vec<RenderedWidget>,
    ) -> Self {
        let title = format!("{} Contact Center", tenant.name);
        Self {
            title,
            tenant,
            theme,
            date_range,
            widgets,
        }
    }
}

fn default_widget(id: &str, title: &str, kind: WidgetKind, size: WidgetSize, kpi_id: &str) -> Widget {
    Widget {
        id: id.to_string(),
        title: title.to_string(),
        kind,
        size,
        kpi_id: kpi_id.to_string(),
        sql_query: kpi_query(kpi_id),
    }
}

/// The layout a dashboard starts with and returns to on reset.
pub fn default_layout() -> Vec<Widget> {
    vec![
        default_widget("default-call-volume", "Call Volume", WidgetKind::Chart(ChartKind::Bar), WidgetSize::Large, "call-volume"),
        default_widget("default-service-level", "Service Level", WidgetKind::Value, WidgetSize::Small, "service-level"),
        default_widget("default-avg-handle-time", "Average Handle Time", WidgetKind::Chart(ChartKind::Line), WidgetSize::Medium, "avg-handle-time"),
        default_widget("default-sentiment", "Sentiment", WidgetKind::Chart(ChartKind::Donut), WidgetSize::Medium, "sentiment-score"),
        default_widget("default-agent-performance", "Agent Performance", WidgetKind::Table, WidgetSize::Large, "agent-performance"),
        default_widget("default-key-phrases", "Top Key Phrases", WidgetKind::List, WidgetSize::Small, "key-phrases"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_layout_ids_are_unique() {
        let layout = default_layout();
        let ids: HashSet<&str> = layout.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids.len(), layout.len());
    }

    #[test]
    fn test_view_serializes_with_tag() {
        let view = WidgetView::Error {
            message: "Failed to load sentiment data".to_string(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["view"], "error");
        assert_eq!(json["message"], "Failed to load sentiment data");
    }
}
