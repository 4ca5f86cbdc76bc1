// Widget renderer: widget descriptor + fetch state -> view
use crate::application::fetch_tracker::FetchState;
use crate::domain::analytics::{DataPoint, WidgetData};
use crate::domain::dashboard::{RenderedWidget, WidgetView};
use crate::domain::widget::{Widget, WidgetKind};

/// Renders one widget. Never fails: pending data becomes a skeleton and a
/// failed fetch becomes the widget's fixed error message.
pub fn render(widget: &Widget, state: &FetchState) -> RenderedWidget {
    let view = match state {
        FetchState::Pending => WidgetView::Skeleton,
        FetchState::Failed(_) => WidgetView::Error {
            message: failure_message(widget),
        },
        FetchState::Loaded(data) => render_data(widget.kind, data),
    };

    RenderedWidget {
        widget: widget.clone(),
        view,
    }
}

pub fn failure_message(widget: &Widget) -> String {
    format!("Failed to load {} data", widget.title.to_lowercase())
}

fn render_data(kind: WidgetKind, data: &WidgetData) -> WidgetView {
    match kind {
        WidgetKind::Value => WidgetView::Value {
            text: value_text(data),
        },
        WidgetKind::Chart(chart_type) => WidgetView::Chart {
            chart_type,
            unit: data_unit(data),
            points: series_points(data),
        },
        WidgetKind::Table => {
            let (columns, rows) = table_of(data);
            WidgetView::Table { columns, rows }
        }
        WidgetKind::List => WidgetView::List {
            items: list_items(data),
        },
    }
}

fn data_unit(data: &WidgetData) -> String {
    match data {
        WidgetData::Scalar { unit, .. } | WidgetData::Series { unit, .. } => unit.clone(),
        WidgetData::Rows { .. } => String::new(),
    }
}

fn value_text(data: &WidgetData) -> String {
    match data {
        WidgetData::Scalar { value, unit } => format_value(*value, unit),
        WidgetData::Series { unit, points } => points
            .last()
            .map(|p| format_value(p.value, unit))
            .unwrap_or_else(|| "-".to_string()),
        WidgetData::Rows { rows, .. } => format_count(rows.len() as f64),
    }
}

fn series_points(data: &WidgetData) -> Vec<DataPoint> {
    match data {
        WidgetData::Scalar { value, .. } => vec![DataPoint::new("current", *value)],
        WidgetData::Series { points, .. } => points.clone(),
        // first column labels, second column values; unparsable rows are skipped
        WidgetData::Rows { rows, .. } => rows
            .iter()
            .filter_map(|row| {
                let label = row.first()?;
                let value = row.get(1)?.trim().parse::<f64>().ok()?;
                Some(DataPoint::new(label.clone(), value))
            })
            .collect(),
    }
}

fn table_of(data: &WidgetData) -> (Vec<String>, Vec<Vec<String>>) {
    match data {
        WidgetData::Scalar { value, unit } => (
            vec!["Metric".to_string(), "Value".to_string()],
            vec![vec!["Current".to_string(), format_value(*value, unit)]],
        ),
        WidgetData::Series { unit, points } => (
            vec!["Label".to_string(), "Value".to_string()],
            points
                .iter()
                .map(|p| vec![p.label.clone(), format_value(p.value, unit)])
                .collect(),
        ),
        WidgetData::Rows { columns, rows } => (columns.clone(), rows.clone()),
    }
}

fn list_items(data: &WidgetData) -> Vec<String> {
    match data {
        WidgetData::Scalar { value, unit } => vec![format_value(*value, unit)],
        WidgetData::Series { unit, points } => points
            .iter()
            .map(|p| format!("{}: {}", p.label, format_value(p.value, unit)))
            .collect(),
        WidgetData::Rows { rows, .. } => rows.iter().filter_map(|r| r.first().cloned()).collect(),
    }
}

/// Formats a metric value according to its unit.
pub fn format_value(value: f64, unit: &str) -> String {
    let lower = unit.trim().to_lowercase();

    if lower.contains('%') {
        format!("{:.1}%", value)
    } else if lower.contains("millisecond") || lower == "ms" {
        format!("{:.0} ms", value)
    } else if lower.contains("second") || lower == "s" {
        format!("{:.1} s", value)
    } else if ["count", "user", "call", "agent"].iter().any(|k| lower.contains(k)) {
        format_count(value)
    } else if lower.is_empty() {
        format!("{:.2}", value)
    } else {
        format!("{:.2} {}", value, unit.trim())
    }
}

fn format_count(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    if rounded < 0 {
        format!("-{}", out)
    } else {
        out
    }
}
