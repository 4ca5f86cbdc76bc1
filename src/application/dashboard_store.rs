// Dashboard configuration store: the ordered widget layout of one session
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::DashboardError;
use crate::domain::time_range::{DateRangeParams, TimeRange};
use crate::domain::widget::Widget;

/// Result of a "Save Layout" request. Layouts live for the session only,
/// so a save hands back the snapshot without persisting it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedLayout {
    pub widgets: Vec<Widget>,
    pub persisted: bool,
}

#[derive(Debug, Clone)]
pub struct DashboardStore {
    widgets: Vec<Widget>,
    defaults: Vec<Widget>,
    time_range: TimeRange,
}

impl DashboardStore {
    /// A store showing `defaults`, which is also what reset restores.
    pub fn new(defaults: Vec<Widget>) -> Self {
        Self {
            widgets: defaults.clone(),
            defaults,
            time_range: TimeRange::default(),
        }
    }

    #[cfg(test)]
    pub fn with_widgets(widgets: Vec<Widget>, defaults: Vec<Widget>) -> Self {
        Self {
            widgets,
            defaults,
            time_range: TimeRange::default(),
        }
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn get(&self, id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn add_widget(&mut self, widget: Widget) -> Result<&Widget, DashboardError> {
        if self.get(&widget.id).is_some() {
            return Err(DashboardError::DuplicateWidgetId(widget.id));
        }

        tracing::debug!("Adding widget {} ({})", widget.id, widget.kpi_id);
        self.widgets.push(widget);
        Ok(&self.widgets[self.widgets.len() - 1])
    }

    /// Removes a widget by id. Absent ids are ignored.
    pub fn remove_widget(&mut self, id: &str) -> Option<Widget> {
        let idx = self.widgets.iter().position(|w| w.id == id)?;
        tracing::debug!("Removing widget {}", id);
        Some(self.widgets.remove(idx))
    }

    pub fn reset_to_default(&mut self) {
        tracing::debug!("Resetting layout to {} default widgets", self.defaults.len());
        self.widgets = self.defaults.clone();
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn set_time_range(&mut self, range: TimeRange) {
        self.time_range = range;
    }

    pub fn date_range_params(&self, now: DateTime<Utc>) -> DateRangeParams {
        self.time_range.params(now)
    }

    pub fn save_layout(&self) -> SavedLayout {
        tracing::info!("Save layout requested for {} widgets; layouts are session-scoped", self.widgets.len());
        SavedLayout {
            widgets: self.widgets.clone(),
            persisted: false,
        }
    }
}
