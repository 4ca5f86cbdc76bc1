// Customize-dashboard drag/drop controller
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::dashboard_store::DashboardStore;
use crate::domain::error::DashboardError;
use crate::domain::kpi::KpiCatalog;
use crate::domain::widget::{Widget, WidgetIdGenerator};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DragState {
    Idle,
    #[serde(rename_all = "camelCase")]
    Dragging { kpi_id: String },
    #[serde(rename_all = "camelCase")]
    HoveringDropZone { kpi_id: String },
    #[serde(rename_all = "camelCase")]
    Dropped { kpi_id: String },
}

/// Input events, independent of any pointer transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum DragEvent {
    #[serde(rename_all = "camelCase")]
    DragStart { kpi_id: String },
    EnterDropZone,
    LeaveDropZone,
    Drop,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// State changed; nothing else happened.
    Moved,
    /// Event not valid in the current state.
    Ignored,
    /// Drop resolved to a catalog KPI and a widget was appended.
    Added { widget: Widget, kpi_name: String },
    /// Drop payload did not match any KPI.
    Discarded,
    Rejected(DashboardError),
}

#[derive(Debug)]
pub struct DragDropController {
    state: DragState,
    /// `Dropped` record of the most recent drop on the zone; the live state
    /// returns to `Idle` in the same step
    last_drop: Option<DragState>,
    ids: WidgetIdGenerator,
}

impl Default for DragDropController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragDropController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
            last_drop: None,
            ids: WidgetIdGenerator::default(),
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn last_drop(&self) -> Option<&DragState> {
        self.last_drop.as_ref()
    }

    pub fn handle(
        &mut self,
        event: DragEvent,
        catalog: &KpiCatalog,
        store: &mut DashboardStore,
        now: DateTime<Utc>,
    ) -> DragOutcome {
        let current = std::mem::replace(&mut self.state, DragState::Idle);

        let (next, outcome) = match (current, event) {
            (DragState::Idle, DragEvent::DragStart { kpi_id }) => {
                self.last_drop = None;
                (DragState::Dragging { kpi_id }, DragOutcome::Moved)
            }
            (DragState::Dragging { kpi_id }, DragEvent::EnterDropZone) => {
                (DragState::HoveringDropZone { kpi_id }, DragOutcome::Moved)
            }
            (DragState::HoveringDropZone { kpi_id }, DragEvent::LeaveDropZone) => {
                (DragState::Dragging { kpi_id }, DragOutcome::Moved)
            }
            (DragState::HoveringDropZone { kpi_id }, DragEvent::Drop) => {
                tracing::debug!("Drag state -> Dropped({})", kpi_id);
                let outcome = self.complete_drop(&kpi_id, catalog, store, now);
                self.last_drop = Some(DragState::Dropped { kpi_id });
                (DragState::Idle, outcome)
            }
            // released outside any drop zone
            (DragState::Dragging { .. }, DragEvent::Drop) => (DragState::Idle, DragOutcome::Moved),
            (DragState::Dragging { .. } | DragState::HoveringDropZone { .. }, DragEvent::Cancel) => {
                (DragState::Idle, DragOutcome::Moved)
            }
            (state, event) => {
                tracing::debug!("Ignoring drag event {:?} in state {:?}", event, state);
                (state, DragOutcome::Ignored)
            }
        };

        if outcome != DragOutcome::Ignored {
            tracing::debug!("Drag state -> {:?}", next);
        }
        self.state = next;
        outcome
    }

    fn complete_drop(
        &mut self,
        kpi_id: &str,
        catalog: &KpiCatalog,
        store: &mut DashboardStore,
        now: DateTime<Utc>,
    ) -> DragOutcome {
        let Some(kpi) = catalog.get(kpi_id) else {
            tracing::debug!("Drop payload {} is not a catalog KPI; ignoring", kpi_id);
            return DragOutcome::Discarded;
        };

        let widget = Widget::from_kpi(self.ids.next_id(&kpi.id, now), kpi);
        match store.add_widget(widget) {
            Ok(added) => DragOutcome::Added {
                widget: added.clone(),
                kpi_name: kpi.name.clone(),
            },
            Err(e) => DragOutcome::Rejected(e),
        }
    }
}
