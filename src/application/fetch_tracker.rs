// Per-widget fetch bookkeeping: generation tags, stale-response suppression, timeouts
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use crate::domain::analytics::WidgetData;
use crate::domain::error::FetchError;

/// Logical identity of a fetch: `(endpoint, tenantId, date-range, filter)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchKey {
    pub endpoint: String,
    pub tenant_id: i64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Pending,
    Loaded(WidgetData),
    Failed(FetchError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub widget_id: String,
    pub generation: u64,
    pub key: FetchKey,
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    state: FetchState,
}

/// Tracks the latest issued fetch per widget. A resolution only lands if its
/// ticket is still the newest one for that widget.
#[derive(Debug, Default)]
pub struct FetchTracker {
    slots: HashMap<String, Slot>,
    next_generation: u64,
}

impl FetchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, widget_id: &str, key: FetchKey) -> FetchTicket {
        self.next_generation += 1;
        let generation = self.next_generation;

        tracing::debug!("Fetch #{} for widget {} -> {:?}", generation, widget_id, key);
        self.slots.insert(
            widget_id.to_string(),
            Slot {
                generation,
                state: FetchState::Pending,
            },
        );

        FetchTicket {
            widget_id: widget_id.to_string(),
            generation,
            key,
        }
    }

    /// Applies a fetch result. Returns false when the ticket is stale or the
    /// widget is no longer tracked.
    pub fn resolve(&mut self, ticket: &FetchTicket, result: Result<WidgetData, FetchError>) -> bool {
        let Some(slot) = self.slots.get_mut(&ticket.widget_id) else {
            tracing::debug!("Dropping fetch #{} for untracked widget {}", ticket.generation, ticket.widget_id);
            return false;
        };

        if slot.generation != ticket.generation {
            tracing::warn!(
                "Discarding stale fetch #{} for widget {} (latest is #{})",
                ticket.generation,
                ticket.widget_id,
                slot.generation
            );
            return false;
        }

        slot.state = match result {
            Ok(data) => FetchState::Loaded(data),
            Err(e) => {
                tracing::warn!("Fetch {} for widget {} failed: {}", ticket.key.endpoint, ticket.widget_id, e);
                FetchState::Failed(e)
            }
        };
        true
    }

    pub fn state(&self, widget_id: &str) -> FetchState {
        self.slots
            .get(widget_id)
            .map(|s| s.state.clone())
            .unwrap_or(FetchState::Pending)
    }

    pub fn forget(&mut self, widget_id: &str) {
        self.slots.remove(widget_id);
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

/// Runs a fetch, turning an overrun of `limit` into `FetchError::Timeout`.
pub async fn with_timeout<F>(limit: Duration, fetch: F) -> Result<WidgetData, FetchError>
where
    F: Future<Output = Result<WidgetData, FetchError>>,
{
    match tokio::time::timeout(limit, fetch).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(limit.as_millis() as u64)),
    }
}
