// Dashboard sessions: one private configuration store per client session
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::application::dashboard_store::DashboardStore;
use crate::application::drag_drop::{DragDropController, DragEvent, DragOutcome};
use crate::application::fetch_tracker::{FetchTicket, FetchTracker};
use crate::application::notifications::NotificationQueue;
use crate::application::theme_service::{PreferenceStore, ThemeRegistry};
use crate::application::widget_data_service::WidgetDataService;
use crate::application::widget_renderer::render;
use crate::domain::analytics::QueryParams;
use crate::domain::dashboard::Dashboard;
use crate::domain::error::DashboardError;
use crate::domain::kpi::KpiCatalog;
use crate::domain::tenant::{Tenant, TenantContext};
use crate::domain::widget::Widget;

pub const DEFAULT_SESSION: &str = "default";

pub struct DashboardSession {
    pub tenant: TenantContext,
    pub store: DashboardStore,
    pub drag: DragDropController,
    pub fetches: FetchTracker,
    pub notifications: NotificationQueue,
    pub theme: ThemeRegistry,
}

impl DashboardSession {
    pub fn new(
        tenant: TenantContext,
        defaults: Vec<Widget>,
        theme: ThemeRegistry,
        notification_ttl: TimeDelta,
    ) -> Self {
        Self {
            tenant,
            theme,
            store: DashboardStore::new(defaults),
            drag: DragDropController::new(),
            fetches: FetchTracker::new(),
            notifications: NotificationQueue::new(notification_ttl),
        }
    }

    /// Fetch parameters for the active tenant and selected time range.
    pub fn query_params(&self, now: DateTime<Utc>) -> QueryParams {
        let range = self.store.date_range_params(now);
        let mut params = QueryParams::for_tenant(self.tenant.active().id);
        params.start_date = range.start_date;
        params.end_date = range.end_date;
        params
    }

    pub fn select_tenant(&mut self, tenant_id: i64) -> Result<Tenant, DashboardError> {
        let tenant = self.tenant.select(tenant_id)?.clone();
        // data loaded for the previous tenant must not be shown
        self.fetches.clear();
        Ok(tenant)
    }

    pub fn remove_widget(&mut self, id: &str) -> Option<Widget> {
        self.fetches.forget(id);
        self.store.remove_widget(id)
    }

    pub fn reset_to_default(&mut self) {
        self.fetches.clear();
        self.store.reset_to_default();
    }

    pub fn handle_drag(&mut self, event: DragEvent, catalog: &KpiCatalog, now: DateTime<Utc>) -> DragOutcome {
        let outcome = self.drag.handle(event, catalog, &mut self.store, now);
        if let DragOutcome::Added { kpi_name, .. } = &outcome {
            self.notifications
                .push(format!("Added {} to dashboard", kpi_name), now);
        }
        outcome
    }

    /// Issues a new fetch ticket for every widget, superseding in-flight ones.
    pub fn begin_fetches(
        &mut self,
        data: &WidgetDataService,
        now: DateTime<Utc>,
    ) -> (QueryParams, Vec<(Widget, FetchTicket)>) {
        let params = self.query_params(now);
        let tickets = self
            .store
            .widgets()
            .iter()
            .map(|w| {
                let ticket = self.fetches.begin(&w.id, data.fetch_key(w, &params));
                (w.clone(), ticket)
            })
            .collect();
        (params, tickets)
    }

    /// Renders the current layout from whatever data has landed so far.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Dashboard {
        let widgets = self
            .store
            .widgets()
            .iter()
            .map(|w| render(w, &self.fetches.state(&w.id)))
            .collect();

        Dashboard::new(
            self.tenant.active().clone(),
            self.theme.active().key,
            self.store.date_range_params(now),
            widgets,
        )
    }
}

/// Limits applied to every session the registry opens.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    pub notification_ttl: TimeDelta,
    /// Sessions not accessed for longer than this are dropped
    pub idle_ttl: TimeDelta,
    pub max_sessions: usize,
}

/// Preferences private to one session: every key is stored as `<session>:<key>`.
struct SessionPreferences {
    session_id: String,
    inner: Arc<dyn PreferenceStore>,
}

impl SessionPreferences {
    fn scoped(&self, key: &str) -> String {
        format!("{}:{}", self.session_id, key)
    }
}

#[async_trait]
impl PreferenceStore for SessionPreferences {
    async fn load(&self, key: &str) -> Result<Option<String>, DashboardError> {
        self.inner.load(&self.scoped(key)).await
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), DashboardError> {
        self.inner.save(&self.scoped(key), value).await
    }
}

struct SessionEntry {
    session: Arc<Mutex<DashboardSession>>,
    last_seen: DateTime<Utc>,
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    tenants: TenantContext,
    defaults: Vec<Widget>,
    preferences: Arc<dyn PreferenceStore>,
    policy: SessionPolicy,
}

impl SessionRegistry {
    /// Every new session starts from a copy of `tenants` and `defaults`, with
    /// the theme last saved under its own id.
    pub fn new(
        tenants: TenantContext,
        defaults: Vec<Widget>,
        preferences: Arc<dyn PreferenceStore>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            tenants,
            defaults,
            preferences,
            policy,
        }
    }

    pub async fn session(&self, id: &str) -> Arc<Mutex<DashboardSession>> {
        self.session_at(id, Utc::now()).await
    }

    /// Returns the session for `id`, opening it if needed, and marks it used
    /// at `now`.
    pub async fn session_at(&self, id: &str, now: DateTime<Utc>) -> Arc<Mutex<DashboardSession>> {
        if let Some(entry) = self.sessions.write().await.get_mut(id) {
            entry.last_seen = now;
            return entry.session.clone();
        }

        // read outside the map lock; a concurrent opener may win the insert below
        let preferences = Arc::new(SessionPreferences {
            session_id: id.to_string(),
            inner: self.preferences.clone(),
        });
        let theme = ThemeRegistry::load(preferences).await;

        let mut sessions = self.sessions.write().await;
        if !sessions.contains_key(id) {
            self.evict(&mut sessions, now);
            tracing::info!("Opening dashboard session {}", id);
        }

        let entry = sessions.entry(id.to_string()).or_insert_with(|| SessionEntry {
            session: Arc::new(Mutex::new(DashboardSession::new(
                self.tenants.clone(),
                self.defaults.clone(),
                theme,
                self.policy.notification_ttl,
            ))),
            last_seen: now,
        });
        entry.last_seen = now;
        entry.session.clone()
    }

    /// Drops idle sessions, then the least recently used ones until there is
    /// room for one more.
    fn evict(&self, sessions: &mut HashMap<String, SessionEntry>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, entry| now - entry.last_seen <= self.policy.idle_ttl);

        let cap = self.policy.max_sessions.max(1);
        while sessions.len() >= cap {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} dashboard sessions", evicted);
        }
    }

    pub fn tenants(&self) -> &[Tenant] {
        self.tenants.tenants()
    }

    #[cfg(test)]
    async fn is_open(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
