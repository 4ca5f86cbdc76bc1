// Application state for HTTP handlers
use std::sync::Arc;

use crate::application::analytics_service::AnalyticsService;
use crate::application::render_service::RenderService;
use crate::application::session::SessionRegistry;
use crate::domain::kpi::KpiCatalog;

pub struct AppState {
    pub catalog: Arc<KpiCatalog>,
    pub sessions: SessionRegistry,
    pub analytics_service: AnalyticsService,
    pub render_service: RenderService,
}
