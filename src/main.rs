// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::{bail, Context};
use chrono::TimeDelta;
use tracing_subscriber::EnvFilter;

use crate::application::analytics_repository::AnalyticsRepository;
use crate::application::analytics_service::AnalyticsService;
use crate::application::render_service::RenderService;
use crate::application::session::{SessionPolicy, SessionRegistry};
use crate::application::widget_data_service::WidgetDataService;
use crate::domain::dashboard::default_layout;
use crate::domain::kpi::KpiCatalog;
use crate::domain::tenant::TenantContext;
use crate::infrastructure::config::{load_app_config, DatasourceKind};
use crate::infrastructure::http_repository::HttpRepository;
use crate::infrastructure::preferences::FilePreferenceStore;
use crate::infrastructure::sample_repository::SampleRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::router::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config().context("loading dashboard configuration")?;
    let catalog = Arc::new(KpiCatalog::builtin().context("loading KPI catalog")?);

    // Create repository (infrastructure layer)
    let repository: Arc<dyn AnalyticsRepository> = match config.datasource.kind {
        DatasourceKind::Sample => {
            tracing::info!("Serving generated sample data");
            Arc::new(SampleRepository::new())
        }
        DatasourceKind::Http => {
            let Some(base_url) = config.datasource.base_url.clone() else {
                bail!("datasource.base_url is required when datasource.kind = \"http\"");
            };
            tracing::info!("Proxying data from {}", base_url);
            Arc::new(HttpRepository::new(base_url, config.datasource.token.clone()))
        }
    };

    let preferences = Arc::new(FilePreferenceStore::new(&config.preferences.path));

    // Create services (application layer)
    let analytics_service = AnalyticsService::new(repository.clone());
    let data_service = WidgetDataService::new(repository, catalog.clone(), config.fetch.timeout());
    let render_service = RenderService::new(data_service);
    let tenants = TenantContext::new(config.tenants.clone(), config.user.clone()).context("seeding tenants")?;
    let policy = SessionPolicy {
        notification_ttl: TimeDelta::milliseconds(config.notifications.ttl_ms),
        idle_ttl: TimeDelta::seconds(config.sessions.idle_ttl_secs),
        max_sessions: config.sessions.max_sessions,
    };
    let sessions = SessionRegistry::new(tenants, default_layout(), preferences, policy);

    // Create application state
    let state = Arc::new(AppState {
        catalog,
        sessions,
        analytics_service,
        render_service,
    });

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting callcenter-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state)).await?;

    Ok(())
}
