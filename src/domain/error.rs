// Error types shared by the domain and application layers
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("widget id already present: {0}")]
    DuplicateWidgetId(String),

    #[error("invalid widget: {0}")]
    InvalidWidget(String),

    #[error("unknown tenant: {0}")]
    UnknownTenant(i64),

    #[error("tenant {0} is not active")]
    InactiveTenant(i64),

    #[error("no active tenant configured")]
    NoActiveTenant,

    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    #[error("preference store error: {0}")]
    Preference(String),

    #[error("invalid KPI catalog: {0}")]
    Catalog(String),
}

/// Failure of a tenant-scoped data fetch. Always caught at the widget boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("not found: {0}")]
    NotFound(String),
}
