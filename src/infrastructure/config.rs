use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::tenant::{Tenant, User};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub datasource: DatasourceSettings,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub preferences: PreferenceSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub sessions: SessionSettings,
    #[serde(default = "default_tenants")]
    pub tenants: Vec<Tenant>,
    /// Signed-in user shown next to the tenant; no authentication is done
    #[serde(default)]
    pub user: Option<User>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            datasource: DatasourceSettings::default(),
            fetch: FetchSettings::default(),
            preferences: PreferenceSettings::default(),
            notifications: NotificationSettings::default(),
            sessions: SessionSettings::default(),
            tenants: default_tenants(),
            user: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatasourceKind {
    #[default]
    Sample,
    Http,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatasourceSettings {
    #[serde(default)]
    pub kind: DatasourceKind,
    pub base_url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchSettings {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PreferenceSettings {
    #[serde(default = "default_preferences_path")]
    pub path: String,
}

impl Default for PreferenceSettings {
    fn default() -> Self {
        Self {
            path: default_preferences_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationSettings {
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: i64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    /// Sessions untouched for longer than this are dropped
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: i64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_ttl_secs: default_idle_ttl_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_preferences_path() -> String {
    "data/preferences.json".to_string()
}

fn default_ttl_ms() -> i64 {
    3_000
}

fn default_idle_ttl_secs() -> i64 {
    30 * 60
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_tenants() -> Vec<Tenant> {
    vec![
        Tenant::new(1, "First National Bank", "FNB"),
        Tenant::new(2, "Coastal Credit Union", "CCU"),
        Tenant::new(3, "Metro Savings Bank", "MSB"),
    ]
}

/// Loads `config/dashboard.toml` (optional) overlaid with `DASHBOARD__*`
/// environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_query() {
        let mut vars = HashMap::new();
        vars.insert("tenantId".to_string(), "3".to_string());
        vars.insert("startDate".to_string(), "2024-01-01T00:00:00+00:00".to_string());

        let query = "SELECT * FROM calls WHERE tenant_id = ${tenantId} AND started_at >= '${startDate}'";
        let result = prepare_query(query, &vars);

        assert_eq!(result, "SELECT * FROM calls WHERE tenant_id = 3 AND started_at >= '2024-01-01T00:00:00+00:00'");
    }

    #[test]
    fn test_defaults_apply_for_empty_document() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str("", config::FileFormat::Toml))
            .build()
            .unwrap();
        let cfg: AppConfig = settings.try_deserialize().unwrap();

        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.datasource.kind, DatasourceKind::Sample);
        assert_eq!(cfg.fetch.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.sessions.idle_ttl_secs, 1800);
        assert_eq!(cfg.sessions.max_sessions, 10_000);
        assert_eq!(cfg.tenants.len(), 3);
    }

    #[test]
    fn test_document_overrides() {
        let doc = r#"
            [datasource]
            kind = "http"
            base_url = "http://reporting.internal:3001"

            [fetch]
            timeout_ms = 2500

            [sessions]
            idle_ttl_secs = 60
            max_sessions = 50

            [[tenants]]
            id = 10
            name = "Harbor Bank"
            code = "HBR"
        "#;
        let settings = config::Config::builder()
            .add_source(config::File::from_str(doc, config::FileFormat::Toml))
            .build()
            .unwrap();
        let cfg: AppConfig = settings.try_deserialize().unwrap();

        assert_eq!(cfg.datasource.kind, DatasourceKind::Http);
        assert_eq!(cfg.datasource.base_url.as_deref(), Some("http://reporting.internal:3001"));
        assert_eq!(cfg.fetch.timeout_ms, 2500);
        assert_eq!(cfg.sessions.idle_ttl_secs, 60);
        assert_eq!(cfg.sessions.max_sessions, 50);
        assert_eq!(cfg.tenants, vec![Tenant::new(10, "Harbor Bank", "HBR")]);
    }
}
