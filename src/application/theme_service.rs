// Theme registry backed by a persisted preference
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::DashboardError;
use crate::domain::theme::{builtin_themes, Theme, DEFAULT_THEME};

pub const THEME_PREFERENCE_KEY: &str = "dashboard-theme";

/// Port for small persisted string preferences.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, DashboardError>;

    async fn save(&self, key: &str, value: &str) -> Result<(), DashboardError>;
}

/// The themes one dashboard session can pick from, and its current pick.
pub struct ThemeRegistry {
    themes: Vec<Theme>,
    active: usize,
    store: Arc<dyn PreferenceStore>,
}

impl ThemeRegistry {
    /// A registry with `key` active, or the default theme when `key` is
    /// absent or unknown.
    pub fn new(store: Arc<dyn PreferenceStore>, key: Option<&str>) -> Self {
        let themes = builtin_themes();
        let default_idx = themes.iter().position(|t| t.key == DEFAULT_THEME).unwrap_or(0);

        let active = match key {
            Some(key) => themes.iter().position(|t| t.key == key).unwrap_or_else(|| {
                tracing::warn!("Stored theme '{}' is unknown, using '{}'", key, DEFAULT_THEME);
                default_idx
            }),
            None => default_idx,
        };

        Self {
            themes,
            active,
            store,
        }
    }

    /// Builds a registry that reapplies the stored theme. A missing,
    /// unreadable or unknown preference falls back to the default theme.
    pub async fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let stored = match store.load(THEME_PREFERENCE_KEY).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Could not read theme preference: {}", e);
                None
            }
        };

        let registry = Self::new(store, stored.as_deref());
        tracing::debug!("Active theme: {}", registry.active().key);
        registry
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn active(&self) -> &Theme {
        &self.themes[self.active]
    }

    /// Switches theme. The choice is saved first; a failed save leaves the
    /// current theme in place.
    pub async fn set_active(&mut self, key: &str) -> Result<&Theme, DashboardError> {
        let idx = self
            .themes
            .iter()
            .position(|t| t.key == key)
            .ok_or_else(|| DashboardError::UnknownTheme(key.to_string()))?;

        self.store.save(THEME_PREFERENCE_KEY, key).await?;
        self.active = idx;
        Ok(&self.themes[idx])
    }
}
