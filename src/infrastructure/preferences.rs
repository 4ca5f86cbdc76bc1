// JSON-file backed preference store
use crate::application::theme_service::PreferenceStore;
use crate::domain::error::DashboardError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Stores preferences as a flat JSON object in a single file.
pub struct FilePreferenceStore {
    path: PathBuf,
    // serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn io_error(&self, e: impl std::fmt::Display) -> DashboardError {
        DashboardError::Preference(format!("{}: {}", self.path.display(), e))
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, DashboardError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|e| self.io_error(e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn load(&self, key: &str) -> Result<Option<String>, DashboardError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), DashboardError> {
        let _guard = self.lock.lock().await;

        let mut all = self.read_all().await?;
        all.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| self.io_error(e))?;
            }
        }

        let text = serde_json::to_string_pretty(&all)
            .map_err(|e| DashboardError::Preference(e.to_string()))?;
        tokio::fs::write(&self.path, text).await.map_err(|e| self.io_error(e))?;

        tracing::debug!("Saved preference {} = {}", key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("callcenter-dashboard-{}-{}", std::process::id(), name))
            .join("preferences.json")
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let store = FilePreferenceStore::new(temp_path("missing"));
        assert_eq!(store.load("dashboard-theme").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips_and_keeps_other_keys() {
        let path = temp_path("roundtrip");
        let store = FilePreferenceStore::new(&path);
        store.save("dashboard-theme", "dark").await.unwrap();
        store.save("sidebar", "collapsed").await.unwrap();
        store.save("dashboard-theme", "emerald").await.unwrap();

        let reopened = FilePreferenceStore::new(&path);
        assert_eq!(reopened.load("dashboard-theme").await.unwrap().as_deref(), Some("emerald"));
        assert_eq!(reopened.load("sidebar").await.unwrap().as_deref(), Some("collapsed"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let store = FilePreferenceStore::new(&path);
        assert!(matches!(store.load("dashboard-theme").await, Err(DashboardError::Preference(_))));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_saves_keep_every_key() {
        let path = temp_path("concurrent");
        let store = std::sync::Arc::new(FilePreferenceStore::new(&path));

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..8 {
            let store = store.clone();
            tasks.spawn(async move { store.save(&format!("key-{}", i), "v").await });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        for i in 0..8 {
            assert_eq!(store.load(&format!("key-{}", i)).await.unwrap().as_deref(), Some("v"));
        }

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
