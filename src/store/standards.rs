use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

use crate::standards::{default_standards, table_from_named, table_to_named, PerformanceStandard, StandardsTable};
use crate::store::write_atomic;
use crate::Platform;

/// Runtime-editable targets. Readers take a fresh [`snapshot`](Self::snapshot) per
/// evaluation so an edit changes every later classification, historical posts included.
pub struct StandardsStore {
    path: PathBuf,
    standards: RwLock<StandardsTable>,
}

impl StandardsStore {
    /// Falls back to the built-in standards when `path` does not exist yet.
    pub async fn load(path: PathBuf) -> Result<Self, String> {
        let standards = if path.exists() {
            let data = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| format!("failed to read standards: {}", err))?;
            let named: BTreeMap<String, PerformanceStandard> = toml::from_str(&data)
                .map_err(|err| format!("failed to parse standards: {}", err))?;
            let (table, unknown) = table_from_named(named);
            for name in unknown {
                tracing::warn!(platform = %name, "ignoring standard for unknown platform");
            }
            table
        } else {
            default_standards()
        };

        Ok(Self {
            path,
            standards: RwLock::new(standards),
        })
    }

    pub async fn snapshot(&self) -> StandardsTable {
        let guard = self.standards.read().await;
        guard.clone()
    }

    pub async fn get(&self, platform: Platform) -> Option<PerformanceStandard> {
        let guard = self.standards.read().await;
        guard.get(&platform).cloned()
    }

    pub async fn set(&self, platform: Platform, standard: PerformanceStandard) -> Result<(), String> {
        let mut guard = self.standards.write().await;
        tracing::info!(platform = platform.label(), kind = standard.kind(), "updating performance standard");
        guard.insert(platform, standard);
        self.persist(&guard).await
    }

    pub async fn remove(&self, platform: Platform) -> Result<bool, String> {
        let mut guard = self.standards.write().await;
        let removed = guard.remove(&platform).is_some();
        if removed {
            self.persist(&guard).await?;
        }
        Ok(removed)
    }

    async fn persist(&self, standards: &StandardsTable) -> Result<(), String> {
        let payload = toml::to_string_pretty(&table_to_named(standards))
            .map_err(|err| format!("failed to serialize standards: {}", err))?;
        write_atomic(&self.path, payload, "standards").await
    }
}
