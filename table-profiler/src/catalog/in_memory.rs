//! In-memory catalog for testing and embedded use.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{
    CatalogError, CatalogSink, ColumnProfileRecord, StatisticsRecord, TableProfileRecord,
    TargetResolver,
};
use crate::audit::AuditStamp;
use crate::target::TargetId;

/// A registered profiling target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredTarget {
    pub target_id: TargetId,
    pub name: String,
}

/// A table profile together with the stamp of its first insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTableProfile {
    pub created: AuditStamp,
    pub profile: TableProfileRecord,
}

/// Serializable copy of the whole catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub targets: Vec<RegisteredTarget>,
    pub table_profiles: Vec<StoredTableProfile>,
    pub column_profiles: Vec<ColumnProfileRecord>,
    pub statistics: Vec<StatisticsRecord>,
}

impl CatalogSnapshot {
    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    targets: BTreeMap<TargetId, String>,
    table_profiles: BTreeMap<TargetId, StoredTableProfile>,
    column_profiles: Vec<ColumnProfileRecord>,
    statistics: Vec<StatisticsRecord>,
}

/// Catalog held in process memory.
///
/// Table profiles are upserted by target id and keep their first `created`
/// stamp. Column profiles and statistics are append-only, so re-profiling a
/// target adds rows instead of replacing them.
///
/// ```rust
/// use table_profiler::catalog::{InMemoryCatalog, TargetResolver};
/// use table_profiler::target::TargetId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let catalog = InMemoryCatalog::new();
/// catalog.register_target(TargetId::new(1), "data.col_level_meta").await;
///
/// let name = catalog.lookup(TargetId::new(1)).await.unwrap();
/// assert_eq!(name.as_deref(), Some("data.col_level_meta"));
/// # })
/// ```
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or renames) a target.
    pub async fn register_target(&self, target_id: TargetId, name: impl Into<String>) {
        let name = name.into();
        debug!(%target_id, name = %name, "Registering target");
        self.state.write().await.targets.insert(target_id, name);
    }

    pub async fn table_profile(&self, target_id: TargetId) -> Option<StoredTableProfile> {
        self.state.read().await.table_profiles.get(&target_id).cloned()
    }

    /// Column profiles of `target_id` in insertion order.
    pub async fn column_profiles(&self, target_id: TargetId) -> Vec<ColumnProfileRecord> {
        self.state
            .read()
            .await
            .column_profiles
            .iter()
            .filter(|record| record.target_id == target_id)
            .cloned()
            .collect()
    }

    /// Statistics rows of `target_id` in insertion order.
    pub async fn statistics(&self, target_id: TargetId) -> Vec<StatisticsRecord> {
        self.state
            .read()
            .await
            .statistics
            .iter()
            .filter(|record| record.target_id() == target_id)
            .cloned()
            .collect()
    }

    /// Statistics rows of one column of `target_id`.
    pub async fn column_statistics(&self, target_id: TargetId, column: &str) -> Vec<StatisticsRecord> {
        self.statistics(target_id)
            .await
            .into_iter()
            .filter(|record| record.column_name() == column)
            .collect()
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        let state = self.state.read().await;
        CatalogSnapshot {
            targets: state
                .targets
                .iter()
                .map(|(target_id, name)| RegisteredTarget {
                    target_id: *target_id,
                    name: name.clone(),
                })
                .collect(),
            table_profiles: state.table_profiles.values().cloned().collect(),
            column_profiles: state.column_profiles.clone(),
            statistics: state.statistics.clone(),
        }
    }

    /// Replaces the catalog content with `snapshot`.
    pub async fn restore(&self, snapshot: CatalogSnapshot) {
        let mut state = self.state.write().await;
        state.targets = snapshot
            .targets
            .into_iter()
            .map(|target| (target.target_id, target.name))
            .collect();
        state.table_profiles = snapshot
            .table_profiles
            .into_iter()
            .map(|stored| (stored.profile.target_id, stored))
            .collect();
        state.column_profiles = snapshot.column_profiles;
        state.statistics = snapshot.statistics;
    }

    /// Writes the snapshot as pretty-printed JSON to `path`.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn export_json(&self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        let snapshot = self.snapshot().await;
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, &snapshot)?;
        Ok(())
    }
}

#[async_trait]
impl TargetResolver for InMemoryCatalog {
    async fn lookup(&self, target_id: TargetId) -> Result<Option<String>, CatalogError> {
        Ok(self.state.read().await.targets.get(&target_id).cloned())
    }
}

#[async_trait]
impl CatalogSink for InMemoryCatalog {
    async fn upsert_table_profile(&self, record: TableProfileRecord) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        let created = state
            .table_profiles
            .get(&record.target_id)
            .map(|stored| stored.created.clone())
            .unwrap_or_else(|| record.audit.clone());
        state.table_profiles.insert(
            record.target_id,
            StoredTableProfile {
                created,
                profile: record,
            },
        );
        Ok(())
    }

    async fn append_column_profile(&self, record: ColumnProfileRecord) -> Result<(), CatalogError> {
        self.state.write().await.column_profiles.push(record);
        Ok(())
    }

    async fn append_statistics(&self, records: Vec<StatisticsRecord>) -> Result<(), CatalogError> {
        self.state.write().await.statistics.extend(records);
        Ok(())
    }
}
