//! Table profiler: the top-level driver of a profiling run.
//!
//! A run resolves the target, records table-level metadata, then classifies
//! each column in declared order, computes its statistics and writes its
//! catalog records. Any error aborts the run.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use arrow::array::Int64Array;
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use datafusion::prelude::SessionContext;
//! use table_profiler::audit::SystemAudit;
//! use table_profiler::catalog::InMemoryCatalog;
//! use table_profiler::classify::Classification;
//! use table_profiler::profiler::TableProfiler;
//! use table_profiler::store::TableStore;
//! use table_profiler::target::TargetId;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let schema = Arc::new(Schema::new(vec![Field::new("c_num", DataType::Int64, true)]));
//! let batch = RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![1, 2, 3]))]).unwrap();
//!
//! let store = TableStore::new(SessionContext::new());
//! store.register_batch("data", "numbers", batch).unwrap();
//!
//! let catalog = InMemoryCatalog::new();
//! catalog.register_target(TargetId::new(1), "data.numbers").await;
//!
//! let profiler = TableProfiler::builder().categorical_threshold(2).build();
//! let report = profiler
//!     .profile(TargetId::new(1), &store, &catalog, &catalog, &SystemAudit::new("etl"))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(report.row_count, 3);
//! assert_eq!(report.columns[0].classification, Classification::Numeric);
//! # })
//! ```

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::audit::AuditSource;
use crate::catalog::{
    CatalogSink, ColumnProfileRecord, RecordKind, StatisticsRecord, TableProfileRecord,
    TargetResolver,
};
use crate::classify::{Classification, ColumnClassifier};
use crate::config::ProfilerConfig;
use crate::error::{ProfilerError, Result};
use crate::staging::StagingArea;
use crate::stats::{self, ColumnStatistics};
use crate::store::TableStore;
use crate::target::{QualifiedTable, TargetId};

/// Outcome for one profiled column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnReport {
    pub name: String,
    pub classification: Classification,
    pub statistics: ColumnStatistics,
}

/// Summary of a completed profiling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileReport {
    pub target_id: TargetId,
    pub table: QualifiedTable,
    pub row_count: u64,
    pub column_count: u64,
    pub size_bytes: u64,
    /// Columns in declared order.
    pub columns: Vec<ColumnReport>,
    pub elapsed_ms: u64,
}

impl ProfileReport {
    pub fn column(&self, name: &str) -> Option<&ColumnReport> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// Builder for [`TableProfiler`].
#[derive(Debug, Clone, Default)]
pub struct TableProfilerBuilder {
    config: ProfilerConfig,
}

impl TableProfilerBuilder {
    /// Replace the whole configuration.
    pub fn config(mut self, config: ProfilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the categorical-distinctness threshold (inclusive).
    pub fn categorical_threshold(mut self, threshold: u64) -> Self {
        self.config.categorical_threshold = threshold;
        self
    }

    /// Set a deadline for each run.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> TableProfiler {
        TableProfiler::new(self.config)
    }
}

/// Profiles tables into a metadata catalog.
#[derive(Debug, Clone)]
pub struct TableProfiler {
    config: ProfilerConfig,
    classifier: ColumnClassifier,
}

impl Default for TableProfiler {
    fn default() -> Self {
        Self::new(ProfilerConfig::default())
    }
}

impl TableProfiler {
    pub fn new(config: ProfilerConfig) -> Self {
        let classifier = ColumnClassifier::new(config.categorical_threshold);
        Self { config, classifier }
    }

    pub fn builder() -> TableProfilerBuilder {
        TableProfilerBuilder::default()
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Profiles `target_id`, writing its table, column and statistics records.
    ///
    /// # Errors
    ///
    /// Fails before any write when the target is unknown, its name is
    /// malformed, or the table has no rows or columns. Statistics for a column
    /// are computed before any of its records are written; a failed
    /// statistics write after its column profile was stored is reported as
    /// [`ProfilerError::PartialColumnWrite`].
    pub async fn profile(
        &self,
        target_id: TargetId,
        store: &TableStore,
        resolver: &dyn TargetResolver,
        sink: &dyn CatalogSink,
        audit: &dyn AuditSource,
    ) -> Result<ProfileReport> {
        let run = self.run(target_id, store, resolver, sink, audit);
        match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| ProfilerError::Timeout {
                    target_id,
                    elapsed: limit,
                })?,
            None => run.await,
        }
    }

    #[instrument(
        skip(self, store, resolver, sink, audit),
        fields(threshold = self.config.categorical_threshold)
    )]
    async fn run(
        &self,
        target_id: TargetId,
        store: &TableStore,
        resolver: &dyn TargetResolver,
        sink: &dyn CatalogSink,
        audit: &dyn AuditSource,
    ) -> Result<ProfileReport> {
        let start_time = Instant::now();
        let table = resolve(target_id, resolver).await?;

        let row_count = store.row_count(&table).await?;
        let columns = store.column_names(&table).await?;
        let size_bytes = store.storage_size(&table).await?;

        if row_count == 0 || columns.is_empty() {
            warn!(
                %target_id,
                table = %table,
                rows = row_count,
                columns = columns.len(),
                "Rejecting table without rows or columns"
            );
            return Err(ProfilerError::ZeroRowTable {
                table: table.to_string(),
                rows: row_count,
                columns: columns.len(),
            });
        }

        info!(
            %target_id,
            table = %table,
            rows = row_count,
            columns = columns.len(),
            size_bytes,
            "Starting table profiling"
        );

        sink.upsert_table_profile(TableProfileRecord {
            target_id,
            row_count,
            column_count: columns.len() as u64,
            size_bytes,
            audit: audit.stamp(),
        })
        .await
        .map_err(|source| ProfilerError::CatalogWrite {
            target_id,
            column: None,
            record: RecordKind::TableProfile,
            source,
        })?;

        let mut staging = StagingArea::new(store);
        let mut reports = Vec::with_capacity(columns.len());
        for column in &columns {
            let report = self
                .profile_column(target_id, store, &table, column, &mut staging, sink, audit)
                .await?;
            reports.push(report);
        }

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(%target_id, table = %table, time_ms = elapsed_ms, "Completed table profiling");

        Ok(ProfileReport {
            target_id,
            table,
            row_count,
            column_count: columns.len() as u64,
            size_bytes,
            columns: reports,
            elapsed_ms,
        })
    }

    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self, store, table, staging, sink, audit))]
    async fn profile_column(
        &self,
        target_id: TargetId,
        store: &TableStore,
        table: &QualifiedTable,
        column: &str,
        staging: &mut StagingArea,
        sink: &dyn CatalogSink,
        audit: &dyn AuditSource,
    ) -> Result<ColumnReport> {
        let classified = self.classifier.classify(store, table, column, staging).await?;
        let classification = classified.classification;
        let statistics = stats::compute(column, classification, staging).await?;
        staging.clear()?;

        let stamp = audit.stamp();
        sink.append_column_profile(ColumnProfileRecord {
            target_id,
            column_name: column.to_string(),
            data_type: classification,
            audit: stamp.clone(),
        })
        .await
        .map_err(|source| ProfilerError::CatalogWrite {
            target_id,
            column: Some(column.to_string()),
            record: RecordKind::ColumnProfile,
            source,
        })?;

        let records = StatisticsRecord::from_statistics(target_id, column, &statistics, &stamp);
        let record_count = records.len();
        sink.append_statistics(records)
            .await
            .map_err(|source| ProfilerError::PartialColumnWrite {
                target_id,
                column: column.to_string(),
                record: RecordKind::statistics_for(classification),
                source,
            })?;

        info!(column, %classification, records = record_count, "Profiled column");
        Ok(ColumnReport {
            name: column.to_string(),
            classification,
            statistics,
        })
    }
}

async fn resolve(target_id: TargetId, resolver: &dyn TargetResolver) -> Result<QualifiedTable> {
    let name = resolver
        .lookup(target_id)
        .await
        .map_err(|source| ProfilerError::TargetResolution { target_id, source })?
        .ok_or(ProfilerError::TargetNotFound { target_id })?;
    QualifiedTable::parse(target_id, &name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditStamp, FixedAudit};
    use crate::catalog::InMemoryCatalog;
    use crate::test_fixtures::{col_level_meta_batch, store_with_table};
    use chrono::{TimeZone, Utc};

    fn fixed_audit() -> FixedAudit {
        FixedAudit(AuditStamp::new(
            "metaadmin",
            Utc.with_ymd_and_hms(2019, 2, 5, 13, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_resolve_policy() {
        let catalog = InMemoryCatalog::new();
        catalog.register_target(TargetId::new(1), "data.col_level_meta").await;
        catalog.register_target(TargetId::new(2), "col_level_meta").await;
        catalog.register_target(TargetId::new(3), "a.b.c").await;

        assert_eq!(
            resolve(TargetId::new(1), &catalog).await.unwrap(),
            QualifiedTable::new("data", "col_level_meta")
        );
        assert!(matches!(
            resolve(TargetId::new(2), &catalog).await,
            Err(ProfilerError::MalformedIdentifier { .. })
        ));
        assert!(matches!(
            resolve(TargetId::new(3), &catalog).await,
            Err(ProfilerError::MalformedIdentifier { .. })
        ));
        assert!(matches!(
            resolve(TargetId::new(4), &catalog).await,
            Err(ProfilerError::TargetNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_report_lists_columns_in_declared_order() {
        let store = store_with_table("data", "col_level_meta", col_level_meta_batch());
        let catalog = InMemoryCatalog::new();
        catalog.register_target(TargetId::new(1), "data.col_level_meta").await;

        let report = TableProfiler::builder()
            .categorical_threshold(2)
            .build()
            .profile(TargetId::new(1), &store, &catalog, &catalog, &fixed_audit())
            .await
            .unwrap();

        let names: Vec<_> = report.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["c_num", "c_text", "c_code", "c_date"]);
        assert_eq!(report.column_count, 4);
        assert_eq!(
            report.column("c_code").map(|c| c.classification),
            Some(Classification::Categorical)
        );
    }

    #[tokio::test]
    async fn test_staging_is_released_after_run() {
        let store = store_with_table("data", "col_level_meta", col_level_meta_batch());
        let catalog = InMemoryCatalog::new();
        catalog.register_target(TargetId::new(1), "data.col_level_meta").await;

        TableProfiler::default()
            .profile(TargetId::new(1), &store, &catalog, &catalog, &fixed_audit())
            .await
            .unwrap();

        let schema_tables = store
            .session()
            .catalog("datafusion")
            .and_then(|catalog| catalog.schema("public"))
            .map(|schema| schema.table_names())
            .unwrap_or_default();
        assert!(schema_tables.iter().all(|name| !name.starts_with("__staging_")));
    }
}
