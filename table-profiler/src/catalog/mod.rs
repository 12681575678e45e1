//! Metadata catalog interfaces.
//!
//! The profiler reads the target registry through a [`TargetResolver`] and
//! writes its results through a [`CatalogSink`]. Both are external services;
//! [`InMemoryCatalog`] implements them for tests and embedded use.
//!
//! # Implementing a catalog
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use table_profiler::catalog::*;
//! use table_profiler::target::TargetId;
//!
//! struct PostgresCatalog { /* connection pool */ }
//!
//! #[async_trait]
//! impl CatalogSink for PostgresCatalog {
//!     async fn upsert_table_profile(&self, record: TableProfileRecord) -> Result<(), CatalogError> {
//!         // INSERT ... ON CONFLICT (target_id) DO UPDATE
//!         Ok(())
//!     }
//!
//!     async fn append_column_profile(&self, record: ColumnProfileRecord) -> Result<(), CatalogError> {
//!         Ok(())
//!     }
//!
//!     async fn append_statistics(&self, records: Vec<StatisticsRecord>) -> Result<(), CatalogError> {
//!         // one transaction for the whole batch
//!         Ok(())
//!     }
//! }
//! ```

pub mod in_memory;

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audit::AuditStamp;
use crate::classify::Classification;
use crate::stats::{ColumnStatistics, Number};
use crate::target::TargetId;

pub use in_memory::{CatalogSnapshot, InMemoryCatalog, RegisteredTarget, StoredTableProfile};

/// Failure reported by a catalog service.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Catalog rejected write: {0}")]
    Rejected(String),

    #[error("Catalog serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Catalog I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Family of a catalog record, used for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    TableProfile,
    ColumnProfile,
    NumericStatistics,
    TextStatistics,
    DateStatistics,
    CodeStatistics,
}

impl RecordKind {
    /// Statistics record family written for a column of `classification`.
    pub fn statistics_for(classification: Classification) -> Self {
        match classification {
            Classification::Numeric => RecordKind::NumericStatistics,
            Classification::Text => RecordKind::TextStatistics,
            Classification::Date => RecordKind::DateStatistics,
            Classification::Categorical => RecordKind::CodeStatistics,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::TableProfile => "table profile",
            RecordKind::ColumnProfile => "column profile",
            RecordKind::NumericStatistics => "numeric statistics",
            RecordKind::TextStatistics => "text statistics",
            RecordKind::DateStatistics => "date statistics",
            RecordKind::CodeStatistics => "code statistics",
        };
        f.write_str(name)
    }
}

/// Table-level metadata, upserted by target id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableProfileRecord {
    pub target_id: TargetId,
    pub row_count: u64,
    pub column_count: u64,
    pub size_bytes: u64,
    /// Last update.
    pub audit: AuditStamp,
}

/// A column's classification, appended once per profiling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProfileRecord {
    pub target_id: TargetId,
    pub column_name: String,
    pub data_type: Classification,
    pub audit: AuditStamp,
}

/// Type-specific statistics keyed by target and column.
///
/// Categorical columns produce one `Code` record per distinct value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatisticsRecord {
    Numeric {
        target_id: TargetId,
        column_name: String,
        min: Number,
        max: Number,
        mean: f64,
        median: f64,
        audit: AuditStamp,
    },
    Text {
        target_id: TargetId,
        column_name: String,
        max_length: i64,
        min_length: i64,
        median_length: i64,
        audit: AuditStamp,
    },
    Date {
        target_id: TargetId,
        column_name: String,
        min_date: NaiveDate,
        max_date: NaiveDate,
        audit: AuditStamp,
    },
    Code {
        target_id: TargetId,
        column_name: String,
        code: String,
        frequency: u64,
        audit: AuditStamp,
    },
}

impl StatisticsRecord {
    /// Expands computed statistics into the records stored for `column`.
    pub fn from_statistics(
        target_id: TargetId,
        column: &str,
        statistics: &ColumnStatistics,
        audit: &AuditStamp,
    ) -> Vec<Self> {
        let column_name = column.to_string();
        match statistics {
            ColumnStatistics::Numeric(stats) => vec![StatisticsRecord::Numeric {
                target_id,
                column_name,
                min: stats.min,
                max: stats.max,
                mean: stats.mean,
                median: stats.median,
                audit: audit.clone(),
            }],
            ColumnStatistics::Text(stats) => vec![StatisticsRecord::Text {
                target_id,
                column_name,
                max_length: stats.max_length,
                min_length: stats.min_length,
                median_length: stats.median_length,
                audit: audit.clone(),
            }],
            ColumnStatistics::Date(stats) => vec![StatisticsRecord::Date {
                target_id,
                column_name,
                min_date: stats.min_date,
                max_date: stats.max_date,
                audit: audit.clone(),
            }],
            ColumnStatistics::Categorical(stats) => stats
                .frequencies
                .iter()
                .map(|entry| StatisticsRecord::Code {
                    target_id,
                    column_name: column_name.clone(),
                    code: entry.code.clone(),
                    frequency: entry.frequency,
                    audit: audit.clone(),
                })
                .collect(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            StatisticsRecord::Numeric { .. } => RecordKind::NumericStatistics,
            StatisticsRecord::Text { .. } => RecordKind::TextStatistics,
            StatisticsRecord::Date { .. } => RecordKind::DateStatistics,
            StatisticsRecord::Code { .. } => RecordKind::CodeStatistics,
        }
    }

    pub fn target_id(&self) -> TargetId {
        match self {
            StatisticsRecord::Numeric { target_id, .. }
            | StatisticsRecord::Text { target_id, .. }
            | StatisticsRecord::Date { target_id, .. }
            | StatisticsRecord::Code { target_id, .. } => *target_id,
        }
    }

    pub fn column_name(&self) -> &str {
        match self {
            StatisticsRecord::Numeric { column_name, .. }
            | StatisticsRecord::Text { column_name, .. }
            | StatisticsRecord::Date { column_name, .. }
            | StatisticsRecord::Code { column_name, .. } => column_name,
        }
    }
}

/// Resolves target ids to their registered `namespace.table` names.
#[async_trait]
pub trait TargetResolver: Send + Sync {
    /// Returns the registered name, or `None` for an unknown id.
    async fn lookup(&self, target_id: TargetId) -> Result<Option<String>, CatalogError>;
}

/// Destination of profiling results.
#[async_trait]
pub trait CatalogSink: Send + Sync {
    /// Inserts or replaces the table profile for the record's target.
    async fn upsert_table_profile(&self, record: TableProfileRecord) -> Result<(), CatalogError>;

    /// Appends a column profile row.
    async fn append_column_profile(&self, record: ColumnProfileRecord) -> Result<(), CatalogError>;

    /// Appends all statistics rows of one column. Implementations should store
    /// the batch atomically.
    async fn append_statistics(&self, records: Vec<StatisticsRecord>) -> Result<(), CatalogError>;
}
