//! Error types for the table profiler.
//!
//! Every fatal condition of a profiling run is represented by
//! [`ProfilerError`]. The probe-level conversion failure used to fall through
//! the classification cascade lives in [`crate::classify::probe`] and is never
//! converted into a `ProfilerError`.

use std::time::Duration;

use thiserror::Error;

use crate::catalog::{CatalogError, RecordKind};
use crate::classify::Classification;
use crate::target::TargetId;

/// The main error type for a profiling run.
#[derive(Error, Debug)]
pub enum ProfilerError {
    /// The target identifier is not registered in the catalog.
    #[error("Target {target_id} not found in catalog registry")]
    TargetNotFound { target_id: TargetId },

    /// The target registry could not be queried.
    #[error("Lookup of target {target_id} failed: {source}")]
    TargetResolution {
        target_id: TargetId,
        #[source]
        source: CatalogError,
    },

    /// The registered table name is not in `<namespace>.<table>` form.
    #[error("Target {target_id} has malformed table name '{name}': expected <namespace>.<table>")]
    MalformedIdentifier { target_id: TargetId, name: String },

    /// The table has no rows (or no columns) and cannot be profiled.
    #[error("Table '{table}' has {rows} row(s) and {columns} column(s); nothing to profile")]
    ZeroRowTable {
        table: String,
        rows: u64,
        columns: usize,
    },

    /// A statistics calculator was run against empty or inconsistent staged data.
    #[error("Statistics computation failed for {classification} column '{column}': {message}")]
    StatisticsComputation {
        column: String,
        classification: Classification,
        message: String,
    },

    /// A catalog write failed before any record for the column was stored.
    #[error("Catalog write of {record} record failed for target {target_id}{}: {source}", column_suffix(.column))]
    CatalogWrite {
        target_id: TargetId,
        column: Option<String>,
        record: RecordKind,
        #[source]
        source: CatalogError,
    },

    /// Statistics write failed after the column profile record was stored.
    #[error("Column '{column}' of target {target_id} is partially written: {record} record failed: {source}")]
    PartialColumnWrite {
        target_id: TargetId,
        column: String,
        record: RecordKind,
        #[source]
        source: CatalogError,
    },

    /// Error from DataFusion query planning or execution.
    #[error("Store query failed: {0}")]
    Store(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow array operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An identifier could not be used safely in a SQL statement.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The caller-imposed deadline for the run expired.
    #[error("Profiling target {target_id} timed out after {elapsed:?}")]
    Timeout {
        target_id: TargetId,
        elapsed: Duration,
    },

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn column_suffix(column: &Option<String>) -> String {
    match column {
        Some(name) => format!(" column '{name}'"),
        None => String::new(),
    }
}

/// A type alias for `Result<T, ProfilerError>`.
pub type Result<T> = std::result::Result<T, ProfilerError>;

impl ProfilerError {
    /// Creates a statistics computation error.
    pub fn statistics(
        column: impl Into<String>,
        classification: Classification,
        message: impl Into<String>,
    ) -> Self {
        Self::StatisticsComputation {
            column: column.into(),
            classification,
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the column a column-level error refers to, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::StatisticsComputation { column, .. } | Self::PartialColumnWrite { column, .. } => {
                Some(column)
            }
            Self::CatalogWrite { column, .. } => column.as_deref(),
            _ => None,
        }
    }
}
