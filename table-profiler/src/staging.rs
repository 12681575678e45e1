//! Transient staging area holding a column's converted values.
//!
//! A [`StagingArea`] is a single table registered in the session's default
//! schema under a name unique to the profiling run, so concurrent runs against
//! the same target never see each other's data. Each column's probe results are
//! staged here and read back by the statistics calculators.

use std::fmt;
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Date32Type, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use datafusion::datasource::MemTable;
use datafusion::sql::TableReference;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::security::SqlSecurity;
use crate::store::TableStore;

/// Name of the single column of every staging table.
pub const STAGED_COLUMN: &str = "converted_data";

/// Target representation of a staged column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Representation {
    Numeric,
    Date,
    Text,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Representation::Numeric => "numeric",
            Representation::Date => "date",
            Representation::Text => "text",
        };
        f.write_str(name)
    }
}

/// A column's values after a successful conversion.
///
/// Numbers have two shapes: `Integer` keeps 64-bit integers exact, `Numeric`
/// holds everything else as 64-bit floats.
#[derive(Debug, Clone, PartialEq)]
pub enum StagedValues {
    Integer(Vec<Option<i64>>),
    Numeric(Vec<Option<f64>>),
    Date(Vec<Option<NaiveDate>>),
    Text(Vec<Option<String>>),
}

impl StagedValues {
    pub fn representation(&self) -> Representation {
        match self {
            StagedValues::Integer(_) | StagedValues::Numeric(_) => Representation::Numeric,
            StagedValues::Date(_) => Representation::Date,
            StagedValues::Text(_) => Representation::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            StagedValues::Integer(values) => values.len(),
            StagedValues::Numeric(values) => values.len(),
            StagedValues::Date(values) => values.len(),
            StagedValues::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn non_null_count(&self) -> usize {
        match self {
            StagedValues::Integer(values) => values.iter().flatten().count(),
            StagedValues::Numeric(values) => values.iter().flatten().count(),
            StagedValues::Date(values) => values.iter().flatten().count(),
            StagedValues::Text(values) => values.iter().flatten().count(),
        }
    }

    fn into_array(self) -> ArrayRef {
        match self {
            StagedValues::Integer(values) => Arc::new(Int64Array::from(values)),
            StagedValues::Numeric(values) => Arc::new(Float64Array::from(values)),
            StagedValues::Date(values) => Arc::new(Date32Array::from(
                values
                    .into_iter()
                    .map(|value| value.map(Date32Type::from_naive_date))
                    .collect::<Vec<_>>(),
            )),
            StagedValues::Text(values) => Arc::new(StringArray::from(values)),
        }
    }

    fn into_batch(self) -> Result<RecordBatch> {
        let array = self.into_array();
        let schema = Arc::new(Schema::new(vec![Field::new(
            STAGED_COLUMN,
            array.data_type().clone(),
            true,
        )]));
        Ok(RecordBatch::try_new(schema, vec![array])?)
    }
}

/// Description of what is currently staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedSummary {
    pub representation: Representation,
    pub rows: usize,
    pub non_null: usize,
}

/// Run-scoped scratch table for converted column values.
pub struct StagingArea {
    store: TableStore,
    name: String,
    staged: Option<StagedSummary>,
}

impl StagingArea {
    /// Creates an empty staging area with a fresh unique name.
    pub fn new(store: &TableStore) -> Self {
        Self {
            store: store.clone(),
            name: format!("__staging_{}", Uuid::new_v4().simple()),
            staged: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// What is currently staged, if anything.
    pub fn staged(&self) -> Option<StagedSummary> {
        self.staged
    }

    /// Replaces the staged content with `values`.
    pub fn stage(&mut self, values: StagedValues) -> Result<()> {
        self.clear()?;
        let summary = StagedSummary {
            representation: values.representation(),
            rows: values.len(),
            non_null: values.non_null_count(),
        };
        let batch = values.into_batch()?;
        let provider = MemTable::try_new(batch.schema(), vec![vec![batch]])?;
        self.store
            .session()
            .register_table(TableReference::bare(self.name.as_str()), Arc::new(provider))?;
        debug!(
            staging = %self.name,
            representation = %summary.representation,
            rows = summary.rows,
            "Staged column values"
        );
        self.staged = Some(summary);
        Ok(())
    }

    /// Drops the staged content. Clearing an empty staging area is a no-op.
    pub fn clear(&mut self) -> Result<()> {
        if self.staged.take().is_some() {
            self.store
                .session()
                .deregister_table(TableReference::bare(self.name.as_str()))?;
        }
        Ok(())
    }

    /// The staging table as a quoted SQL relation.
    pub(crate) fn relation(&self) -> Result<String> {
        SqlSecurity::quote_identifier(&self.name)
    }

    pub(crate) async fn query(&self, sql: &str) -> Result<Vec<RecordBatch>> {
        self.store.query(sql).await
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if let Err(e) = self.clear() {
            warn!(staging = %self.name, error = %e, "Failed to drop staging table");
        }
    }
}
