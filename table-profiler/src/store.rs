//! Row store and schema registry backed by a DataFusion `SessionContext`.
//!
//! Namespaces map to DataFusion schemas in the session's default catalog and
//! tables to registered `TableProvider`s. Anything DataFusion can register
//! (in-memory batches, CSV, Parquet, database table providers) can be profiled.

use std::sync::Arc;

use arrow::array::{new_empty_array, Array, ArrayRef, AsArray};
use arrow::compute::{cast, concat};
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use datafusion::catalog::MemorySchemaProvider;
use datafusion::datasource::{MemTable, TableProvider};
use datafusion::prelude::*;
use datafusion::sql::TableReference;
use tracing::{debug, instrument};

use crate::error::{ProfilerError, Result};
use crate::security::SqlSecurity;
use crate::target::QualifiedTable;

/// Read access to the tables being profiled.
#[derive(Clone)]
pub struct TableStore {
    ctx: SessionContext,
}

impl TableStore {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    /// Returns the underlying session.
    pub fn session(&self) -> &SessionContext {
        &self.ctx
    }

    /// Registers an in-memory table, creating the namespace when missing.
    pub fn register_batch(&self, namespace: &str, table: &str, batch: RecordBatch) -> Result<()> {
        self.ensure_namespace(namespace)?;
        let provider = MemTable::try_new(batch.schema(), vec![vec![batch]])?;
        self.ctx
            .register_table(TableReference::partial(namespace, table), Arc::new(provider))?;
        debug!(namespace, table, "Registered in-memory table");
        Ok(())
    }

    fn ensure_namespace(&self, namespace: &str) -> Result<()> {
        SqlSecurity::validate_identifier(namespace)?;
        let catalog_name = self
            .ctx
            .state()
            .config_options()
            .catalog
            .default_catalog
            .clone();
        let catalog = self.ctx.catalog(&catalog_name).ok_or_else(|| {
            ProfilerError::internal(format!("Default catalog '{catalog_name}' is not registered"))
        })?;
        if catalog.schema(namespace).is_none() {
            catalog.register_schema(namespace, Arc::new(MemorySchemaProvider::new()))?;
        }
        Ok(())
    }

    async fn provider(&self, table: &QualifiedTable) -> Result<Arc<dyn TableProvider>> {
        Ok(self
            .ctx
            .table_provider(TableReference::partial(
                table.namespace.as_str(),
                table.table.as_str(),
            ))
            .await?)
    }

    /// Counts the rows of `table`.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn row_count(&self, table: &QualifiedTable) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(*) AS n_rows FROM {}",
            SqlSecurity::quote_table(table)?
        );
        let batches = self.query(&sql).await?;
        Ok(scalar_i64(&batches, 0)?.unwrap_or(0).max(0) as u64)
    }

    /// Column names of `table` in declaration order.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn column_names(&self, table: &QualifiedTable) -> Result<Vec<String>> {
        let provider = self.provider(table).await?;
        Ok(provider
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect())
    }

    /// Storage size of `table` in bytes.
    ///
    /// Uses the provider's byte-size statistic when it has one, otherwise the
    /// Arrow memory footprint of a full scan.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn storage_size(&self, table: &QualifiedTable) -> Result<u64> {
        let provider = self.provider(table).await?;
        if let Some(size) = provider
            .statistics()
            .and_then(|stats| stats.total_byte_size.get_value().copied())
        {
            return Ok(size as u64);
        }

        let sql = format!("SELECT * FROM {}", SqlSecurity::quote_table(table)?);
        let batches = self.query(&sql).await?;
        Ok(batches
            .iter()
            .map(|batch| batch.get_array_memory_size() as u64)
            .sum())
    }

    /// Every value of `column` in its native Arrow type, in row order.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn scan_column(&self, table: &QualifiedTable, column: &str) -> Result<ArrayRef> {
        let sql = format!(
            "SELECT {} FROM {}",
            SqlSecurity::quote_identifier(column)?,
            SqlSecurity::quote_table(table)?
        );
        let df = self.ctx.sql(&sql).await?;
        let data_type = df.schema().field(0).data_type().clone();
        let batches = df.collect().await?;

        let arrays: Vec<&dyn Array> = batches.iter().map(|batch| batch.column(0).as_ref()).collect();
        if arrays.is_empty() {
            return Ok(new_empty_array(&data_type));
        }
        Ok(concat(&arrays)?)
    }

    /// Number of distinct non-null values of `column`.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn distinct_count(&self, table: &QualifiedTable, column: &str) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(DISTINCT {}) AS n_distinct FROM {}",
            SqlSecurity::quote_identifier(column)?,
            SqlSecurity::quote_table(table)?
        );
        let batches = self.query(&sql).await?;
        Ok(scalar_i64(&batches, 0)?.unwrap_or(0).max(0) as u64)
    }

    pub(crate) async fn query(&self, sql: &str) -> Result<Vec<RecordBatch>> {
        let df = self.ctx.sql(sql).await?;
        Ok(df.collect().await?)
    }
}

fn first_value(batches: &[RecordBatch], index: usize, target: &DataType) -> Result<Option<ArrayRef>> {
    let Some(batch) = batches.iter().find(|batch| batch.num_rows() > 0) else {
        return Ok(None);
    };
    if index >= batch.num_columns() {
        return Err(ProfilerError::internal(format!(
            "Result has {} column(s), expected at least {}",
            batch.num_columns(),
            index + 1
        )));
    }
    let array = cast(batch.column(index), target)?;
    if array.is_null(0) {
        return Ok(None);
    }
    Ok(Some(array))
}

/// Reads the first row of column `index` as an `i64`.
pub(crate) fn scalar_i64(batches: &[RecordBatch], index: usize) -> Result<Option<i64>> {
    match first_value(batches, index, &DataType::Int64)? {
        Some(array) => array
            .as_primitive_opt::<Int64Type>()
            .map(|values| Some(values.value(0)))
            .ok_or_else(|| ProfilerError::internal("Expected Int64 array")),
        None => Ok(None),
    }
}

/// Reads the first row of column `index` as an `f64`.
pub(crate) fn scalar_f64(batches: &[RecordBatch], index: usize) -> Result<Option<f64>> {
    match first_value(batches, index, &DataType::Float64)? {
        Some(array) => array
            .as_primitive_opt::<Float64Type>()
            .map(|values| Some(values.value(0)))
            .ok_or_else(|| ProfilerError::internal("Expected Float64 array")),
        None => Ok(None),
    }
}

/// Reads the first row of column `index` as a date.
pub(crate) fn scalar_date(batches: &[RecordBatch], index: usize) -> Result<Option<NaiveDate>> {
    match first_value(batches, index, &DataType::Date32)? {
        Some(array) => array
            .as_primitive_opt::<Date32Type>()
            .map(|values| values.value_as_date(0))
            .ok_or_else(|| ProfilerError::internal("Expected Date32 array")),
        None => Ok(None),
    }
}

/// Renders every value of `array` as text, keeping nulls.
pub(crate) fn text_values(array: &dyn Array) -> Result<Vec<Option<String>>> {
    let rendered = cast(array, &DataType::Utf8)?;
    let strings = rendered
        .as_string_opt::<i32>()
        .ok_or_else(|| ProfilerError::internal("Expected Utf8 array"))?;
    Ok(strings.iter().map(|value| value.map(str::to_string)).collect())
}

/// Reads every row of column `index` across `batches` as text.
pub(crate) fn column_strings(batches: &[RecordBatch], index: usize) -> Result<Vec<Option<String>>> {
    let mut values = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());
    for batch in batches {
        if index >= batch.num_columns() {
            return Err(ProfilerError::internal(format!(
                "Result has {} column(s), expected at least {}",
                batch.num_columns(),
                index + 1
            )));
        }
        values.extend(text_values(batch.column(index).as_ref())?);
    }
    Ok(values)
}

/// Reads every row of column `index` across `batches` as `i64`.
pub(crate) fn column_i64(batches: &[RecordBatch], index: usize) -> Result<Vec<Option<i64>>> {
    let mut values = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());
    for batch in batches {
        if index >= batch.num_columns() {
            return Err(ProfilerError::internal(format!(
                "Result has {} column(s), expected at least {}",
                batch.num_columns(),
                index + 1
            )));
        }
        let array = cast(batch.column(index), &DataType::Int64)?;
        let ints = array
            .as_primitive_opt::<Int64Type>()
            .ok_or_else(|| ProfilerError::internal("Expected Int64 array"))?;
        values.extend(ints.iter());
    }
    Ok(values)
}
