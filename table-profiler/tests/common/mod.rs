//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use arrow::array::{
    ArrayRef, Date32Array, Float64Array, Int64Array, StringArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, Date32Type, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, TimeZone, Utc};
use datafusion::prelude::SessionContext;
use table_profiler::audit::{AuditStamp, FixedAudit};
use table_profiler::catalog::InMemoryCatalog;
use table_profiler::store::TableStore;
use table_profiler::target::TargetId;

pub const ACTOR: &str = "metaadmin";

pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn stamp_at(hour: u32) -> AuditStamp {
    AuditStamp::new(ACTOR, Utc.with_ymd_and_hms(2019, 2, 5, hour, 0, 0).unwrap())
}

pub fn fixed_audit() -> FixedAudit {
    FixedAudit(stamp_at(13))
}

fn batch(columns: Vec<(&str, ArrayRef)>) -> RecordBatch {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
        .collect();
    let arrays = columns.into_iter().map(|(_, array)| array).collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
}

/// Integer, text, code and date columns of three rows each.
pub fn col_level_meta_batch() -> RecordBatch {
    batch(vec![
        ("c_num", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
        ("c_text", Arc::new(StringArray::from(vec!["abc", "efgh", "ijklm"])) as ArrayRef),
        ("c_code", Arc::new(StringArray::from(vec!["M", "F", "F"])) as ArrayRef),
        (
            "c_date",
            Arc::new(Date32Array::from(
                [ymd(2018, 1, 1), ymd(2018, 2, 1), ymd(2018, 3, 2)]
                    .into_iter()
                    .map(Date32Type::from_naive_date)
                    .collect::<Vec<_>>(),
            )) as ArrayRef,
        ),
    ])
}

pub fn text_batch(column: &str, values: &[Option<&str>]) -> RecordBatch {
    batch(vec![(column, Arc::new(StringArray::from(values.to_vec())) as ArrayRef)])
}

pub fn float_batch(column: &str, values: &[Option<f64>]) -> RecordBatch {
    batch(vec![(column, Arc::new(Float64Array::from(values.to_vec())) as ArrayRef)])
}

pub fn int_batch(column: &str, values: &[Option<i64>]) -> RecordBatch {
    batch(vec![(column, Arc::new(Int64Array::from(values.to_vec())) as ArrayRef)])
}

/// `seen` as UTC timestamps: 2018-01-01T00:00:00Z and 2018-02-01T06:30:00Z.
pub fn utc_timestamp_batch() -> RecordBatch {
    let seconds = [ymd(2018, 1, 1).and_hms_opt(0, 0, 0), ymd(2018, 2, 1).and_hms_opt(6, 30, 0)]
        .into_iter()
        .map(|datetime| datetime.map(|datetime| datetime.and_utc().timestamp()))
        .collect::<Vec<_>>();
    let schema = Arc::new(Schema::new(vec![Field::new(
        "seen",
        DataType::Timestamp(TimeUnit::Second, Some("UTC".into())),
        true,
    )]));
    let array = TimestampSecondArray::from(seconds).with_timezone("UTC");
    RecordBatch::try_new(schema, vec![Arc::new(array)]).unwrap()
}

/// Integer column followed by a column with no non-null values.
pub fn with_null_column_batch() -> RecordBatch {
    batch(vec![
        ("c_num", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
        ("c_empty", Arc::new(StringArray::from(vec![None::<&str>, None, None])) as ArrayRef),
    ])
}

pub fn empty_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("c_num", DataType::Int64, true),
        Field::new("c_text", DataType::Utf8, true),
    ]));
    RecordBatch::new_empty(schema)
}

/// Registers `batch` as `data.<table>` and `target_id` in a fresh catalog.
pub async fn setup(target_id: i64, table: &str, batch: RecordBatch) -> (TableStore, InMemoryCatalog) {
    let store = TableStore::new(SessionContext::new());
    store.register_batch("data", table, batch).unwrap();
    let catalog = InMemoryCatalog::new();
    catalog
        .register_target(TargetId::new(target_id), format!("data.{table}"))
        .await;
    (store, catalog)
}
