//! Arrow fixtures shared by unit tests.

use std::sync::Arc;

use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray, TimestampSecondArray};
use arrow::datatypes::{DataType, Date32Type, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use datafusion::prelude::SessionContext;

use crate::store::TableStore;

fn date32(year: i32, month: u32, day: u32) -> i32 {
    Date32Type::from_naive_date(NaiveDate::from_ymd_opt(year, month, day).unwrap())
}

/// One column of each classification:
/// `c_num` {1,2,3}, `c_text` {abc,efgh,ijklm}, `c_code` {M,F,F} and
/// `c_date` {2018-01-01, 2018-02-01, 2018-03-02}.
pub fn col_level_meta_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("c_num", DataType::Int64, true),
        Field::new("c_text", DataType::Utf8, true),
        Field::new("c_code", DataType::Utf8, true),
        Field::new("c_date", DataType::Date32, true),
    ]));

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3])),
            Arc::new(StringArray::from(vec!["abc", "efgh", "ijklm"])),
            Arc::new(StringArray::from(vec!["M", "F", "F"])),
            Arc::new(Date32Array::from(vec![
                date32(2018, 1, 1),
                date32(2018, 2, 1),
                date32(2018, 3, 2),
            ])),
        ],
    )
    .unwrap()
}

/// A single nullable text column.
pub fn text_batch(column: &str, values: &[Option<&str>]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new(column, DataType::Utf8, true)]));
    RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(values.to_vec()))]).unwrap()
}

/// A single nullable `Float64` column.
pub fn float_batch(column: &str, values: &[Option<f64>]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new(column, DataType::Float64, true)]));
    RecordBatch::try_new(schema, vec![Arc::new(Float64Array::from(values.to_vec()))]).unwrap()
}

/// A single nullable `Int64` column.
pub fn int_batch(column: &str, values: &[Option<i64>]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new(column, DataType::Int64, true)]));
    RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values.to_vec()))]).unwrap()
}

/// A UTC timestamp column: 2018-01-01T00:00:00Z and 2018-02-01T00:00:00Z.
pub fn utc_timestamp_batch(column: &str) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new(
        column,
        DataType::Timestamp(TimeUnit::Second, Some("UTC".into())),
        true,
    )]));
    let seconds =
        TimestampSecondArray::from(vec![1_514_764_800, 1_517_443_200]).with_timezone("UTC");
    RecordBatch::try_new(schema, vec![Arc::new(seconds)]).unwrap()
}

/// A fresh store holding `batch` as `namespace.table`.
pub fn store_with_table(namespace: &str, table: &str, batch: RecordBatch) -> TableStore {
    let store = TableStore::new(SessionContext::new());
    store.register_batch(namespace, table, batch).unwrap();
    store
}
