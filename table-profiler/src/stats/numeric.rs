//! Minimum, maximum, mean and median of a numeric column.

use std::fmt;

use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{required, staged_input};
use crate::classify::Classification;
use crate::error::Result;
use crate::staging::StagingArea;
use crate::store::{scalar_f64, scalar_i64};

/// A column value: exact for integer columns, floating point otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(value) => *value as f64,
            Number::Float(value) => *value,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(value) => write!(f, "{value}"),
            Number::Float(value) => write!(f, "{value}"),
        }
    }
}

/// Summary of a numeric column. The median interpolates between the two
/// middle values when the count is even.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericStatistics {
    pub min: Number,
    pub max: Number,
    pub mean: f64,
    pub median: f64,
}

/// Reads the first row of column `index`, keeping integer results exact.
fn scalar_number(batches: &[RecordBatch], index: usize) -> Result<Option<Number>> {
    let integer = batches
        .first()
        .and_then(|batch| {
            batch
                .schema()
                .fields()
                .get(index)
                .map(|field| field.data_type().is_integer())
        })
        .unwrap_or(false);
    if integer {
        Ok(scalar_i64(batches, index)?.map(Number::Integer))
    } else {
        Ok(scalar_f64(batches, index)?.map(Number::Float))
    }
}

#[instrument(skip(staging))]
pub async fn compute(column: &str, staging: &StagingArea) -> Result<NumericStatistics> {
    const KIND: Classification = Classification::Numeric;
    let input = staged_input(column, KIND, staging)?;
    let value = &input.value;
    let sql = format!(
        "SELECT MIN({value}) AS min_value, MAX({value}) AS max_value, \
         AVG({value}) AS mean_value, MEDIAN(CAST({value} AS DOUBLE)) AS median_value \
         FROM {}",
        input.relation
    );
    let batches = staging.query(&sql).await?;

    Ok(NumericStatistics {
        min: required(scalar_number(&batches, 0)?, column, KIND, "minimum")?,
        max: required(scalar_number(&batches, 1)?, column, KIND, "maximum")?,
        mean: required(scalar_f64(&batches, 2)?, column, KIND, "mean")?,
        median: required(scalar_f64(&batches, 3)?, column, KIND, "median")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::StagedValues;
    use crate::store::TableStore;
    use datafusion::prelude::SessionContext;

    async fn staged_stats(values: StagedValues) -> NumericStatistics {
        let store = TableStore::new(SessionContext::new());
        let mut staging = StagingArea::new(&store);
        staging.stage(values).unwrap();
        compute("c_num", &staging).await.unwrap()
    }

    async fn numeric_stats(values: Vec<Option<f64>>) -> NumericStatistics {
        staged_stats(StagedValues::Numeric(values)).await
    }

    #[tokio::test]
    async fn test_odd_count() {
        let stats = numeric_stats(vec![Some(1.0), Some(2.0), Some(3.0)]).await;
        assert_eq!(
            stats,
            NumericStatistics {
                min: Number::Float(1.0),
                max: Number::Float(3.0),
                mean: 2.0,
                median: 2.0,
            }
        );
    }

    #[tokio::test]
    async fn test_even_count_median_interpolates() {
        let stats = numeric_stats(vec![Some(1.0), Some(2.0)]).await;
        assert_eq!(stats.median, 1.5);
        assert_eq!(stats.mean, 1.5);
    }

    #[tokio::test]
    async fn test_nulls_are_ignored() {
        let stats = numeric_stats(vec![None, Some(-4.0), Some(10.0), None, Some(0.5)]).await;
        assert_eq!(stats.min, Number::Float(-4.0));
        assert_eq!(stats.max, Number::Float(10.0));
        assert_eq!(stats.median, 0.5);
        assert!((stats.mean - 6.5 / 3.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_integer_extremes_are_exact() {
        let stats = staged_stats(StagedValues::Integer(vec![
            Some(9_007_199_254_740_993),
            None,
            Some(1),
        ]))
        .await;
        assert_eq!(stats.min, Number::Integer(1));
        assert_eq!(stats.max, Number::Integer(9_007_199_254_740_993));
    }

    #[tokio::test]
    async fn test_integer_median_interpolates() {
        let stats = staged_stats(StagedValues::Integer(vec![Some(1), Some(2)])).await;
        assert_eq!(stats.median, 1.5);
        assert_eq!(stats.mean, 1.5);
    }

    #[test]
    fn test_number_serializes_without_tag() {
        assert_eq!(
            serde_json::to_string(&Number::Integer(9_007_199_254_740_993)).unwrap(),
            "9007199254740993"
        );
        assert_eq!(serde_json::to_string(&Number::Float(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::from_str::<Number>("3").unwrap(), Number::Integer(3));
        assert_eq!(serde_json::from_str::<Number>("3.0").unwrap(), Number::Float(3.0));
    }
}
