//! Frequency table of a categorical column.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::staged_input;
use crate::classify::Classification;
use crate::error::{ProfilerError, Result};
use crate::staging::StagingArea;
use crate::store::{column_i64, column_strings};

/// Occurrences of one distinct code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFrequency {
    pub code: String,
    pub frequency: u64,
}

/// One entry per distinct non-null value, ordered by value ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoricalStatistics {
    pub frequencies: Vec<CodeFrequency>,
}

impl CategoricalStatistics {
    /// Sum of all frequencies, equal to the column's non-null row count.
    pub fn total(&self) -> u64 {
        self.frequencies.iter().map(|entry| entry.frequency).sum()
    }
}

#[instrument(skip(staging))]
pub async fn compute(column: &str, staging: &StagingArea) -> Result<CategoricalStatistics> {
    const KIND: Classification = Classification::Categorical;
    let input = staged_input(column, KIND, staging)?;
    let sql = format!(
        "SELECT {value} AS code, COUNT(*) AS frequency FROM {relation} \
         WHERE {value} IS NOT NULL GROUP BY {value} ORDER BY {value} ASC",
        value = input.value,
        relation = input.relation
    );
    let batches = staging.query(&sql).await?;

    let codes = column_strings(&batches, 0)?;
    let counts = column_i64(&batches, 1)?;
    let frequencies = codes
        .into_iter()
        .zip(counts)
        .map(|(code, count)| match (code, count) {
            (Some(code), Some(count)) if count > 0 => Ok(CodeFrequency {
                code,
                frequency: count as u64,
            }),
            _ => Err(ProfilerError::statistics(
                column,
                KIND,
                "frequency table contains a null or empty group",
            )),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CategoricalStatistics { frequencies })
}
