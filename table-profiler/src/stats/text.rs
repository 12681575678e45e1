//! Length statistics of a text column, in characters.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{required, staged_input};
use crate::classify::Classification;
use crate::error::Result;
use crate::staging::StagingArea;
use crate::store::{scalar_f64, scalar_i64};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStatistics {
    pub max_length: i64,
    pub min_length: i64,
    /// Interpolated median length, rounded half to even.
    pub median_length: i64,
}

#[instrument(skip(staging))]
pub async fn compute(column: &str, staging: &StagingArea) -> Result<TextStatistics> {
    const KIND: Classification = Classification::Text;
    let input = staged_input(column, KIND, staging)?;
    let sql = format!(
        "SELECT MAX(len) AS max_length, MIN(len) AS min_length, \
         MEDIAN(CAST(len AS DOUBLE)) AS median_length \
         FROM (SELECT CAST(character_length({value}) AS BIGINT) AS len \
               FROM {relation} WHERE {value} IS NOT NULL) AS lengths",
        value = input.value,
        relation = input.relation
    );
    let batches = staging.query(&sql).await?;

    let median = required(scalar_f64(&batches, 2)?, column, KIND, "median length")?;
    Ok(TextStatistics {
        max_length: required(scalar_i64(&batches, 0)?, column, KIND, "maximum length")?,
        min_length: required(scalar_i64(&batches, 1)?, column, KIND, "minimum length")?,
        median_length: median.round_ties_even() as i64,
    })
}
