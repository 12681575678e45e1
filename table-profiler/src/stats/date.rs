//! Date range of a date column.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{required, staged_input};
use crate::classify::Classification;
use crate::error::Result;
use crate::staging::StagingArea;
use crate::store::scalar_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateStatistics {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

#[instrument(skip(staging))]
pub async fn compute(column: &str, staging: &StagingArea) -> Result<DateStatistics> {
    const KIND: Classification = Classification::Date;
    let input = staged_input(column, KIND, staging)?;
    let sql = format!(
        "SELECT MIN({value}) AS min_date, MAX({value}) AS max_date FROM {relation}",
        value = input.value,
        relation = input.relation
    );
    let batches = staging.query(&sql).await?;

    Ok(DateStatistics {
        min_date: required(scalar_date(&batches, 0)?, column, KIND, "minimum date")?,
        max_date: required(scalar_date(&batches, 1)?, column, KIND, "maximum date")?,
    })
}
