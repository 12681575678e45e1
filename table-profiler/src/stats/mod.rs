//! Statistics calculators.
//!
//! Each calculator reads the column's converted values from the
//! [`StagingArea`] populated during classification, never the source table.
//! A calculator refuses to run on an empty staging area or on staged values of
//! the wrong representation.

pub mod categorical;
pub mod date;
pub mod numeric;
pub mod text;

use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::error::{ProfilerError, Result};
use crate::security::SqlSecurity;
use crate::staging::{StagingArea, STAGED_COLUMN};

pub use categorical::{CategoricalStatistics, CodeFrequency};
pub use date::DateStatistics;
pub use numeric::{Number, NumericStatistics};
pub use text::TextStatistics;

/// Statistics for one column, shaped by its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStatistics {
    Numeric(NumericStatistics),
    Text(TextStatistics),
    Date(DateStatistics),
    Categorical(CategoricalStatistics),
}

impl ColumnStatistics {
    pub fn classification(&self) -> Classification {
        match self {
            ColumnStatistics::Numeric(_) => Classification::Numeric,
            ColumnStatistics::Text(_) => Classification::Text,
            ColumnStatistics::Date(_) => Classification::Date,
            ColumnStatistics::Categorical(_) => Classification::Categorical,
        }
    }
}

/// Runs the calculator matching `classification` against the staged values.
pub async fn compute(
    column: &str,
    classification: Classification,
    staging: &StagingArea,
) -> Result<ColumnStatistics> {
    Ok(match classification {
        Classification::Numeric => ColumnStatistics::Numeric(numeric::compute(column, staging).await?),
        Classification::Text => ColumnStatistics::Text(text::compute(column, staging).await?),
        Classification::Date => ColumnStatistics::Date(date::compute(column, staging).await?),
        Classification::Categorical => {
            ColumnStatistics::Categorical(categorical::compute(column, staging).await?)
        }
    })
}

/// Staged relation and value column, once the staging area is known to hold
/// non-null values of the representation `classification` needs.
pub(crate) struct StagedInput {
    pub relation: String,
    pub value: String,
}

pub(crate) fn staged_input(
    column: &str,
    classification: Classification,
    staging: &StagingArea,
) -> Result<StagedInput> {
    let Some(summary) = staging.staged() else {
        return Err(ProfilerError::statistics(
            column,
            classification,
            "no data: staging area is empty",
        ));
    };
    let expected = classification.representation();
    if summary.representation != expected {
        return Err(ProfilerError::statistics(
            column,
            classification,
            format!(
                "staging area holds {} values, expected {expected}",
                summary.representation
            ),
        ));
    }
    if summary.non_null == 0 {
        return Err(ProfilerError::statistics(
            column,
            classification,
            format!("no data: all {} staged value(s) are null", summary.rows),
        ));
    }
    Ok(StagedInput {
        relation: staging.relation()?,
        value: SqlSecurity::quote_identifier(STAGED_COLUMN)?,
    })
}

/// Fails with "no data" when an aggregate came back NULL.
pub(crate) fn required<T>(
    value: Option<T>,
    column: &str,
    classification: Classification,
    what: &str,
) -> Result<T> {
    value.ok_or_else(|| {
        ProfilerError::statistics(column, classification, format!("no data: {what} is null"))
    })
}
