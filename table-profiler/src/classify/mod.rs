//! Column classification.
//!
//! A column is classified by a short-circuiting cascade: the numeric probe,
//! then the date probe, then the categorical gate, with text as the fallback.
//! Each probe converts natively typed columns directly and probes the rest
//! through their text rendering. The winning step leaves the column's
//! converted values in the [`StagingArea`] for the statistics calculators.
//!
//! ```rust,no_run
//! use datafusion::prelude::SessionContext;
//! use table_profiler::classify::{Classification, ColumnClassifier};
//! use table_profiler::staging::StagingArea;
//! use table_profiler::store::TableStore;
//! use table_profiler::target::QualifiedTable;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = TableStore::new(SessionContext::new());
//! let table = QualifiedTable::new("data", "survey");
//! let mut staging = StagingArea::new(&store);
//!
//! let classified = ColumnClassifier::new(10)
//!     .classify(&store, &table, "answer", &mut staging)
//!     .await
//!     .unwrap();
//! if classified.classification == Classification::Categorical {
//!     println!("{} distinct codes", classified.distinct.unwrap_or(0));
//! }
//! # })
//! ```

pub mod gate;
pub mod probe;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::logging::{truncate_field, MAX_LOGGED_VALUE_LENGTH};
use crate::staging::{Representation, StagedValues, StagingArea};
use crate::store::{text_values, TableStore};
use crate::target::QualifiedTable;

pub use gate::GateDecision;
pub use probe::{convert_native, probe, ConversionError};

/// The inferred semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "code")]
    Categorical,
    #[serde(rename = "text")]
    Text,
}

impl Classification {
    /// Catalog type name of the classification.
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Numeric => "numeric",
            Classification::Date => "date",
            Classification::Categorical => "code",
            Classification::Text => "text",
        }
    }

    /// Representation the statistics calculator for this classification reads.
    pub fn representation(&self) -> Representation {
        match self {
            Classification::Numeric => Representation::Numeric,
            Classification::Date => Representation::Date,
            Classification::Categorical | Classification::Text => Representation::Text,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type probes in cascade order.
const TYPE_PROBES: [(Classification, Representation); 2] = [
    (Classification::Numeric, Representation::Numeric),
    (Classification::Date, Representation::Date),
];

/// Result of classifying one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedColumn {
    pub name: String,
    pub classification: Classification,
    /// Distinct non-null count, when the categorical gate was evaluated.
    pub distinct: Option<u64>,
}

/// Runs the classification cascade for individual columns.
#[derive(Debug, Clone, Copy)]
pub struct ColumnClassifier {
    categorical_threshold: u64,
}

impl ColumnClassifier {
    pub fn new(categorical_threshold: u64) -> Self {
        Self {
            categorical_threshold,
        }
    }

    pub fn categorical_threshold(&self) -> u64 {
        self.categorical_threshold
    }

    /// Classifies `column` of `table`, leaving its converted values staged.
    #[instrument(skip(self, store, staging), fields(table = %table, threshold = self.categorical_threshold))]
    pub async fn classify(
        &self,
        store: &TableStore,
        table: &QualifiedTable,
        column: &str,
        staging: &mut StagingArea,
    ) -> Result<ClassifiedColumn> {
        let source = store.scan_column(table, column).await?;
        let values = text_values(source.as_ref())?;

        for (classification, representation) in TYPE_PROBES {
            staging.clear()?;
            let converted = match convert_native(representation, source.as_ref())? {
                Some(staged) => Ok(staged),
                None => probe(representation, &values),
            };
            match converted {
                Ok(staged) => {
                    staging.stage(staged)?;
                    debug!(column, %classification, "Probe succeeded");
                    return Ok(ClassifiedColumn {
                        name: column.to_string(),
                        classification,
                        distinct: None,
                    });
                }
                Err(e) => {
                    debug!(
                        column,
                        %representation,
                        row = e.row,
                        value = %truncate_field(&e.value, MAX_LOGGED_VALUE_LENGTH),
                        "Probe failed, falling through"
                    );
                }
            }
        }

        let decision = GateDecision::new(
            store.distinct_count(table, column).await?,
            self.categorical_threshold,
        );
        staging.clear()?;
        staging.stage(StagedValues::Text(values))?;

        let classification = if decision.is_categorical() {
            Classification::Categorical
        } else {
            Classification::Text
        };
        debug!(column, distinct = decision.distinct, %classification, "Categorical gate evaluated");

        Ok(ClassifiedColumn {
            name: column.to_string(),
            classification,
            distinct: Some(decision.distinct),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{
        col_level_meta_batch, float_batch, int_batch, store_with_table, text_batch,
        utc_timestamp_batch,
    };

    async fn classify_column(
        store: &TableStore,
        table: &QualifiedTable,
        column: &str,
        threshold: u64,
    ) -> (ClassifiedColumn, StagingArea) {
        let mut staging = StagingArea::new(store);
        let classified = ColumnClassifier::new(threshold)
            .classify(store, table, column, &mut staging)
            .await
            .unwrap();
        (classified, staging)
    }

    #[test]
    fn test_catalog_type_names() {
        assert_eq!(Classification::Numeric.to_string(), "numeric");
        assert_eq!(Classification::Date.to_string(), "date");
        assert_eq!(Classification::Categorical.to_string(), "code");
        assert_eq!(Classification::Text.to_string(), "text");
        assert_eq!(
            serde_json::to_string(&Classification::Categorical).unwrap(),
            "\"code\""
        );
    }

    #[tokio::test]
    async fn test_col_level_meta_classifications() {
        let store = store_with_table("data", "col_level_meta", col_level_meta_batch());
        let table = QualifiedTable::new("data", "col_level_meta");

        let expected = [
            ("c_num", Classification::Numeric),
            ("c_text", Classification::Text),
            ("c_code", Classification::Categorical),
            ("c_date", Classification::Date),
        ];
        for (column, classification) in expected {
            let (classified, staging) = classify_column(&store, &table, column, 2).await;
            assert_eq!(classified.classification, classification, "{column}");
            assert_eq!(
                staging.staged().map(|s| s.representation),
                Some(classification.representation())
            );
        }
    }

    #[tokio::test]
    async fn test_gate_sees_exact_threshold() {
        let batch = text_batch("answer", &[Some("a"), Some("b"), Some("c"), Some("a")]);
        let store = store_with_table("data", "answers", batch);
        let table = QualifiedTable::new("data", "answers");

        let (at, _) = classify_column(&store, &table, "answer", 3).await;
        assert_eq!(at.classification, Classification::Categorical);
        assert_eq!(at.distinct, Some(3));

        let (over, _) = classify_column(&store, &table, "answer", 2).await;
        assert_eq!(over.classification, Classification::Text);
    }

    #[tokio::test]
    async fn test_numeric_text_column_is_numeric_before_categorical() {
        let batch = text_batch("flag", &[Some("0"), Some("1"), Some("1")]);
        let store = store_with_table("data", "flags", batch);
        let table = QualifiedTable::new("data", "flags");

        let (classified, _) = classify_column(&store, &table, "flag", 10).await;
        assert_eq!(classified.classification, Classification::Numeric);
        assert_eq!(classified.distinct, None);
    }

    #[tokio::test]
    async fn test_date_strings_classify_as_date() {
        let batch = text_batch("loaded", &[Some("2019-02-05"), None, Some("02/06/2019")]);
        let store = store_with_table("data", "loads", batch);
        let table = QualifiedTable::new("data", "loads");

        let (classified, staging) = classify_column(&store, &table, "loaded", 10).await;
        assert_eq!(classified.classification, Classification::Date);
        assert_eq!(staging.staged().map(|s| s.non_null), Some(2));
    }

    #[tokio::test]
    async fn test_all_null_column_classifies_numeric() {
        let batch = text_batch("empty", &[None, None, None]);
        let store = store_with_table("data", "nulls", batch);
        let table = QualifiedTable::new("data", "nulls");

        let (classified, staging) = classify_column(&store, &table, "empty", 10).await;
        assert_eq!(classified.classification, Classification::Numeric);
        assert_eq!(staging.staged().map(|s| s.non_null), Some(0));
    }

    #[tokio::test]
    async fn test_native_float_with_nan_is_numeric() {
        let batch = float_batch("ratio", &[Some(1.0), Some(f64::NAN), Some(3.0)]);
        let store = store_with_table("data", "ratios", batch);
        let table = QualifiedTable::new("data", "ratios");

        let (classified, staging) = classify_column(&store, &table, "ratio", 10).await;
        assert_eq!(classified.classification, Classification::Numeric);
        assert_eq!(staging.staged().map(|s| s.non_null), Some(3));
    }

    #[tokio::test]
    async fn test_utc_timestamps_are_dates() {
        let store = store_with_table("data", "events", utc_timestamp_batch("seen"));
        let table = QualifiedTable::new("data", "events");

        let (classified, staging) = classify_column(&store, &table, "seen", 10).await;
        assert_eq!(classified.classification, Classification::Date);
        assert_eq!(
            staging.staged().map(|s| s.representation),
            Some(Representation::Date)
        );
    }

    #[tokio::test]
    async fn test_large_integers_stay_numeric() {
        let batch = int_batch("id", &[Some(9_007_199_254_740_993), Some(1)]);
        let store = store_with_table("data", "ids", batch);
        let table = QualifiedTable::new("data", "ids");

        let (classified, _) = classify_column(&store, &table, "id", 10).await;
        assert_eq!(classified.classification, Classification::Numeric);
    }
}
